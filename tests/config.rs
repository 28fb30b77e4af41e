//! Site configuration loading

use radiohits::server::SiteConfig;
use std::io::Write;

#[test]
fn test_defaults() {
  let config = SiteConfig::default();
  assert_eq!(config.server.host, "0.0.0.0");
  assert_eq!(config.server.port, 8000);
  assert_eq!(config.server.static_dir, "static");
  assert_eq!(config.sqlite.path, "radiohits.db");
  assert_eq!(config.logging.level, "info");
  assert_eq!(config.auth.login_url, "/login/");
  assert_eq!(config.auth.cookie_name, "radiohits_session");
  assert_eq!(config.auth.session_days, 14);
  assert!(!config.auth.secure_cookies);
  assert_eq!(config.pages.per_page, 6);
  assert_eq!(config.pages.carousel_size, 3);
  assert_eq!(config.address(), "0.0.0.0:8000");
}

#[test]
fn test_partial_yaml_keeps_defaults() {
  let yaml = r#"
server:
  port: 9000
pages:
  per_page: 10
"#;
  let config = SiteConfig::from_yaml(yaml).unwrap();
  assert_eq!(config.server.port, 9000);
  assert_eq!(config.server.host, "0.0.0.0");
  assert_eq!(config.pages.per_page, 10);
  assert_eq!(config.pages.carousel_size, 3);
  assert_eq!(config.auth.cookie_name, "radiohits_session");
}

#[test]
fn test_empty_document_is_all_defaults() {
  let config = SiteConfig::from_yaml("{}").unwrap();
  assert_eq!(config.pages.per_page, 6);
}

#[test]
fn test_env_vars_expanded() {
  std::env::set_var("RADIOHITS_CONFIG_TEST_PATH", "/var/lib/radiohits/site.db");
  let yaml = r#"
sqlite:
  path: ${RADIOHITS_CONFIG_TEST_PATH}
auth:
  secure_cookies: true
"#;
  let config = SiteConfig::from_yaml(yaml).unwrap();
  assert_eq!(config.sqlite.path, "/var/lib/radiohits/site.db");
  assert!(config.auth.secure_cookies);
}

#[test]
fn test_zero_page_size_rejected() {
  let err = SiteConfig::from_yaml("pages:\n  per_page: 0\n").unwrap_err();
  assert!(err.to_string().contains("per_page"));
}

#[test]
fn test_page_size_bounded_by_backend_limit() {
  let config = SiteConfig::from_yaml("pages:\n  per_page: 1000\n").unwrap();
  assert_eq!(config.pages.per_page, 1000);

  let err = SiteConfig::from_yaml("pages:\n  per_page: 2000\n").unwrap_err();
  assert!(err.to_string().contains("per_page"));

  let err = SiteConfig::from_yaml("pages:\n  carousel_size: 1001\n").unwrap_err();
  assert!(err.to_string().contains("carousel_size"));
}

#[test]
fn test_accented_text_in_yaml() {
  std::env::set_var("RADIOHITS_CONFIG_TEST_PORT", "9001");
  let yaml = "# Configuración del sitio\n# Año 2026, señal en línea\nserver:\n  port: $RADIOHITS_CONFIG_TEST_PORT\n  static_dir: estáticos\n";
  let config = SiteConfig::from_yaml(yaml).unwrap();
  assert_eq!(config.server.port, 9001);
  assert_eq!(config.server.static_dir, "estáticos");
}

#[test]
fn test_from_file() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  writeln!(file, "server:\n  host: 127.0.0.1\n  port: 8081").unwrap();
  let config = SiteConfig::from_file(file.path()).unwrap();
  assert_eq!(config.address(), "127.0.0.1:8081");
}

#[test]
fn test_from_file_with_accents() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  writeln!(file, "# Configuración\nsqlite:\n  path: /var/lib/radiohits/sitio.db").unwrap();
  let config = SiteConfig::from_file(file.path()).unwrap();
  assert_eq!(config.sqlite.path, "/var/lib/radiohits/sitio.db");
}

#[test]
fn test_missing_file_is_an_error() {
  assert!(SiteConfig::from_file("/nonexistent/radiohits.yaml").is_err());
}
