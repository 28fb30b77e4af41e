use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::db::MAX_LIMIT;

/// Expand environment variables in a string.
/// Supports $VAR_NAME and ${VAR_NAME} syntax.
fn expand_env_vars(input: &str) -> String {
  let mut result = input.to_string();

  // ${VAR_NAME} first
  while let Some(start) = result.find("${") {
    if let Some(end) = result[start..].find('}') {
      let var_name = &result[start + 2..start + end];
      let value = std::env::var(var_name).unwrap_or_default();
      result = format!(
        "{}{}{}",
        &result[..start],
        value,
        &result[start + end + 1..]
      );
    } else {
      break;
    }
  }

  // $VAR_NAME (alphanumeric + underscore)
  let mut i = 0;
  while i < result.len() {
    if result[i..].starts_with('$') && !result[i..].starts_with("${") {
      let rest = &result[i + 1..];
      let var_len = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .count();
      if var_len > 0 {
        let var_name = &rest[..var_len];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..i], value, &rest[var_len..]);
        i += value.len();
        continue;
      }
    }
    i += result[i..].chars().next().map_or(1, char::len_utf8);
  }

  result
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
  #[serde(default)]
  pub server: ServerSection,
  #[serde(default)]
  pub sqlite: SqliteSection,
  #[serde(default)]
  pub logging: LoggingSection,
  #[serde(default)]
  pub auth: AuthSection,
  #[serde(default)]
  pub pages: PagesSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
  /// Directory served under /static (holds the wasm bundle in pkg/)
  #[serde(default = "default_static_dir")]
  pub static_dir: String,
}

fn default_host() -> String {
  "0.0.0.0".into()
}
fn default_port() -> u16 {
  8000
}
fn default_static_dir() -> String {
  "static".into()
}

impl Default for ServerSection {
  fn default() -> Self {
    Self {
      host: default_host(),
      port: default_port(),
      static_dir: default_static_dir(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteSection {
  #[serde(default = "default_sqlite_path")]
  pub path: String,
}
fn default_sqlite_path() -> String {
  "radiohits.db".into()
}
impl Default for SqliteSection {
  fn default() -> Self {
    Self {
      path: default_sqlite_path(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
  #[serde(default = "default_level")]
  pub level: String,
}
fn default_level() -> String {
  "info".into()
}
impl Default for LoggingSection {
  fn default() -> Self {
    Self {
      level: default_level(),
    }
  }
}

/// Session login settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSection {
  /// Where anonymous visitors of protected pages are sent
  #[serde(default = "default_login_url")]
  pub login_url: String,
  #[serde(default = "default_cookie_name")]
  pub cookie_name: String,
  #[serde(default = "default_session_days")]
  pub session_days: i64,
  /// Mark cookies `Secure` (enable behind HTTPS)
  #[serde(default)]
  pub secure_cookies: bool,
}

fn default_login_url() -> String {
  "/login/".into()
}
fn default_cookie_name() -> String {
  "radiohits_session".into()
}
fn default_session_days() -> i64 {
  14
}

impl Default for AuthSection {
  fn default() -> Self {
    Self {
      login_url: default_login_url(),
      cookie_name: default_cookie_name(),
      session_days: default_session_days(),
      secure_cookies: false,
    }
  }
}

/// Listing sizes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesSection {
  #[serde(default = "default_per_page")]
  pub per_page: usize,
  #[serde(default = "default_carousel_size")]
  pub carousel_size: usize,
}

fn default_per_page() -> usize {
  6
}
fn default_carousel_size() -> usize {
  3
}

impl Default for PagesSection {
  fn default() -> Self {
    Self {
      per_page: default_per_page(),
      carousel_size: default_carousel_size(),
    }
  }
}

impl SiteConfig {
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
    let content = std::fs::read_to_string(&path)?;
    Self::from_yaml(&content)
  }

  /// Parse YAML after expanding environment variables
  pub fn from_yaml(content: &str) -> Result<Self, anyhow::Error> {
    let expanded = expand_env_vars(content);
    let config: Self = serde_yaml::from_str(&expanded)?;
    if !(1..=MAX_LIMIT).contains(&config.pages.per_page) {
      anyhow::bail!("pages.per_page must be between 1 and {}", MAX_LIMIT);
    }
    if config.pages.carousel_size > MAX_LIMIT {
      anyhow::bail!("pages.carousel_size must be at most {}", MAX_LIMIT);
    }
    Ok(config)
  }

  pub fn find_and_load() -> Result<Option<Self>, anyhow::Error> {
    for p in ["radiohits.yaml", "radiohits.yml"] {
      if Path::new(p).exists() {
        tracing::info!("Loading config from {}", p);
        return Ok(Some(Self::from_file(p)?));
      }
    }
    Ok(None)
  }

  pub fn address(&self) -> String {
    format!("{}:{}", self.server.host, self.server.port)
  }
}
