use axum::http::{header, HeaderMap};

/// Name of the one-shot message cookie
pub const FLASH_COOKIE: &str = "radiohits_flash";

/// Value of cookie `name` across all `Cookie` headers
pub fn get(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(k, _)| *k == name)
    .map(|(_, v)| v.to_string())
}

/// `Set-Cookie` value for a session-scoped or `max_age`-bound cookie
pub fn set(name: &str, value: &str, max_age_secs: Option<i64>, secure: bool) -> String {
  let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, value);
  if let Some(age) = max_age_secs {
    cookie.push_str(&format!("; Max-Age={}", age));
  }
  if secure {
    cookie.push_str("; Secure");
  }
  cookie
}

/// `Set-Cookie` value that removes `name`
pub fn clear(name: &str) -> String {
  format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  #[test]
  fn test_get_across_headers() {
    let mut headers = HeaderMap::new();
    headers.append(header::COOKIE, HeaderValue::from_static("a=1; b=2"));
    headers.append(header::COOKIE, HeaderValue::from_static("c=3"));
    assert_eq!(get(&headers, "b").as_deref(), Some("2"));
    assert_eq!(get(&headers, "c").as_deref(), Some("3"));
    assert_eq!(get(&headers, "d"), None);
  }

  #[test]
  fn test_set_and_clear() {
    assert_eq!(
      set("s", "tok", Some(60), true),
      "s=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=60; Secure"
    );
    assert!(clear("s").ends_with("Max-Age=0"));
  }
}
