//! One-shot messages carried across a redirect in a cookie.

use axum::http::HeaderMap;

use super::cookies::{self, FLASH_COOKIE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
  Success,
  Error,
}

impl FlashLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Success => "success",
      Self::Error => "error",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
  pub level: FlashLevel,
  pub message: String,
}

impl Flash {
  pub fn success(message: impl Into<String>) -> Self {
    Self {
      level: FlashLevel::Success,
      message: message.into(),
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      level: FlashLevel::Error,
      message: message.into(),
    }
  }

  /// `Set-Cookie` value carrying this message
  pub fn to_cookie(&self) -> String {
    let raw = format!("{}:{}", self.level.as_str(), self.message);
    cookies::set(FLASH_COOKIE, &urlencoding::encode(&raw), None, false)
  }

  /// Message pending in the request cookies, if any
  pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
    let raw = cookies::get(headers, FLASH_COOKIE)?;
    let decoded = urlencoding::decode(&raw).ok()?;
    let (level, message) = decoded.split_once(':')?;
    let level = match level {
      "success" => FlashLevel::Success,
      "error" => FlashLevel::Error,
      _ => return None,
    };
    Some(Self {
      level,
      message: message.to_string(),
    })
  }
}
