use serde::Deserialize;

use crate::types::{Entry, EntryInput};

pub const TITLE_MAX_CHARS: usize = 200;
pub const IMAGE_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
  #[error("Este campo es obligatorio.")]
  Required { field: &'static str },
  #[error("Asegúrese de que este valor tenga como máximo {max} caracteres (tiene {len}).")]
  TooLong {
    field: &'static str,
    max: usize,
    len: usize,
  },
  #[error("Introduzca una URL válida.")]
  InvalidUrl { field: &'static str },
}

impl FormError {
  pub fn field(&self) -> &'static str {
    match self {
      Self::Required { field } | Self::TooLong { field, .. } | Self::InvalidUrl { field } => *field,
    }
  }
}

/// Raw entry form as posted by the browser
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryForm {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub image: String,
  #[serde(default)]
  pub body: String,
}

impl EntryForm {
  pub fn from_entry(entry: &Entry) -> Self {
    Self {
      title: entry.title.clone(),
      image: entry.image.clone().unwrap_or_default(),
      body: entry.body.clone(),
    }
  }

  pub fn validate(&self) -> Result<EntryInput, Vec<FormError>> {
    let mut errors = Vec::new();

    let title = self.title.trim();
    let title_len = title.chars().count();
    if title.is_empty() {
      errors.push(FormError::Required { field: "title" });
    } else if title_len > TITLE_MAX_CHARS {
      errors.push(FormError::TooLong {
        field: "title",
        max: TITLE_MAX_CHARS,
        len: title_len,
      });
    }

    let image = self.image.trim();
    let image_len = image.chars().count();
    if image_len > IMAGE_MAX_CHARS {
      errors.push(FormError::TooLong {
        field: "image",
        max: IMAGE_MAX_CHARS,
        len: image_len,
      });
    } else if !image.is_empty() && !is_image_url(image) {
      errors.push(FormError::InvalidUrl { field: "image" });
    }

    if self.body.trim().is_empty() {
      errors.push(FormError::Required { field: "body" });
    }

    if !errors.is_empty() {
      return Err(errors);
    }

    Ok(EntryInput {
      title: title.to_string(),
      image: (!image.is_empty()).then(|| image.to_string()),
      body: self.body.clone(),
    })
  }
}

fn is_image_url(s: &str) -> bool {
  let rest = s
    .strip_prefix("https://")
    .or_else(|| s.strip_prefix("http://"));
  match rest {
    Some(host_and_path) => {
      !host_and_path.is_empty() && !host_and_path.contains(char::is_whitespace)
    }
    None => s.starts_with('/') && !s.starts_with("//") && !s.contains(char::is_whitespace),
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
  pub next: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form(title: &str, image: &str, body: &str) -> EntryForm {
    EntryForm {
      title: title.into(),
      image: image.into(),
      body: body.into(),
    }
  }

  #[test]
  fn test_valid_form_trims_title_and_drops_empty_image() {
    let input = form("  Festival  ", "", "Texto").validate().unwrap();
    assert_eq!(input.title, "Festival");
    assert_eq!(input.image, None);
    assert_eq!(input.body, "Texto");
  }

  #[test]
  fn test_required_fields() {
    let errors = form("   ", "", "").validate().unwrap_err();
    let fields: Vec<_> = errors.iter().map(FormError::field).collect();
    assert_eq!(fields, vec!["title", "body"]);
    assert_eq!(errors[0].to_string(), "Este campo es obligatorio.");
  }

  #[test]
  fn test_title_limit_counts_characters() {
    let at_limit = "ñ".repeat(TITLE_MAX_CHARS);
    assert!(form(&at_limit, "", "x").validate().is_ok());

    let over = "a".repeat(TITLE_MAX_CHARS + 1);
    let errors = form(&over, "", "x").validate().unwrap_err();
    assert_eq!(
      errors,
      vec![FormError::TooLong {
        field: "title",
        max: 200,
        len: 201
      }]
    );
  }

  #[test]
  fn test_image_urls() {
    assert!(form("t", "https://cdn.example/a.jpg", "b").validate().is_ok());
    assert!(form("t", "/media/a.jpg", "b").validate().is_ok());
    assert!(form("t", "javascript:alert(1)", "b").validate().is_err());
    assert!(form("t", "//evil.example/a.jpg", "b").validate().is_err());
    assert!(form("t", "https://", "b").validate().is_err());
  }
}
