//! URL layout per entry kind

use crate::dialog::DEFAULT_ACTION_TEMPLATE;
use crate::types::EntryKind;

pub const LOGIN: &str = "/login/";
pub const LOGOUT: &str = "/logout/";
pub const BLOG: &str = "/blog/";
pub const CAROUSEL: &str = "/carrusel_index/";
pub const STYLESHEET: &str = "/style.css";
/// Module emitted by wasm-bindgen for the dialog bundle
pub const DIALOG_SCRIPT: &str = "/static/pkg/radiohits.js";

pub fn list(kind: EntryKind) -> &'static str {
  match kind {
    EntryKind::Blog => "/list_entradas_blog/",
    EntryKind::Index => "/list_entradas_index/",
  }
}

pub fn add(kind: EntryKind) -> &'static str {
  match kind {
    EntryKind::Blog => "/add_entrada_blog/",
    EntryKind::Index => "/add_entrada_index/",
  }
}

pub fn update(kind: EntryKind, id: i64) -> String {
  match kind {
    EntryKind::Blog => format!("/update_entrada_blog/{}/", id),
    EntryKind::Index => format!("/update_entrada_index/{}/", id),
  }
}

/// Form action template the delete dialog fills in
pub fn delete_template(kind: EntryKind) -> &'static str {
  match kind {
    EntryKind::Blog => DEFAULT_ACTION_TEMPLATE,
    EntryKind::Index => "/delete_entrada_index/{id}/",
  }
}

pub fn detail(kind: EntryKind, id: i64) -> String {
  match kind {
    EntryKind::Blog => format!("/blog/{}/", id),
    EntryKind::Index => format!("{}#entrada-{}", CAROUSEL, id),
  }
}
