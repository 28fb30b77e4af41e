//! Delete confirmation dialog controller.
//!
//! The controller owns no state of its own: every call overwrites the title
//! text, the form action and the container's `hidden` class on whatever
//! [`DialogSurface`] it was built with. The browser surface lives in [`dom`]
//! (feature `csr`); [`memory`] provides an in-process document for tests.

use std::fmt;

#[cfg(feature = "csr")]
pub mod dom;
pub mod memory;

/// Element id of the text node that shows the entry title.
pub const TITLE_ELEMENT_ID: &str = "modalEntryTitle";
/// Element id of the form whose action points at the delete endpoint.
pub const FORM_ELEMENT_ID: &str = "deleteForm";
/// Element id of the dialog container.
pub const MODAL_ELEMENT_ID: &str = "deleteModal";
/// Class whose presence hides the container.
pub const HIDDEN_CLASS: &str = "hidden";
/// Placeholder substituted with the encoded item id.
pub const ID_PLACEHOLDER: &str = "{id}";
/// Form action used when the page does not override it.
pub const DEFAULT_ACTION_TEMPLATE: &str = "/delete_entrada/{id}/";

/// Errors raised while binding a dialog to its elements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialogError {
  #[error("element #{id} not found in document")]
  MissingElement { id: String },
  #[error("element #{id} is not a {expected}")]
  WrongElementType { id: String, expected: &'static str },
  #[error("invalid action template {0:?}: expected exactly one {{id}} placeholder")]
  InvalidTemplate(String),
}

/// The three element writes a dialog needs.
///
/// Implementations hold already-resolved elements, so none of these can fail.
pub trait DialogSurface {
  fn set_title(&self, title: &str);
  fn set_form_action(&self, action: &str);
  fn set_hidden(&self, hidden: bool);
}

/// A form action with a single `{id}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTemplate {
  prefix: String,
  suffix: String,
}

impl ActionTemplate {
  pub fn parse(template: &str) -> Result<Self, DialogError> {
    let mut parts = template.split(ID_PLACEHOLDER);
    match (parts.next(), parts.next(), parts.next()) {
      (Some(prefix), Some(suffix), None) => Ok(Self {
        prefix: prefix.to_string(),
        suffix: suffix.to_string(),
      }),
      _ => Err(DialogError::InvalidTemplate(template.to_string())),
    }
  }

  /// Interpolate `item_id`, percent-encoding anything outside the unreserved set.
  pub fn render(&self, item_id: &str) -> String {
    format!(
      "{}{}{}",
      self.prefix,
      urlencoding::encode(item_id),
      self.suffix
    )
  }
}

impl Default for ActionTemplate {
  fn default() -> Self {
    Self {
      prefix: "/delete_entrada/".into(),
      suffix: "/".into(),
    }
  }
}

impl fmt::Display for ActionTemplate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}{}", self.prefix, ID_PLACEHOLDER, self.suffix)
  }
}

/// Controller for the delete confirmation dialog.
pub struct DeleteDialog<S> {
  surface: S,
  action: ActionTemplate,
}

impl<S: DialogSurface> DeleteDialog<S> {
  pub fn new(surface: S) -> Self {
    Self::with_action(surface, ActionTemplate::default())
  }

  pub fn with_action(surface: S, action: ActionTemplate) -> Self {
    Self { surface, action }
  }

  /// Show the dialog for `item_id`, titled `item_title`.
  pub fn open(&self, item_id: impl fmt::Display, item_title: &str) {
    self.surface.set_title(item_title);
    self
      .surface
      .set_form_action(&self.action.render(&item_id.to_string()));
    self.surface.set_hidden(false);
  }

  pub fn close(&self) {
    self.surface.set_hidden(true);
  }

  pub fn action(&self) -> &ActionTemplate {
    &self.action
  }

  pub fn surface(&self) -> &S {
    &self.surface
  }
}
