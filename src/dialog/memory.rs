//! In-process document used to drive a [`DeleteDialog`](super::DeleteDialog)
//! without a browser.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use super::{DialogError, DialogSurface, FORM_ELEMENT_ID, MODAL_ELEMENT_ID, TITLE_ELEMENT_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
  Generic,
  Form,
}

/// A single element: text content, attributes and a class list.
#[derive(Debug)]
pub struct MemoryElement {
  kind: ElementKind,
  text: RefCell<String>,
  attributes: RefCell<BTreeMap<String, String>>,
  classes: RefCell<Vec<String>>,
}

impl MemoryElement {
  fn new(kind: ElementKind) -> Self {
    Self {
      kind,
      text: RefCell::new(String::new()),
      attributes: RefCell::new(BTreeMap::new()),
      classes: RefCell::new(Vec::new()),
    }
  }

  pub fn kind(&self) -> ElementKind {
    self.kind
  }

  pub fn text(&self) -> String {
    self.text.borrow().clone()
  }

  pub fn set_text(&self, text: &str) {
    *self.text.borrow_mut() = text.to_string();
  }

  pub fn attribute(&self, name: &str) -> Option<String> {
    self.attributes.borrow().get(name).cloned()
  }

  pub fn set_attribute(&self, name: &str, value: &str) {
    self
      .attributes
      .borrow_mut()
      .insert(name.to_string(), value.to_string());
  }

  pub fn classes(&self) -> Vec<String> {
    self.classes.borrow().clone()
  }

  pub fn has_class(&self, class: &str) -> bool {
    self.classes.borrow().iter().any(|c| c == class)
  }

  /// Same semantics as `DOMTokenList.add`: no duplicates.
  pub fn add_class(&self, class: &str) {
    if !self.has_class(class) {
      self.classes.borrow_mut().push(class.to_string());
    }
  }

  pub fn remove_class(&self, class: &str) {
    self.classes.borrow_mut().retain(|c| c != class);
  }
}

/// Elements indexed by id.
#[derive(Debug, Default)]
pub struct MemoryDocument {
  elements: HashMap<String, Rc<MemoryElement>>,
}

impl MemoryDocument {
  pub fn new() -> Self {
    Self::default()
  }

  /// A document holding the three dialog elements, container initially hidden.
  pub fn with_dialog_markup() -> Self {
    let mut doc = Self::new();
    doc.insert(TITLE_ELEMENT_ID, ElementKind::Generic);
    doc.insert(FORM_ELEMENT_ID, ElementKind::Form);
    doc
      .insert(MODAL_ELEMENT_ID, ElementKind::Generic)
      .add_class(super::HIDDEN_CLASS);
    doc
  }

  pub fn insert(&mut self, id: &str, kind: ElementKind) -> Rc<MemoryElement> {
    let element = Rc::new(MemoryElement::new(kind));
    self.elements.insert(id.to_string(), element.clone());
    element
  }

  pub fn remove(&mut self, id: &str) -> Option<Rc<MemoryElement>> {
    self.elements.remove(id)
  }

  pub fn get_element_by_id(&self, id: &str) -> Option<Rc<MemoryElement>> {
    self.elements.get(id).cloned()
  }
}

/// Dialog surface over a [`MemoryDocument`].
#[derive(Debug, Clone)]
pub struct MemorySurface {
  title: Rc<MemoryElement>,
  form: Rc<MemoryElement>,
  modal: Rc<MemoryElement>,
}

impl MemorySurface {
  /// Resolve the three dialog elements up front.
  pub fn from_document(doc: &MemoryDocument) -> Result<Self, DialogError> {
    let lookup = |id: &str| {
      doc
        .get_element_by_id(id)
        .ok_or_else(|| DialogError::MissingElement { id: id.to_string() })
    };

    let title = lookup(TITLE_ELEMENT_ID)?;
    let form = lookup(FORM_ELEMENT_ID)?;
    if form.kind() != ElementKind::Form {
      return Err(DialogError::WrongElementType {
        id: FORM_ELEMENT_ID.to_string(),
        expected: "form",
      });
    }
    let modal = lookup(MODAL_ELEMENT_ID)?;

    Ok(Self { title, form, modal })
  }

  pub fn title(&self) -> &MemoryElement {
    &self.title
  }

  pub fn form(&self) -> &MemoryElement {
    &self.form
  }

  pub fn modal(&self) -> &MemoryElement {
    &self.modal
  }
}

impl DialogSurface for MemorySurface {
  fn set_title(&self, title: &str) {
    self.title.set_text(title);
  }

  fn set_form_action(&self, action: &str) {
    self.form.set_attribute("action", action);
  }

  fn set_hidden(&self, hidden: bool) {
    if hidden {
      self.modal.add_class(super::HIDDEN_CLASS);
    } else {
      self.modal.remove_class(super::HIDDEN_CLASS);
    }
  }
}
