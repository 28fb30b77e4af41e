//! Delete dialog behaviour against an in-process document

use radiohits::dialog::memory::{ElementKind, MemoryDocument, MemorySurface};
use radiohits::dialog::{
  ActionTemplate, DeleteDialog, DialogError, FORM_ELEMENT_ID, HIDDEN_CLASS, MODAL_ELEMENT_ID,
  TITLE_ELEMENT_ID,
};

fn dialog() -> DeleteDialog<MemorySurface> {
  let doc = MemoryDocument::with_dialog_markup();
  DeleteDialog::new(MemorySurface::from_document(&doc).unwrap())
}

fn is_hidden(d: &DeleteDialog<MemorySurface>) -> bool {
  d.surface().modal().has_class(HIDDEN_CLASS)
}

fn action(d: &DeleteDialog<MemorySurface>) -> Option<String> {
  d.surface().form().attribute("action")
}

// =============================================================================
// Open / close
// =============================================================================

#[test]
fn test_open_then_close() {
  let d = dialog();
  assert!(is_hidden(&d));

  d.open(7, "My Entry");
  assert_eq!(d.surface().title().text(), "My Entry");
  assert_eq!(action(&d).as_deref(), Some("/delete_entrada/7/"));
  assert!(!is_hidden(&d));

  d.close();
  assert!(is_hidden(&d));
}

#[test]
fn test_title_is_copied_verbatim() {
  let d = dialog();
  for title in ["", "  espacios  ", "<b>no es html</b>", "Año \"Nuevo\" & más"] {
    d.open(1, title);
    assert_eq!(d.surface().title().text(), title);
  }
}

#[test]
fn test_action_for_url_safe_ids() {
  let d = dialog();
  for id in ["42", "abc-1", "a_b.c~d"] {
    d.open(id, "t");
    assert_eq!(action(&d), Some(format!("/delete_entrada/{}/", id)));
  }
}

#[test]
fn test_action_encodes_unsafe_ids() {
  let d = dialog();
  d.open("1/../../admin", "t");
  assert_eq!(
    action(&d).as_deref(),
    Some("/delete_entrada/1%2F..%2F..%2Fadmin/")
  );
  d.open("a b?c", "t");
  assert_eq!(action(&d).as_deref(), Some("/delete_entrada/a%20b%3Fc/"));
}

#[test]
fn test_close_regardless_of_prior_state() {
  let d = dialog();
  d.close();
  assert!(is_hidden(&d));

  d.open(3, "x");
  d.close();
  d.close();
  assert!(is_hidden(&d));
  assert_eq!(d.surface().modal().classes(), vec![HIDDEN_CLASS.to_string()]);
}

#[test]
fn test_open_overwrites_previous_call() {
  let d = dialog();
  d.open(1, "A");
  d.open(2, "B");
  assert_eq!(d.surface().title().text(), "B");
  assert_eq!(action(&d).as_deref(), Some("/delete_entrada/2/"));
  assert!(!is_hidden(&d));
}

#[test]
fn test_open_twice_keeps_other_classes() {
  let doc = MemoryDocument::with_dialog_markup();
  doc
    .get_element_by_id(MODAL_ELEMENT_ID)
    .unwrap()
    .add_class("modal");
  let d = DeleteDialog::new(MemorySurface::from_document(&doc).unwrap());

  d.open(1, "A");
  d.open(1, "A");
  assert_eq!(d.surface().modal().classes(), vec!["modal".to_string()]);
  d.close();
  assert!(d.surface().modal().has_class("modal"));
  assert!(is_hidden(&d));
}

#[test]
fn test_custom_action_template() {
  let doc = MemoryDocument::with_dialog_markup();
  let template = ActionTemplate::parse("/delete_entrada_index/{id}/").unwrap();
  let d = DeleteDialog::with_action(MemorySurface::from_document(&doc).unwrap(), template);
  d.open(9, "Carrusel");
  assert_eq!(action(&d).as_deref(), Some("/delete_entrada_index/9/"));
  assert_eq!(d.action().to_string(), "/delete_entrada_index/{id}/");
  assert_eq!(dialog().action().to_string(), "/delete_entrada/{id}/");
}

#[test]
fn test_surface_shares_document_elements() {
  let doc = MemoryDocument::with_dialog_markup();
  let d = DeleteDialog::new(MemorySurface::from_document(&doc).unwrap());
  d.open(5, "Compartido");
  let title = doc.get_element_by_id(TITLE_ELEMENT_ID).unwrap();
  assert_eq!(title.text(), "Compartido");
}

// =============================================================================
// Construction failures
// =============================================================================

#[test]
fn test_missing_elements_fail_at_construction() {
  for id in [TITLE_ELEMENT_ID, FORM_ELEMENT_ID, MODAL_ELEMENT_ID] {
    let mut doc = MemoryDocument::with_dialog_markup();
    doc.remove(id);
    let err = MemorySurface::from_document(&doc).unwrap_err();
    assert_eq!(err, DialogError::MissingElement { id: id.to_string() });
    assert_eq!(err.to_string(), format!("element #{} not found in document", id));
  }
}

#[test]
fn test_form_must_be_a_form() {
  let mut doc = MemoryDocument::with_dialog_markup();
  doc.insert(FORM_ELEMENT_ID, ElementKind::Generic);
  let err = MemorySurface::from_document(&doc).unwrap_err();
  assert_eq!(
    err,
    DialogError::WrongElementType {
      id: FORM_ELEMENT_ID.to_string(),
      expected: "form",
    }
  );
}
