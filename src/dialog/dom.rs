//! Browser bindings for the delete dialog.
//!
//! `start` runs when the wasm bundle loads on an admin list page: it resolves
//! the dialog elements once and wires every `[data-delete-id]` button to
//! [`DeleteDialog::open`] and every `[data-delete-close]` control to
//! [`DeleteDialog::close`].

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlFormElement};

use super::{
  ActionTemplate, DeleteDialog, DialogError, DialogSurface, FORM_ELEMENT_ID, HIDDEN_CLASS,
  MODAL_ELEMENT_ID, TITLE_ELEMENT_ID,
};

/// Form attribute that overrides the default action template.
pub const ACTION_TEMPLATE_ATTR: &str = "data-action-template";
pub const DELETE_ID_ATTR: &str = "data-delete-id";
pub const DELETE_TITLE_ATTR: &str = "data-delete-title";
pub const DELETE_CLOSE_ATTR: &str = "data-delete-close";

fn to_js(err: DialogError) -> JsValue {
  JsValue::from_str(&err.to_string())
}

/// Dialog surface backed by live DOM elements.
pub struct DomSurface {
  title: Element,
  form: HtmlFormElement,
  modal: Element,
}

impl DomSurface {
  pub fn from_document(document: &Document) -> Result<Self, DialogError> {
    let lookup = |id: &str| {
      document
        .get_element_by_id(id)
        .ok_or_else(|| DialogError::MissingElement { id: id.to_string() })
    };

    let title = lookup(TITLE_ELEMENT_ID)?;
    let form = lookup(FORM_ELEMENT_ID)?
      .dyn_into::<HtmlFormElement>()
      .map_err(|_| DialogError::WrongElementType {
        id: FORM_ELEMENT_ID.to_string(),
        expected: "form",
      })?;
    let modal = lookup(MODAL_ELEMENT_ID)?;

    Ok(Self { title, form, modal })
  }

  /// The action template declared on the form, or the default one.
  pub fn action_template(&self) -> Result<ActionTemplate, DialogError> {
    match self.form.get_attribute(ACTION_TEMPLATE_ATTR) {
      Some(template) => ActionTemplate::parse(&template),
      None => Ok(ActionTemplate::default()),
    }
  }
}

impl DialogSurface for DomSurface {
  fn set_title(&self, title: &str) {
    self.title.set_text_content(Some(title));
  }

  fn set_form_action(&self, action: &str) {
    self.form.set_action(action);
  }

  fn set_hidden(&self, hidden: bool) {
    let classes = self.modal.class_list();
    // DOMTokenList only throws for empty or whitespace tokens
    let _ = if hidden {
      classes.add_1(HIDDEN_CLASS)
    } else {
      classes.remove_1(HIDDEN_CLASS)
    };
  }
}

/// Build a dialog from the document, honoring the form's action template.
pub fn dialog_from_document(document: &Document) -> Result<DeleteDialog<DomSurface>, DialogError> {
  let surface = DomSurface::from_document(document)?;
  let action = surface.action_template()?;
  Ok(DeleteDialog::with_action(surface, action))
}

fn elements_with(document: &Document, attr: &str) -> Result<Vec<Element>, JsValue> {
  let nodes = document.query_selector_all(&format!("[{}]", attr))?;
  Ok(
    (0..nodes.length())
      .filter_map(|i| nodes.item(i))
      .filter_map(|node| node.dyn_into::<Element>().ok())
      .collect(),
  )
}

fn on_click(element: &Element, handler: impl FnMut(Event) + 'static) -> Result<(), JsValue> {
  let closure = Closure::<dyn FnMut(Event)>::new(handler);
  element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
  // Listeners live as long as the page
  closure.forget();
  Ok(())
}

/// Attach open/close handlers to the page's trigger controls.
pub fn bind(document: &Document, dialog: Rc<DeleteDialog<DomSurface>>) -> Result<(), JsValue> {
  for button in elements_with(document, DELETE_ID_ATTR)? {
    let dialog = dialog.clone();
    let id = button.get_attribute(DELETE_ID_ATTR).unwrap_or_default();
    let title = button.get_attribute(DELETE_TITLE_ATTR).unwrap_or_default();
    on_click(&button, move |event: Event| {
      event.prevent_default();
      dialog.open(&id, &title);
    })?;
  }

  for control in elements_with(document, DELETE_CLOSE_ATTR)? {
    let dialog = dialog.clone();
    on_click(&control, move |event: Event| {
      event.prevent_default();
      dialog.close();
    })?;
  }

  Ok(())
}

fn document() -> Result<Document, JsValue> {
  web_sys::window()
    .and_then(|w| w.document())
    .ok_or_else(|| JsValue::from_str("no document available"))
}

/// Entry point of the wasm bundle.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
  console_error_panic_hook::set_once();

  let document = document()?;
  let dialog = match dialog_from_document(&document) {
    Ok(dialog) => Rc::new(dialog),
    Err(e) => {
      web_sys::console::error_1(&JsValue::from_str(&format!("delete dialog: {}", e)));
      return Err(to_js(e));
    }
  };
  bind(&document, dialog)
}

/// Handle for wiring the dialog by hand from page scripts.
#[wasm_bindgen]
pub struct DeleteModal {
  inner: Rc<DeleteDialog<DomSurface>>,
}

#[wasm_bindgen]
impl DeleteModal {
  #[wasm_bindgen(constructor)]
  pub fn new() -> Result<DeleteModal, JsValue> {
    let dialog = dialog_from_document(&document()?).map_err(to_js)?;
    Ok(DeleteModal {
      inner: Rc::new(dialog),
    })
  }

  pub fn open(&self, item_id: &str, item_title: &str) {
    self.inner.open(item_id, item_title);
  }

  pub fn close(&self) {
    self.inner.close();
  }

  /// Form action template in use, e.g. `/delete_entrada/{id}/`
  #[wasm_bindgen(getter, js_name = actionTemplate)]
  pub fn action_template(&self) -> String {
    self.inner.action().to_string()
  }
}
