//! Server-rendered HTML.
//!
//! Every interpolated value goes through [`escape_html`]; the delete dialog
//! markup uses the element ids the wasm controller binds to.

use std::fmt::Write;

use super::flash::{Flash, FlashLevel};
use super::forms::{EntryForm, FormError};
use super::listing::{self, ListQuery, YearOption, MONTHS_ES};
use super::paths;
use crate::dialog::{FORM_ELEMENT_ID, HIDDEN_CLASS, MODAL_ELEMENT_ID, TITLE_ELEMENT_ID};
use crate::types::{Entry, EntryFilter, EntryKind, User};

pub fn escape_html(s: &str) -> String {
  s.replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
    .replace('\'', "&#x27;")
}

/// Escaped text with line breaks preserved
fn paragraphs(s: &str) -> String {
  s.split("\n\n")
    .map(|p| p.trim())
    .filter(|p| !p.is_empty())
    .map(|p| format!("<p>{}</p>", escape_html(p).replace('\n', "<br>")))
    .collect()
}

/// A rendered page body plus what the layout needs to know about it
#[derive(Debug, Clone)]
pub struct Page {
  pub title: String,
  pub body: String,
  /// Load the wasm bundle that drives the delete dialog
  pub with_dialog: bool,
}

impl Page {
  fn new(title: impl Into<String>, body: String) -> Self {
    Self {
      title: title.into(),
      body,
      with_dialog: false,
    }
  }
}

pub fn layout(page: &Page, user: Option<&User>, flash: Option<&Flash>) -> String {
  let account = match user {
    Some(u) => format!(
      r#"<span class="user">{}</span>
        <a href="{}">Blog</a> <a href="{}">Carrusel</a>
        <form method="post" action="{}" class="inline"><button type="submit" class="link">Salir</button></form>"#,
      escape_html(&u.username),
      paths::list(EntryKind::Blog),
      paths::list(EntryKind::Index),
      paths::LOGOUT
    ),
    None => format!(r#"<a href="{}">Ingresar</a>"#, paths::LOGIN),
  };

  let message = flash
    .map(|f| {
      let class = match f.level {
        FlashLevel::Success => "flash flash-success",
        FlashLevel::Error => "flash flash-error",
      };
      format!(
        r#"<div class="{}" role="status">{}</div>"#,
        class,
        escape_html(&f.message)
      )
    })
    .unwrap_or_default();

  let script = if page.with_dialog {
    format!(
      r#"<script type="module">import init from "{}"; init();</script>"#,
      paths::DIALOG_SCRIPT
    )
  } else {
    String::new()
  };

  format!(
    r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | Radio Hits</title>
    <link rel="stylesheet" href="{css}">
</head>
<body>
    <header class="site-header">
        <a class="logo" href="/">Radio Hits</a>
        <nav>
            <a href="/">Inicio</a>
            <a href="{blog}">Blog</a>
            <a href="/eventos/">Eventos</a>
            <a href="/fiestas/">Fiestas</a>
            <a href="/latertulia/">La Tertulia</a>
            <a href="/about/">Nosotros</a>
        </nav>
        <div class="account">{account}</div>
    </header>
    <main class="content">
        {message}
        {body}
    </main>
    {script}
</body>
</html>"#,
    title = escape_html(&page.title),
    css = paths::STYLESHEET,
    blog = paths::BLOG,
    account = account,
    message = message,
    body = page.body,
    script = script,
  )
}

fn entry_card(entry: &Entry) -> String {
  let image = entry
    .image
    .as_deref()
    .map(|src| {
      format!(
        r#"<img src="{}" alt="{}">"#,
        escape_html(src),
        escape_html(&entry.title)
      )
    })
    .unwrap_or_default();
  format!(
    r#"<article class="card" id="entrada-{id}">
      {image}
      <h3><a href="{href}">{title}</a></h3>
      <p class="meta">{author} · {date}</p>
    </article>"#,
    id = entry.id,
    image = image,
    href = paths::detail(entry.kind, entry.id),
    title = escape_html(&entry.title),
    author = escape_html(&entry.author),
    date = listing::long_date(entry.created_at),
  )
}

/// Economic indicators block of the home page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Indicators {
  pub dolar: Option<f64>,
  pub euro: Option<f64>,
  pub uf: Option<f64>,
  pub utm: Option<f64>,
  /// Spanish month the UTM value applies to
  pub utm_month: Option<String>,
  /// Long Spanish date of the lookup
  pub queried_on: String,
}

impl Indicators {
  /// Date line only; every value shows as unavailable
  pub fn unavailable(queried_on: String) -> Self {
    Self {
      queried_on,
      ..Self::default()
    }
  }

  fn render(&self) -> String {
    let item = |label: &str, value: Option<f64>| {
      let value = value
        .map(|v| format!("$ {:.2}", v))
        .unwrap_or_else(|| "No disponible".to_string());
      format!(
        r#"<li><span>{}</span> <strong>{}</strong></li>"#,
        escape_html(label),
        escape_html(&value)
      )
    };
    let utm_label = match &self.utm_month {
      Some(month) => format!("UTM ({})", month),
      None => "UTM".to_string(),
    };
    format!(
      r#"<aside class="indicators">
      <p class="today">Indicadores al {}</p>
      <ul>{}{}{}{}</ul>
    </aside>"#,
      escape_html(&self.queried_on),
      item("Dólar", self.dolar),
      item("Euro", self.euro),
      item("UF", self.uf),
      item(&utm_label, self.utm),
    )
  }
}

pub fn home(indicators: &Indicators, carousel: &[Entry]) -> Page {
  let slides: String = carousel
    .iter()
    .map(|e| {
      format!(
        r#"<div class="slide" id="entrada-{}"><h2>{}</h2>{}</div>"#,
        e.id,
        escape_html(&e.title),
        paragraphs(&e.body)
      )
    })
    .collect();
  Page::new(
    "Inicio",
    format!(
      r#"<section class="hero">
      {}
      <div class="carousel">{}</div>
    </section>"#,
      indicators.render(),
      slides
    ),
  )
}

/// Static informational sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
  Events,
  Parties,
  About,
  Tertulia,
}

pub fn section(section: Section) -> Page {
  let (title, text) = match section {
    Section::Events => (
      "Eventos",
      "Agenda de eventos y transmisiones especiales de Radio Hits.",
    ),
    Section::Parties => (
      "Fiestas",
      "Las mejores fiestas de la temporada, con música en vivo.",
    ),
    Section::About => (
      "Nosotros",
      "Radio Hits: la radio de los éxitos, de la comunidad para la comunidad.",
    ),
    Section::Tertulia => (
      "La Tertulia",
      "Conversación, música y opinión en La Tertulia.",
    ),
  };
  Page::new(
    title,
    format!("<h1>{}</h1><p>{}</p>", escape_html(title), escape_html(text)),
  )
}

fn pagination_nav(base: &str, query: &ListQuery, page: &listing::Page) -> String {
  let params = query.filter_params();
  let link = |number: u64| {
    if params.is_empty() {
      format!("{}?page={}", base, number)
    } else {
      format!("{}?{}&page={}", base, params, number)
    }
  };

  let mut nav = String::from(r#"<nav class="pagination">"#);
  if page.has_previous() {
    let _ = write!(
      nav,
      r#"<a href="{}">&laquo; Primera</a> <a href="{}">Anterior</a> "#,
      escape_html(&link(1)),
      escape_html(&link(page.number - 1))
    );
  }
  let _ = write!(
    nav,
    r#"<span class="current">Página {} de {}</span>"#,
    page.number, page.num_pages
  );
  if page.has_next() {
    let _ = write!(
      nav,
      r#" <a href="{}">Siguiente</a> <a href="{}">Última &raquo;</a>"#,
      escape_html(&link(page.number + 1)),
      escape_html(&link(page.num_pages))
    );
  }
  nav.push_str("</nav>");
  nav
}

pub fn blog_list(entries: &[Entry], page: &listing::Page, total: u64, per_page: usize) -> Page {
  let cards: String = if entries.is_empty() {
    "<p>Aún no hay entradas publicadas.</p>".into()
  } else {
    entries.iter().map(entry_card).collect()
  };
  Page::new(
    "Blog",
    format!(
      r#"<h1>Blog</h1>
    <p class="meta">{} entradas · {} por página</p>
    <div class="grid">{}</div>
    {}"#,
      total,
      per_page,
      cards,
      pagination_nav(paths::BLOG, &ListQuery::default(), page)
    ),
  )
}

pub fn blog_entry(entry: &Entry, detailed: bool) -> Page {
  let image = entry
    .image
    .as_deref()
    .map(|src| {
      format!(
        r#"<img class="cover" src="{}" alt="{}">"#,
        escape_html(src),
        escape_html(&entry.title)
      )
    })
    .unwrap_or_default();
  let byline = if detailed {
    format!(
      r#"<p class="meta">Publicado por {} el {}</p>"#,
      escape_html(&entry.author),
      listing::long_date(entry.created_at)
    )
  } else {
    format!(
      r#"<p class="meta">{}</p>"#,
      listing::long_date(entry.created_at)
    )
  };
  Page::new(
    entry.title.clone(),
    format!(
      r#"<article class="entry">
      <h1>{}</h1>
      {}
      {}
      <div class="body">{}</div>
      <p><a href="{}">&larr; Volver al blog</a></p>
    </article>"#,
      escape_html(&entry.title),
      byline,
      image,
      paragraphs(&entry.body),
      paths::BLOG
    ),
  )
}

pub fn carousel(entries: &[Entry]) -> Page {
  let cards: String = entries.iter().map(entry_card).collect();
  Page::new(
    "Carrusel",
    format!(r#"<h1>Carrusel</h1><div class="grid">{}</div>"#, cards),
  )
}

fn field_errors(errors: &[FormError], field: &str) -> String {
  errors
    .iter()
    .filter(|e| e.field() == field)
    .map(|e| format!(r#"<p class="field-error">{}</p>"#, escape_html(&e.to_string())))
    .collect()
}

pub fn entry_form(
  kind: EntryKind,
  action: &str,
  heading: &str,
  form: &EntryForm,
  errors: &[FormError],
) -> Page {
  let body_label = match kind {
    EntryKind::Blog => "Contenido",
    EntryKind::Index => "Texto",
  };
  Page::new(
    heading,
    format!(
      r#"<h1>{heading}</h1>
    <form method="post" action="{action}" class="entry-form">
      <label for="title">Título</label>
      <input id="title" name="title" type="text" maxlength="200" value="{title}">
      {title_errors}
      <label for="image">Imagen (URL)</label>
      <input id="image" name="image" type="text" value="{image}">
      {image_errors}
      <label for="body">{body_label}</label>
      <textarea id="body" name="body" rows="10">{body}</textarea>
      {body_errors}
      <div class="actions">
        <a class="btn" href="{cancel}">Cancelar</a>
        <button type="submit" class="btn btn-primary">Guardar</button>
      </div>
    </form>"#,
      heading = escape_html(heading),
      action = escape_html(action),
      title = escape_html(&form.title),
      title_errors = field_errors(errors, "title"),
      image = escape_html(&form.image),
      image_errors = field_errors(errors, "image"),
      body_label = body_label,
      body = escape_html(&form.body),
      body_errors = field_errors(errors, "body"),
      cancel = paths::list(kind),
    ),
  )
}

/// The confirmation dialog driven by the wasm controller
fn delete_dialog(kind: EntryKind) -> String {
  format!(
    r#"<div id="{modal}" class="modal {hidden}">
      <div class="modal-box" role="dialog" aria-modal="true">
        <h3>¿Eliminar entrada?</h3>
        <p>Vas a eliminar &laquo;<span id="{title}"></span>&raquo;. Esta acción no se puede deshacer.</p>
        <form id="{form}" method="post" action="" data-action-template="{template}">
          <button type="button" class="btn" data-delete-close>Cancelar</button>
          <button type="submit" class="btn btn-danger">Eliminar</button>
        </form>
      </div>
    </div>"#,
    modal = MODAL_ELEMENT_ID,
    hidden = HIDDEN_CLASS,
    title = TITLE_ELEMENT_ID,
    form = FORM_ELEMENT_ID,
    template = escape_html(paths::delete_template(kind)),
  )
}

fn filter_form(kind: EntryKind, years: &[YearOption], filter: &EntryFilter) -> String {
  let year_options: String = years
    .iter()
    .map(|y| {
      format!(
        r#"<option value="{}"{}{}>{}</option>"#,
        y.year,
        if y.is_current { r#" class="current-year""# } else { "" },
        if filter.year == Some(y.year) { " selected" } else { "" },
        escape_html(&y.label)
      )
    })
    .collect();
  let month_options: String = MONTHS_ES
    .iter()
    .zip(1u32..)
    .map(|(name, n)| {
      format!(
        r#"<option value="{}"{}>{}</option>"#,
        n,
        if filter.month == Some(n) { " selected" } else { "" },
        name
      )
    })
    .collect();
  format!(
    r#"<form method="get" action="{action}" class="filters">
      <select name="year"><option value="">Todos los años</option>{years}</select>
      <select name="month"><option value="">Todos los meses</option>{months}</select>
      <button type="submit" class="btn">Filtrar</button>
      <a class="btn" href="{action}">Limpiar</a>
    </form>"#,
    action = paths::list(kind),
    years = year_options,
    months = month_options,
  )
}

/// Admin listing with filters, pagination and the delete dialog
pub struct AdminList<'a> {
  pub kind: EntryKind,
  pub entries: &'a [Entry],
  pub page: &'a listing::Page,
  pub total: u64,
  pub per_page: usize,
  pub query: &'a ListQuery,
  pub years: &'a [YearOption],
}

pub fn admin_list(list: &AdminList<'_>) -> Page {
  let heading = match list.kind {
    EntryKind::Blog => "Entradas del blog",
    EntryKind::Index => "Entradas del carrusel",
  };
  let rows: String = if list.entries.is_empty() {
    r#"<tr><td colspan="4">No hay entradas para este filtro.</td></tr>"#.into()
  } else {
    list
      .entries
      .iter()
      .map(|e| {
        format!(
          r#"<tr>
        <td><a href="{href}">{title}</a></td>
        <td>{author}</td>
        <td>{date}</td>
        <td class="actions">
          <a class="btn" href="{edit}">Editar</a>
          <button type="button" class="btn btn-danger" data-delete-id="{id}" data-delete-title="{title}">Eliminar</button>
        </td>
      </tr>"#,
          href = paths::detail(e.kind, e.id),
          title = escape_html(&e.title),
          author = escape_html(&e.author),
          date = listing::long_date(e.created_at),
          edit = paths::update(e.kind, e.id),
          id = e.id,
        )
      })
      .collect()
  };

  let mut page = Page::new(
    heading,
    format!(
      r#"<h1>{heading}</h1>
    <p><a class="btn btn-primary" href="{add}">Nueva entrada</a></p>
    {filters}
    <p class="meta">{total} entradas · {per_page} por página</p>
    <table class="entries">
      <thead><tr><th>Título</th><th>Autor</th><th>Fecha</th><th></th></tr></thead>
      <tbody>{rows}</tbody>
    </table>
    {nav}
    {dialog}"#,
      heading = heading,
      add = paths::add(list.kind),
      filters = filter_form(list.kind, list.years, &list.query.filter()),
      total = list.total,
      per_page = list.per_page,
      rows = rows,
      nav = pagination_nav(paths::list(list.kind), list.query, list.page),
      dialog = delete_dialog(list.kind),
    ),
  );
  page.with_dialog = true;
  page
}

pub fn login(username: &str, next: Option<&str>, error: Option<&str>) -> Page {
  let error = error
    .map(|e| format!(r#"<p class="field-error">{}</p>"#, escape_html(e)))
    .unwrap_or_default();
  let next = next
    .map(|n| {
      format!(
        r#"<input type="hidden" name="next" value="{}">"#,
        escape_html(n)
      )
    })
    .unwrap_or_default();
  Page::new(
    "Ingresar",
    format!(
      r#"<h1>Ingresar</h1>
    <form method="post" action="{action}" class="login-form">
      {error}
      <label for="username">Usuario</label>
      <input id="username" name="username" type="text" value="{username}" autofocus>
      <label for="password">Contraseña</label>
      <input id="password" name="password" type="password">
      {next}
      <button type="submit" class="btn btn-primary">Ingresar</button>
    </form>"#,
      action = paths::LOGIN,
      error = error,
      username = escape_html(username),
      next = next,
    ),
  )
}

pub fn error(heading: &str, message: &str) -> Page {
  Page::new(
    heading,
    format!(
      "<h1>{}</h1><p>{}</p>",
      escape_html(heading),
      escape_html(message)
    ),
  )
}
