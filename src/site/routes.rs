use axum::{
  extract::{FromRequestParts, Path, Query, State},
  http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
  response::{Html, IntoResponse, Redirect, Response},
  routing::{get, post},
  Form, Router,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::auth;
use super::cookies::{self, FLASH_COOKIE};
use super::flash::Flash;
use super::forms::{EntryForm, LoginForm};
use super::listing::{self, ListQuery, PageError, Paginator};
use super::pages::{self, AdminList, Indicators, Page, Section};
use super::paths;
use crate::db::DatabaseBackend;
use crate::server::SiteConfig;
use crate::types::{EntryFilter, EntryKind, User};

type Backend = Arc<dyn DatabaseBackend>;

const ENTRY_NOT_FOUND: &str = "Entrada no encontrada";
const LOGIN_REQUIRED: &str = "Inicia sesión para continuar.";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
  pub backend: Backend,
  pub config: Arc<SiteConfig>,
}

/// Public site server
pub struct SiteServer {
  backend: Backend,
  config: SiteConfig,
  shutdown_rx: broadcast::Receiver<()>,
}

impl SiteServer {
  pub fn new(backend: Backend, config: SiteConfig, shutdown_rx: broadcast::Receiver<()>) -> Self {
    Self {
      backend,
      config,
      shutdown_rx,
    }
  }

  pub async fn run(mut self, addr: &str) -> Result<(), anyhow::Error> {
    let app = build_router(self.backend, self.config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Radio Hits at http://{}", addr);

    axum::serve(listener, app.into_make_service())
      .with_graceful_shutdown(async move {
        let _ = self.shutdown_rx.recv().await;
        tracing::info!("Site server shutting down");
      })
      .await?;
    Ok(())
  }
}

/// Full site router with state applied
pub fn build_router(backend: Backend, config: SiteConfig) -> Router {
  let static_dir = config.server.static_dir.clone();
  let state = AppState {
    backend,
    config: Arc::new(config),
  };

  Router::new()
    .route("/health", get(health_check))
    .route(paths::STYLESHEET, get(serve_css))
    .route("/", get(home))
    .route("/eventos/", get(events))
    .route("/fiestas/", get(parties))
    .route("/about/", get(about))
    .route("/latertulia/", get(tertulia))
    .route(paths::BLOG, get(blog_list))
    .route("/blog/{id}/", get(blog_entry))
    .route("/blog/detail/{id}/", get(blog_detail))
    .route(paths::CAROUSEL, get(carousel))
    .route(paths::LOGIN, get(login_form).post(login_submit))
    .route(paths::LOGOUT, post(logout))
    // Target of the delete dialog on the blog admin list
    .route(
      "/delete_entrada/{id}/",
      post(|s: State<AppState>, e: Editor, id: Path<String>| {
        delete_entry(EntryKind::Blog, s, e, id)
      }),
    )
    .merge(entry_routes(EntryKind::Blog))
    .merge(entry_routes(EntryKind::Index))
    .nest_service("/static", ServeDir::new(static_dir))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Add/update/delete/list routes for one entry kind
fn entry_routes(kind: EntryKind) -> Router<AppState> {
  let slug = match kind {
    EntryKind::Blog => "blog",
    EntryKind::Index => "index",
  };

  Router::new()
    .route(
      paths::add(kind),
      get(move |e: Editor| add_form(kind, e)).post(
        move |s: State<AppState>, e: Editor, f: Form<EntryForm>| add_submit(kind, s, e, f),
      ),
    )
    .route(
      &format!("/update_entrada_{}/{{id}}/", slug),
      get(move |s: State<AppState>, e: Editor, id: Path<String>| edit_form(kind, s, e, id)).post(
        move |s: State<AppState>, e: Editor, id: Path<String>, f: Form<EntryForm>| {
          edit_submit(kind, s, e, id, f)
        },
      ),
    )
    .route(
      &format!("/delete_entrada_{}/{{id}}/", slug),
      post(move |s: State<AppState>, e: Editor, id: Path<String>| delete_entry(kind, s, e, id)),
    )
    .route(
      paths::list(kind),
      get(move |s: State<AppState>, e: Editor, q: Query<ListQuery>| admin_list(kind, s, e, q)),
    )
}

// =============================================================================
// Request context
// =============================================================================

/// Any visitor: the logged-in user (if any) and a pending flash message
pub struct Viewer {
  pub user: Option<User>,
  pub flash: Option<Flash>,
  path: String,
}

impl Viewer {
  pub fn respond(&self, page: Page) -> Response {
    self.respond_with(StatusCode::OK, page)
  }

  pub fn respond_with(&self, status: StatusCode, page: Page) -> Response {
    let html = pages::layout(&page, self.user.as_ref(), self.flash.as_ref());
    let mut response = (status, Html(html)).into_response();
    // The message has now been shown once
    if self.flash.is_some() {
      if let Ok(clear) = HeaderValue::from_str(&cookies::clear(FLASH_COOKIE)) {
        response.headers_mut().append(header::SET_COOKIE, clear);
      }
    }
    response
  }
}

impl FromRequestParts<AppState> for Viewer {
  type Rejection = AppError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    let user = match cookies::get(&parts.headers, &state.config.auth.cookie_name) {
      Some(token) => {
        state
          .backend
          .validate_session(&auth::hash_session_token(&token))
          .await?
      }
      None => None,
    };
    let path = parts
      .uri
      .path_and_query()
      .map(|pq| pq.as_str().to_string())
      .unwrap_or_else(|| parts.uri.path().to_string());

    Ok(Self {
      user,
      flash: Flash::from_headers(&parts.headers),
      path,
    })
  }
}

/// A logged-in visitor. Anonymous requests are sent to the login page.
pub struct Editor {
  pub user: User,
  viewer: Viewer,
}

impl Editor {
  pub fn respond(&self, page: Page) -> Response {
    self.viewer.respond(page)
  }
}

impl FromRequestParts<AppState> for Editor {
  type Rejection = AppError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    let viewer = Viewer::from_request_parts(parts, state).await?;
    match viewer.user.clone() {
      Some(user) => Ok(Self { user, viewer }),
      None => Err(AppError::LoginRequired(format!(
        "{}?next={}",
        state.config.auth.login_url,
        urlencoding::encode(&viewer.path)
      ))),
    }
  }
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
  raw
    .parse()
    .map_err(|_| AppError::NotFound(ENTRY_NOT_FOUND.to_string()))
}

fn resolve_page(paginator: &Paginator, raw: Option<&str>) -> Result<listing::Page, AppError> {
  paginator.page(raw).map_err(|e| match e {
    PageError::NotAnInteger => AppError::NotFound("Página inválida".to_string()),
    PageError::LessThanOne | PageError::Empty => {
      AppError::NotFound("La página no contiene resultados".to_string())
    }
  })
}

fn redirect_with_flash(to: &str, flash: Flash) -> Response {
  ([(header::SET_COOKIE, flash.to_cookie())], Redirect::to(to)).into_response()
}

fn created_message(kind: EntryKind) -> &'static str {
  match kind {
    EntryKind::Blog => "¡Entrada creada exitosamente!",
    EntryKind::Index => "¡Entrada agregada correctamente!",
  }
}

fn updated_message(kind: EntryKind) -> &'static str {
  match kind {
    EntryKind::Blog => "¡Entrada modificada exitosamente!",
    EntryKind::Index => "¡Entrada modificada correctamente!",
  }
}

fn deleted_message(kind: EntryKind, title: &str) -> String {
  match kind {
    EntryKind::Blog => format!("La entrada \"{}\" ha sido eliminada exitosamente.", title),
    EntryKind::Index => format!("La entrada \"{}\" ha sido eliminada correctamente.", title),
  }
}

fn form_heading(kind: EntryKind, editing: bool) -> &'static str {
  match (kind, editing) {
    (EntryKind::Blog, false) => "Nueva entrada del blog",
    (EntryKind::Blog, true) => "Modificar entrada del blog",
    (EntryKind::Index, false) => "Nueva entrada del carrusel",
    (EntryKind::Index, true) => "Modificar entrada del carrusel",
  }
}

// =============================================================================
// Public pages
// =============================================================================

async fn health_check() -> StatusCode {
  StatusCode::OK
}

async fn serve_css() -> impl IntoResponse {
  (
    [(header::CONTENT_TYPE, "text/css")],
    include_str!("styles.css"),
  )
}

async fn home(State(state): State<AppState>, viewer: Viewer) -> Result<Response, AppError> {
  let entries = state
    .backend
    .latest_entries(EntryKind::Index, state.config.pages.carousel_size)
    .await?;
  let today = listing::long_date(Utc::now());
  Ok(viewer.respond(pages::home(&Indicators::unavailable(today), &entries)))
}

async fn carousel(State(state): State<AppState>, viewer: Viewer) -> Result<Response, AppError> {
  let entries = state
    .backend
    .latest_entries(EntryKind::Index, state.config.pages.carousel_size)
    .await?;
  Ok(viewer.respond(pages::carousel(&entries)))
}

async fn blog_list(
  State(state): State<AppState>,
  viewer: Viewer,
  Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
  let per_page = state.config.pages.per_page;
  let total = state
    .backend
    .count_entries(EntryKind::Blog, &EntryFilter::default())
    .await?;
  let page = resolve_page(&Paginator::new(total, per_page), query.page.as_deref())?;
  let entries = state
    .backend
    .list_entries(EntryKind::Blog, &EntryFilter::default(), page.limit, page.offset)
    .await?;
  Ok(viewer.respond(pages::blog_list(&entries, &page, total, per_page)))
}

async fn events(viewer: Viewer) -> Response {
  viewer.respond(pages::section(Section::Events))
}

async fn parties(viewer: Viewer) -> Response {
  viewer.respond(pages::section(Section::Parties))
}

async fn about(viewer: Viewer) -> Response {
  viewer.respond(pages::section(Section::About))
}

async fn tertulia(viewer: Viewer) -> Response {
  viewer.respond(pages::section(Section::Tertulia))
}

async fn blog_entry(
  state: State<AppState>,
  viewer: Viewer,
  id: Path<String>,
) -> Result<Response, AppError> {
  show_blog(state, viewer, id, false).await
}

async fn blog_detail(
  state: State<AppState>,
  viewer: Viewer,
  id: Path<String>,
) -> Result<Response, AppError> {
  show_blog(state, viewer, id, true).await
}

async fn show_blog(
  State(state): State<AppState>,
  viewer: Viewer,
  Path(id): Path<String>,
  detailed: bool,
) -> Result<Response, AppError> {
  let id = parse_id(&id)?;
  let entry = state
    .backend
    .get_entry(EntryKind::Blog, id)
    .await?
    .ok_or_else(|| AppError::NotFound(ENTRY_NOT_FOUND.to_string()))?;
  Ok(viewer.respond(pages::blog_entry(&entry, detailed)))
}

// =============================================================================
// Entry management (login required)
// =============================================================================

async fn add_form(kind: EntryKind, editor: Editor) -> Response {
  editor.respond(pages::entry_form(
    kind,
    paths::add(kind),
    form_heading(kind, false),
    &EntryForm::default(),
    &[],
  ))
}

async fn add_submit(
  kind: EntryKind,
  State(state): State<AppState>,
  editor: Editor,
  Form(form): Form<EntryForm>,
) -> Result<Response, AppError> {
  let input = match form.validate() {
    Ok(input) => input,
    Err(errors) => {
      return Ok(editor.respond(pages::entry_form(
        kind,
        paths::add(kind),
        form_heading(kind, false),
        &form,
        &errors,
      )))
    }
  };

  let entry = state
    .backend
    .insert_entry(kind, editor.user.id, &input, Utc::now())
    .await?;
  tracing::info!(kind = %kind, id = entry.id, author = %editor.user.username, "Entry created");

  Ok(redirect_with_flash(
    paths::list(kind),
    Flash::success(created_message(kind)),
  ))
}

async fn edit_form(
  kind: EntryKind,
  State(state): State<AppState>,
  editor: Editor,
  Path(id): Path<String>,
) -> Result<Response, AppError> {
  let id = parse_id(&id)?;
  let entry = state
    .backend
    .get_entry(kind, id)
    .await?
    .filter(|e| e.author_id == editor.user.id)
    .ok_or_else(|| AppError::NotFound(ENTRY_NOT_FOUND.to_string()))?;

  Ok(editor.respond(pages::entry_form(
    kind,
    &paths::update(kind, id),
    form_heading(kind, true),
    &EntryForm::from_entry(&entry),
    &[],
  )))
}

async fn edit_submit(
  kind: EntryKind,
  State(state): State<AppState>,
  editor: Editor,
  Path(id): Path<String>,
  Form(form): Form<EntryForm>,
) -> Result<Response, AppError> {
  let id = parse_id(&id)?;
  let input = match form.validate() {
    Ok(input) => input,
    Err(errors) => {
      return Ok(editor.respond(pages::entry_form(
        kind,
        &paths::update(kind, id),
        form_heading(kind, true),
        &form,
        &errors,
      )))
    }
  };

  state
    .backend
    .update_entry(kind, id, editor.user.id, &input)
    .await?
    .ok_or_else(|| AppError::NotFound(ENTRY_NOT_FOUND.to_string()))?;
  tracing::info!(kind = %kind, id, author = %editor.user.username, "Entry updated");

  Ok(redirect_with_flash(
    paths::list(kind),
    Flash::success(updated_message(kind)),
  ))
}

async fn delete_entry(
  kind: EntryKind,
  State(state): State<AppState>,
  editor: Editor,
  Path(id): Path<String>,
) -> Result<Response, AppError> {
  let id = parse_id(&id)?;
  let entry = state
    .backend
    .delete_entry(kind, id, editor.user.id)
    .await?
    .ok_or_else(|| AppError::NotFound(ENTRY_NOT_FOUND.to_string()))?;
  tracing::info!(kind = %kind, id, author = %editor.user.username, "Entry deleted");

  Ok(redirect_with_flash(
    paths::list(kind),
    Flash::success(deleted_message(kind, &entry.title)),
  ))
}

async fn admin_list(
  kind: EntryKind,
  State(state): State<AppState>,
  editor: Editor,
  Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
  let per_page = state.config.pages.per_page;
  let filter = query.filter();
  let total = state.backend.count_entries(kind, &filter).await?;
  let page = resolve_page(&Paginator::new(total, per_page), query.page.as_deref())?;
  let entries = state
    .backend
    .list_entries(kind, &filter, page.limit, page.offset)
    .await?;
  let years = listing::year_options(
    &state.backend.entry_years(kind).await?,
    Utc::now().year(),
  );

  Ok(editor.respond(pages::admin_list(&AdminList {
    kind,
    entries: &entries,
    page: &page,
    total,
    per_page,
    query: &query,
    years: &years,
  })))
}

// =============================================================================
// Login
// =============================================================================

#[derive(Deserialize)]
struct NextQuery {
  next: Option<String>,
}

async fn login_form(viewer: Viewer, Query(query): Query<NextQuery>) -> Response {
  if viewer.user.is_some() {
    return Redirect::to(auth::safe_next(query.next.as_deref())).into_response();
  }
  viewer.respond(pages::login("", query.next.as_deref(), None))
}

async fn login_submit(
  State(state): State<AppState>,
  viewer: Viewer,
  Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
  let username = form.username.trim().to_string();
  let user = match state.backend.get_user_by_username(&username).await? {
    Some((user, hash)) if auth::verify_password(&form.password, &hash) => user,
    _ => {
      tracing::warn!(username = %username, "Failed login");
      return Ok(viewer.respond(pages::login(
        &username,
        form.next.as_deref(),
        Some("Usuario o contraseña incorrectos."),
      )));
    }
  };

  let token = auth::generate_session_token();
  let days = state.config.auth.session_days;
  state
    .backend
    .create_session(
      user.id,
      &auth::hash_session_token(&token),
      Utc::now() + chrono::Duration::days(days),
    )
    .await?;
  tracing::info!(username = %user.username, "Logged in");

  let cookie = cookies::set(
    &state.config.auth.cookie_name,
    &token,
    Some(days * 24 * 60 * 60),
    state.config.auth.secure_cookies,
  );
  Ok(
    (
      [(header::SET_COOKIE, cookie)],
      Redirect::to(auth::safe_next(form.next.as_deref())),
    )
      .into_response(),
  )
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
  let name = &state.config.auth.cookie_name;
  if let Some(token) = cookies::get(&headers, name) {
    state
      .backend
      .delete_session(&auth::hash_session_token(&token))
      .await?;
  }
  Ok(([(header::SET_COOKIE, cookies::clear(name))], Redirect::to("/")).into_response())
}

// =============================================================================
// Errors
// =============================================================================

pub enum AppError {
  Internal(anyhow::Error),
  NotFound(String),
  /// Redirect target for anonymous visitors of protected pages
  LoginRequired(String),
}

impl From<anyhow::Error> for AppError {
  fn from(e: anyhow::Error) -> Self {
    Self::Internal(e)
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let (status, heading, msg) = match self {
      Self::LoginRequired(location) => {
        return redirect_with_flash(&location, Flash::error(LOGIN_REQUIRED))
      }
      Self::Internal(e) => {
        tracing::error!("Request failed: {:#}", e);
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "Error del servidor",
          "Ocurrió un error inesperado.".to_string(),
        )
      }
      Self::NotFound(msg) => (StatusCode::NOT_FOUND, "No encontrado", msg),
    };
    let html = pages::layout(&pages::error(heading, &msg), None, None);
    (status, Html(html)).into_response()
  }
}
