//! Public site: pages, entry management and login

pub mod auth;
pub mod cookies;
pub mod flash;
pub mod forms;
pub mod listing;
pub mod pages;
pub mod paths;
mod routes;

pub use routes::{build_router, AppError, AppState, Editor, SiteServer, Viewer};
