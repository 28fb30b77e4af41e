mod backend;
mod sqlite;

pub use backend::{DatabaseBackend, MAX_LIMIT};
pub use sqlite::SqliteBackend;
