use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{Entry, EntryFilter, EntryInput, EntryKind, User};

/// Upper bound for page sizes requested from a backend
pub const MAX_LIMIT: usize = 1000;

/// Abstract storage for entries, accounts and sessions
#[async_trait]
pub trait DatabaseBackend: Send + Sync {
  async fn init_schema(&self) -> Result<(), anyhow::Error>;

  // Entries
  async fn insert_entry(
    &self,
    kind: EntryKind,
    author_id: i64,
    input: &EntryInput,
    created_at: DateTime<Utc>,
  ) -> Result<Entry, anyhow::Error>;
  async fn get_entry(&self, kind: EntryKind, id: i64) -> Result<Option<Entry>, anyhow::Error>;
  /// Update an entry owned by `author_id`. `None` if missing or owned by someone else.
  async fn update_entry(
    &self,
    kind: EntryKind,
    id: i64,
    author_id: i64,
    input: &EntryInput,
  ) -> Result<Option<Entry>, anyhow::Error>;
  /// Delete an entry owned by `author_id`, returning what was removed.
  async fn delete_entry(
    &self,
    kind: EntryKind,
    id: i64,
    author_id: i64,
  ) -> Result<Option<Entry>, anyhow::Error>;
  /// Newest `created_at` first, ties broken by id.
  async fn list_entries(
    &self,
    kind: EntryKind,
    filter: &EntryFilter,
    limit: usize,
    offset: usize,
  ) -> Result<Vec<Entry>, anyhow::Error>;
  async fn count_entries(&self, kind: EntryKind, filter: &EntryFilter)
    -> Result<u64, anyhow::Error>;
  /// Most recently inserted entries (highest ids first).
  async fn latest_entries(&self, kind: EntryKind, n: usize) -> Result<Vec<Entry>, anyhow::Error>;
  /// Distinct years with at least one entry, newest first.
  async fn entry_years(&self, kind: EntryKind) -> Result<Vec<i32>, anyhow::Error>;

  // Accounts
  async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, anyhow::Error>;
  /// Returns the user with their stored password hash
  async fn get_user_by_username(
    &self,
    username: &str,
  ) -> Result<Option<(User, String)>, anyhow::Error>;
  async fn delete_user(&self, id: i64) -> Result<bool, anyhow::Error>;

  // Sessions
  async fn create_session(
    &self,
    user_id: i64,
    token_hash: &str,
    expires_at: DateTime<Utc>,
  ) -> Result<(), anyhow::Error>;
  /// Resolve a session to its user. Expired sessions count as missing.
  async fn validate_session(&self, token_hash: &str) -> Result<Option<User>, anyhow::Error>;
  async fn delete_session(&self, token_hash: &str) -> Result<bool, anyhow::Error>;
}
