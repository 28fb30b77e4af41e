use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, OptionalExtension};
use tokio_rusqlite::Connection;

use super::backend::{DatabaseBackend, MAX_LIMIT};
use crate::types::{Entry, EntryFilter, EntryInput, EntryKind, User};

const PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;
PRAGMA temp_store = MEMORY;
"#;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    image TEXT,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_entries_kind_created ON entries(kind, created_at);

CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    expires_at TEXT NOT NULL
) WITHOUT ROWID;
"#;

const ENTRY_COLUMNS: &str = "e.id, e.kind, e.author_id, u.username, e.title, e.image, e.body, e.created_at \
   FROM entries e JOIN users u ON u.id = e.author_id";


/// Fixed-width UTC timestamps so text order is chronological order
fn format_ts(ts: DateTime<Utc>) -> String {
  ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(idx: usize, s: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
  DateTime::parse_from_rfc3339(s)
    .map(|d| d.with_timezone(&Utc))
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_entry(row: &rusqlite::Row) -> Result<Entry, rusqlite::Error> {
  let kind: String = row.get(1)?;
  let created: String = row.get(7)?;
  Ok(Entry {
    id: row.get(0)?,
    kind: kind.parse().map_err(|e: anyhow::Error| {
      rusqlite::Error::FromSqlConversionFailure(1, Type::Text, e.into())
    })?,
    author_id: row.get(2)?,
    author: row.get(3)?,
    title: row.get(4)?,
    image: row.get(5)?,
    body: row.get(6)?,
    created_at: parse_ts(7, &created)?,
  })
}

fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
  let created: String = row.get(2)?;
  Ok(User {
    id: row.get(0)?,
    username: row.get(1)?,
    created_at: parse_ts(2, &created)?,
  })
}

/// WHERE clause (without the keyword) and its parameters for a kind + filter
fn filter_clause(kind: EntryKind, filter: &EntryFilter) -> (String, Vec<Value>) {
  let mut sql = String::from("e.kind = ?");
  let mut values = vec![Value::Text(kind.as_str().to_string())];
  if let Some(year) = filter.year {
    sql.push_str(" AND CAST(substr(e.created_at, 1, 4) AS INTEGER) = ?");
    values.push(Value::Integer(year.into()));
  }
  if let Some(month) = filter.month {
    sql.push_str(" AND CAST(substr(e.created_at, 6, 2) AS INTEGER) = ?");
    values.push(Value::Integer(month.into()));
  }
  (sql, values)
}

fn select_entry(
  conn: &rusqlite::Connection,
  kind: EntryKind,
  id: i64,
) -> Result<Option<Entry>, rusqlite::Error> {
  let sql = format!("SELECT {} WHERE e.kind = ?1 AND e.id = ?2", ENTRY_COLUMNS);
  let mut stmt = conn.prepare_cached(&sql)?;
  stmt
    .query_row(params![kind.as_str(), id], row_to_entry)
    .optional()
}

pub struct SqliteBackend {
  conn: Connection,
}

impl SqliteBackend {
  pub async fn new(path: &str) -> Result<Self, anyhow::Error> {
    let conn = if path == ":memory:" {
      Connection::open_in_memory().await?
    } else {
      Connection::open(path).await?
    };

    conn
      .call(|conn| conn.execute_batch(PRAGMAS).map_err(|e| e.into()))
      .await?;

    Ok(Self { conn })
  }

  pub async fn in_memory() -> Result<Self, anyhow::Error> {
    Self::new(":memory:").await
  }
}

#[async_trait]
impl DatabaseBackend for SqliteBackend {
  async fn init_schema(&self) -> Result<(), anyhow::Error> {
    self
      .conn
      .call(|conn| conn.execute_batch(SCHEMA).map_err(|e| e.into()))
      .await?;
    tracing::info!("SQLite schema initialized");
    Ok(())
  }

  async fn insert_entry(
    &self,
    kind: EntryKind,
    author_id: i64,
    input: &EntryInput,
    created_at: DateTime<Utc>,
  ) -> Result<Entry, anyhow::Error> {
    let input = input.clone();
    let created = format_ts(created_at);

    let entry = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO entries (kind, author_id, title, image, body, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![kind.as_str(), author_id, input.title, input.image, input.body, created],
        )?;
        let id = conn.last_insert_rowid();
        Ok(select_entry(conn, kind, id)?)
      })
      .await?;

    entry.ok_or_else(|| anyhow::anyhow!("inserted {} entry vanished", kind))
  }

  async fn get_entry(&self, kind: EntryKind, id: i64) -> Result<Option<Entry>, anyhow::Error> {
    self
      .conn
      .call(move |conn| Ok(select_entry(conn, kind, id)?))
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn update_entry(
    &self,
    kind: EntryKind,
    id: i64,
    author_id: i64,
    input: &EntryInput,
  ) -> Result<Option<Entry>, anyhow::Error> {
    let input = input.clone();

    self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE entries SET title = ?1, image = ?2, body = ?3 WHERE kind = ?4 AND id = ?5 AND author_id = ?6",
          params![input.title, input.image, input.body, kind.as_str(), id, author_id],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_entry(conn, kind, id)?)
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn delete_entry(
    &self,
    kind: EntryKind,
    id: i64,
    author_id: i64,
  ) -> Result<Option<Entry>, anyhow::Error> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let entry = match select_entry(&tx, kind, id)? {
          Some(entry) if entry.author_id == author_id => entry,
          _ => return Ok(None),
        };
        tx.execute("DELETE FROM entries WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(Some(entry))
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn list_entries(
    &self,
    kind: EntryKind,
    filter: &EntryFilter,
    limit: usize,
    offset: usize,
  ) -> Result<Vec<Entry>, anyhow::Error> {
    if limit > MAX_LIMIT {
      anyhow::bail!("Limit too large (max {})", MAX_LIMIT);
    }

    let (clause, mut values) = filter_clause(kind, filter);
    let sql = format!(
      "SELECT {} WHERE {} ORDER BY e.created_at DESC, e.id DESC LIMIT ? OFFSET ?",
      ENTRY_COLUMNS, clause
    );
    values.push(Value::Integer(limit as i64));
    values.push(Value::Integer(offset as i64));

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), row_to_entry)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn count_entries(
    &self,
    kind: EntryKind,
    filter: &EntryFilter,
  ) -> Result<u64, anyhow::Error> {
    let (clause, values) = filter_clause(kind, filter);
    let sql = format!("SELECT COUNT(*) FROM entries e WHERE {}", clause);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn latest_entries(&self, kind: EntryKind, n: usize) -> Result<Vec<Entry>, anyhow::Error> {
    let n = n.min(MAX_LIMIT) as i64;
    let sql = format!(
      "SELECT {} WHERE e.kind = ?1 ORDER BY e.id DESC LIMIT ?2",
      ENTRY_COLUMNS
    );

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![kind.as_str(), n], row_to_entry)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn entry_years(&self, kind: EntryKind) -> Result<Vec<i32>, anyhow::Error> {
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT DISTINCT CAST(substr(created_at, 1, 4) AS INTEGER) AS year FROM entries WHERE kind = ?1 ORDER BY year DESC",
        )?;
        let rows = stmt.query_map(params![kind.as_str()], |row| row.get::<_, i32>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, anyhow::Error> {
    let username = username.to_string();
    let password_hash = password_hash.to_string();
    let now = Utc::now();
    let now_str = format_ts(now);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
          params![username, password_hash, now_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    let user = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT id, username, created_at FROM users WHERE id = ?1",
          params![id],
          row_to_user,
        )?)
      })
      .await?;
    tracing::info!(username = %user.username, "Created user");
    Ok(user)
  }

  async fn get_user_by_username(
    &self,
    username: &str,
  ) -> Result<Option<(User, String)>, anyhow::Error> {
    let username = username.to_string();

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT id, username, created_at, password_hash FROM users WHERE username = ?1",
        )?;
        Ok(
          stmt
            .query_row(params![username], |row| {
              Ok((row_to_user(row)?, row.get::<_, String>(3)?))
            })
            .optional()?,
        )
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn delete_user(&self, id: i64) -> Result<bool, anyhow::Error> {
    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", params![id])?))
      .await?;
    Ok(deleted > 0)
  }

  async fn create_session(
    &self,
    user_id: i64,
    token_hash: &str,
    expires_at: DateTime<Utc>,
  ) -> Result<(), anyhow::Error> {
    let token_hash = token_hash.to_string();
    let expires = format_ts(expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, expires_at) VALUES (?1, ?2, ?3)",
          params![token_hash, user_id, expires],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn validate_session(&self, token_hash: &str) -> Result<Option<User>, anyhow::Error> {
    let token_hash = token_hash.to_string();
    let now = format_ts(Utc::now());

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT u.id, u.username, u.created_at FROM sessions s JOIN users u ON u.id = s.user_id \
           WHERE s.token_hash = ?1 AND s.expires_at > ?2",
        )?;
        Ok(
          stmt
            .query_row(params![token_hash, now], row_to_user)
            .optional()?,
        )
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn delete_session(&self, token_hash: &str) -> Result<bool, anyhow::Error> {
    let token_hash = token_hash.to_string();
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE token_hash = ?1",
          params![token_hash],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }
}
