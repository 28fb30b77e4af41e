use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Site account allowed to manage entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: i64,
  pub username: String,
  pub created_at: DateTime<Utc>,
}
