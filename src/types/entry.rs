use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which section an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
  /// Blog post, listed under /blog/
  Blog,
  /// Home page carousel item
  Index,
}

impl EntryKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Blog => "blog",
      Self::Index => "index",
    }
  }
}

impl std::fmt::Display for EntryKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for EntryKind {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "blog" => Ok(Self::Blog),
      "index" => Ok(Self::Index),
      other => anyhow::bail!("unknown entry kind: {}", other),
    }
  }
}

/// A stored entry with its author's username resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
  pub id: i64,
  pub kind: EntryKind,
  pub author_id: i64,
  pub author: String,
  pub title: String,
  pub image: Option<String>,
  pub body: String,
  pub created_at: DateTime<Utc>,
}

/// Author-editable fields of an entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInput {
  pub title: String,
  pub image: Option<String>,
  pub body: String,
}

/// Year/month restriction on `created_at`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryFilter {
  pub year: Option<i32>,
  pub month: Option<u32>,
}
