//! SQLite backend: entries, ownership, filters and sessions

use chrono::{Duration, TimeZone, Utc};
use radiohits::db::{DatabaseBackend, SqliteBackend};
use radiohits::types::{EntryFilter, EntryInput, EntryKind, User};

async fn backend() -> SqliteBackend {
  let backend = SqliteBackend::in_memory().await.unwrap();
  backend.init_schema().await.unwrap();
  backend
}

async fn user(backend: &SqliteBackend, name: &str) -> User {
  backend.create_user(name, "hash").await.unwrap()
}

fn input(title: &str) -> EntryInput {
  EntryInput {
    title: title.into(),
    image: None,
    body: format!("Cuerpo de {}", title),
  }
}

// =============================================================================
// Entries
// =============================================================================

#[tokio::test]
async fn test_insert_and_get_entry() {
  let backend = backend().await;
  let author = user(&backend, "ana").await;
  let created = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();

  let entry = backend
    .insert_entry(
      EntryKind::Blog,
      author.id,
      &EntryInput {
        title: "Festival".into(),
        image: Some("https://cdn.example/f.jpg".into()),
        body: "Texto".into(),
      },
      created,
    )
    .await
    .unwrap();

  assert_eq!(entry.kind, EntryKind::Blog);
  assert_eq!(entry.author, "ana");
  assert_eq!(entry.created_at, created);
  assert_eq!(entry.image.as_deref(), Some("https://cdn.example/f.jpg"));

  let fetched = backend.get_entry(EntryKind::Blog, entry.id).await.unwrap();
  assert_eq!(fetched, Some(entry.clone()));
}

#[tokio::test]
async fn test_kinds_are_separate() {
  let backend = backend().await;
  let author = user(&backend, "ana").await;
  let entry = backend
    .insert_entry(EntryKind::Index, author.id, &input("Slide"), Utc::now())
    .await
    .unwrap();

  assert!(backend
    .get_entry(EntryKind::Blog, entry.id)
    .await
    .unwrap()
    .is_none());
  assert_eq!(
    backend
      .count_entries(EntryKind::Blog, &EntryFilter::default())
      .await
      .unwrap(),
    0
  );
  assert_eq!(
    backend
      .count_entries(EntryKind::Index, &EntryFilter::default())
      .await
      .unwrap(),
    1
  );
}

#[tokio::test]
async fn test_only_author_can_update_or_delete() {
  let backend = backend().await;
  let ana = user(&backend, "ana").await;
  let luis = user(&backend, "luis").await;
  let entry = backend
    .insert_entry(EntryKind::Blog, ana.id, &input("Original"), Utc::now())
    .await
    .unwrap();

  let updated = backend
    .update_entry(EntryKind::Blog, entry.id, luis.id, &input("Ajeno"))
    .await
    .unwrap();
  assert!(updated.is_none());
  assert!(backend
    .delete_entry(EntryKind::Blog, entry.id, luis.id)
    .await
    .unwrap()
    .is_none());

  let updated = backend
    .update_entry(EntryKind::Blog, entry.id, ana.id, &input("Nuevo"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.title, "Nuevo");
  assert_eq!(updated.created_at, entry.created_at);

  let deleted = backend
    .delete_entry(EntryKind::Blog, entry.id, ana.id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(deleted.title, "Nuevo");
  assert!(backend
    .get_entry(EntryKind::Blog, entry.id)
    .await
    .unwrap()
    .is_none());
}

#[tokio::test]
async fn test_update_missing_entry() {
  let backend = backend().await;
  let ana = user(&backend, "ana").await;
  assert!(backend
    .update_entry(EntryKind::Blog, 999, ana.id, &input("x"))
    .await
    .unwrap()
    .is_none());
}

#[tokio::test]
async fn test_list_newest_first_with_paging() {
  let backend = backend().await;
  let ana = user(&backend, "ana").await;
  for day in 1..=8 {
    let created = Utc.with_ymd_and_hms(2025, 1, day, 10, 0, 0).unwrap();
    backend
      .insert_entry(EntryKind::Blog, ana.id, &input(&format!("E{}", day)), created)
      .await
      .unwrap();
  }

  let all = EntryFilter::default();
  let first = backend
    .list_entries(EntryKind::Blog, &all, 6, 0)
    .await
    .unwrap();
  let titles: Vec<_> = first.iter().map(|e| e.title.as_str()).collect();
  assert_eq!(titles, vec!["E8", "E7", "E6", "E5", "E4", "E3"]);

  let second = backend
    .list_entries(EntryKind::Blog, &all, 6, 6)
    .await
    .unwrap();
  let titles: Vec<_> = second.iter().map(|e| e.title.as_str()).collect();
  assert_eq!(titles, vec!["E2", "E1"]);

  assert!(backend
    .list_entries(EntryKind::Blog, &all, 5000, 0)
    .await
    .is_err());
}

#[tokio::test]
async fn test_year_and_month_filters() {
  let backend = backend().await;
  let ana = user(&backend, "ana").await;
  let dates = [(2024, 3), (2025, 3), (2025, 11), (2025, 11)];
  for (i, (year, month)) in dates.iter().enumerate() {
    let created = Utc.with_ymd_and_hms(*year, *month, 5, 8, 0, 0).unwrap();
    backend
      .insert_entry(EntryKind::Blog, ana.id, &input(&format!("E{}", i)), created)
      .await
      .unwrap();
  }

  let count = |year, month| {
    let filter = EntryFilter { year, month };
    let backend = &backend;
    async move {
      backend
        .count_entries(EntryKind::Blog, &filter)
        .await
        .unwrap()
    }
  };

  assert_eq!(count(None, None).await, 4);
  assert_eq!(count(Some(2025), None).await, 3);
  assert_eq!(count(None, Some(3)).await, 2);
  assert_eq!(count(Some(2025), Some(11)).await, 2);
  assert_eq!(count(Some(2023), None).await, 0);

  let listed = backend
    .list_entries(
      EntryKind::Blog,
      &EntryFilter {
        year: Some(2024),
        month: Some(3),
      },
      6,
      0,
    )
    .await
    .unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].title, "E0");

  assert_eq!(
    backend.entry_years(EntryKind::Blog).await.unwrap(),
    vec![2025, 2024]
  );
  assert!(backend.entry_years(EntryKind::Index).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_latest_entries() {
  let backend = backend().await;
  let ana = user(&backend, "ana").await;
  for i in 0..5 {
    backend
      .insert_entry(EntryKind::Index, ana.id, &input(&format!("S{}", i)), Utc::now())
      .await
      .unwrap();
  }
  let latest = backend.latest_entries(EntryKind::Index, 3).await.unwrap();
  let titles: Vec<_> = latest.iter().map(|e| e.title.as_str()).collect();
  assert_eq!(titles, vec!["S4", "S3", "S2"]);
}

// =============================================================================
// Users and sessions
// =============================================================================

#[tokio::test]
async fn test_duplicate_username_rejected() {
  let backend = backend().await;
  user(&backend, "ana").await;
  assert!(backend.create_user("ana", "other").await.is_err());
}

#[tokio::test]
async fn test_get_user_by_username() {
  let backend = backend().await;
  let ana = user(&backend, "ana").await;
  let (found, hash) = backend.get_user_by_username("ana").await.unwrap().unwrap();
  assert_eq!(found, ana);
  assert_eq!(hash, "hash");
  assert!(backend
    .get_user_by_username("nadie")
    .await
    .unwrap()
    .is_none());
}

#[tokio::test]
async fn test_sessions_expire_and_can_be_deleted() {
  let backend = backend().await;
  let ana = user(&backend, "ana").await;

  backend
    .create_session(ana.id, "live", Utc::now() + Duration::days(1))
    .await
    .unwrap();
  backend
    .create_session(ana.id, "stale", Utc::now() - Duration::seconds(1))
    .await
    .unwrap();

  assert_eq!(
    backend.validate_session("live").await.unwrap().map(|u| u.id),
    Some(ana.id)
  );
  assert!(backend.validate_session("stale").await.unwrap().is_none());
  assert!(backend.validate_session("unknown").await.unwrap().is_none());

  assert!(backend.delete_session("live").await.unwrap());
  assert!(!backend.delete_session("live").await.unwrap());
  assert!(backend.validate_session("live").await.unwrap().is_none());
}

#[tokio::test]
async fn test_deleting_user_removes_entries_and_sessions() {
  let backend = backend().await;
  let ana = user(&backend, "ana").await;
  let entry = backend
    .insert_entry(EntryKind::Blog, ana.id, &input("E"), Utc::now())
    .await
    .unwrap();
  backend
    .create_session(ana.id, "tok", Utc::now() + Duration::days(1))
    .await
    .unwrap();

  assert!(backend.delete_user(ana.id).await.unwrap());
  assert!(backend
    .get_entry(EntryKind::Blog, entry.id)
    .await
    .unwrap()
    .is_none());
  assert!(backend.validate_session("tok").await.unwrap().is_none());
  assert!(!backend.delete_user(ana.id).await.unwrap());
}

#[tokio::test]
async fn test_file_backed_database_persists() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("site.db");
  let path = path.to_str().unwrap();

  {
    let backend = SqliteBackend::new(path).await.unwrap();
    backend.init_schema().await.unwrap();
    let ana = user(&backend, "ana").await;
    backend
      .insert_entry(EntryKind::Blog, ana.id, &input("Persistente"), Utc::now())
      .await
      .unwrap();
  }

  let backend = SqliteBackend::new(path).await.unwrap();
  backend.init_schema().await.unwrap();
  let entries = backend
    .list_entries(EntryKind::Blog, &EntryFilter::default(), 6, 0)
    .await
    .unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].title, "Persistente");
}
