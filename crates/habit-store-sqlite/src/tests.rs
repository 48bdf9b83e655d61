//! Integration tests for `SqliteStore`.

use habit_core::{
  Kind, NewRecord, Record,
  record::{NewAction, NewOverall, NewTrigger},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn bootstrapped() -> SqliteStore {
  let s = store().await;
  s.create_tables().await.unwrap();
  s
}

fn trigger(category: &str, intensity: i32) -> Record {
  NewRecord::Trigger(NewTrigger {
    category: category.into(),
    intensity,
    compulsion: intensity > 5,
    notes: String::new(),
  })
  .stamp()
}

fn action(category: &str) -> Record {
  NewRecord::Action(NewAction {
    category: category.into(),
    relief:   true,
    duration: 20,
    notes:    "walked it off".into(),
  })
  .stamp()
}

fn overall(mood_score: i32) -> Record {
  NewRecord::Overall(NewOverall {
    clean_streak: 3,
    gym_session: false,
    coding_hours: 6,
    reading_hours: 1,
    mood_score,
  })
  .stamp()
}

// ─── Schema bootstrap ────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_store_has_no_tables() {
  let s = store().await;
  assert!(!s.tables_exist().await.unwrap());
}

#[tokio::test]
async fn create_tables_makes_all_three() {
  let s = bootstrapped().await;
  assert!(s.tables_exist().await.unwrap());
  for kind in Kind::ALL {
    assert_eq!(s.count(kind).await.unwrap(), 0, "{kind}");
  }
}

#[tokio::test]
async fn create_tables_is_repeatable() {
  let s = bootstrapped().await;
  s.insert_batch(Kind::Trigger, vec![trigger("urge", 4)]).await.unwrap();
  s.create_tables().await.unwrap();
  assert_eq!(s.count(Kind::Trigger).await.unwrap(), 1);
}

#[tokio::test]
async fn one_missing_table_means_schema_absent() {
  for missing in Kind::ALL {
    let s = bootstrapped().await;
    let sql = format!("DROP TABLE \"{}\"", missing.table_name());
    s.conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await
      .unwrap();
    assert!(!s.tables_exist().await.unwrap(), "dropped {missing}");
  }
}

// ─── Batch insert ────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_batch_is_a_no_op() {
  // No tables at all: an empty batch must not even reach the database.
  let s = store().await;
  assert_eq!(s.insert_batch(Kind::Action, vec![]).await.unwrap(), 0);
}

#[tokio::test]
async fn batch_insert_roundtrips_fields() {
  let s = bootstrapped().await;
  let original = trigger("urge", 7);

  let n = s.insert_batch(Kind::Trigger, vec![original.clone()]).await.unwrap();
  assert_eq!(n, 1);

  let rows = s.list(Kind::Trigger).await.unwrap();
  assert_eq!(rows, vec![original]);
}

#[tokio::test]
async fn each_kind_lands_in_its_own_table() {
  let s = bootstrapped().await;
  s.insert_batch(Kind::Trigger, vec![trigger("urge", 2), trigger("boredom", 5)])
    .await
    .unwrap();
  s.insert_batch(Kind::Action, vec![action("walk")]).await.unwrap();
  s.insert_batch(Kind::Overall, vec![overall(6)]).await.unwrap();

  assert_eq!(s.count(Kind::Trigger).await.unwrap(), 2);
  assert_eq!(s.count(Kind::Action).await.unwrap(), 1);
  assert_eq!(s.count(Kind::Overall).await.unwrap(), 1);

  let rows = s.list(Kind::Overall).await.unwrap();
  let Record::Overall(o) = &rows[0] else {
    panic!("expected an overall row");
  };
  assert_eq!(o.mood_score, 6);
  assert_eq!(o.coding_hours, 6);
}

#[tokio::test]
async fn failing_record_rolls_back_whole_batch() {
  let s = bootstrapped().await;
  let first = action("walk");
  let second = action("call a friend");
  // Same primary key as `first`: the third insert fails.
  let duplicate = first.clone();

  let result = s
    .insert_batch(Kind::Action, vec![first, second, duplicate])
    .await;
  assert!(matches!(result, Err(Error::Database(_))), "{result:?}");
  assert_eq!(s.count(Kind::Action).await.unwrap(), 0);
}

#[tokio::test]
async fn failed_batch_leaves_earlier_commits_intact() {
  let s = bootstrapped().await;
  let kept = trigger("urge", 3);
  s.insert_batch(Kind::Trigger, vec![kept.clone()]).await.unwrap();

  let result = s
    .insert_batch(Kind::Trigger, vec![trigger("stress", 4), kept.clone()])
    .await;
  assert!(result.is_err());
  assert_eq!(s.list(Kind::Trigger).await.unwrap(), vec![kept]);
}

#[tokio::test]
async fn insert_without_schema_fails() {
  let s = store().await;
  let result = s.insert_batch(Kind::Overall, vec![overall(5)]).await;
  assert!(matches!(result, Err(Error::Database(_))));
}

#[tokio::test]
async fn mixed_batch_is_rejected_before_writing() {
  let s = bootstrapped().await;
  let result = s
    .insert_batch(Kind::Trigger, vec![trigger("urge", 1), action("walk")])
    .await;
  assert!(matches!(
    result,
    Err(Error::KindMismatch { expected: Kind::Trigger, found: Kind::Action })
  ));
  assert_eq!(s.count(Kind::Trigger).await.unwrap(), 0);
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn snapshot_copies_rows_and_replaces_prior_file() {
  let dir = tempfile::tempdir().unwrap();
  let out = dir.path().join("out.sqlite");
  std::fs::write(&out, b"stale snapshot").unwrap();

  let s = bootstrapped().await;
  s.insert_batch(Kind::Trigger, vec![trigger("urge", 7)]).await.unwrap();
  s.insert_batch(Kind::Overall, vec![overall(4)]).await.unwrap();
  s.snapshot_to(&out).await.unwrap();

  let copy = SqliteStore::open(&out).await.unwrap();
  assert!(copy.tables_exist().await.unwrap());
  assert_eq!(copy.count(Kind::Trigger).await.unwrap(), 1);
  assert_eq!(copy.count(Kind::Action).await.unwrap(), 0);
  assert_eq!(copy.count(Kind::Overall).await.unwrap(), 1);
}

#[tokio::test]
async fn file_store_survives_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("health.sqlite");

  let s = SqliteStore::open(&path).await.unwrap();
  s.create_tables().await.unwrap();
  s.insert_batch(Kind::Action, vec![action("walk")]).await.unwrap();
  s.close().await.unwrap();

  let reopened = SqliteStore::open(&path).await.unwrap();
  assert!(reopened.tables_exist().await.unwrap());
  assert_eq!(reopened.count(Kind::Action).await.unwrap(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn snapshot_refuses_non_utf8_path() {
  use std::{ffi::OsStr, os::unix::ffi::OsStrExt as _};

  let dir = tempfile::tempdir().unwrap();
  let out = dir.path().join(OsStr::from_bytes(b"out-\xff.sqlite"));

  let s = bootstrapped().await;
  let err = s.snapshot_to(&out).await.unwrap_err();
  assert!(matches!(err, Error::NonUtf8Path(ref p) if *p == out), "{err:?}");
  assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
