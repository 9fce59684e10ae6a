use std::sync::Arc;

use semnotes_core::model::{ProgressStatus, Role, Subject, User};
use semnotes_core::scoring::{ScoreWeights, ScoringEngine};
use semnotes_core::traits::{ProgressUpdate, Store};
use semnotes_store::DocumentStore;
use uuid::Uuid;

fn student(email: &str) -> User {
    let mut user = User::new(email, "hash".into(), Role::Student);
    user.email = Some(email.to_string());
    user
}

fn status(status: ProgressStatus) -> ProgressUpdate {
    ProgressUpdate {
        status: Some(status),
        note: None,
    }
}

#[tokio::test]
async fn recompute_sees_rows_written_by_another_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let scheduler = DocumentStore::open(&path).unwrap();
    let alice = scheduler.insert_user(student("alice@example.com")).await.unwrap();

    let cli = DocumentStore::open(&path).unwrap();
    let bob = cli.insert_user(student("bob@example.com")).await.unwrap();
    cli.upsert_progress(alice.id, Uuid::new_v4(), status(ProgressStatus::Revise))
        .await
        .unwrap();

    let scheduler = Arc::new(scheduler);
    let engine = ScoringEngine::new(scheduler.clone(), ScoreWeights::default());
    let summary = engine.recompute_all().await.unwrap();
    assert_eq!(summary.students, 2);
    assert_eq!(summary.updated, 1);

    assert_eq!(scheduler.get_user(alice.id).await.unwrap().unwrap().score, 5);
    assert_eq!(cli.get_user(alice.id).await.unwrap().unwrap().score, 5);
    assert!(cli.get_user(bob.id).await.unwrap().is_some());
}

#[tokio::test]
async fn writes_from_both_handles_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let topic = Uuid::new_v4();

    let a = DocumentStore::open(&path).unwrap();
    let b = DocumentStore::open(&path).unwrap();

    let alice = a.insert_user(student("alice@example.com")).await.unwrap();
    a.upsert_progress(alice.id, topic, status(ProgressStatus::Read))
        .await
        .unwrap();

    // b has not read anything since it was opened
    let bob = b.insert_user(student("bob@example.com")).await.unwrap();
    b.upsert_progress(alice.id, topic, status(ProgressStatus::Revise))
        .await
        .unwrap();

    let summary = ScoringEngine::new(Arc::new(a), ScoreWeights::default())
        .recompute_all()
        .await
        .unwrap();
    assert_eq!(summary.updated, 1);

    let reopened = DocumentStore::open(&path).unwrap();
    assert_eq!(reopened.count_users().await.unwrap(), 2);
    assert!(reopened.get_user(bob.id).await.unwrap().is_some());
    let rows = reopened.list_progress(alice.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, ProgressStatus::Revise);
    assert_eq!(reopened.get_user(alice.id).await.unwrap().unwrap().score, 5);
}

#[tokio::test]
async fn uniqueness_is_checked_against_the_other_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let a = DocumentStore::open(&path).unwrap();
    let b = DocumentStore::open(&path).unwrap();

    a.insert_subject(Subject::new("Physics", "")).await.unwrap();
    let err = b
        .insert_subject(Subject::new("Physics", ""))
        .await
        .unwrap_err();
    assert!(err.is_duplicate());
}

#[tokio::test]
async fn failed_save_leaves_no_trace() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let store = DocumentStore::open(data_dir.join("store.json")).unwrap();
    let alice = store.insert_user(student("alice@example.com")).await.unwrap();

    // The snapshot directory becomes a plain file, so the next save fails.
    std::fs::remove_dir_all(&data_dir).unwrap();
    std::fs::write(&data_dir, "not a directory").unwrap();

    let result = store
        .upsert_progress(alice.id, Uuid::new_v4(), status(ProgressStatus::Read))
        .await;
    assert!(result.is_err());
    assert!(store.list_progress(alice.id).await.unwrap().is_empty());
    assert_eq!(store.count_progress(alice.id, ProgressStatus::Read).await.unwrap(), 0);
}

#[tokio::test]
async fn recompute_saves_once_for_all_changed_scores() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let store = Arc::new(DocumentStore::open(&path).unwrap());

    for email in ["a@example.com", "b@example.com", "c@example.com"] {
        let user = store.insert_user(student(email)).await.unwrap();
        store
            .upsert_progress(user.id, Uuid::new_v4(), status(ProgressStatus::Read))
            .await
            .unwrap();
    }
    let generation = |p: &std::path::Path| -> u64 {
        let lock = p.with_file_name("store.json.lock");
        std::fs::read_to_string(lock).unwrap().parse().unwrap()
    };
    let before = generation(&path);

    let summary = ScoringEngine::new(store.clone(), ScoreWeights::default())
        .recompute_all()
        .await
        .unwrap();
    assert_eq!(summary.updated, 3);
    assert_eq!(generation(&path), before + 1);
}
