use semnotes_core::model::{ProgressStatus, Subject, Topic};
use semnotes_core::progress::{progress_by_subject, subject_progress};
use semnotes_core::traits::{ProgressUpdate, Store};
use semnotes_store::DocumentStore;
use uuid::Uuid;

fn status(s: ProgressStatus) -> ProgressUpdate {
    ProgressUpdate {
        status: Some(s),
        note: None,
    }
}

#[tokio::test]
async fn subject_without_topics_is_zero_percent() {
    let store = DocumentStore::in_memory();
    let empty = store.insert_subject(Subject::new("Empty", "")).await.unwrap();

    let p = subject_progress(&store, Uuid::new_v4(), &empty).await.unwrap();
    assert_eq!(p.total, 0);
    assert_eq!(p.completed, 0);
    assert_eq!(p.percentage, 0);
}

#[tokio::test]
async fn one_of_three_topics_is_thirty_three_percent() {
    let store = DocumentStore::in_memory();
    let user = Uuid::new_v4();
    let os = store
        .insert_subject(Subject::new("Operating Systems", ""))
        .await
        .unwrap();

    let mut topics = Vec::new();
    for title in ["Processes", "Threads", "Paging"] {
        topics.push(
            store
                .insert_topic(Topic::new(os.id, "Basics", title, ""))
                .await
                .unwrap(),
        );
    }

    store
        .upsert_progress(user, topics[0].id, status(ProgressStatus::Read))
        .await
        .unwrap();
    store
        .upsert_progress(user, topics[1].id, status(ProgressStatus::Unread))
        .await
        .unwrap();

    let p = subject_progress(&store, user, &os).await.unwrap();
    assert_eq!((p.completed, p.total, p.percentage), (1, 3, 33));

    // Switching read -> revise still counts once.
    store
        .upsert_progress(user, topics[0].id, status(ProgressStatus::Revise))
        .await
        .unwrap();
    let p = subject_progress(&store, user, &os).await.unwrap();
    assert_eq!(p.percentage, 33);
}

#[tokio::test]
async fn progress_is_per_user_and_per_subject() {
    let store = DocumentStore::in_memory();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let maths = store.insert_subject(Subject::new("Maths", "")).await.unwrap();
    let physics = store.insert_subject(Subject::new("Physics", "")).await.unwrap();
    let algebra = store
        .insert_topic(Topic::new(maths.id, "Algebra", "Groups", ""))
        .await
        .unwrap();
    store
        .insert_topic(Topic::new(physics.id, "Optics", "Lenses", ""))
        .await
        .unwrap();

    store
        .upsert_progress(alice, algebra.id, status(ProgressStatus::Read))
        .await
        .unwrap();

    let subjects = store.list_subjects().await.unwrap();
    let alice_view = progress_by_subject(&store, alice, &subjects).await.unwrap();
    assert_eq!(alice_view[0].subject_name, "Maths");
    assert_eq!(alice_view[0].percentage, 100);
    assert_eq!(alice_view[1].percentage, 0);

    let bob_view = progress_by_subject(&store, bob, &subjects).await.unwrap();
    assert!(bob_view.iter().all(|p| p.percentage == 0));
}

#[tokio::test]
async fn progress_on_deleted_topic_is_ignored() {
    let store = DocumentStore::in_memory();
    let user = Uuid::new_v4();
    let s = store.insert_subject(Subject::new("Chem", "")).await.unwrap();
    store
        .insert_topic(Topic::new(s.id, "Ch1", "Atoms", ""))
        .await
        .unwrap();
    let dropped = store
        .insert_topic(Topic::new(s.id, "Ch1", "Bonds", ""))
        .await
        .unwrap();

    store
        .upsert_progress(user, dropped.id, status(ProgressStatus::Read))
        .await
        .unwrap();
    store.delete_topic(dropped.id).await.unwrap();

    let p = subject_progress(&store, user, &s).await.unwrap();
    assert_eq!((p.completed, p.total), (0, 1));
}
