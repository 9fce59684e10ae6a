mod common;

use common::harness;
use semnotes_core::model::{NoteFileType, NoteStatus, ProgressStatus};
use semnotes_core::traits::{ProgressUpdate, Store};
use semnotes_portal::contributions::NewNote;
use semnotes_portal::PortalError;

fn note(subject: uuid::Uuid, title: &str) -> NewNote {
    NewNote {
        subject,
        title: title.into(),
        description: "handwritten".into(),
        file_url: "https://res.example.com/demo/image/upload/v1712/notes/unit1.pdf".into(),
        original_name: Some("unit1.pdf".into()),
        file_type: NoteFileType::Pdf,
    }
}

#[tokio::test]
async fn approving_a_note_triggers_immediate_recompute() {
    let h = harness();
    let admin = h.main_admin().await;
    let alice = h.student("alice@example.com").await;
    let os = h.portal.create_subject(&admin, "OS", "").await.unwrap();

    // Activity the scoring engine has not seen yet.
    h.store
        .upsert_progress(
            alice.user_id,
            uuid::Uuid::new_v4(),
            ProgressUpdate {
                status: Some(ProgressStatus::Read),
                note: None,
            },
        )
        .await
        .unwrap();

    let pending = h.portal.upload_note(&alice, note(os.id, "Unit 1")).await.unwrap();
    assert_eq!(pending.status, NoteStatus::Pending);
    assert_eq!(h.trigger.calls(), 0);

    let approval = h.portal.approve_note(&admin, pending.id).await.unwrap();
    assert_eq!(approval.note.status, NoteStatus::Approved);
    assert_eq!(h.trigger.calls(), 1);
    assert_eq!(approval.recompute.unwrap().updated, 1);

    let alice_now = h.portal.current_user(&alice).await.unwrap();
    assert_eq!(alice_now.score, 2);
}

#[tokio::test]
async fn pending_and_approved_lists() {
    let h = harness();
    let admin = h.main_admin().await;
    let alice = h.student("alice@example.com").await;
    let os = h.portal.create_subject(&admin, "OS", "").await.unwrap();
    let dbms = h.portal.create_subject(&admin, "DBMS", "").await.unwrap();

    let a = h.portal.upload_note(&alice, note(os.id, "A")).await.unwrap();
    let b = h.portal.upload_note(&alice, note(os.id, "B")).await.unwrap();
    let c = h.portal.upload_note(&alice, note(dbms.id, "C")).await.unwrap();

    let pending: Vec<_> = h
        .portal
        .pending_notes(&admin)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(pending, [c.id, b.id, a.id]);

    h.portal.approve_note(&admin, a.id).await.unwrap();
    h.portal.approve_note(&admin, c.id).await.unwrap();
    h.portal.reject_note(&admin, b.id).await.unwrap();

    let approved = h.portal.approved_notes(os.id).await.unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].id, a.id);
    assert!(h.portal.pending_notes(&admin).await.unwrap().is_empty());

    // Rejection keeps the row.
    assert_eq!(
        h.store.get_note(b.id).await.unwrap().unwrap().status,
        NoteStatus::Rejected
    );
}

#[tokio::test]
async fn students_cannot_moderate() {
    let h = harness();
    let admin = h.main_admin().await;
    let alice = h.student("alice@example.com").await;
    let os = h.portal.create_subject(&admin, "OS", "").await.unwrap();
    let n = h.portal.upload_note(&alice, note(os.id, "A")).await.unwrap();

    assert!(matches!(
        h.portal.approve_note(&alice, n.id).await,
        Err(PortalError::Forbidden(_))
    ));
    assert!(matches!(
        h.portal.pending_notes(&alice).await,
        Err(PortalError::Forbidden(_))
    ));
    assert_eq!(h.trigger.calls(), 0);
}

#[tokio::test]
async fn upload_requires_title_file_and_subject() {
    let h = harness();
    let admin = h.main_admin().await;
    let alice = h.student("alice@example.com").await;
    let os = h.portal.create_subject(&admin, "OS", "").await.unwrap();

    let mut missing = note(os.id, "A");
    missing.file_url.clear();
    assert!(matches!(
        h.portal.upload_note(&alice, missing).await,
        Err(PortalError::MissingFields)
    ));
    assert!(matches!(
        h.portal.upload_note(&alice, note(uuid::Uuid::new_v4(), "A")).await,
        Err(PortalError::NotFound("subject"))
    ));
}

#[tokio::test]
async fn deleting_a_note_destroys_its_hosted_file() {
    let h = harness();
    let admin = h.main_admin().await;
    let alice = h.student("alice@example.com").await;
    let os = h.portal.create_subject(&admin, "OS", "").await.unwrap();
    let n = h.portal.upload_note(&alice, note(os.id, "A")).await.unwrap();

    h.portal.delete_note(&admin, n.id).await.unwrap();
    assert_eq!(h.media.destroyed(), ["notes/unit1"]);
    assert!(h.store.get_note(n.id).await.unwrap().is_none());

    assert!(matches!(
        h.portal.delete_note(&admin, n.id).await,
        Err(PortalError::NotFound("note"))
    ));
}
