//! Community notes: student uploads and admin moderation.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use semnotes_core::model::{CommunityNote, NoteFileType, NoteId, NoteStatus, SubjectId};
use semnotes_core::scoring::RecomputeSummary;
use semnotes_core::traits::public_id_from_url;

use crate::error::PortalError;
use crate::{Portal, Session};

/// A file a student already uploaded to the media host.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub subject: SubjectId,
    pub title: String,
    pub description: String,
    pub file_url: String,
    pub original_name: Option<String>,
    pub file_type: NoteFileType,
}

/// Result of approving a note.
#[derive(Debug, Clone, Serialize)]
pub struct Approval {
    pub note: CommunityNote,
    /// `None` when the follow-up score recomputation failed.
    pub recompute: Option<RecomputeSummary>,
}

impl Portal {
    /// Submit a note for moderation.
    pub async fn upload_note(
        &self,
        session: &Session,
        note: NewNote,
    ) -> Result<CommunityNote, PortalError> {
        let user = self.current_user(session).await?;
        if note.title.trim().is_empty() || note.file_url.trim().is_empty() {
            return Err(PortalError::MissingFields);
        }
        if self.store.get_subject(note.subject).await?.is_none() {
            return Err(PortalError::NotFound("subject"));
        }

        let doc = CommunityNote {
            id: Uuid::new_v4(),
            subject: note.subject,
            uploaded_by: user.id,
            title: note.title.trim().to_string(),
            description: note.description,
            file_url: note.file_url,
            original_name: note.original_name,
            file_type: note.file_type,
            status: NoteStatus::Pending,
            created_at: Utc::now(),
        };
        Ok(self.store.insert_note(doc).await?)
    }

    /// Notes awaiting moderation, newest first.
    pub async fn pending_notes(&self, session: &Session) -> Result<Vec<CommunityNote>, PortalError> {
        self.require_admin(session).await?;
        Ok(self.store.list_notes(Some(NoteStatus::Pending)).await?)
    }

    /// Approved notes of one subject, newest first.
    pub async fn approved_notes(
        &self,
        subject: SubjectId,
    ) -> Result<Vec<CommunityNote>, PortalError> {
        Ok(self
            .store
            .list_notes(Some(NoteStatus::Approved))
            .await?
            .into_iter()
            .filter(|n| n.subject == subject)
            .collect())
    }

    async fn set_note_status(
        &self,
        id: NoteId,
        status: NoteStatus,
    ) -> Result<CommunityNote, PortalError> {
        let mut note = self
            .store
            .get_note(id)
            .await?
            .ok_or(PortalError::NotFound("note"))?;
        note.status = status;
        self.store.update_note(&note).await?;
        tracing::info!(note = %note.id, %status, "note moderated");
        Ok(note)
    }

    /// Approve a note and recompute every score straight away.
    ///
    /// A failed recomputation is logged; the approval stands and the next
    /// scheduled pass catches up.
    pub async fn approve_note(&self, session: &Session, id: NoteId) -> Result<Approval, PortalError> {
        self.require_admin(session).await?;
        let note = self.set_note_status(id, NoteStatus::Approved).await?;

        let recompute = match self.trigger.recompute_now().await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::error!("score recomputation after approval failed: {e:#}");
                None
            }
        };

        Ok(Approval { note, recompute })
    }

    /// Reject a note. The row and its file are kept.
    pub async fn reject_note(
        &self,
        session: &Session,
        id: NoteId,
    ) -> Result<CommunityNote, PortalError> {
        self.require_admin(session).await?;
        self.set_note_status(id, NoteStatus::Rejected).await
    }

    /// Delete a note and its hosted file.
    pub async fn delete_note(
        &self,
        session: &Session,
        id: NoteId,
    ) -> Result<CommunityNote, PortalError> {
        self.require_admin(session).await?;
        let note = self
            .store
            .get_note(id)
            .await?
            .ok_or(PortalError::NotFound("note"))?;

        match public_id_from_url(&note.file_url) {
            Some(public_id) => self.destroy_media(&public_id).await,
            None => tracing::warn!(url = %note.file_url, "no media id in note URL; file left on host"),
        }

        self.store.delete_note(id).await?;
        Ok(note)
    }
}
