//! Core trait definitions for the document store, the media host and
//! score recomputation.
//!
//! The store and media host are implemented by `semnotes-store`; the scoring
//! engine in this crate implements [`RecomputeTrigger`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::*;
use crate::scoring::RecomputeSummary;

// ---------------------------------------------------------------------------
// Upsert outcomes
// ---------------------------------------------------------------------------

/// Whether an upsert created a new row or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// The stored document after an upsert, plus what happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted<T> {
    pub outcome: UpsertOutcome,
    pub value: T,
}

/// Outcome of recording an idempotent marker such as a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    Recorded,
    AlreadyRecorded,
}

/// Fields to apply to a Progress row. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    #[serde(default)]
    pub status: Option<ProgressStatus>,
    #[serde(default)]
    pub note: Option<String>,
}

// ---------------------------------------------------------------------------
// Document store trait
// ---------------------------------------------------------------------------

/// Persistence for every portal collection.
///
/// Implementations enforce the uniqueness keys (username, email, subject
/// name, `user+topic` progress, `user+paper` downloads) and make each call
/// atomic on its own. Nothing spans more than one call.
#[async_trait]
pub trait Store: Send + Sync {
    // -- users --------------------------------------------------------------

    /// Insert a user. Rejects a taken username or email.
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Exact username match.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Match either the email or the username.
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;

    /// Replace a stored user. Uniqueness is re-checked against other users.
    async fn update_user(&self, user: &User) -> Result<(), StoreError>;

    async fn count_users(&self) -> Result<usize, StoreError>;

    /// Users with the given role, oldest first.
    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, StoreError>;

    /// Overwrite the cached leaderboard score.
    async fn set_score(&self, id: UserId, score: u64) -> Result<(), StoreError>;

    /// Overwrite several cached scores in one write. Ids with no matching
    /// user are skipped; returns how many users were updated.
    async fn set_scores(&self, scores: &[(UserId, u64)]) -> Result<usize, StoreError>;

    // -- subjects -----------------------------------------------------------

    /// Insert a subject. Rejects a taken name.
    async fn insert_subject(&self, subject: Subject) -> Result<Subject, StoreError>;

    async fn get_subject(&self, id: SubjectId) -> Result<Option<Subject>, StoreError>;

    /// All subjects sorted by name.
    async fn list_subjects(&self) -> Result<Vec<Subject>, StoreError>;

    async fn delete_subject(&self, id: SubjectId) -> Result<Option<Subject>, StoreError>;

    // -- topics -------------------------------------------------------------

    async fn insert_topic(&self, topic: Topic) -> Result<Topic, StoreError>;

    async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, StoreError>;

    /// Topics of one subject (or all when `None`), oldest first.
    async fn list_topics(&self, subject: Option<SubjectId>) -> Result<Vec<Topic>, StoreError>;

    async fn delete_topic(&self, id: TopicId) -> Result<Option<Topic>, StoreError>;

    // -- papers -------------------------------------------------------------

    async fn insert_paper(&self, paper: Paper) -> Result<Paper, StoreError>;

    async fn get_paper(&self, id: PaperId) -> Result<Option<Paper>, StoreError>;

    /// Papers of one subject (or all when `None`), newest year first.
    async fn list_papers(&self, subject: Option<SubjectId>) -> Result<Vec<Paper>, StoreError>;

    async fn delete_paper(&self, id: PaperId) -> Result<Option<Paper>, StoreError>;

    // -- progress -----------------------------------------------------------

    /// Create the (user, topic) row if absent, else update it in place.
    async fn upsert_progress(
        &self,
        user: UserId,
        topic: TopicId,
        update: ProgressUpdate,
    ) -> Result<Upserted<Progress>, StoreError>;

    async fn get_progress(
        &self,
        user: UserId,
        topic: TopicId,
    ) -> Result<Option<Progress>, StoreError>;

    async fn list_progress(&self, user: UserId) -> Result<Vec<Progress>, StoreError>;

    /// Every user's rows with the given status.
    async fn list_progress_with_status(
        &self,
        status: ProgressStatus,
    ) -> Result<Vec<Progress>, StoreError>;

    async fn count_progress(
        &self,
        user: UserId,
        status: ProgressStatus,
    ) -> Result<u64, StoreError>;

    // -- downloads ----------------------------------------------------------

    /// Record that `user` downloaded `paper`. Idempotent per pair.
    async fn record_download(
        &self,
        user: UserId,
        paper: PaperId,
    ) -> Result<RecordOutcome, StoreError>;

    async fn count_downloads(&self, user: UserId) -> Result<u64, StoreError>;

    // -- comments -----------------------------------------------------------

    async fn insert_comment(&self, comment: Comment) -> Result<Comment, StoreError>;

    async fn get_comment(&self, id: CommentId) -> Result<Option<Comment>, StoreError>;

    /// Comments on a topic, oldest first.
    async fn list_comments(&self, topic: TopicId) -> Result<Vec<Comment>, StoreError>;

    async fn delete_comment(&self, id: CommentId) -> Result<bool, StoreError>;

    async fn count_comments(&self, user: UserId) -> Result<u64, StoreError>;

    // -- goals --------------------------------------------------------------

    async fn insert_goal(&self, goal: Goal) -> Result<Goal, StoreError>;

    async fn get_goal(&self, id: GoalId) -> Result<Option<Goal>, StoreError>;

    /// Goals of a user, earliest target date first.
    async fn list_goals(&self, user: UserId) -> Result<Vec<Goal>, StoreError>;

    async fn update_goal(&self, goal: &Goal) -> Result<(), StoreError>;

    async fn delete_goal(&self, id: GoalId) -> Result<bool, StoreError>;

    // -- announcements ------------------------------------------------------

    async fn insert_announcement(
        &self,
        announcement: Announcement,
    ) -> Result<Announcement, StoreError>;

    /// All announcements, newest first.
    async fn list_announcements(&self) -> Result<Vec<Announcement>, StoreError>;

    async fn delete_announcement(&self, id: AnnouncementId) -> Result<bool, StoreError>;

    // -- community notes ----------------------------------------------------

    async fn insert_note(&self, note: CommunityNote) -> Result<CommunityNote, StoreError>;

    async fn get_note(&self, id: NoteId) -> Result<Option<CommunityNote>, StoreError>;

    async fn update_note(&self, note: &CommunityNote) -> Result<(), StoreError>;

    /// Notes filtered by status (all when `None`), newest first.
    async fn list_notes(
        &self,
        status: Option<NoteStatus>,
    ) -> Result<Vec<CommunityNote>, StoreError>;

    async fn delete_note(&self, id: NoteId) -> Result<Option<CommunityNote>, StoreError>;

    // -- settings -----------------------------------------------------------

    /// The settings document, or defaults when none was saved yet.
    async fn get_settings(&self) -> Result<SystemSettings, StoreError>;

    async fn put_settings(&self, settings: SystemSettings) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Media host trait
// ---------------------------------------------------------------------------

/// Third-party host for question-paper images and community notes.
///
/// Uploads happen before the portal sees a file; the portal only keeps the
/// URL and deletion token, and asks the host to destroy the asset when the
/// owning document is deleted.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Human-readable host name (e.g. "cloudinary").
    fn name(&self) -> &str;

    /// Delete a hosted asset by its public id.
    async fn destroy(&self, public_id: &str) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Score recomputation trigger
// ---------------------------------------------------------------------------

/// "Recompute now" hook shared by the timer and event-driven callers.
#[async_trait]
pub trait RecomputeTrigger: Send + Sync {
    async fn recompute_now(&self) -> anyhow::Result<RecomputeSummary>;
}

// ---------------------------------------------------------------------------
// Hosted URL helpers
// ---------------------------------------------------------------------------

/// Extract the media-host public id from a delivery URL.
///
/// `https://host/<cloud>/image/upload/v1712/notes/abc.pdf` → `notes/abc`.
/// Returns `None` when the URL has no `/upload/` segment or no extension.
pub fn public_id_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/upload/")?;
    let rest = match rest.split_once('/') {
        Some((version, tail))
            if version.len() > 1
                && version.starts_with('v')
                && version[1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            tail
        }
        _ => rest,
    };

    let (stem, ext) = rest.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_id_strips_version_and_extension() {
        let url = "https://res.example.com/demo/image/upload/v1712345/notes/abc_def.pdf";
        assert_eq!(public_id_from_url(url).as_deref(), Some("notes/abc_def"));
    }

    #[test]
    fn public_id_without_version() {
        let url = "https://res.example.com/demo/image/upload/papers/os-2023.jpg";
        assert_eq!(public_id_from_url(url).as_deref(), Some("papers/os-2023"));
    }

    #[test]
    fn public_id_keeps_inner_dots() {
        let url = "https://res.example.com/demo/raw/upload/v1/a/b.c.png";
        assert_eq!(public_id_from_url(url).as_deref(), Some("a/b.c"));
    }

    #[test]
    fn public_id_rejects_urls_without_upload_segment() {
        assert_eq!(public_id_from_url("https://example.com/files/a.pdf"), None);
    }

    #[test]
    fn public_id_rejects_missing_extension() {
        assert_eq!(
            public_id_from_url("https://res.example.com/demo/image/upload/v1/notes/abc"),
            None
        );
    }

    #[test]
    fn progress_update_defaults_to_no_change() {
        let update: ProgressUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.status.is_none());
        assert!(update.note.is_none());
    }
}
