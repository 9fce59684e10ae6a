//! Core document types for semnotes.
//!
//! Every collection the portal persists has a type here. Identifiers are
//! generated UUIDs and timestamps are UTC.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type UserId = Uuid;
pub type SubjectId = Uuid;
pub type TopicId = Uuid;
pub type PaperId = Uuid;
pub type CommentId = Uuid;
pub type GoalId = Uuid;
pub type AnnouncementId = Uuid;
pub type NoteId = Uuid;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A student's self-reported mastery of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    #[default]
    Unread,
    Read,
    Revise,
}

impl ProgressStatus {
    /// Read and revise both count as having covered the topic.
    pub fn is_completed(self) -> bool {
        matches!(self, ProgressStatus::Read | ProgressStatus::Revise)
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressStatus::Unread => write!(f, "unread"),
            ProgressStatus::Read => write!(f, "read"),
            ProgressStatus::Revise => write!(f, "revise"),
        }
    }
}

impl FromStr for ProgressStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unread" => Ok(ProgressStatus::Unread),
            "read" => Ok(ProgressStatus::Read),
            "revise" => Ok(ProgressStatus::Revise),
            other => Err(format!("unknown progress status: {other}")),
        }
    }
}

/// Kind of question paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaperKind {
    Mid,
    #[default]
    End,
    Assignment,
    Other,
}

impl fmt::Display for PaperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperKind::Mid => write!(f, "mid"),
            PaperKind::End => write!(f, "end"),
            PaperKind::Assignment => write!(f, "assignment"),
            PaperKind::Other => write!(f, "other"),
        }
    }
}

impl FromStr for PaperKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mid" => Ok(PaperKind::Mid),
            "end" => Ok(PaperKind::End),
            "assignment" => Ok(PaperKind::Assignment),
            "other" => Ok(PaperKind::Other),
            other => Err(format!("unknown paper type: {other}")),
        }
    }
}

/// Severity of an announcement banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementKind {
    #[default]
    Info,
    Warning,
    Urgent,
}

impl FromStr for AnnouncementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(AnnouncementKind::Info),
            "warning" => Ok(AnnouncementKind::Warning),
            "urgent" => Ok(AnnouncementKind::Urgent),
            other => Err(format!("unknown announcement type: {other}")),
        }
    }
}

/// Moderation state of a community note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteStatus::Pending => write!(f, "pending"),
            NoteStatus::Approved => write!(f, "approved"),
            NoteStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// File type of an uploaded community note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoteFileType {
    #[default]
    Pdf,
    Image,
}

impl fmt::Display for NoteFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteFileType::Pdf => write!(f, "pdf"),
            NoteFileType::Image => write!(f, "image"),
        }
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// A portal account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    /// Stored lowercase; unique when present.
    #[serde(default)]
    pub email: Option<String>,
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    /// 1..=8; `None` for the setup admin.
    #[serde(default)]
    pub semester: Option<u8>,
    /// Cached leaderboard score, rewritten by the scoring engine.
    #[serde(default)]
    pub score: u64,
    #[serde(default = "default_true")]
    pub registration_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: &str, password_hash: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            email: None,
            username: username.trim().to_string(),
            password_hash,
            role,
            semester: None,
            score: 0,
            registration_enabled: true,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A file attached to a topic, stored on local disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Name on disk, e.g. `1700000000000-notes.pdf`.
    pub filename: String,
    /// Public path, e.g. `/uploads/1700000000000-notes.pdf`.
    pub path: String,
    pub original_name: String,
}

/// A unit of study content within a subject chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub subject: SubjectId,
    pub chapter: String,
    pub title: String,
    /// Rich-text HTML body.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
}

impl Topic {
    pub fn new(subject: SubjectId, chapter: &str, title: &str, content: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject,
            chapter: chapter.trim().to_string(),
            title: title.trim().to_string(),
            content: content.to_string(),
            attachments: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// A page image of a question paper, hosted on the media service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperImage {
    pub url: String,
    /// Deletion token on the media host.
    #[serde(default)]
    pub public_id: Option<String>,
}

/// A previous-year question paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: PaperId,
    pub subject: SubjectId,
    pub title: String,
    pub year: i32,
    #[serde(default)]
    pub kind: PaperKind,
    #[serde(default)]
    pub images: Vec<PaperImage>,
    pub created_at: DateTime<Utc>,
}

impl Paper {
    pub fn new(subject: SubjectId, title: &str, year: i32, kind: PaperKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject,
            title: title.trim().to_string(),
            year,
            kind,
            images: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// One row per (user, topic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub user: UserId,
    pub topic: TopicId,
    #[serde(default)]
    pub status: ProgressStatus,
    #[serde(default)]
    pub note: String,
    pub last_updated: DateTime<Utc>,
}

/// One row per (user, paper).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadLog {
    pub user: UserId,
    pub paper: PaperId,
    pub downloaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub topic: TopicId,
    pub user: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(topic: TopicId, user: UserId, body: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic,
            user,
            body: body.trim().to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A personal study goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub user: UserId,
    pub title: String,
    pub target_date: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(user: UserId, title: &str, target_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            title: title.trim().to_string(),
            target_date,
            completed: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub message: String,
    #[serde(default)]
    pub kind: AnnouncementKind,
    #[serde(default = "default_true")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    pub fn new(message: &str, kind: AnnouncementKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.trim().to_string(),
            kind,
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// A student-submitted file awaiting (or past) moderation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityNote {
    pub id: NoteId,
    pub subject: SubjectId,
    pub uploaded_by: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub file_url: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub file_type: NoteFileType,
    #[serde(default)]
    pub status: NoteStatus,
    pub created_at: DateTime<Utc>,
}

/// Portal-wide switches. A single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSettings {
    #[serde(default = "default_true")]
    pub student_login_enabled: bool,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            student_login_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_and_parse() {
        assert_eq!(ProgressStatus::Revise.to_string(), "revise");
        assert_eq!(
            "READ".parse::<ProgressStatus>().unwrap(),
            ProgressStatus::Read
        );
        assert!("done".parse::<ProgressStatus>().is_err());
    }

    #[test]
    fn only_read_and_revise_complete_a_topic() {
        assert!(!ProgressStatus::Unread.is_completed());
        assert!(ProgressStatus::Read.is_completed());
        assert!(ProgressStatus::Revise.is_completed());
    }

    #[test]
    fn paper_kind_defaults_to_end() {
        assert_eq!(PaperKind::default(), PaperKind::End);
        assert_eq!("assignment".parse::<PaperKind>().unwrap(), PaperKind::Assignment);
        assert!("quiz".parse::<PaperKind>().is_err());
    }

    #[test]
    fn user_defaults_when_fields_missing() {
        let json = serde_json::json!({
            "id": Uuid::nil(),
            "username": "alice@example.com",
            "password_hash": "x",
            "created_at": "2024-01-01T00:00:00Z"
        });
        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.score, 0);
        assert!(user.registration_enabled);
        assert!(user.email.is_none());
    }

    #[test]
    fn settings_default_allows_student_login() {
        assert!(SystemSettings::default().student_login_enabled);
    }
}
