//! In-process document store with an optional JSON snapshot on disk.
//!
//! Each trait call is atomic on its own and nothing spans calls. A store
//! opened on a path shares that snapshot with every other process that opens
//! it: calls take an advisory lock on `<path>.lock`, reload the snapshot when
//! another handle has written since, and mutations write back before the
//! lock is released. The lock file holds a generation counter that is bumped
//! on every write.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use semnotes_core::model::*;
use semnotes_core::traits::{ProgressUpdate, RecordOutcome, Store, UpsertOutcome, Upserted};
use semnotes_core::StoreError;

use crate::snapshot;

/// Every persisted collection.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Collections {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    subjects: Vec<Subject>,
    #[serde(default)]
    topics: Vec<Topic>,
    #[serde(default)]
    papers: Vec<Paper>,
    #[serde(default)]
    progress: Vec<Progress>,
    #[serde(default)]
    downloads: Vec<DownloadLog>,
    #[serde(default)]
    comments: Vec<Comment>,
    #[serde(default)]
    goals: Vec<Goal>,
    #[serde(default)]
    announcements: Vec<Announcement>,
    #[serde(default)]
    notes: Vec<CommunityNote>,
    #[serde(default)]
    settings: Option<SystemSettings>,
}

impl Collections {
    fn check_user_unique(&self, user: &User) -> Result<(), StoreError> {
        for other in self.users.iter().filter(|u| u.id != user.id) {
            if other.username == user.username {
                return Err(StoreError::duplicate("users", &user.username));
            }
            if let (Some(a), Some(b)) = (&other.email, &user.email) {
                if a == b {
                    return Err(StoreError::duplicate("users", b));
                }
            }
        }
        Ok(())
    }
}

/// The snapshot file and the lock file guarding it.
#[derive(Debug)]
struct Disk {
    snapshot: PathBuf,
    lock: File,
}

impl Disk {
    fn open(snapshot: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = snapshot.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut lock_path = snapshot.clone().into_os_string();
        lock_path.push(".lock");
        let lock = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        Ok(Self { snapshot, lock })
    }

    /// The generation written by the last successful save. A fresh lock
    /// file reads as zero.
    fn generation(&self) -> Result<u64, StoreError> {
        let mut file = &self.lock;
        file.seek(SeekFrom::Start(0))?;
        let mut text = String::new();
        file.read_to_string(&mut text)?;
        Ok(text.trim().parse().unwrap_or(0))
    }

    fn set_generation(&self, generation: u64) -> Result<(), StoreError> {
        let mut file = &self.lock;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        write!(file, "{generation}")?;
        Ok(())
    }

    /// Take the lock and return the on-disk generation along with the
    /// snapshot, which is only loaded when `cached` is stale.
    fn acquire(
        self: Arc<Self>,
        exclusive: bool,
        cached: Option<u64>,
    ) -> Result<(LockGuard, u64, Option<Collections>), StoreError> {
        if exclusive {
            self.lock.lock()?;
        } else {
            self.lock.lock_shared()?;
        }
        let guard = LockGuard(self);
        let generation = guard.0.generation()?;
        let fresh = if cached == Some(generation) {
            None
        } else {
            Some(snapshot::load(&guard.0.snapshot)?.unwrap_or_default())
        };
        Ok((guard, generation, fresh))
    }
}

/// Holds the advisory lock until dropped.
struct LockGuard(Arc<Disk>);

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.lock.unlock() {
            let path = self.0.snapshot.display();
            tracing::warn!(path = %path, error = %e, "failed to release store lock");
        }
    }
}

/// What this handle last saw.
#[derive(Debug, Default)]
struct State {
    /// `None` forces a reload on the next call.
    generation: Option<u64>,
    data: Collections,
}

/// A [`Store`] backed by memory and, optionally, a JSON file shared with
/// other handles.
pub struct DocumentStore {
    disk: Option<Arc<Disk>>,
    state: Mutex<State>,
}

async fn blocking<R, F>(f: F) -> Result<R, StoreError>
where
    F: FnOnce() -> Result<R, StoreError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
}

impl DocumentStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            disk: None,
            state: Mutex::new(State {
                generation: Some(0),
                data: Collections::default(),
            }),
        }
    }

    /// Open (or create on first write) a store snapshotted at `path`.
    ///
    /// Creates the parent directory and the lock file, and fails early on a
    /// snapshot that cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let disk = Arc::new(Disk::open(path.as_ref().to_path_buf())?);
        let (guard, generation, data) = disk.clone().acquire(false, None)?;
        drop(guard);
        let data = data.unwrap_or_default();
        tracing::debug!(
            path = %disk.snapshot.display(),
            generation,
            users = data.users.len(),
            subjects = data.subjects.len(),
            "document store opened"
        );
        Ok(Self {
            disk: Some(disk),
            state: Mutex::new(State {
                generation: Some(generation),
                data,
            }),
        })
    }

    /// The snapshot path, if this store persists.
    pub fn path(&self) -> Option<&Path> {
        self.disk.as_deref().map(|d| d.snapshot.as_path())
    }

    async fn read<R>(&self, f: impl FnOnce(&Collections) -> R) -> Result<R, StoreError> {
        let mut state = self.state.lock().await;
        if let Some(disk) = &self.disk {
            let disk = disk.clone();
            let cached = state.generation;
            let (guard, generation, fresh) =
                blocking(move || disk.acquire(false, cached)).await?;
            drop(guard);
            if let Some(data) = fresh {
                tracing::debug!(generation, "reloaded store snapshot");
                state.data = data;
            }
            state.generation = Some(generation);
        }
        Ok(f(&state.data))
    }

    /// Apply `f` to a copy of the latest data, persist the copy, then make
    /// it current.
    ///
    /// If `f` or the snapshot write fails, neither memory nor disk changes.
    async fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Collections) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut state = self.state.lock().await;
        let Some(disk) = &self.disk else {
            let mut next = state.data.clone();
            let out = f(&mut next)?;
            state.data = next;
            return Ok(out);
        };

        let cached = state.generation;
        let locked = disk.clone();
        let (guard, generation, fresh) = blocking(move || locked.acquire(true, cached)).await?;
        if let Some(data) = fresh {
            tracing::debug!(generation, "reloaded store snapshot");
            state.data = data;
        }
        state.generation = Some(generation);

        let mut next = state.data.clone();
        let out = f(&mut next)?;

        let next_generation = generation + 1;
        let saved = blocking(move || {
            let disk = &guard.0;
            snapshot::save(&disk.snapshot, &next)?;
            if let Err(e) = disk.set_generation(next_generation) {
                return Ok((next, Some(e)));
            }
            Ok((next, None))
        })
        .await?;

        match saved {
            (next, None) => {
                state.data = next;
                state.generation = Some(next_generation);
                Ok(out)
            }
            // The snapshot landed but other handles cannot tell; reload next time.
            (_, Some(e)) => {
                state.generation = None;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl Store for DocumentStore {
    // -- users --------------------------------------------------------------

    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        self.mutate(|c| {
            c.check_user_unique(&user)?;
            c.users.push(user.clone());
            Ok(user)
        })
        .await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.read(|c| c.users.iter().find(|u| u.id == id).cloned()).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.read(|c| c.users.iter().find(|u| u.username == username).cloned()).await
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        self.read(|c| {
            c.users
                .iter()
                .find(|u| u.email.as_deref() == Some(login) || u.username == login)
                .cloned()
        })
        .await
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        self.mutate(|c| {
            c.check_user_unique(user)?;
            let slot = c
                .users
                .iter_mut()
                .find(|u| u.id == user.id)
                .ok_or_else(|| StoreError::not_found("users", user.id))?;
            *slot = user.clone();
            Ok(())
        })
        .await
    }

    async fn count_users(&self) -> Result<usize, StoreError> {
        self.read(|c| c.users.len()).await
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        self.read(|c| {
            let mut users: Vec<User> = c.users.iter().filter(|u| u.role == role).cloned().collect();
            users.sort_by_key(|u| u.created_at);
            users
        })
        .await
    }

    async fn set_score(&self, id: UserId, score: u64) -> Result<(), StoreError> {
        self.mutate(|c| {
            let user = c
                .users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or_else(|| StoreError::not_found("users", id))?;
            user.score = score;
            Ok(())
        })
        .await
    }

    async fn set_scores(&self, scores: &[(UserId, u64)]) -> Result<usize, StoreError> {
        if scores.is_empty() {
            return Ok(0);
        }
        self.mutate(|c| {
            let mut written = 0;
            for user in c.users.iter_mut() {
                if let Some((_, score)) = scores.iter().find(|(id, _)| *id == user.id) {
                    user.score = *score;
                    written += 1;
                }
            }
            Ok(written)
        })
        .await
    }

    // -- subjects -----------------------------------------------------------

    async fn insert_subject(&self, subject: Subject) -> Result<Subject, StoreError> {
        self.mutate(|c| {
            if c.subjects.iter().any(|s| s.name == subject.name) {
                return Err(StoreError::duplicate("subjects", &subject.name));
            }
            c.subjects.push(subject.clone());
            Ok(subject)
        })
        .await
    }

    async fn get_subject(&self, id: SubjectId) -> Result<Option<Subject>, StoreError> {
        self.read(|c| c.subjects.iter().find(|s| s.id == id).cloned()).await
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, StoreError> {
        self.read(|c| {
            let mut subjects = c.subjects.clone();
            subjects.sort_by(|a, b| a.name.cmp(&b.name));
            subjects
        })
        .await
    }

    async fn delete_subject(&self, id: SubjectId) -> Result<Option<Subject>, StoreError> {
        self.mutate(|c| Ok(take_where(&mut c.subjects, |s| s.id == id))).await
    }

    // -- topics -------------------------------------------------------------

    async fn insert_topic(&self, topic: Topic) -> Result<Topic, StoreError> {
        self.mutate(|c| {
            c.topics.push(topic.clone());
            Ok(topic)
        })
        .await
    }

    async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, StoreError> {
        self.read(|c| c.topics.iter().find(|t| t.id == id).cloned()).await
    }

    async fn list_topics(&self, subject: Option<SubjectId>) -> Result<Vec<Topic>, StoreError> {
        self.read(|c| {
            c.topics
                .iter()
                .filter(|t| subject.map_or(true, |s| t.subject == s))
                .cloned()
                .collect()
        })
        .await
    }

    async fn delete_topic(&self, id: TopicId) -> Result<Option<Topic>, StoreError> {
        self.mutate(|c| Ok(take_where(&mut c.topics, |t| t.id == id))).await
    }

    // -- papers -------------------------------------------------------------

    async fn insert_paper(&self, paper: Paper) -> Result<Paper, StoreError> {
        self.mutate(|c| {
            c.papers.push(paper.clone());
            Ok(paper)
        })
        .await
    }

    async fn get_paper(&self, id: PaperId) -> Result<Option<Paper>, StoreError> {
        self.read(|c| c.papers.iter().find(|p| p.id == id).cloned()).await
    }

    async fn list_papers(&self, subject: Option<SubjectId>) -> Result<Vec<Paper>, StoreError> {
        self.read(|c| {
            let mut papers: Vec<Paper> = c
                .papers
                .iter()
                .filter(|p| subject.map_or(true, |s| p.subject == s))
                .cloned()
                .collect();
            papers.sort_by(|a, b| b.year.cmp(&a.year));
            papers
        })
        .await
    }

    async fn delete_paper(&self, id: PaperId) -> Result<Option<Paper>, StoreError> {
        self.mutate(|c| Ok(take_where(&mut c.papers, |p| p.id == id))).await
    }

    // -- progress -----------------------------------------------------------

    async fn upsert_progress(
        &self,
        user: UserId,
        topic: TopicId,
        update: ProgressUpdate,
    ) -> Result<Upserted<Progress>, StoreError> {
        self.mutate(|c| {
            let now = Utc::now();
            if let Some(row) = c
                .progress
                .iter_mut()
                .find(|p| p.user == user && p.topic == topic)
            {
                if let Some(status) = update.status {
                    row.status = status;
                }
                if let Some(note) = update.note {
                    row.note = note;
                }
                row.last_updated = now;
                return Ok(Upserted {
                    outcome: UpsertOutcome::Updated,
                    value: row.clone(),
                });
            }

            let row = Progress {
                user,
                topic,
                status: update.status.unwrap_or_default(),
                note: update.note.unwrap_or_default(),
                last_updated: now,
            };
            c.progress.push(row.clone());
            Ok(Upserted {
                outcome: UpsertOutcome::Created,
                value: row,
            })
        })
        .await
    }

    async fn get_progress(
        &self,
        user: UserId,
        topic: TopicId,
    ) -> Result<Option<Progress>, StoreError> {
        self.read(|c| {
            c.progress
                .iter()
                .find(|p| p.user == user && p.topic == topic)
                .cloned()
        })
        .await
    }

    async fn list_progress(&self, user: UserId) -> Result<Vec<Progress>, StoreError> {
        self.read(|c| c.progress.iter().filter(|p| p.user == user).cloned().collect()).await
    }

    async fn list_progress_with_status(
        &self,
        status: ProgressStatus,
    ) -> Result<Vec<Progress>, StoreError> {
        self.read(|c| {
            c.progress
                .iter()
                .filter(|p| p.status == status)
                .cloned()
                .collect()
        })
        .await
    }

    async fn count_progress(
        &self,
        user: UserId,
        status: ProgressStatus,
    ) -> Result<u64, StoreError> {
        self.read(|c| {
            c.progress
                .iter()
                .filter(|p| p.user == user && p.status == status)
                .count() as u64
        })
        .await
    }

    // -- downloads ----------------------------------------------------------

    async fn record_download(
        &self,
        user: UserId,
        paper: PaperId,
    ) -> Result<RecordOutcome, StoreError> {
        self.mutate(|c| {
            if c.downloads.iter().any(|d| d.user == user && d.paper == paper) {
                return Ok(RecordOutcome::AlreadyRecorded);
            }
            c.downloads.push(DownloadLog {
                user,
                paper,
                downloaded_at: Utc::now(),
            });
            Ok(RecordOutcome::Recorded)
        })
        .await
    }

    async fn count_downloads(&self, user: UserId) -> Result<u64, StoreError> {
        self.read(|c| c.downloads.iter().filter(|d| d.user == user).count() as u64).await
    }

    // -- comments -----------------------------------------------------------

    async fn insert_comment(&self, comment: Comment) -> Result<Comment, StoreError> {
        self.mutate(|c| {
            c.comments.push(comment.clone());
            Ok(comment)
        })
        .await
    }

    async fn get_comment(&self, id: CommentId) -> Result<Option<Comment>, StoreError> {
        self.read(|c| c.comments.iter().find(|m| m.id == id).cloned()).await
    }

    async fn list_comments(&self, topic: TopicId) -> Result<Vec<Comment>, StoreError> {
        self.read(|c| {
            let mut comments: Vec<Comment> = c
                .comments
                .iter()
                .filter(|m| m.topic == topic)
                .cloned()
                .collect();
            comments.sort_by_key(|m| m.created_at);
            comments
        })
        .await
    }

    async fn delete_comment(&self, id: CommentId) -> Result<bool, StoreError> {
        self.mutate(|c| Ok(take_where(&mut c.comments, |m| m.id == id).is_some())).await
    }

    async fn count_comments(&self, user: UserId) -> Result<u64, StoreError> {
        self.read(|c| c.comments.iter().filter(|m| m.user == user).count() as u64).await
    }

    // -- goals --------------------------------------------------------------

    async fn insert_goal(&self, goal: Goal) -> Result<Goal, StoreError> {
        self.mutate(|c| {
            c.goals.push(goal.clone());
            Ok(goal)
        })
        .await
    }

    async fn get_goal(&self, id: GoalId) -> Result<Option<Goal>, StoreError> {
        self.read(|c| c.goals.iter().find(|g| g.id == id).cloned()).await
    }

    async fn list_goals(&self, user: UserId) -> Result<Vec<Goal>, StoreError> {
        self.read(|c| {
            let mut goals: Vec<Goal> = c.goals.iter().filter(|g| g.user == user).cloned().collect();
            goals.sort_by_key(|g| g.target_date);
            goals
        })
        .await
    }

    async fn update_goal(&self, goal: &Goal) -> Result<(), StoreError> {
        self.mutate(|c| {
            let slot = c
                .goals
                .iter_mut()
                .find(|g| g.id == goal.id)
                .ok_or_else(|| StoreError::not_found("goals", goal.id))?;
            *slot = goal.clone();
            Ok(())
        })
        .await
    }

    async fn delete_goal(&self, id: GoalId) -> Result<bool, StoreError> {
        self.mutate(|c| Ok(take_where(&mut c.goals, |g| g.id == id).is_some())).await
    }

    // -- announcements ------------------------------------------------------

    async fn insert_announcement(
        &self,
        announcement: Announcement,
    ) -> Result<Announcement, StoreError> {
        self.mutate(|c| {
            c.announcements.push(announcement.clone());
            Ok(announcement)
        })
        .await
    }

    async fn list_announcements(&self) -> Result<Vec<Announcement>, StoreError> {
        self.read(|c| c.announcements.iter().rev().cloned().collect()).await
    }

    async fn delete_announcement(&self, id: AnnouncementId) -> Result<bool, StoreError> {
        self.mutate(|c| Ok(take_where(&mut c.announcements, |a| a.id == id).is_some())).await
    }

    // -- community notes ----------------------------------------------------

    async fn insert_note(&self, note: CommunityNote) -> Result<CommunityNote, StoreError> {
        self.mutate(|c| {
            c.notes.push(note.clone());
            Ok(note)
        })
        .await
    }

    async fn get_note(&self, id: NoteId) -> Result<Option<CommunityNote>, StoreError> {
        self.read(|c| c.notes.iter().find(|n| n.id == id).cloned()).await
    }

    async fn update_note(&self, note: &CommunityNote) -> Result<(), StoreError> {
        self.mutate(|c| {
            let slot = c
                .notes
                .iter_mut()
                .find(|n| n.id == note.id)
                .ok_or_else(|| StoreError::not_found("notes", note.id))?;
            *slot = note.clone();
            Ok(())
        })
        .await
    }

    async fn list_notes(
        &self,
        status: Option<NoteStatus>,
    ) -> Result<Vec<CommunityNote>, StoreError> {
        self.read(|c| {
            c.notes
                .iter()
                .rev()
                .filter(|n| status.map_or(true, |s| n.status == s))
                .cloned()
                .collect()
        })
        .await
    }

    async fn delete_note(&self, id: NoteId) -> Result<Option<CommunityNote>, StoreError> {
        self.mutate(|c| Ok(take_where(&mut c.notes, |n| n.id == id))).await
    }

    // -- settings -----------------------------------------------------------

    async fn get_settings(&self) -> Result<SystemSettings, StoreError> {
        self.read(|c| c.settings.unwrap_or_default()).await
    }

    async fn put_settings(&self, settings: SystemSettings) -> Result<(), StoreError> {
        self.mutate(|c| {
            c.settings = Some(settings);
            Ok(())
        })
        .await
    }
}

/// Remove and return the first element matching `pred`.
fn take_where<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> Option<T> {
    let idx = items.iter().position(pred)?;
    Some(items.remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn student(email: &str) -> User {
        let mut u = User::new(email, "hash".into(), Role::Student);
        u.email = Some(email.to_string());
        u
    }

    #[tokio::test]
    async fn username_and_email_are_unique() {
        let store = DocumentStore::in_memory();
        store.insert_user(student("a@example.com")).await.unwrap();

        let err = store
            .insert_user(student("a@example.com"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());

        let mut other = User::new("someone", "hash".into(), Role::Student);
        other.email = Some("a@example.com".into());
        assert!(store.insert_user(other).await.unwrap_err().is_duplicate());
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn login_matches_email_or_username() {
        let store = DocumentStore::in_memory();
        let admin = store
            .insert_user(User::new("admin", "hash".into(), Role::Admin))
            .await
            .unwrap();
        let alice = store.insert_user(student("alice@example.com")).await.unwrap();

        let found = store.find_user_by_login("admin").await.unwrap().unwrap();
        assert_eq!(found.id, admin.id);
        let found = store
            .find_user_by_login("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, alice.id);
        assert!(store.find_user_by_login("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_user_rechecks_uniqueness() {
        let store = DocumentStore::in_memory();
        store.insert_user(student("a@example.com")).await.unwrap();
        let mut b = store.insert_user(student("b@example.com")).await.unwrap();

        b.email = Some("a@example.com".into());
        assert!(store.update_user(&b).await.unwrap_err().is_duplicate());

        b.email = Some("b@example.com".into());
        b.semester = Some(5);
        store.update_user(&b).await.unwrap();
        assert_eq!(store.get_user(b.id).await.unwrap().unwrap().semester, Some(5));
    }

    #[tokio::test]
    async fn set_score_on_missing_user_is_not_found() {
        let store = DocumentStore::in_memory();
        let err = store.set_score(uuid::Uuid::new_v4(), 3).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn set_scores_skips_missing_users() {
        let store = DocumentStore::in_memory();
        let a = store.insert_user(student("a@example.com")).await.unwrap();
        let b = store.insert_user(student("b@example.com")).await.unwrap();

        let written = store
            .set_scores(&[(a.id, 7), (uuid::Uuid::new_v4(), 3), (b.id, 2)])
            .await
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(store.get_user(a.id).await.unwrap().unwrap().score, 7);
        assert_eq!(store.get_user(b.id).await.unwrap().unwrap().score, 2);
    }

    #[tokio::test]
    async fn lock_file_tracks_generation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = DocumentStore::open(&path).unwrap();
        store.insert_subject(Subject::new("Maths", "")).await.unwrap();
        store.insert_subject(Subject::new("Physics", "")).await.unwrap();

        let lock = std::fs::read_to_string(dir.path().join("store.json.lock")).unwrap();
        assert_eq!(lock, "2");
    }

    #[tokio::test]
    async fn subject_names_are_unique_and_sorted() {
        let store = DocumentStore::in_memory();
        store.insert_subject(Subject::new("Physics", "")).await.unwrap();
        store.insert_subject(Subject::new("Chemistry", "")).await.unwrap();
        assert!(store
            .insert_subject(Subject::new("Physics", "again"))
            .await
            .unwrap_err()
            .is_duplicate());

        let names: Vec<String> = store
            .list_subjects()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Chemistry", "Physics"]);
    }

    #[tokio::test]
    async fn progress_upsert_never_duplicates() {
        let store = DocumentStore::in_memory();
        let user = uuid::Uuid::new_v4();
        let topic = uuid::Uuid::new_v4();

        let first = store
            .upsert_progress(
                user,
                topic,
                ProgressUpdate {
                    status: Some(ProgressStatus::Read),
                    note: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(first.outcome, UpsertOutcome::Created);

        let second = store
            .upsert_progress(
                user,
                topic,
                ProgressUpdate {
                    status: None,
                    note: Some("check example 4".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(second.outcome, UpsertOutcome::Updated);
        assert_eq!(second.value.status, ProgressStatus::Read);
        assert_eq!(second.value.note, "check example 4");

        assert_eq!(store.list_progress(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_download_is_already_recorded() {
        let store = DocumentStore::in_memory();
        let user = uuid::Uuid::new_v4();
        let paper = uuid::Uuid::new_v4();

        assert_eq!(
            store.record_download(user, paper).await.unwrap(),
            RecordOutcome::Recorded
        );
        assert_eq!(
            store.record_download(user, paper).await.unwrap(),
            RecordOutcome::AlreadyRecorded
        );
        assert_eq!(store.count_downloads(user).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn papers_sorted_newest_year_first() {
        let store = DocumentStore::in_memory();
        let subject = uuid::Uuid::new_v4();
        for year in [2019, 2023, 2021] {
            store
                .insert_paper(Paper::new(subject, "End Sem", year, PaperKind::End))
                .await
                .unwrap();
        }
        store
            .insert_paper(Paper::new(uuid::Uuid::new_v4(), "Other", 2030, PaperKind::Mid))
            .await
            .unwrap();

        let years: Vec<i32> = store
            .list_papers(Some(subject))
            .await
            .unwrap()
            .iter()
            .map(|p| p.year)
            .collect();
        assert_eq!(years, [2023, 2021, 2019]);
    }

    #[tokio::test]
    async fn goals_sorted_by_target_date() {
        let store = DocumentStore::in_memory();
        let user = uuid::Uuid::new_v4();
        let late = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let soon = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        store.insert_goal(Goal::new(user, "Finish DBMS", late)).await.unwrap();
        store.insert_goal(Goal::new(user, "Revise OS", soon)).await.unwrap();

        let goals = store.list_goals(user).await.unwrap();
        assert_eq!(goals[0].title, "Revise OS");
    }

    #[tokio::test]
    async fn notes_filtered_by_status_newest_first() {
        let store = DocumentStore::in_memory();
        let subject = uuid::Uuid::new_v4();
        let uploader = uuid::Uuid::new_v4();
        for title in ["first", "second", "third"] {
            store
                .insert_note(CommunityNote {
                    id: uuid::Uuid::new_v4(),
                    subject,
                    uploaded_by: uploader,
                    title: title.into(),
                    description: String::new(),
                    file_url: "https://example.com/a.pdf".into(),
                    original_name: None,
                    file_type: NoteFileType::Pdf,
                    status: NoteStatus::Pending,
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }
        let mut second = store.list_notes(None).await.unwrap()[1].clone();
        second.status = NoteStatus::Approved;
        store.update_note(&second).await.unwrap();

        let pending: Vec<String> = store
            .list_notes(Some(NoteStatus::Pending))
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(pending, ["third", "first"]);
    }

    #[tokio::test]
    async fn settings_default_until_saved() {
        let store = DocumentStore::in_memory();
        assert!(store.get_settings().await.unwrap().student_login_enabled);

        store
            .put_settings(SystemSettings {
                student_login_enabled: false,
            })
            .await
            .unwrap();
        assert!(!store.get_settings().await.unwrap().student_login_enabled);
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let id = {
            let store = DocumentStore::open(&path).unwrap();
            let subject = store.insert_subject(Subject::new("Maths", "")).await.unwrap();
            store
                .insert_topic(Topic::new(subject.id, "Algebra", "Groups", ""))
                .await
                .unwrap();
            subject.id
        };

        let reopened = DocumentStore::open(&path).unwrap();
        assert_eq!(reopened.path(), Some(path.as_path()));
        assert_eq!(reopened.get_subject(id).await.unwrap().unwrap().name, "Maths");
        assert_eq!(reopened.list_topics(Some(id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_mutation_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = DocumentStore::open(&path).unwrap();
        store.insert_subject(Subject::new("Maths", "")).await.unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        assert!(store.insert_subject(Subject::new("Maths", "")).await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }
}
