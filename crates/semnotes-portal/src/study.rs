//! Per-student study tools: progress, dashboard, goals, comments and the
//! leaderboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use semnotes_core::leaderboard::Leaderboard;
use semnotes_core::model::{
    Announcement, Comment, CommentId, Goal, GoalId, Progress, ProgressStatus, Role, Subject,
    TopicId,
};
use semnotes_core::progress::{progress_by_subject, SubjectProgress};
use semnotes_core::traits::ProgressUpdate;

use crate::error::PortalError;
use crate::{Portal, Session};

/// Body of `POST /api/progress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRequest {
    pub topic_id: TopicId,
    #[serde(default)]
    pub status: Option<ProgressStatus>,
    /// Applied whenever present, including the empty string.
    #[serde(default)]
    pub note: Option<String>,
}

/// Reply of `POST /api/progress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
}

impl ProgressResponse {
    fn saved(progress: Progress) -> Self {
        Self {
            success: true,
            progress: Some(progress),
        }
    }

    fn failed() -> Self {
        Self {
            success: false,
            progress: None,
        }
    }
}

/// The home page.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub subjects: Vec<Subject>,
    /// One entry per subject when signed in, empty otherwise.
    pub progress: Vec<SubjectProgress>,
    /// Earliest target date first.
    pub goals: Vec<Goal>,
    /// Active announcements, newest first.
    pub announcements: Vec<Announcement>,
}

impl Portal {
    /// Save a student's status and/or note for a topic.
    ///
    /// Never fails outright: problems are logged and reported as
    /// `success: false`.
    pub async fn save_progress(&self, session: &Session, req: ProgressRequest) -> ProgressResponse {
        match self.try_save_progress(session, req).await {
            Ok(progress) => ProgressResponse::saved(progress),
            Err(e) => {
                tracing::warn!(user = %session.user_id, "progress not saved: {e}");
                ProgressResponse::failed()
            }
        }
    }

    async fn try_save_progress(
        &self,
        session: &Session,
        req: ProgressRequest,
    ) -> Result<Progress, PortalError> {
        let user = self.current_user(session).await?;
        self.get_topic(req.topic_id).await?;

        let upserted = self
            .store
            .upsert_progress(
                user.id,
                req.topic_id,
                ProgressUpdate {
                    status: req.status,
                    note: req.note,
                },
            )
            .await?;
        Ok(upserted.value)
    }

    /// Subjects, the viewer's progress per subject, goals and announcements.
    pub async fn dashboard(&self, session: Option<&Session>) -> Result<Dashboard, PortalError> {
        let subjects = self.store.list_subjects().await?;
        let announcements = self
            .store
            .list_announcements()
            .await?
            .into_iter()
            .filter(|a| a.active)
            .collect();

        let (progress, goals) = match session {
            Some(session) => {
                let user = self.current_user(session).await?;
                (
                    progress_by_subject(self.store.as_ref(), user.id, &subjects).await?,
                    self.store.list_goals(user.id).await?,
                )
            }
            None => (Vec::new(), Vec::new()),
        };

        Ok(Dashboard {
            subjects,
            progress,
            goals,
            announcements,
        })
    }

    // -- goals --------------------------------------------------------------

    pub async fn add_goal(
        &self,
        session: &Session,
        title: &str,
        target_date: NaiveDate,
    ) -> Result<Goal, PortalError> {
        let user = self.current_user(session).await?;
        if title.trim().is_empty() {
            return Err(PortalError::MissingFields);
        }
        Ok(self.store.insert_goal(Goal::new(user.id, title, target_date)).await?)
    }

    /// Flip a goal's completion. Goals of other users are left alone.
    pub async fn toggle_goal(
        &self,
        session: &Session,
        id: GoalId,
    ) -> Result<Option<Goal>, PortalError> {
        let Some(mut goal) = self.own_goal(session, id).await? else {
            return Ok(None);
        };
        goal.completed = !goal.completed;
        self.store.update_goal(&goal).await?;
        Ok(Some(goal))
    }

    /// Delete a goal. Goals of other users are left alone.
    pub async fn delete_goal(&self, session: &Session, id: GoalId) -> Result<bool, PortalError> {
        if self.own_goal(session, id).await?.is_none() {
            return Ok(false);
        }
        Ok(self.store.delete_goal(id).await?)
    }

    async fn own_goal(&self, session: &Session, id: GoalId) -> Result<Option<Goal>, PortalError> {
        Ok(self
            .store
            .get_goal(id)
            .await?
            .filter(|g| g.user == session.user_id))
    }

    // -- comments -----------------------------------------------------------

    pub async fn add_comment(
        &self,
        session: &Session,
        topic: TopicId,
        body: &str,
    ) -> Result<Comment, PortalError> {
        let user = self.current_user(session).await?;
        if body.trim().is_empty() {
            return Err(PortalError::MissingFields);
        }
        self.get_topic(topic).await?;
        Ok(self.store.insert_comment(Comment::new(topic, user.id, body)).await?)
    }

    /// Comments on a topic, oldest first.
    pub async fn comments(&self, topic: TopicId) -> Result<Vec<Comment>, PortalError> {
        Ok(self.store.list_comments(topic).await?)
    }

    /// Delete a comment. Only its author or an admin may.
    pub async fn delete_comment(&self, session: &Session, id: CommentId) -> Result<(), PortalError> {
        let user = self.current_user(session).await?;
        let comment = self
            .store
            .get_comment(id)
            .await?
            .ok_or(PortalError::NotFound("comment"))?;

        if comment.user != user.id && user.role != Role::Admin {
            return Err(PortalError::Forbidden("only the author or an admin can delete a comment"));
        }
        self.store.delete_comment(id).await?;
        Ok(())
    }

    // -- leaderboard --------------------------------------------------------

    /// Students ranked by their cached score.
    pub async fn leaderboard(&self, limit: Option<usize>) -> Result<Leaderboard, PortalError> {
        let students = self.store.list_users_by_role(Role::Student).await?;
        Ok(Leaderboard::rank(&students, limit))
    }
}
