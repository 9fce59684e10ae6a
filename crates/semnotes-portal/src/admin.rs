//! Announcements, portal switches and the admin dashboard.

use serde::Serialize;

use semnotes_core::analytics::{most_read_subject, stuck_topics, StuckTopic, SubjectPopularity};
use semnotes_core::model::{
    Announcement, AnnouncementId, AnnouncementKind, Paper, ProgressStatus, Subject,
    SystemSettings, User,
};

use crate::error::PortalError;
use crate::{Portal, Session};

/// How many stuck topics the dashboard lists.
pub const STUCK_TOPIC_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub most_read_subject: SubjectPopularity,
    pub stuck_topics: Vec<StuckTopic>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub current_user: User,
    pub is_main_admin: bool,
    pub subjects: Vec<Subject>,
    pub papers: Vec<Paper>,
    /// Newest first.
    pub announcements: Vec<Announcement>,
    pub settings: SystemSettings,
    pub analytics: Analytics,
}

impl Portal {
    pub async fn create_announcement(
        &self,
        session: &Session,
        message: &str,
        kind: AnnouncementKind,
    ) -> Result<Announcement, PortalError> {
        self.require_admin(session).await?;
        if message.trim().is_empty() {
            return Err(PortalError::MissingFields);
        }
        Ok(self
            .store
            .insert_announcement(Announcement::new(message, kind))
            .await?)
    }

    pub async fn delete_announcement(
        &self,
        session: &Session,
        id: AnnouncementId,
    ) -> Result<bool, PortalError> {
        self.require_admin(session).await?;
        Ok(self.store.delete_announcement(id).await?)
    }

    /// Flip whether students may sign in. Returns the new settings.
    pub async fn toggle_student_login(
        &self,
        session: &Session,
    ) -> Result<SystemSettings, PortalError> {
        let admin = self.require_admin(session).await?;
        let mut settings = self.store.get_settings().await?;
        settings.student_login_enabled = !settings.student_login_enabled;
        self.store.put_settings(settings).await?;

        tracing::info!(
            by = %admin.username,
            enabled = settings.student_login_enabled,
            "student login toggled"
        );
        Ok(settings)
    }

    /// Flip whether new accounts may register. Main admin only.
    ///
    /// Returns whether registration is now open.
    pub async fn toggle_registration(&self, session: &Session) -> Result<bool, PortalError> {
        let mut admin = self.require_admin(session).await?;
        if !self.is_main_admin(&admin).await? {
            return Err(PortalError::Forbidden("only the main admin can change registration"));
        }

        admin.registration_enabled = !admin.registration_enabled;
        self.store.update_user(&admin).await?;

        tracing::info!(enabled = admin.registration_enabled, "registration toggled");
        Ok(admin.registration_enabled)
    }

    /// Everything the admin home page shows, including usage analytics.
    pub async fn admin_dashboard(&self, session: &Session) -> Result<AdminDashboard, PortalError> {
        let current_user = self.require_admin(session).await?;
        let is_main_admin = self.is_main_admin(&current_user).await?;

        let subjects = self.store.list_subjects().await?;
        let topics = self.store.list_topics(None).await?;
        let read_rows = self
            .store
            .list_progress_with_status(ProgressStatus::Read)
            .await?;
        let revise_rows = self
            .store
            .list_progress_with_status(ProgressStatus::Revise)
            .await?;

        let analytics = Analytics {
            most_read_subject: most_read_subject(&read_rows, &topics, &subjects),
            stuck_topics: stuck_topics(&revise_rows, &topics, STUCK_TOPIC_LIMIT),
        };

        Ok(AdminDashboard {
            current_user,
            is_main_admin,
            papers: self.store.list_papers(None).await?,
            announcements: self.store.list_announcements().await?,
            settings: self.store.get_settings().await?,
            subjects,
            analytics,
        })
    }
}
