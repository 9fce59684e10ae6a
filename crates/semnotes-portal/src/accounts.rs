//! Registration, login and account settings.

use serde::{Deserialize, Serialize};

use semnotes_core::model::{Role, User};

use crate::error::PortalError;
use crate::password::{hash_password_off_thread, verify_password_off_thread};
use crate::{Portal, Session};

/// Username given to the first account.
pub const MAIN_ADMIN_USERNAME: &str = "admin";

/// Semesters a student can be in.
pub const SEMESTERS: std::ops::RangeInclusive<u8> = 1..=8;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub semester: Option<u8>,
    pub password: String,
}

/// What the registration page should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    /// No accounts yet; the next registration creates the main admin.
    Setup,
    Open,
    Closed,
}

/// Which login form the request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginPortal {
    #[default]
    Student,
    Admin,
}

impl std::str::FromStr for LoginPortal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(LoginPortal::Student),
            "admin" => Ok(LoginPortal::Admin),
            other => Err(format!("unknown login portal: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email or username on the student portal, exact username on the admin one.
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub portal: LoginPortal,
}

impl Portal {
    /// Create an account.
    ///
    /// The very first account becomes the main admin. After that, accounts
    /// are students and require the main admin to have registration open.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, PortalError> {
        let email = req.email.trim().to_lowercase();
        if email.is_empty() || req.password.is_empty() {
            return Err(PortalError::MissingFields);
        }

        let setup = self.store.count_users().await? == 0;
        if !setup && !self.registration_open().await? {
            return Err(PortalError::RegistrationClosed);
        }

        if self.store.find_user_by_login(&email).await?.is_some() {
            return Err(PortalError::AlreadyRegistered);
        }

        let semester = req.semester.unwrap_or(1);
        if !setup && !SEMESTERS.contains(&semester) {
            return Err(PortalError::Invalid(format!(
                "semester must be between 1 and 8, got {semester}"
            )));
        }

        let password_hash = hash_password_off_thread(req.password).await?;
        let name = req.name.trim();

        let user = if setup {
            let mut user = User::new(MAIN_ADMIN_USERNAME, password_hash, Role::Admin);
            user.name = if name.is_empty() { "Admin" } else { name }.to_string();
            user.email = Some(email);
            user
        } else {
            let mut user = User::new(&email, password_hash, Role::Student);
            user.name = name.to_string();
            user.email = Some(email);
            user.semester = Some(semester);
            user
        };

        let user = self.store.insert_user(user).await.map_err(|e| {
            if e.is_duplicate() {
                PortalError::AlreadyRegistered
            } else {
                e.into()
            }
        })?;

        tracing::info!(username = %user.username, role = %user.role, "account registered");
        Ok(user)
    }

    /// Whether the registration page is in setup mode, open or closed.
    pub async fn registration_status(&self) -> Result<RegistrationStatus, PortalError> {
        if self.store.count_users().await? == 0 {
            return Ok(RegistrationStatus::Setup);
        }
        Ok(if self.registration_open().await? {
            RegistrationStatus::Open
        } else {
            RegistrationStatus::Closed
        })
    }

    async fn registration_open(&self) -> Result<bool, PortalError> {
        Ok(self
            .main_admin()
            .await?
            .map_or(true, |admin| admin.registration_enabled))
    }

    /// Sign in through the student or admin portal.
    pub async fn login(&self, req: LoginRequest) -> Result<Session, PortalError> {
        let user = match req.portal {
            LoginPortal::Student => {
                if !self.store.get_settings().await?.student_login_enabled {
                    return Err(PortalError::StudentLoginDisabled);
                }
                self.store
                    .find_user_by_login(&req.username.trim().to_lowercase())
                    .await?
            }
            LoginPortal::Admin => self.store.find_user_by_username(req.username.trim()).await?,
        };

        let user = user.ok_or(PortalError::InvalidCredentials)?;

        match (req.portal, user.role) {
            (LoginPortal::Student, Role::Admin) => return Err(PortalError::AdminPortalRequired),
            (LoginPortal::Admin, Role::Student) => return Err(PortalError::AdminsOnly),
            _ => {}
        }

        if !verify_password_off_thread(req.password, user.password_hash.clone()).await? {
            return Err(PortalError::InvalidCredentials);
        }

        tracing::debug!(username = %user.username, "signed in");
        Ok(Session::new(user.id))
    }

    /// The signed-in user, freshly read from the store.
    pub async fn current_user(&self, session: &Session) -> Result<User, PortalError> {
        self.store
            .get_user(session.user_id)
            .await?
            .ok_or(PortalError::NotFound("user"))
    }

    /// The signed-in user, if they are an admin right now.
    pub async fn require_admin(&self, session: &Session) -> Result<User, PortalError> {
        let user = self.current_user(session).await?;
        if !user.is_admin() {
            return Err(PortalError::Forbidden("admin only"));
        }
        Ok(user)
    }

    /// The first admin account ever created.
    pub async fn main_admin(&self) -> Result<Option<User>, PortalError> {
        Ok(self
            .store
            .list_users_by_role(Role::Admin)
            .await?
            .into_iter()
            .next())
    }

    pub async fn is_main_admin(&self, user: &User) -> Result<bool, PortalError> {
        Ok(user.is_admin() && self.main_admin().await?.is_some_and(|m| m.id == user.id))
    }

    /// Change the signed-in user's semester after re-checking their password.
    pub async fn update_semester(
        &self,
        session: &Session,
        semester: u8,
        password: &str,
    ) -> Result<User, PortalError> {
        let mut user = self.current_user(session).await?;
        if !verify_password_off_thread(password.to_string(), user.password_hash.clone()).await? {
            return Err(PortalError::IncorrectPassword);
        }
        if !SEMESTERS.contains(&semester) {
            return Err(PortalError::Invalid(format!(
                "semester must be between 1 and 8, got {semester}"
            )));
        }

        user.semester = Some(semester);
        self.store.update_user(&user).await?;
        Ok(user)
    }
}
