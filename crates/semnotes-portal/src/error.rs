//! Portal error types.
//!
//! The account variants carry the exact messages shown to users on the
//! login and registration pages.

use thiserror::Error;

use semnotes_core::StoreError;

/// Errors returned by portal services.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Student login is currently disabled by the Administrator.")]
    StudentLoginDisabled,

    #[error("Admins must use the Dedicated Admin Portal.")]
    AdminPortalRequired,

    #[error("Access Denied: This portal is for Admins only.")]
    AdminsOnly,

    #[error("Registration is closed.")]
    RegistrationClosed,

    #[error("Email already registered.")]
    AlreadyRegistered,

    #[error("Missing fields")]
    MissingFields,

    #[error("Incorrect Password")]
    IncorrectPassword,

    /// The signed-in user may not perform this action.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    /// The referenced document does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Input failed validation.
    #[error("invalid input: {0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading or writing a local upload failed.
    #[error("upload I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl PortalError {
    /// Returns `true` for errors caused by the caller rather than the system.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            PortalError::Store(_) | PortalError::Io(_) | PortalError::PasswordHash(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_login_page_copy() {
        assert_eq!(PortalError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(
            PortalError::AdminsOnly.to_string(),
            "Access Denied: This portal is for Admins only."
        );
        assert_eq!(PortalError::NotFound("topic").to_string(), "topic not found");
    }

    #[test]
    fn store_failures_are_not_user_errors() {
        let err: PortalError = StoreError::not_found("users", 1).into();
        assert!(!err.is_user_error());
        assert!(PortalError::MissingFields.is_user_error());
    }
}
