//! semnotes-portal — The services behind the student-notes portal.
//!
//! [`Portal`] ties the document store, the media host, the score
//! recomputation trigger and the local uploads directory together. Its
//! methods are split by area: accounts, library, study, contributions,
//! admin and catalog import. Every call that needs an identity takes a
//! [`Session`] and re-reads the user from the store, so role changes apply
//! on the next call.

pub mod accounts;
pub mod admin;
pub mod contributions;
pub mod error;
pub mod import;
pub mod library;
pub mod password;
pub mod study;
pub mod uploads;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use semnotes_core::model::UserId;
use semnotes_core::traits::{MediaHost, RecomputeTrigger, Store};

pub use error::PortalError;
pub use uploads::{FileUpload, UploadStore};

/// A signed-in browser session. Carries only the user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// The portal's service layer.
pub struct Portal {
    store: Arc<dyn Store>,
    media: Arc<dyn MediaHost>,
    trigger: Arc<dyn RecomputeTrigger>,
    uploads: UploadStore,
}

impl Portal {
    pub fn new(
        store: Arc<dyn Store>,
        media: Arc<dyn MediaHost>,
        trigger: Arc<dyn RecomputeTrigger>,
        uploads: UploadStore,
    ) -> Self {
        Self {
            store,
            media,
            trigger,
            uploads,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    /// Ask the media host to delete an asset. Failures are logged.
    async fn destroy_media(&self, public_id: &str) {
        if let Err(e) = self.media.destroy(public_id).await {
            tracing::warn!(
                host = self.media.name(),
                public_id,
                "media delete failed: {e:#}"
            );
        }
    }
}
