//! Wiring shared by the commands: config, store, scoring engine and portal.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use semnotes_core::scoring::ScoringEngine;
use semnotes_core::traits::Store;
use semnotes_portal::accounts::{LoginPortal, LoginRequest};
use semnotes_portal::{Portal, Session, UploadStore};
use semnotes_store::{create_media_host, load_config_from, DocumentStore, PortalConfig};

use crate::AdminArgs;

pub struct App {
    pub config: PortalConfig,
    pub store: Arc<dyn Store>,
    pub engine: Arc<ScoringEngine>,
    pub portal: Portal,
}

impl App {
    /// Load config and open the store it points at.
    pub fn open(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config_from(config_path)?;

        if let Some(parent) = config.store_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create store directory: {}", parent.display())
            })?;
        }
        let store: Arc<dyn Store> = Arc::new(
            DocumentStore::open(&config.store_path).with_context(|| {
                format!("failed to open store: {}", config.store_path.display())
            })?,
        );
        tracing::debug!(path = %config.store_path.display(), "store opened");

        let engine = Arc::new(ScoringEngine::new(store.clone(), config.scoring.weights));
        let media = create_media_host(config.media.as_ref());
        let uploads = UploadStore::new(config.uploads_dir.clone());
        let portal = Portal::new(store.clone(), media, engine.clone(), uploads);

        Ok(Self {
            config,
            store,
            engine,
            portal,
        })
    }

    /// Sign in through the admin portal.
    pub async fn admin_session(&self, admin: &AdminArgs) -> Result<Session> {
        self.portal
            .login(LoginRequest {
                username: admin.username.clone(),
                password: admin.password.clone(),
                portal: LoginPortal::Admin,
            })
            .await
            .with_context(|| format!("admin login as '{}' failed", admin.username))
    }
}
