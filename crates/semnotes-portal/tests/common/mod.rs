#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use semnotes_core::scoring::{RecomputeSummary, ScoreWeights, ScoringEngine};
use semnotes_core::traits::RecomputeTrigger;
use semnotes_portal::accounts::{LoginPortal, LoginRequest, RegisterRequest};
use semnotes_portal::{Portal, Session, UploadStore};
use semnotes_store::mock::MockMediaHost;
use semnotes_store::DocumentStore;

pub const PASSWORD: &str = "hunter2hunter2";

/// Counts recompute requests and forwards them to a real scoring engine.
pub struct CountingTrigger {
    engine: ScoringEngine,
    calls: AtomicUsize,
}

impl CountingTrigger {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecomputeTrigger for CountingTrigger {
    async fn recompute_now(&self) -> anyhow::Result<RecomputeSummary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.engine.recompute_all().await?)
    }
}

pub struct Harness {
    pub portal: Portal,
    pub store: Arc<DocumentStore>,
    pub media: Arc<MockMediaHost>,
    pub trigger: Arc<CountingTrigger>,
    pub uploads_dir: TempDir,
}

pub fn harness() -> Harness {
    let store = Arc::new(DocumentStore::in_memory());
    let media = Arc::new(MockMediaHost::new());
    let trigger = Arc::new(CountingTrigger {
        engine: ScoringEngine::new(store.clone(), ScoreWeights::default()),
        calls: AtomicUsize::new(0),
    });
    let uploads_dir = tempfile::tempdir().unwrap();

    let portal = Portal::new(
        store.clone(),
        media.clone(),
        trigger.clone(),
        UploadStore::new(uploads_dir.path()),
    );

    Harness {
        portal,
        store,
        media,
        trigger,
        uploads_dir,
    }
}

pub fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        name: String::new(),
        email: email.to_string(),
        semester: Some(3),
        password: PASSWORD.to_string(),
    }
}

impl Harness {
    /// Register the first account (the main admin) and sign in.
    pub async fn main_admin(&self) -> Session {
        self.portal
            .register(register_request("root@example.com"))
            .await
            .unwrap();
        self.portal
            .login(LoginRequest {
                username: "admin".into(),
                password: PASSWORD.into(),
                portal: LoginPortal::Admin,
            })
            .await
            .unwrap()
    }

    /// Register a student and sign in through the student portal.
    pub async fn student(&self, email: &str) -> Session {
        self.portal.register(register_request(email)).await.unwrap();
        self.portal
            .login(LoginRequest {
                username: email.into(),
                password: PASSWORD.into(),
                portal: LoginPortal::Student,
            })
            .await
            .unwrap()
    }
}
