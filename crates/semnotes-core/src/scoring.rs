//! Leaderboard scoring engine.
//!
//! A student's score is a weighted sum of their Progress, DownloadLog and
//! Comment rows. Recomputation is always a full pass over every student; the
//! cached score is only written back when it changed.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{ProgressStatus, Role, UserId};
use crate::traits::{RecomputeTrigger, Store};

/// Points awarded per counted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_read")]
    pub read: u64,
    #[serde(default = "default_revise")]
    pub revise: u64,
    #[serde(default = "default_one")]
    pub download: u64,
    #[serde(default = "default_one")]
    pub comment: u64,
}

fn default_read() -> u64 {
    2
}
fn default_revise() -> u64 {
    5
}
fn default_one() -> u64 {
    1
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            read: default_read(),
            revise: default_revise(),
            download: default_one(),
            comment: default_one(),
        }
    }
}

/// Row counts feeding one student's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub read: u64,
    pub revise: u64,
    pub downloads: u64,
    pub comments: u64,
}

impl ScoreBreakdown {
    /// Weighted total. Saturates instead of overflowing.
    pub fn total(&self, weights: &ScoreWeights) -> u64 {
        self.read
            .saturating_mul(weights.read)
            .saturating_add(self.revise.saturating_mul(weights.revise))
            .saturating_add(self.downloads.saturating_mul(weights.download))
            .saturating_add(self.comments.saturating_mul(weights.comment))
    }
}

/// What a full recomputation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecomputeSummary {
    /// Students visited.
    pub students: usize,
    /// Students whose stored score was rewritten.
    pub updated: usize,
    /// Students whose stored score already matched.
    pub unchanged: usize,
    /// Wall-clock duration of the pass in milliseconds.
    pub duration_ms: u64,
}

/// Recomputes cached scores from the store.
pub struct ScoringEngine {
    store: Arc<dyn Store>,
    weights: ScoreWeights,
}

impl ScoringEngine {
    pub fn new(store: Arc<dyn Store>, weights: ScoreWeights) -> Self {
        Self { store, weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Count the rows that make up one user's score.
    pub async fn breakdown(&self, user: UserId) -> Result<ScoreBreakdown, StoreError> {
        let (read, revise, downloads, comments) = futures::try_join!(
            self.store.count_progress(user, ProgressStatus::Read),
            self.store.count_progress(user, ProgressStatus::Revise),
            self.store.count_downloads(user),
            self.store.count_comments(user),
        )?;

        Ok(ScoreBreakdown {
            read,
            revise,
            downloads,
            comments,
        })
    }

    /// Recompute every student's score, writing only the ones that changed.
    ///
    /// Changed scores go to the store in a single batch, so a failed pass
    /// leaves every score as it was.
    pub async fn recompute_all(&self) -> Result<RecomputeSummary, StoreError> {
        let start = Instant::now();
        let students = self.store.list_users_by_role(Role::Student).await?;

        let mut summary = RecomputeSummary {
            students: students.len(),
            ..Default::default()
        };

        let mut changed = Vec::new();
        for student in &students {
            let score = self.breakdown(student.id).await?.total(&self.weights);
            if score != student.score {
                tracing::debug!(user = %student.username, old = student.score, new = score, "score changed");
                changed.push((student.id, score));
            } else {
                summary.unchanged += 1;
            }
        }

        if !changed.is_empty() {
            let written = self.store.set_scores(&changed).await?;
            if written < changed.len() {
                let missing = changed.len() - written;
                tracing::debug!(missing, "students removed during recompute");
            }
        }
        summary.updated = changed.len();

        summary.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            students = summary.students,
            updated = summary.updated,
            "leaderboard recomputed in {}ms",
            summary.duration_ms
        );
        Ok(summary)
    }
}

#[async_trait]
impl RecomputeTrigger for ScoringEngine {
    async fn recompute_now(&self) -> anyhow::Result<RecomputeSummary> {
        Ok(self.recompute_all().await?)
    }
}
