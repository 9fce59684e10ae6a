//! Leaderboard snapshots with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Role, User, UserId};

/// A ranked view of student scores at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    /// Unique snapshot identifier.
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<LeaderboardEntry>,
}

/// One ranked student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based competition rank; tied scores share a rank.
    pub rank: usize,
    pub user_id: UserId,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub semester: Option<u8>,
    pub score: u64,
}

impl Leaderboard {
    /// Rank students by cached score, highest first.
    ///
    /// Admins are skipped. Equal scores share a rank (1, 1, 3) and are listed
    /// by username. `limit` truncates after ranking.
    pub fn rank(users: &[User], limit: Option<usize>) -> Self {
        let mut students: Vec<&User> = users.iter().filter(|u| u.role == Role::Student).collect();
        students.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.username.cmp(&b.username)));

        let mut entries = Vec::with_capacity(students.len());
        let mut rank = 0;
        let mut previous: Option<u64> = None;
        for (i, user) in students.iter().enumerate() {
            if previous != Some(user.score) {
                rank = i + 1;
                previous = Some(user.score);
            }
            entries.push(LeaderboardEntry {
                rank,
                user_id: user.id,
                name: user.name.clone(),
                username: user.username.clone(),
                semester: user.semester,
                score: user.score,
            });
        }

        if let Some(limit) = limit {
            entries.truncate(limit);
        }

        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            entries,
        }
    }

    /// Rank of a user, if they are on the board.
    pub fn position(&self, user: UserId) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.user_id == user)
            .map(|e| e.rank)
    }

    /// Save the snapshot as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize leaderboard")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write leaderboard to {}", path.display()))?;
        Ok(())
    }

    /// Load a snapshot from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read leaderboard from {}", path.display()))?;
        let board: Leaderboard =
            serde_json::from_str(&content).context("failed to parse leaderboard JSON")?;
        Ok(board)
    }

    /// Format the board as a markdown table.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("| Rank | Student | Semester | Score |\n");
        md.push_str("|------|---------|----------|-------|\n");
        for e in &self.entries {
            let who = if e.name.is_empty() { &e.username } else { &e.name };
            let semester = e
                .semester
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                e.rank, who, semester, e.score
            ));
        }
        md
    }
}
