//! Versioned JSON export documents.
//!
//! Exports carry a `format` tag and version so downstream tools (grade
//! sheets, notice-board bots) can check what they are reading.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::json;

use semnotes_core::leaderboard::Leaderboard;
use semnotes_core::progress::SubjectProgress;

pub const EXPORT_VERSION: &str = "1.0";

/// Build the leaderboard export: entries plus score statistics.
pub fn leaderboard_document(board: &Leaderboard) -> serde_json::Value {
    let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
    let total: u64 = scores.iter().sum();
    let mean = if scores.is_empty() {
        0.0
    } else {
        total as f64 / scores.len() as f64
    };

    json!({
        "format": "semnotes-leaderboard",
        "version": EXPORT_VERSION,
        "id": board.id,
        "generated_at": board.generated_at,
        "stats": {
            "students": scores.len(),
            "top_score": scores.iter().max().copied().unwrap_or(0),
            "mean_score": (mean * 100.0).round() / 100.0,
            "zero_scores": scores.iter().filter(|&&s| s == 0).count(),
        },
        "entries": board.entries,
    })
}

/// Build a student's progress export.
pub fn progress_document(
    student: &str,
    progress: &[SubjectProgress],
    generated_at: DateTime<Utc>,
) -> serde_json::Value {
    let completed: usize = progress.iter().map(|p| p.completed).sum();
    let total: usize = progress.iter().map(|p| p.total).sum();

    json!({
        "format": "semnotes-progress",
        "version": EXPORT_VERSION,
        "student": student,
        "generated_at": generated_at,
        "completed": completed,
        "total": total,
        "subjects": progress,
    })
}

/// Write an export document as pretty JSON, creating parent directories.
pub fn write_document(document: &serde_json::Value, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(document)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use semnotes_core::leaderboard::LeaderboardEntry;

    fn entry(rank: usize, username: &str, score: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            user_id: uuid::Uuid::new_v4(),
            name: String::new(),
            username: username.into(),
            semester: None,
            score,
        }
    }

    #[test]
    fn leaderboard_document_structure() {
        let board = Leaderboard {
            id: uuid::Uuid::nil(),
            generated_at: Utc::now(),
            entries: vec![entry(1, "a", 9), entry(2, "b", 4), entry(3, "c", 0)],
        };
        let doc = leaderboard_document(&board);

        assert_eq!(doc["format"], "semnotes-leaderboard");
        assert_eq!(doc["version"], EXPORT_VERSION);
        assert_eq!(doc["stats"]["students"], 3);
        assert_eq!(doc["stats"]["top_score"], 9);
        assert_eq!(doc["stats"]["mean_score"], 4.33);
        assert_eq!(doc["stats"]["zero_scores"], 1);
        assert_eq!(doc["entries"][1]["username"], "b");
    }

    #[test]
    fn empty_leaderboard_has_zero_stats() {
        let board = Leaderboard {
            id: uuid::Uuid::nil(),
            generated_at: Utc::now(),
            entries: vec![],
        };
        let doc = leaderboard_document(&board);
        assert_eq!(doc["stats"]["top_score"], 0);
        assert_eq!(doc["stats"]["mean_score"], 0.0);
    }

    #[test]
    fn progress_document_sums_subjects() {
        let progress = vec![SubjectProgress {
            subject_id: uuid::Uuid::nil(),
            subject_name: "OS".into(),
            completed: 2,
            total: 4,
            percentage: 50,
        }];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");

        write_document(&progress_document("alice", &progress, Utc::now()), &path).unwrap();
        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["completed"], 2);
        assert_eq!(doc["total"], 4);
        assert_eq!(doc["subjects"][0]["percentage"], 50);
    }
}
