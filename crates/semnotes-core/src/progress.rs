//! Per-subject completion aggregation.
//!
//! Computed fresh on every call; nothing here is cached.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{Progress, Subject, SubjectId, TopicId, UserId};
use crate::traits::Store;

/// How far a user is through one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectProgress {
    pub subject_id: SubjectId,
    pub subject_name: String,
    /// Distinct topics marked read or revise.
    pub completed: usize,
    pub total: usize,
    /// `round(100 * completed / total)`, 0 when the subject has no topics.
    pub percentage: u8,
}

/// `round(100 * completed / total)` with halves rounded up.
///
/// Returns 0 for an empty subject and caps at 100.
pub fn completion_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u128;
    let total = total as u128;
    ((200 * completed + total) / (2 * total)) as u8
}

/// Count the distinct completed topics among `topic_ids`.
pub fn count_completed(progress: &[Progress], topic_ids: &HashSet<TopicId>) -> usize {
    progress
        .iter()
        .filter(|p| p.status.is_completed() && topic_ids.contains(&p.topic))
        .map(|p| p.topic)
        .collect::<HashSet<_>>()
        .len()
}

/// Completion of one subject for one user.
pub async fn subject_progress(
    store: &dyn Store,
    user: UserId,
    subject: &Subject,
) -> Result<SubjectProgress, StoreError> {
    let progress = store.list_progress(user).await?;
    summarize(store, subject, &progress).await
}

/// Completion of every given subject for one user.
///
/// The user's progress rows are fetched once and reused across subjects.
pub async fn progress_by_subject(
    store: &dyn Store,
    user: UserId,
    subjects: &[Subject],
) -> Result<Vec<SubjectProgress>, StoreError> {
    let progress = store.list_progress(user).await?;

    let mut out = Vec::with_capacity(subjects.len());
    for subject in subjects {
        out.push(summarize(store, subject, &progress).await?);
    }
    Ok(out)
}

async fn summarize(
    store: &dyn Store,
    subject: &Subject,
    progress: &[Progress],
) -> Result<SubjectProgress, StoreError> {
    let topic_ids: HashSet<TopicId> = store
        .list_topics(Some(subject.id))
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    let total = topic_ids.len();
    let completed = if total == 0 {
        0
    } else {
        count_completed(progress, &topic_ids)
    };

    Ok(SubjectProgress {
        subject_id: subject.id,
        subject_name: subject.name.clone(),
        completed,
        total,
        percentage: completion_percentage(completed, total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgressStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn row(topic: TopicId, status: ProgressStatus) -> Progress {
        Progress {
            user: Uuid::nil(),
            topic,
            status,
            note: String::new(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn zero_topics_is_zero_percent() {
        assert_eq!(completion_percentage(0, 0), 0);
        assert_eq!(completion_percentage(5, 0), 0);
    }

    #[test]
    fn rounds_to_nearest_percent() {
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(3, 3), 100);
        assert_eq!(completion_percentage(0, 7), 0);
    }

    #[test]
    fn halves_round_up() {
        // 37.5 -> 38, 12.5 -> 13
        assert_eq!(completion_percentage(3, 8), 38);
        assert_eq!(completion_percentage(1, 8), 13);
        assert_eq!(completion_percentage(1, 200), 1);
    }

    #[test]
    fn never_exceeds_one_hundred() {
        assert_eq!(completion_percentage(9, 4), 100);
    }

    #[test]
    fn count_completed_ignores_unread_and_foreign_topics() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let foreign = Uuid::new_v4();
        let ids: HashSet<_> = [a, b, c].into_iter().collect();

        let rows = vec![
            row(a, ProgressStatus::Read),
            row(b, ProgressStatus::Unread),
            row(c, ProgressStatus::Revise),
            row(foreign, ProgressStatus::Read),
        ];
        assert_eq!(count_completed(&rows, &ids), 2);
    }
}
