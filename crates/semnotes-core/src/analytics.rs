//! Admin dashboard analytics over Progress rows.
//!
//! Rows whose topic (or the topic's subject) no longer exists are dropped,
//! the same way a join would drop them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Progress, Subject, SubjectId, Topic, TopicId};

/// The subject with the most `read` rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectPopularity {
    pub subject: String,
    pub count: usize,
}

impl SubjectPopularity {
    fn none() -> Self {
        Self {
            subject: "None".to_string(),
            count: 0,
        }
    }
}

/// A topic many students marked for revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StuckTopic {
    pub topic_id: TopicId,
    pub title: String,
    pub subject_id: SubjectId,
    pub count: usize,
}

/// Subject with the most `read` progress rows.
///
/// Ties go to the alphabetically first subject name. With no rows the
/// result is `("None", 0)`.
pub fn most_read_subject(
    read_rows: &[Progress],
    topics: &[Topic],
    subjects: &[Subject],
) -> SubjectPopularity {
    let topic_subject: HashMap<TopicId, SubjectId> =
        topics.iter().map(|t| (t.id, t.subject)).collect();
    let subject_names: HashMap<SubjectId, &str> =
        subjects.iter().map(|s| (s.id, s.name.as_str())).collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in read_rows {
        let Some(subject_id) = topic_subject.get(&row.topic) else {
            continue;
        };
        let Some(name) = subject_names.get(subject_id) else {
            continue;
        };
        *counts.entry(*name).or_default() += 1;
    }

    counts
        .into_iter()
        .max_by(|(a_name, a), (b_name, b)| a.cmp(b).then_with(|| b_name.cmp(a_name)))
        .map(|(name, count)| SubjectPopularity {
            subject: name.to_string(),
            count,
        })
        .unwrap_or_else(SubjectPopularity::none)
}

/// Topics with the most `revise` rows, highest count first, at most `limit`.
pub fn stuck_topics(revise_rows: &[Progress], topics: &[Topic], limit: usize) -> Vec<StuckTopic> {
    let by_id: HashMap<TopicId, &Topic> = topics.iter().map(|t| (t.id, t)).collect();

    let mut counts: HashMap<TopicId, usize> = HashMap::new();
    for row in revise_rows {
        if by_id.contains_key(&row.topic) {
            *counts.entry(row.topic).or_default() += 1;
        }
    }

    let mut stuck: Vec<StuckTopic> = counts
        .into_iter()
        .filter_map(|(id, count)| {
            by_id.get(&id).map(|t| StuckTopic {
                topic_id: id,
                title: t.title.clone(),
                subject_id: t.subject,
                count,
            })
        })
        .collect();

    stuck.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.title.cmp(&b.title)));
    stuck.truncate(limit);
    stuck
}
