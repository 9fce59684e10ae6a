//! Subjects, topics, question papers, downloads and search.

use serde::Serialize;

use semnotes_core::model::{
    Paper, PaperId, PaperImage, PaperKind, Progress, Subject, SubjectId, Topic, TopicId,
};
use semnotes_core::traits::RecordOutcome;

use crate::error::PortalError;
use crate::uploads::FileUpload;
use crate::{Portal, Session};

/// Input for a new topic.
#[derive(Debug, Clone, Default)]
pub struct NewTopic {
    pub chapter: String,
    pub title: String,
    /// Rich-text HTML body.
    pub content: String,
    pub attachments: Vec<FileUpload>,
}

/// Input for a new question paper whose images are already hosted.
#[derive(Debug, Clone)]
pub struct NewPaper {
    pub subject: SubjectId,
    pub title: String,
    pub year: i32,
    pub kind: PaperKind,
    pub images: Vec<PaperImage>,
}

/// Topics sharing a chapter name, in creation order.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterGroup {
    pub name: String,
    pub topics: Vec<Topic>,
}

/// Everything the subject page shows.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectView {
    pub subject: Subject,
    pub chapters: Vec<ChapterGroup>,
    pub active: Option<Topic>,
    pub previous: Option<Topic>,
    pub next: Option<Topic>,
    /// The viewer's progress on the active topic, when signed in.
    pub progress: Option<Progress>,
}

/// A topic search hit with its subject.
#[derive(Debug, Clone, Serialize)]
pub struct TopicHit {
    pub topic: Topic,
    pub subject: Option<Subject>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub topics: Vec<TopicHit>,
    pub subjects: Vec<Subject>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty() && self.subjects.is_empty()
    }
}

/// Group topics by chapter, keeping the order each chapter first appears.
pub fn group_by_chapter(topics: &[Topic]) -> Vec<ChapterGroup> {
    let mut groups: Vec<ChapterGroup> = Vec::new();
    for topic in topics {
        match groups.iter_mut().find(|g| g.name == topic.chapter) {
            Some(group) => group.topics.push(topic.clone()),
            None => groups.push(ChapterGroup {
                name: topic.chapter.clone(),
                topics: vec![topic.clone()],
            }),
        }
    }
    groups
}

impl Portal {
    // -- subjects -----------------------------------------------------------

    pub async fn create_subject(
        &self,
        session: &Session,
        name: &str,
        description: &str,
    ) -> Result<Subject, PortalError> {
        self.require_admin(session).await?;
        if name.trim().is_empty() {
            return Err(PortalError::MissingFields);
        }

        self.store
            .insert_subject(Subject::new(name, description))
            .await
            .map_err(|e| {
                if e.is_duplicate() {
                    PortalError::Invalid(format!("subject '{}' already exists", name.trim()))
                } else {
                    e.into()
                }
            })
    }

    /// All subjects, sorted by name.
    pub async fn list_subjects(&self) -> Result<Vec<Subject>, PortalError> {
        Ok(self.store.list_subjects().await?)
    }

    async fn subject(&self, id: SubjectId) -> Result<Subject, PortalError> {
        self.store
            .get_subject(id)
            .await?
            .ok_or(PortalError::NotFound("subject"))
    }

    /// Delete a subject together with its topics and their attachment files.
    pub async fn delete_subject(
        &self,
        session: &Session,
        id: SubjectId,
    ) -> Result<Subject, PortalError> {
        self.require_admin(session).await?;
        let subject = self.subject(id).await?;

        let topics = self.store.list_topics(Some(id)).await?;
        for topic in &topics {
            self.remove_topic(topic.id).await?;
        }
        self.store.delete_subject(id).await?;

        tracing::info!(subject = %subject.name, topics = topics.len(), "subject deleted");
        Ok(subject)
    }

    // -- topics -------------------------------------------------------------

    /// Add a topic, writing its attachments to the uploads directory.
    pub async fn add_topic(
        &self,
        session: &Session,
        subject: SubjectId,
        topic: NewTopic,
    ) -> Result<Topic, PortalError> {
        self.require_admin(session).await?;
        self.subject(subject).await?;
        if topic.title.trim().is_empty() || topic.chapter.trim().is_empty() {
            return Err(PortalError::MissingFields);
        }

        let mut doc = Topic::new(subject, &topic.chapter, &topic.title, &topic.content);
        for upload in &topic.attachments {
            match self.uploads.save(upload).await {
                Ok(attachment) => doc.attachments.push(attachment),
                Err(e) => {
                    self.uploads.remove_all(&doc.attachments).await;
                    return Err(e.into());
                }
            }
        }

        Ok(self.store.insert_topic(doc).await?)
    }

    pub async fn get_topic(&self, id: TopicId) -> Result<Topic, PortalError> {
        self.store
            .get_topic(id)
            .await?
            .ok_or(PortalError::NotFound("topic"))
    }

    /// Delete a topic and its attachment files.
    pub async fn delete_topic(&self, session: &Session, id: TopicId) -> Result<Topic, PortalError> {
        self.require_admin(session).await?;
        self.remove_topic(id).await
    }

    async fn remove_topic(&self, id: TopicId) -> Result<Topic, PortalError> {
        let topic = self
            .store
            .delete_topic(id)
            .await?
            .ok_or(PortalError::NotFound("topic"))?;
        self.uploads.remove_all(&topic.attachments).await;
        Ok(topic)
    }

    /// Distinct chapter names of a subject in the order they were created.
    pub async fn chapters(&self, subject: SubjectId) -> Result<Vec<String>, PortalError> {
        let topics = self.store.list_topics(Some(subject)).await?;
        Ok(group_by_chapter(&topics)
            .into_iter()
            .map(|g| g.name)
            .collect())
    }

    /// The subject page: chapters, the active topic and its neighbours.
    ///
    /// Without `active_topic` the first topic is active. An id that is not
    /// in this subject leaves nothing active.
    pub async fn subject_view(
        &self,
        session: Option<&Session>,
        subject: SubjectId,
        active_topic: Option<TopicId>,
    ) -> Result<SubjectView, PortalError> {
        let subject = self.subject(subject).await?;
        let topics = self.store.list_topics(Some(subject.id)).await?;

        let index = match active_topic {
            Some(id) => topics.iter().position(|t| t.id == id),
            None if topics.is_empty() => None,
            None => Some(0),
        };

        let active = index.map(|i| topics[i].clone());
        let previous = index.filter(|&i| i > 0).map(|i| topics[i - 1].clone());
        let next = index.and_then(|i| topics.get(i + 1)).cloned();

        let progress = match (session, &active) {
            (Some(session), Some(topic)) => {
                self.store.get_progress(session.user_id, topic.id).await?
            }
            _ => None,
        };

        Ok(SubjectView {
            chapters: group_by_chapter(&topics),
            subject,
            active,
            previous,
            next,
            progress,
        })
    }

    // -- papers -------------------------------------------------------------

    pub async fn add_paper(&self, session: &Session, paper: NewPaper) -> Result<Paper, PortalError> {
        self.require_admin(session).await?;
        self.subject(paper.subject).await?;
        if paper.title.trim().is_empty() {
            return Err(PortalError::MissingFields);
        }

        let mut doc = Paper::new(paper.subject, &paper.title, paper.year, paper.kind);
        doc.images = paper.images;
        Ok(self.store.insert_paper(doc).await?)
    }

    /// Papers of a subject, newest year first.
    pub async fn papers(&self, subject: SubjectId) -> Result<Vec<Paper>, PortalError> {
        self.subject(subject).await?;
        Ok(self.store.list_papers(Some(subject)).await?)
    }

    /// Delete a paper, asking the media host to destroy each image first.
    pub async fn delete_paper(&self, session: &Session, id: PaperId) -> Result<Paper, PortalError> {
        self.require_admin(session).await?;
        let paper = self
            .store
            .get_paper(id)
            .await?
            .ok_or(PortalError::NotFound("paper"))?;

        for public_id in paper.images.iter().filter_map(|i| i.public_id.as_deref()) {
            self.destroy_media(public_id).await;
        }

        self.store.delete_paper(id).await?;
        Ok(paper)
    }

    // -- downloads ----------------------------------------------------------

    /// Note that the signed-in user downloaded a paper.
    pub async fn record_download(
        &self,
        session: &Session,
        paper: PaperId,
    ) -> Result<RecordOutcome, PortalError> {
        let user = self.current_user(session).await?;
        if self.store.get_paper(paper).await?.is_none() {
            return Err(PortalError::NotFound("paper"));
        }
        Ok(self.store.record_download(user.id, paper).await?)
    }

    // -- search -------------------------------------------------------------

    /// Case-insensitive substring search over topic titles and subject names.
    pub async fn search(&self, query: &str) -> Result<SearchResults, PortalError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(SearchResults::default());
        }

        let subjects = self.store.list_subjects().await?;
        let topics = self
            .store
            .list_topics(None)
            .await?
            .into_iter()
            .filter(|t| t.title.to_lowercase().contains(&needle))
            .map(|topic| TopicHit {
                subject: subjects.iter().find(|s| s.id == topic.subject).cloned(),
                topic,
            })
            .collect();

        Ok(SearchResults {
            topics,
            subjects: subjects
                .into_iter()
                .filter(|s| s.name.to_lowercase().contains(&needle))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn chapters_keep_first_seen_order() {
        let s = Uuid::new_v4();
        let topics = vec![
            Topic::new(s, "Processes", "States", ""),
            Topic::new(s, "Memory", "Paging", ""),
            Topic::new(s, "Processes", "Scheduling", ""),
        ];
        let groups = group_by_chapter(&topics);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Processes");
        assert_eq!(groups[0].topics.len(), 2);
        assert_eq!(groups[1].topics[0].title, "Paging");
    }

    #[test]
    fn no_topics_no_chapters() {
        assert!(group_by_chapter(&[]).is_empty());
    }
}
