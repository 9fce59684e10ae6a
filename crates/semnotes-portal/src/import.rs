//! Seeding the library from a parsed catalog.

use serde::Serialize;

use semnotes_core::catalog::Catalog;
use semnotes_core::model::{Paper, Subject, Topic};

use crate::error::PortalError;
use crate::{Portal, Session};

/// What an import created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub subjects_created: usize,
    /// Subjects whose name already existed; their topics and papers are
    /// not imported.
    pub subjects_skipped: usize,
    pub topics: usize,
    pub papers: usize,
}

impl Portal {
    /// Import every subject in the catalog that does not exist yet.
    pub async fn import_catalog(
        &self,
        session: &Session,
        catalog: &Catalog,
    ) -> Result<ImportSummary, PortalError> {
        self.require_admin(session).await?;
        let mut summary = ImportSummary::default();

        for entry in &catalog.subjects {
            let subject = match self
                .store
                .insert_subject(Subject::new(&entry.name, &entry.description))
                .await
            {
                Ok(subject) => subject,
                Err(e) if e.is_duplicate() => {
                    tracing::info!(subject = %entry.name, "already exists, skipping");
                    summary.subjects_skipped += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            summary.subjects_created += 1;

            for topic in &entry.topics {
                self.store
                    .insert_topic(Topic::new(
                        subject.id,
                        &topic.chapter,
                        &topic.title,
                        &topic.content,
                    ))
                    .await?;
                summary.topics += 1;
            }

            for paper in &entry.papers {
                let mut doc = Paper::new(subject.id, &paper.title, paper.year, paper.kind);
                doc.images = paper.images.clone();
                self.store.insert_paper(doc).await?;
                summary.papers += 1;
            }
        }

        tracing::info!(
            created = summary.subjects_created,
            skipped = summary.subjects_skipped,
            topics = summary.topics,
            papers = summary.papers,
            "catalog imported"
        );
        Ok(summary)
    }
}
