//! TOML subject catalog parser.
//!
//! A catalog seeds the library with subjects, their topics and their
//! question papers. Catalogs are loaded from files or directories and
//! validated before an admin imports them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{PaperImage, PaperKind};

/// A parsed catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub subjects: Vec<CatalogSubject>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSubject {
    pub name: String,
    pub description: String,
    pub topics: Vec<CatalogTopic>,
    pub papers: Vec<CatalogPaper>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTopic {
    pub chapter: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPaper {
    pub title: String,
    pub year: i32,
    pub kind: PaperKind,
    pub images: Vec<PaperImage>,
}

impl Catalog {
    pub fn topic_count(&self) -> usize {
        self.subjects.iter().map(|s| s.topics.len()).sum()
    }

    pub fn paper_count(&self) -> usize {
        self.subjects.iter().map(|s| s.papers.len()).sum()
    }
}

/// Intermediate TOML structure for catalog files.
#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    #[serde(default)]
    subjects: Vec<TomlSubject>,
}

#[derive(Debug, Deserialize)]
struct TomlSubject {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    topics: Vec<TomlTopic>,
    #[serde(default)]
    papers: Vec<TomlPaper>,
}

#[derive(Debug, Deserialize)]
struct TomlTopic {
    chapter: String,
    title: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TomlPaper {
    title: String,
    year: i32,
    #[serde(default = "default_kind_str")]
    kind: String,
    #[serde(default)]
    images: Vec<TomlImage>,
}

fn default_kind_str() -> String {
    "end".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlImage {
    url: String,
    #[serde(default)]
    public_id: Option<String>,
}

/// Parse a single TOML catalog file.
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    parse_catalog_str(&content, path)
}

/// Parse a TOML string into a `Catalog`.
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<Catalog> {
    let parsed: TomlCatalogFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let subjects = parsed
        .subjects
        .into_iter()
        .map(|s| {
            let papers = s
                .papers
                .into_iter()
                .map(|p| {
                    let kind: PaperKind = p.kind.parse().map_err(|e: String| {
                        anyhow::anyhow!("{e} (paper '{}' in '{}')", p.title, s.name)
                    })?;
                    Ok(CatalogPaper {
                        title: p.title,
                        year: p.year,
                        kind,
                        images: p
                            .images
                            .into_iter()
                            .map(|i| PaperImage {
                                url: i.url,
                                public_id: i.public_id,
                            })
                            .collect(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let topics = s
                .topics
                .into_iter()
                .map(|t| CatalogTopic {
                    chapter: t.chapter,
                    title: t.title,
                    content: t.content,
                })
                .collect();

            Ok(CatalogSubject {
                name: s.name,
                description: s.description,
                topics,
                papers,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Catalog { subjects })
}

/// Recursively load every `.toml` catalog under a directory into one catalog.
pub fn load_catalog_directory(dir: &Path) -> Result<Catalog> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    let mut catalog = Catalog::default();
    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            catalog.subjects.extend(load_catalog_directory(&path)?.subjects);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_catalog(&path) {
                Ok(c) => catalog.subjects.extend(c.subjects),
                Err(e) => {
                    tracing::warn!("skipping {}: {e:#}", path.display());
                }
            }
        }
    }

    Ok(catalog)
}

/// Load a catalog from a file or a directory of files.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if path.is_dir() {
        load_catalog_directory(path)
    } else {
        parse_catalog(path)
    }
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Subject the warning is about, if any.
    pub subject: Option<String>,
    pub message: String,
}

/// Earliest and latest plausible paper years.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1950..=2100;

/// Validate a catalog and return warnings for suspicious entries.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut seen_subjects = HashSet::new();

    if catalog.subjects.is_empty() {
        warnings.push(ValidationWarning {
            subject: None,
            message: "catalog has no subjects".to_string(),
        });
    }

    for subject in &catalog.subjects {
        let warn = |message: String| ValidationWarning {
            subject: Some(subject.name.clone()),
            message,
        };

        if subject.name.trim().is_empty() {
            warnings.push(warn("subject name is empty".to_string()));
        }

        if !seen_subjects.insert(subject.name.trim().to_lowercase()) {
            warnings.push(warn(format!("duplicate subject '{}'", subject.name)));
        }

        if subject.topics.is_empty() {
            warnings.push(warn("no topics; progress will always be 0%".to_string()));
        }

        let mut seen_topics = HashSet::new();
        for topic in &subject.topics {
            if topic.title.trim().is_empty() || topic.chapter.trim().is_empty() {
                warnings.push(warn("topic with empty title or chapter".to_string()));
            }
            if !seen_topics.insert((topic.chapter.trim(), topic.title.trim())) {
                warnings.push(warn(format!(
                    "duplicate topic '{}' in chapter '{}'",
                    topic.title, topic.chapter
                )));
            }
        }

        for paper in &subject.papers {
            if !YEAR_RANGE.contains(&paper.year) {
                warnings.push(warn(format!(
                    "paper '{}' has implausible year {}",
                    paper.title, paper.year
                )));
            }
            if paper.images.is_empty() {
                warnings.push(warn(format!("paper '{}' has no images", paper.title)));
            }
        }
    }

    warnings
}
