//! The `semnotes validate` command.

use std::path::PathBuf;

use anyhow::Result;

use semnotes_core::catalog::{load_catalog, validate_catalog};

pub fn execute(catalog_path: PathBuf) -> Result<()> {
    let catalog = load_catalog(&catalog_path)?;

    for subject in &catalog.subjects {
        println!(
            "Subject: {} ({} topics, {} papers)",
            subject.name,
            subject.topics.len(),
            subject.papers.len()
        );
    }

    let warnings = validate_catalog(&catalog);
    for w in &warnings {
        let prefix = w
            .subject
            .as_ref()
            .map(|name| format!("  [{name}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Catalog valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
