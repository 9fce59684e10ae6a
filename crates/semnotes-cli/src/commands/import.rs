//! The `semnotes import` command.

use std::path::PathBuf;

use anyhow::Result;

use semnotes_core::catalog::{load_catalog, validate_catalog};

use crate::app::App;
use crate::AdminArgs;

pub async fn execute(
    config_path: Option<PathBuf>,
    catalog_path: PathBuf,
    admin: AdminArgs,
) -> Result<()> {
    let catalog = load_catalog(&catalog_path)?;
    for w in validate_catalog(&catalog) {
        let subject = w.subject.as_deref().unwrap_or("catalog");
        eprintln!("  [{subject}] WARNING: {}", w.message);
    }

    let app = App::open(config_path.as_deref())?;
    let session = app.admin_session(&admin).await?;
    let summary = app.portal.import_catalog(&session, &catalog).await?;

    println!(
        "Imported {} subject(s), {} topic(s), {} paper(s); skipped {} existing subject(s)",
        summary.subjects_created, summary.topics, summary.papers, summary.subjects_skipped
    );
    Ok(())
}
