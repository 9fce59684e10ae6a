//! The `semnotes recompute` command.

use std::path::PathBuf;

use anyhow::Result;

use crate::app::App;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let app = App::open(config_path.as_deref())?;
    let summary = app.engine.recompute_all().await?;

    println!(
        "Recomputed {} student(s): {} updated, {} unchanged ({}ms)",
        summary.students, summary.updated, summary.unchanged, summary.duration_ms
    );
    Ok(())
}
