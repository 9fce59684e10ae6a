//! The `semnotes schedule` command.

use std::path::PathBuf;

use anyhow::Result;

use semnotes_core::scheduler::ScoreScheduler;

use crate::app::App;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let app = App::open(config_path.as_deref())?;
    let config = app.config.scoring.scheduler();

    eprintln!(
        "Scoring every {}s (first pass in {}s). Press Ctrl-C to stop.",
        config.interval.as_secs(),
        config.startup_delay.as_secs()
    );

    let scheduler = ScoreScheduler::new(app.engine.clone(), config);
    let runs = scheduler
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await;

    eprintln!("Stopped after {runs} pass(es).");
    Ok(())
}
