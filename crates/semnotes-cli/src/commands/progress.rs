//! The `semnotes progress` command.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use comfy_table::{Cell, Table};

use semnotes_core::progress::{progress_by_subject, SubjectProgress};
use semnotes_report::{generate_progress_html, progress_document, write_document, write_html_report};

use crate::app::App;

pub async fn execute(
    config_path: Option<PathBuf>,
    login: String,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let app = App::open(config_path.as_deref())?;
    let user = app
        .store
        .find_user_by_login(&login.trim().to_lowercase())
        .await?
        .with_context(|| format!("no user with email or username '{login}'"))?;

    let subjects = app.store.list_subjects().await?;
    let progress = progress_by_subject(app.store.as_ref(), user.id, &subjects).await?;

    match format.as_str() {
        "json" => {
            let doc = progress_document(&user.username, &progress, Utc::now());
            match output {
                Some(path) => {
                    write_document(&doc, &path)?;
                    eprintln!("Progress written to {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&doc)?),
            }
        }
        "html" => {
            let html = generate_progress_html(&user.username, &progress, Utc::now());
            match output {
                Some(path) => {
                    write_html_report(&html, &path)?;
                    eprintln!("Progress written to {}", path.display());
                }
                None => println!("{html}"),
            }
        }
        "table" => print_table(&user.username, &progress),
        other => bail!("unknown format '{other}' (expected table, json or html)"),
    }

    Ok(())
}

fn print_table(username: &str, progress: &[SubjectProgress]) {
    println!("Progress for {username}");
    if progress.is_empty() {
        println!("No subjects yet.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Subject", "Completed", "Topics", "Progress"]);
    for p in progress {
        table.add_row(vec![
            Cell::new(&p.subject_name),
            Cell::new(p.completed),
            Cell::new(p.total),
            Cell::new(format!("{}%", p.percentage)),
        ]);
    }
    println!("{table}");
}
