//! The `semnotes leaderboard` command.

use std::path::PathBuf;

use anyhow::{bail, Result};
use comfy_table::{Cell, Table};

use semnotes_core::leaderboard::Leaderboard;
use semnotes_report::{generate_leaderboard_html, leaderboard_document, write_document, write_html_report};

use crate::app::App;

pub async fn execute(
    config_path: Option<PathBuf>,
    limit: Option<usize>,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let app = App::open(config_path.as_deref())?;
    let board = app.portal.leaderboard(limit).await?;

    match format.as_str() {
        "json" => {
            let doc = leaderboard_document(&board);
            match output {
                Some(path) => {
                    write_document(&doc, &path)?;
                    eprintln!("Leaderboard written to {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&doc)?),
            }
        }
        "html" => {
            let html = generate_leaderboard_html(&board);
            match output {
                Some(path) => {
                    write_html_report(&html, &path)?;
                    eprintln!("Leaderboard written to {}", path.display());
                }
                None => println!("{html}"),
            }
        }
        "markdown" | "md" => println!("{}", board.to_markdown()),
        "table" => print_table(&board),
        other => bail!("unknown format '{other}' (expected table, json, markdown or html)"),
    }

    Ok(())
}

fn print_table(board: &Leaderboard) {
    if board.entries.is_empty() {
        println!("No students yet.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Rank", "Name", "Username", "Semester", "Score"]);
    for e in &board.entries {
        table.add_row(vec![
            Cell::new(e.rank),
            Cell::new(&e.name),
            Cell::new(&e.username),
            Cell::new(e.semester.map_or_else(|| "-".to_string(), |s| s.to_string())),
            Cell::new(e.score),
        ]);
    }
    println!("{table}");
}
