//! The `semnotes notes` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use crate::app::App;
use crate::{AdminArgs, NotesAction};

pub async fn execute(
    config_path: Option<PathBuf>,
    action: NotesAction,
    admin: AdminArgs,
) -> Result<()> {
    let app = App::open(config_path.as_deref())?;
    let session = app.admin_session(&admin).await?;

    match action {
        NotesAction::Pending => {
            let notes = app.portal.pending_notes(&session).await?;
            if notes.is_empty() {
                println!("No notes awaiting moderation.");
                return Ok(());
            }

            let subjects = app.portal.list_subjects().await?;
            let mut table = Table::new();
            table.set_header(vec!["Id", "Subject", "Title", "Type", "Uploaded"]);
            for note in &notes {
                let subject = subjects
                    .iter()
                    .find(|s| s.id == note.subject)
                    .map_or("?", |s| s.name.as_str());
                table.add_row(vec![
                    Cell::new(note.id),
                    Cell::new(subject),
                    Cell::new(&note.title),
                    Cell::new(note.file_type),
                    Cell::new(note.created_at.format("%Y-%m-%d %H:%M")),
                ]);
            }
            println!("{table}");
        }
        NotesAction::Approve { id } => {
            let approval = app.portal.approve_note(&session, id).await?;
            println!("Approved '{}'", approval.note.title);
            match approval.recompute {
                Some(summary) => println!(
                    "Scores recomputed: {} updated, {} unchanged",
                    summary.updated, summary.unchanged
                ),
                None => println!("Score recomputation failed; the next scheduled pass will retry."),
            }
        }
        NotesAction::Reject { id } => {
            let note = app.portal.reject_note(&session, id).await?;
            println!("Rejected '{}'", note.title);
        }
    }

    Ok(())
}
