//! Shareable exports of semnotes data.
//!
//! `html` renders self-contained pages; `export` builds versioned JSON
//! documents for other tools.

pub mod export;
pub mod html;

pub use export::{leaderboard_document, progress_document, write_document, EXPORT_VERSION};
pub use html::{generate_leaderboard_html, generate_progress_html, write_html_report};
