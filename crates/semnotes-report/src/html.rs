//! HTML report generator.
//!
//! Produces self-contained HTML files with all CSS/JS inlined.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

use semnotes_core::leaderboard::Leaderboard;
use semnotes_core::progress::SubjectProgress;

/// How many leaders the score chart shows.
const CHART_ENTRIES: usize = 10;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn open_page(html: &mut String, title: &str) {
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>semnotes: {}</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");
}

fn close_page(html: &mut String) {
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");
    html.push_str("</body>\n</html>");
}

/// Generate the leaderboard page.
pub fn generate_leaderboard_html(board: &Leaderboard) -> String {
    let mut html = String::new();
    open_page(&mut html, "leaderboard");

    html.push_str("<header>\n<h1>Leaderboard</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} students | generated {}</p>\n",
        board.entries.len(),
        board.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    if board.entries.is_empty() {
        html.push_str("<p class=\"empty\">No students yet.</p>\n");
        close_page(&mut html);
        return html;
    }

    let top = board.entries.first().map_or(0, |e| e.score);
    let bars: Vec<(&str, f64, String)> = board
        .entries
        .iter()
        .take(CHART_ENTRIES)
        .map(|e| {
            let label = if e.name.is_empty() { &e.username } else { &e.name };
            let fraction = if top == 0 {
                0.0
            } else {
                e.score as f64 / top as f64
            };
            (label.as_str(), fraction, e.score.to_string())
        })
        .collect();
    html.push_str("<section class=\"chart\">\n");
    html.push_str(&generate_bar_chart(&bars));
    html.push_str("</section>\n");

    html.push_str("<section class=\"results\">\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Rank</th><th onclick=\"sortTable(1)\">Name</th><th onclick=\"sortTable(2)\">Username</th><th onclick=\"sortTable(3)\">Semester</th><th onclick=\"sortTable(4)\">Score</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for e in &board.entries {
        let class = if e.rank <= 3 { " class=\"podium\"" } else { "" };
        let semester = e
            .semester
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        html.push_str(&format!(
            "<tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            e.rank,
            html_escape(&e.name),
            html_escape(&e.username),
            semester,
            e.score
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    close_page(&mut html);
    html
}

/// Generate a student's per-subject progress page.
pub fn generate_progress_html(
    student: &str,
    progress: &[SubjectProgress],
    generated_at: DateTime<Utc>,
) -> String {
    let mut html = String::new();
    open_page(&mut html, &format!("progress of {student}"));

    html.push_str("<header>\n");
    html.push_str(&format!("<h1>Progress: {}</h1>\n", html_escape(student)));
    let completed: usize = progress.iter().map(|p| p.completed).sum();
    let total: usize = progress.iter().map(|p| p.total).sum();
    html.push_str(&format!(
        "<p class=\"meta\">{} subjects | {completed}/{total} topics completed | generated {}</p>\n",
        progress.len(),
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    let bars: Vec<(&str, f64, String)> = progress
        .iter()
        .map(|p| {
            (
                p.subject_name.as_str(),
                f64::from(p.percentage) / 100.0,
                format!("{}%", p.percentage),
            )
        })
        .collect();
    if !bars.is_empty() {
        html.push_str(&generate_bar_chart(&bars));
    }

    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Subject</th><th onclick=\"sortTable(1)\">Completed</th><th onclick=\"sortTable(2)\">Topics</th><th onclick=\"sortTable(3)\">Progress</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for p in progress {
        let class = if p.total > 0 && p.completed == p.total {
            "pass"
        } else {
            ""
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}%</td></tr>\n",
            class,
            html_escape(&p.subject_name),
            p.completed,
            p.total,
            p.percentage
        ));
    }
    html.push_str("</tbody></table>\n");

    close_page(&mut html);
    html
}

/// Write a rendered page to a file, creating parent directories.
pub fn write_html_report(html: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

/// Horizontal bars; `fraction` is clamped to 0..=1.
fn generate_bar_chart(bars: &[(&str, f64, String)]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let total_height = bars.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (label, fraction, caption)) in bars.iter().enumerate() {
        let fraction = fraction.clamp(0.0, 1.0);
        let y = i * (bar_height + padding) + padding;
        let width = (fraction * max_width as f64) as usize;

        let color = if fraction >= 0.8 {
            "#22c55e"
        } else if fraction >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(label)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            html_escape(caption)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --podium: #fef9c3; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --podium: #713f12; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .empty { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.podium { background: var(--podium); font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = isNaN(na) || isNaN(nb) ? va.localeCompare(vb) : na - nb;
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
