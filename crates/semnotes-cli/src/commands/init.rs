//! The `semnotes init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("semnotes.toml").exists() {
        println!("semnotes.toml already exists, skipping.");
    } else {
        std::fs::write("semnotes.toml", SAMPLE_CONFIG)?;
        println!("Created semnotes.toml");
    }

    std::fs::create_dir_all("catalog")?;
    let example_path = std::path::Path::new("catalog/example.toml");
    if example_path.exists() {
        println!("catalog/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_CATALOG)?;
        println!("Created catalog/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: semnotes register --email you@example.com --password <password>");
    println!("  2. Run: semnotes validate --catalog catalog/example.toml");
    println!("  3. Run: semnotes import --catalog catalog/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# semnotes configuration

store_path = "./semnotes-data/store.json"
uploads_dir = "./semnotes-data/uploads"

[scoring]
interval_secs = 3600
startup_delay_secs = 5

[scoring.weights]
read = 2
revise = 5
download = 1
comment = 1

# Hosted media for question papers and community notes.
# [media]
# cloud_name = "demo"
# api_key = "${SEMNOTES_MEDIA_KEY}"
# api_secret = "${SEMNOTES_MEDIA_SECRET}"
"#;

const EXAMPLE_CATALOG: &str = r#"[[subjects]]
name = "Operating Systems"
description = "Processes, memory and file systems"

[[subjects.topics]]
chapter = "Processes"
title = "Process states"
content = "<p>New, ready, running, waiting, terminated.</p>"

[[subjects.topics]]
chapter = "Processes"
title = "CPU scheduling"

[[subjects.topics]]
chapter = "Memory"
title = "Paging"

[[subjects.papers]]
title = "End Semester"
year = 2023
kind = "end"

[[subjects.papers.images]]
url = "https://res.example.com/demo/image/upload/v1/papers/os-end-2023-1.jpg"
public_id = "papers/os-end-2023-1"

[[subjects]]
name = "Database Systems"

[[subjects.topics]]
chapter = "SQL"
title = "Joins"

[[subjects.topics]]
chapter = "Normalization"
title = "Third normal form"
"#;
