//! The `semnotes register` command.

use std::path::PathBuf;

use anyhow::Result;

use semnotes_core::model::Role;
use semnotes_portal::accounts::RegisterRequest;

use crate::app::App;

pub async fn execute(
    config_path: Option<PathBuf>,
    email: String,
    password: String,
    name: String,
    semester: Option<u8>,
) -> Result<()> {
    let app = App::open(config_path.as_deref())?;

    let user = app
        .portal
        .register(RegisterRequest {
            name,
            email,
            semester,
            password,
        })
        .await?;

    match user.role {
        Role::Admin => println!("Created main admin account '{}'", user.username),
        Role::Student => println!(
            "Registered student '{}' (semester {})",
            user.username,
            user.semester.unwrap_or(1)
        ),
    }
    Ok(())
}
