//! Local storage for topic attachments.
//!
//! Files land in one flat directory as `<unix-millis>-<sanitized name>` and
//! are served under [`PUBLIC_PREFIX`].

use std::path::{Path, PathBuf};

use chrono::Utc;

use semnotes_core::model::Attachment;

/// URL path prefix attachments are served under.
pub const PUBLIC_PREFIX: &str = "/uploads/";

/// A file received from a form upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(original_name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            original_name: original_name.to_string(),
            bytes: bytes.into(),
        }
    }
}

/// Replace every character other than ASCII letters, digits and `.` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
        .collect()
}

/// The uploads directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Get the uploads directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where an attachment lives on disk.
    pub fn disk_path(&self, attachment: &Attachment) -> PathBuf {
        self.dir.join(&attachment.filename)
    }

    /// Write a file and describe it as an attachment.
    ///
    /// The directory is created on first use. A name already taken in the
    /// same millisecond gets the next free timestamp.
    pub async fn save(&self, upload: &FileUpload) -> std::io::Result<Attachment> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let safe_name = sanitize_file_name(&upload.original_name);
        let mut stamp = Utc::now().timestamp_millis();
        let filename = loop {
            let candidate = format!("{stamp}-{safe_name}");
            if !tokio::fs::try_exists(self.dir.join(&candidate)).await? {
                break candidate;
            }
            stamp += 1;
        };

        tokio::fs::write(self.dir.join(&filename), &upload.bytes).await?;
        tracing::debug!(file = %filename, bytes = upload.bytes.len(), "attachment saved");

        Ok(Attachment {
            path: format!("{PUBLIC_PREFIX}{filename}"),
            filename,
            original_name: upload.original_name.clone(),
        })
    }

    /// Delete an attachment's file. Returns `false` if it was already gone.
    pub async fn remove(&self, attachment: &Attachment) -> std::io::Result<bool> {
        if attachment.filename.contains(['/', '\\']) {
            tracing::warn!(file = %attachment.filename, "refusing to remove path outside uploads");
            return Ok(false);
        }
        match tokio::fs::remove_file(self.disk_path(attachment)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Delete every attachment, logging failures.
    pub async fn remove_all(&self, attachments: &[Attachment]) {
        for attachment in attachments {
            if let Err(e) = self.remove(attachment).await {
                tracing::warn!(file = %attachment.filename, "failed to remove attachment: {e}");
            }
        }
    }
}
