//! Local staging of uploaded files between download and send.
//!
//! Staged files live under a staging directory (created on demand) and are
//! deleted by the engine after the send attempt or on cancellation.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::StagingError;

/// Staging directory handle.
pub struct Staging {
    dir: PathBuf,
}

impl Staging {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write fetched bytes under the staging directory, creating it if
    /// absent. Returns the absolute path of the staged file.
    pub async fn stage(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, StagingError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        fs::write(&path, bytes).await?;
        let absolute = fs::canonicalize(&path).await?;
        tracing::info!(path = %absolute.display(), size = bytes.len(), "Staged file");
        Ok(absolute)
    }

    /// Delete a staged file if it still exists. Failures are logged, not
    /// surfaced.
    pub async fn remove(&self, path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => tracing::info!(path = %path.display(), "Removed staged file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), "Failed to remove staged file: {e}"),
        }
    }
}

/// The filename extension including the leading dot (`".pdf"`), or empty if
/// the name has no extension. A leading dot alone does not count.
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx..],
        _ => "",
    }
}

/// Synthetic filename for a photo upload, which carries no original name.
pub fn photo_filename(unix_ts: i64) -> String {
    format!("photo_{unix_ts}.jpg")
}

/// Compute the name a staged file is written under.
///
/// A user-chosen name gets the upload's extension appended unless it already
/// ends with it (case-sensitive); otherwise the original name is kept.
pub fn final_filename(original: &str, extension: &str, new_name: Option<&str>) -> String {
    match new_name {
        Some(name) if !extension.is_empty() && !name.ends_with(extension) => {
            format!("{name}{extension}")
        }
        Some(name) => name.to_string(),
        None => original.to_string(),
    }
}
