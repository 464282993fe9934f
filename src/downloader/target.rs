//! Download folder resolution.
//!
//! Blank input falls back to `~/Desktop/YouTube Downloads`. Whatever the
//! input, the returned directory exists when `Ok` is returned.

use std::path::{Path, PathBuf};

use super::errors::DownloadError;

pub const DEFAULT_FOLDER_NAME: &str = "YouTube Downloads";

/// `~/Desktop/YouTube Downloads`
pub fn default_download_dir() -> Result<PathBuf, DownloadError> {
    let home = home_dir()?;
    Ok(home.join("Desktop").join(DEFAULT_FOLDER_NAME))
}

/// Resolve user input to a directory and create it (with parents) if needed.
pub fn resolve_download_dir(input: Option<&str>) -> Result<PathBuf, DownloadError> {
    let path = match input.map(str::trim).filter(|s| !s.is_empty()) {
        None => default_download_dir()?,
        Some("~") => home_dir()?,
        Some(s) => match s.strip_prefix("~/") {
            Some(rest) => home_dir()?.join(rest),
            None => PathBuf::from(s),
        },
    };
    ensure_dir(&path)?;
    Ok(path)
}

/// `create_dir_all`, with the failing path attached to the error.
pub fn ensure_dir(path: &Path) -> Result<(), DownloadError> {
    std::fs::create_dir_all(path).map_err(|source| DownloadError::TargetDir {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "download folder ready");
    Ok(())
}

fn home_dir() -> Result<PathBuf, DownloadError> {
    dirs::home_dir().ok_or_else(|| DownloadError::TargetDir {
        path: PathBuf::from("~"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found"),
    })
}
