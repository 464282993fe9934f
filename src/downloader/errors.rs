// Error types for the extraction collaborator and the download target

use std::path::PathBuf;

use thiserror::Error;

use super::diagnostics::{diagnose_error, BlockingReason};

#[derive(Debug, Error)]
pub enum DownloadError {
    /// yt-dlp (or another required binary) not found on the host
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Empty or unsupported playlist/video URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The source server refused the request (403, 429, private, removed...)
    #[error("{}", .0.description())]
    Blocked(BlockingReason),

    /// Network timeout while talking to the source server
    #[error("Network timeout: the server is not responding")]
    NetworkTimeout,

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Command execution failed
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// Download directory could not be created
    #[error("Cannot create download folder {}: {source}", .path.display())]
    TargetDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unknown error with details
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl DownloadError {
    /// Message shown in a banner, with the first yt-dlp error line when we have one.
    pub fn user_message(&self, details: Option<&str>) -> String {
        let mut message = self.to_string();
        if let DownloadError::Blocked(reason) = self {
            if let Some(explanation) = reason.user_explanation() {
                message.push_str("\n\n");
                message.push_str(explanation);
            }
        }
        if let Some(line) = details.and_then(first_error_line) {
            message.push_str("\n\nDetails: ");
            message.push_str(line);
        }
        message
    }
}

/// First `ERROR:` line of yt-dlp stderr, falling back to the last non-empty line.
pub fn first_error_line(stderr: &str) -> Option<&str> {
    stderr
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| stderr.lines().map(str::trim).rev().find(|l| !l.is_empty()))
}

// Classify raw yt-dlp stderr. A missing binary never gets this far: it
// fails at spawn and becomes `ToolNotFound` there.
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        let lower = s.to_lowercase();

        if lower.contains("unsupported url") || lower.contains("is not a valid url") {
            return Self::InvalidUrl(first_error_line(&s).unwrap_or(&s).to_string());
        }

        match diagnose_error(&s) {
            Some(BlockingReason::NetworkTimeout) => Self::NetworkTimeout,
            Some(BlockingReason::Unknown) | None => {
                Self::Unknown(first_error_line(&s).unwrap_or("no output").to_string())
            }
            Some(reason) => Self::Blocked(reason),
        }
    }
}

impl From<DownloadError> for String {
    fn from(e: DownloadError) -> Self {
        e.to_string()
    }
}
