// Common data models for the playlist downloader

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One member of a playlist, as listed by a flat extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    pub id: String,
    pub title: String,
}

impl VideoEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }

    /// Canonical watch URL; the flat listing carries no playable URL.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

/// Result of a playlist lookup, as shown to the page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Listing {
    Found { entries: Vec<VideoEntry> },
    Empty,
}

impl From<Vec<VideoEntry>> for Listing {
    fn from(entries: Vec<VideoEntry>) -> Self {
        if entries.is_empty() {
            Listing::Empty
        } else {
            Listing::Found { entries }
        }
    }
}

/// Options for a single media fetch. Built fresh per attempt, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    /// yt-dlp `-f` selector
    pub format_selector: String,
    /// yt-dlp `-o` template, absolute (`<dir>/%(title)s.%(ext)s`)
    pub output_template: String,
    /// Directory or binary handed to `--ffmpeg-location`
    pub merge_tool_path: Option<PathBuf>,
    pub headers: BTreeMap<String, String>,
}

/// Request for a flat, metadata-only listing
#[derive(Debug, Clone)]
pub struct ListingRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

/// Request for a media fetch
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Video id, used to tag progress events
    pub id: String,
    pub url: String,
    pub config: DownloadConfig,
}

/// Per-item lifecycle, tracked only for UI feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

/// Outcome of one download attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemReport {
    pub id: String,
    pub title: String,
    pub url: String,
    pub status: ItemStatus,
    pub message: String,
    /// False when retrying cannot help (removed, DRM)
    pub retryable: bool,
}

/// Outcome of a "download all" run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
    pub succeeded: usize,
    pub failed: usize,
}

impl From<Vec<ItemReport>> for BatchReport {
    fn from(items: Vec<ItemReport>) -> Self {
        let succeeded = items
            .iter()
            .filter(|i| i.status == ItemStatus::Succeeded)
            .count();
        let failed = items.len() - succeeded;
        Self {
            items,
            succeeded,
            failed,
        }
    }
}

/// Download progress information (`download-progress` event)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub id: String,
    pub percent: f32,
    pub status: String,
}

/// Item state change (`download-item` event)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemEvent {
    pub id: String,
    pub index: usize,
    pub status: ItemStatus,
    pub message: String,
}
