// Extraction collaborator and progress reporting seams

use async_trait::async_trait;
use tauri::Emitter;

use super::errors::DownloadError;
use super::models::{DownloadProgress, FetchRequest, ItemEvent, ListingRequest};

/// The external extraction/download tool, seen through its two call shapes.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Flat, metadata-only listing. Returns the raw info dict; a playlist has
    /// an `entries` array, a single video does not.
    async fn list_flat(&self, request: &ListingRequest) -> Result<serde_json::Value, DownloadError>;

    /// Fetch media to disk as described by `request.config`.
    async fn fetch(
        &self,
        request: &FetchRequest,
        progress: &dyn ProgressSink,
    ) -> Result<(), DownloadError>;
}

/// Receives download feedback for the page.
pub trait ProgressSink: Send + Sync {
    fn progress(&self, progress: DownloadProgress);

    fn item(&self, event: ItemEvent);
}

/// Progress emitter backed by Tauri events
pub struct ProgressEmitter {
    app_handle: tauri::AppHandle,
}

impl ProgressEmitter {
    pub fn new(app_handle: tauri::AppHandle) -> Self {
        Self { app_handle }
    }
}

impl ProgressSink for ProgressEmitter {
    fn progress(&self, progress: DownloadProgress) {
        let _ = self.app_handle.emit("download-progress", progress);
    }

    fn item(&self, event: ItemEvent) {
        let _ = self.app_handle.emit("download-item", event);
    }
}

