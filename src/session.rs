//! Session-scoped configuration.
//!
//! Derived once at startup and handed to every command through Tauri's
//! managed state; nothing here is mutated afterwards.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::downloader::target::{ensure_dir, resolve_download_dir};
use crate::downloader::utils::default_headers;
use crate::downloader::{
    DownloadError, Downloader, MediaExtractor, MergeCapability, ToolManager, ToolType, YtDlpCli,
};

#[derive(Debug, Clone)]
pub struct RunState {
    pub download_dir: PathBuf,
    pub merge: MergeCapability,
}

/// What the page needs to render the header banners
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub download_dir: String,
    pub merge_available: bool,
    pub merge_tool_path: Option<String>,
}

impl RunState {
    pub async fn detect(tools: &ToolManager) -> Result<Self, DownloadError> {
        let download_dir = resolve_download_dir(None)?;
        let merge = tools.detect_merge_tool().await;
        Ok(Self {
            download_dir,
            merge,
        })
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            download_dir: self.download_dir.to_string_lossy().to_string(),
            merge_available: self.merge.is_available(),
            merge_tool_path: self
                .merge
                .tool_path()
                .map(|p| p.to_string_lossy().to_string()),
        }
    }

    /// Folder for a download: the user's input when given, else the session default.
    pub fn output_dir(&self, input: Option<&str>) -> Result<PathBuf, DownloadError> {
        match input.map(str::trim).filter(|s| !s.is_empty()) {
            Some(path) => resolve_download_dir(Some(path)),
            None => {
                // The default may have been removed since startup
                ensure_dir(&self.download_dir)?;
                Ok(self.download_dir.clone())
            }
        }
    }
}

pub struct AppState {
    pub run: RunState,
    pub headers: BTreeMap<String, String>,
    pub extractor: Arc<dyn MediaExtractor>,
    pub tools: ToolManager,
    /// Held for the whole of a download command; one writer at a time.
    pub download_lock: Mutex<()>,
}

impl AppState {
    pub async fn initialize() -> Result<Self, DownloadError> {
        let tools = ToolManager::new();
        let run = RunState::detect(&tools).await?;

        let ytdlp_path = match tools.locate(ToolType::YtDlp).await {
            Some((path, version)) => {
                tracing::info!(path = %path.display(), %version, "yt-dlp found");
                path
            }
            None => {
                tracing::warn!("yt-dlp not found, listing and downloads will fail until it is installed");
                PathBuf::from("yt-dlp")
            }
        };

        tracing::info!(download_dir = %run.download_dir.display(), merge = run.merge.is_available(), "session ready");

        Ok(Self::new(run, Arc::new(YtDlpCli::new(ytdlp_path)), tools))
    }

    pub fn new(run: RunState, extractor: Arc<dyn MediaExtractor>, tools: ToolManager) -> Self {
        Self {
            run,
            headers: default_headers(),
            extractor,
            tools,
            download_lock: Mutex::new(()),
        }
    }

    pub fn downloader(&self) -> Downloader<'_> {
        Downloader::new(self.extractor.as_ref(), &self.run.merge, &self.headers)
    }
}
