// Downloader module - capability probe, target folder, listing, orchestration

pub mod diagnostics;
pub mod errors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod playlist;
pub mod progress;
pub mod target;
pub mod tools;
pub mod traits;
pub mod utils;
pub mod ytdlp;

pub use errors::DownloadError;
pub use models::{BatchReport, ItemReport, Listing, VideoEntry};
pub use orchestrator::Downloader;
pub use tools::{MergeCapability, ToolManager, ToolType};
pub use traits::{MediaExtractor, ProgressEmitter};
pub use ytdlp::YtDlpCli;
