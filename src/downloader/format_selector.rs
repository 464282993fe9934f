// FormatSelector - picks the yt-dlp selector for this host
//
// Two fixed variants, both capped at 1080p:
// - merge-capable: best video track + best audio track, merged by ffmpeg
// - progressive-only: best pre-combined mp4 stream, no merge step

use std::collections::BTreeMap;
use std::path::Path;

use super::models::DownloadConfig;
use super::tools::MergeCapability;

pub const MERGE_FORMAT: &str = "bestvideo[height<=1080]+bestaudio/best";
pub const PROGRESSIVE_FORMAT: &str = "best[ext=mp4][height<=1080]";
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

pub struct FormatSelector;

impl FormatSelector {
    pub fn selector_for(merge: &MergeCapability) -> &'static str {
        if merge.is_available() {
            MERGE_FORMAT
        } else {
            PROGRESSIVE_FORMAT
        }
    }

    /// Fresh config for one download attempt into `output_dir`.
    pub fn build_config(
        merge: &MergeCapability,
        output_dir: &Path,
        headers: &BTreeMap<String, String>,
    ) -> DownloadConfig {
        DownloadConfig {
            format_selector: Self::selector_for(merge).to_string(),
            output_template: output_dir.join(OUTPUT_TEMPLATE).to_string_lossy().to_string(),
            merge_tool_path: merge.tool_path().map(Path::to_path_buf),
            headers: headers.clone(),
        }
    }
}
