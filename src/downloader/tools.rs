use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::utils::run_output_with_timeout;

const PROBE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Ffmpeg,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
        }
    }

    fn binary_name(&self) -> String {
        if cfg!(target_os = "windows") {
            format!("{}.exe", self.as_str())
        } else {
            self.as_str().to_string()
        }
    }

    /// Environment variables that point straight at the binary, checked in order
    fn env_overrides(&self) -> &'static [&'static str] {
        match self {
            ToolType::YtDlp => &["YTDLP_PATH"],
            ToolType::Ffmpeg => &["IMAGEIO_FFMPEG_EXE", "FFMPEG_BINARY"],
        }
    }

    fn version_arg(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "--version",
            ToolType::Ffmpeg => "-version",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub tool_type: ToolType,
    pub version: Option<String>,
    pub path: Option<String>,
    pub is_available: bool,
}

/// Whether separately fetched audio and video can be merged on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeCapability {
    Available(PathBuf),
    Unavailable,
}

impl MergeCapability {
    pub fn is_available(&self) -> bool {
        matches!(self, MergeCapability::Available(_))
    }

    pub fn tool_path(&self) -> Option<&Path> {
        match self {
            MergeCapability::Available(path) => Some(path),
            MergeCapability::Unavailable => None,
        }
    }
}

/// Locates external tools. A failed lookup is a `None`, never an error.
pub struct ToolManager {
    common_dirs: Vec<PathBuf>,
    use_env: bool,
    use_path_lookup: bool,
}

impl ToolManager {
    pub fn new() -> Self {
        Self {
            common_dirs: vec![
                PathBuf::from("/opt/homebrew/bin"), // Homebrew on Apple Silicon
                PathBuf::from("/usr/local/bin"),    // Homebrew on Intel Mac
                PathBuf::from("/usr/bin"),
            ],
            use_env: true,
            use_path_lookup: true,
        }
    }

    /// Only looks in `dirs`: no environment overrides, no PATH search.
    #[cfg(test)]
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self {
            common_dirs: dirs,
            use_env: false,
            use_path_lookup: false,
        }
    }

    pub async fn get_tool_info(&self, tool_type: ToolType) -> ToolInfo {
        let found = self.locate(tool_type).await;
        let (path, version) = match found {
            Some((path, version)) => (Some(path.to_string_lossy().to_string()), Some(version)),
            None => (None, None),
        };

        ToolInfo {
            name: tool_type.as_str().to_string(),
            tool_type,
            is_available: path.is_some(),
            version,
            path,
        }
    }

    pub async fn get_all_tools(&self) -> Vec<ToolInfo> {
        vec![
            self.get_tool_info(ToolType::YtDlp).await,
            self.get_tool_info(ToolType::Ffmpeg).await,
        ]
    }

    /// Probe for the merging tool once per session.
    pub async fn detect_merge_tool(&self) -> MergeCapability {
        match self.locate(ToolType::Ffmpeg).await {
            Some((path, version)) => {
                tracing::info!(path = %path.display(), %version, "ffmpeg detected, merging enabled");
                MergeCapability::Available(path)
            }
            None => {
                tracing::warn!("ffmpeg not detected, falling back to progressive streams");
                MergeCapability::Unavailable
            }
        }
    }

    /// Path of the first candidate that answers its version flag, plus that version.
    pub async fn locate(&self, tool_type: ToolType) -> Option<(PathBuf, String)> {
        for candidate in self.candidates(tool_type).await {
            if let Some(version) = Self::probe(&candidate, tool_type).await {
                return Some((candidate, version));
            }
        }
        None
    }

    async fn candidates(&self, tool_type: ToolType) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        // 1. Explicit overrides
        if self.use_env {
            for var in tool_type.env_overrides() {
                if let Ok(value) = std::env::var(var) {
                    if !value.trim().is_empty() {
                        candidates.push(PathBuf::from(value.trim()));
                    }
                }
            }
        }

        // 2. Common paths
        let binary = tool_type.binary_name();
        for dir in &self.common_dirs {
            let path = dir.join(&binary);
            if path.exists() {
                candidates.push(path);
            }
        }

        // 3. PATH
        if self.use_path_lookup {
            if let Some(path) = which(&binary).await {
                candidates.push(path);
            }
        }

        candidates
    }

    async fn probe(path: &Path, tool_type: ToolType) -> Option<String> {
        let program = path.to_string_lossy();
        let args = vec![tool_type.version_arg().to_string()];
        match run_output_with_timeout(&program, args, PROBE_TIMEOUT_SECS).await {
            Ok(output) if output.status.success() => {
                let out = String::from_utf8_lossy(&output.stdout);
                Some(out.lines().next().unwrap_or("").trim().to_string())
            }
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(candidate = %program, error = %e, "tool probe failed");
                None
            }
        }
    }
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

async fn which(binary: &str) -> Option<PathBuf> {
    let finder = if cfg!(target_os = "windows") { "where" } else { "which" };
    let output = run_output_with_timeout(finder, vec![binary.to_string()], PROBE_TIMEOUT_SECS)
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(PathBuf::from(first))
    }
}
