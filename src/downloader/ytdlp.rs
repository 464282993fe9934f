// yt-dlp CLI adapter
//
// Both call shapes spawn the native `yt-dlp` binary. Listing reads the
// single JSON document printed by `-J`; fetching streams `--newline`
// progress lines to the sink while stderr is collected for diagnostics.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use super::errors::DownloadError;
use super::models::{DownloadProgress, FetchRequest, ListingRequest};
use super::progress::parse_ytdlp_progress;
use super::traits::{MediaExtractor, ProgressSink};
use super::utils::header_args;

/// Socket timeout handed to yt-dlp; we do not add one of our own.
const SOCKET_TIMEOUT_SECS: &str = "30";

pub struct YtDlpCli {
    ytdlp_path: PathBuf,
}

impl YtDlpCli {
    pub fn new(ytdlp_path: PathBuf) -> Self {
        Self { ytdlp_path }
    }

    pub fn listing_args(request: &ListingRequest) -> Vec<String> {
        let mut args = vec![
            "-J".to_string(),
            "--flat-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            SOCKET_TIMEOUT_SECS.to_string(),
        ];
        args.extend(header_args(&request.headers));
        args.push(request.url.clone());
        args
    }

    pub fn fetch_args(request: &FetchRequest) -> Vec<String> {
        let config = &request.config;
        let mut args = vec![
            "-f".to_string(),
            config.format_selector.clone(),
            "-o".to_string(),
            config.output_template.clone(),
            "--no-playlist".to_string(),
            "--newline".to_string(),
            "--socket-timeout".to_string(),
            SOCKET_TIMEOUT_SECS.to_string(),
        ];
        if let Some(tool) = &config.merge_tool_path {
            args.push("--ffmpeg-location".to_string());
            args.push(tool.to_string_lossy().to_string());
        }
        args.extend(header_args(&config.headers));
        args.push(request.url.clone());
        args
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.ytdlp_path);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, e: std::io::Error) -> DownloadError {
        if e.kind() == std::io::ErrorKind::NotFound {
            DownloadError::ToolNotFound(format!("{} ({})", self.ytdlp_path.display(), e))
        } else {
            DownloadError::ExecutionError(format!("Failed to start yt-dlp: {}", e))
        }
    }
}

#[async_trait]
impl MediaExtractor for YtDlpCli {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn list_flat(&self, request: &ListingRequest) -> Result<serde_json::Value, DownloadError> {
        let args = Self::listing_args(request);
        tracing::debug!(url = %request.url, "listing playlist");

        let output = self
            .command(&args)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            tracing::warn!(url = %request.url, %stderr, "yt-dlp listing failed");
            return Err(stderr.into());
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| DownloadError::ParseError(format!("Invalid JSON: {}", e)))
    }

    async fn fetch(
        &self,
        request: &FetchRequest,
        progress: &dyn ProgressSink,
    ) -> Result<(), DownloadError> {
        let args = Self::fetch_args(request);
        tracing::info!(url = %request.url, format = %request.config.format_selector, "starting yt-dlp");

        let mut child = self.command(&args).spawn().map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::ExecutionError("Failed to capture stdout".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::ExecutionError("Failed to capture stderr".to_string()))?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            String::from_utf8_lossy(&buf).to_string()
        });

        // Lines are read as bytes: file names in yt-dlp output are not always UTF-8,
        // and stdout must be drained to EOF or the child blocks on a full pipe.
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end();
                    if let Some((percent, status)) = parse_ytdlp_progress(line) {
                        progress.progress(DownloadProgress {
                            id: request.id.clone(),
                            percent,
                            status,
                        });
                    }
                    if line.contains("[Merger]") || line.contains("Destination") {
                        tracing::debug!("[yt-dlp] {}", line);
                    }
                }
                Err(e) => {
                    tracing::warn!(url = %request.url, error = %e, "failed to read yt-dlp output");
                    let _ = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await;
                    break;
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DownloadError::ExecutionError(format!("Process error: {}", e)))?;
        let stderr_output = stderr_task.await.unwrap_or_default();

        if status.success() {
            progress.progress(DownloadProgress {
                id: request.id.clone(),
                percent: 100.0,
                status: "Download complete".to_string(),
            });
            return Ok(());
        }

        tracing::warn!(url = %request.url, stderr = %stderr_output, "yt-dlp download failed");
        Err(stderr_output.into())
    }
}
