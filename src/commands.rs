// Tauri commands: one per page action, each with its own result

use tauri::State;
use tauri_plugin_opener::OpenerExt;

use crate::downloader::playlist;
use crate::downloader::target::resolve_download_dir as resolve_dir;
use crate::downloader::tools::ToolInfo;
use crate::downloader::{BatchReport, ItemReport, Listing, ProgressEmitter, VideoEntry};
use crate::session::{AppState, SessionView};

#[tauri::command]
pub fn get_session(state: State<'_, AppState>) -> SessionView {
    state.run.view()
}

#[tauri::command]
pub async fn get_tools_status(state: State<'_, AppState>) -> Result<Vec<ToolInfo>, String> {
    Ok(state.tools.get_all_tools().await)
}

/// Resolve and create the folder typed by the user; blank means the default.
#[tauri::command]
pub fn resolve_download_dir(path: Option<String>) -> Result<String, String> {
    let dir = resolve_dir(path.as_deref())?;
    Ok(dir.to_string_lossy().to_string())
}

#[tauri::command]
pub async fn list_playlist(url: String, state: State<'_, AppState>) -> Result<Listing, String> {
    let entries = playlist::enumerate(state.extractor.as_ref(), &url, &state.headers)
        .await
        .map_err(|e| format!("Error processing playlist: {}", e.user_message(None)))?;

    if entries.is_empty() {
        tracing::info!(%url, "playlist has no videos");
    }
    Ok(Listing::from(entries))
}

#[tauri::command]
pub async fn download_video(
    entry: VideoEntry,
    index: usize,
    output_dir: Option<String>,
    state: State<'_, AppState>,
    app_handle: tauri::AppHandle,
) -> Result<ItemReport, String> {
    let dir = state.run.output_dir(output_dir.as_deref())?;
    let _guard = state.download_lock.lock().await;

    let sink = ProgressEmitter::new(app_handle);
    Ok(state.downloader().download_one(&entry, index, &dir, &sink).await)
}

#[tauri::command]
pub async fn download_all(
    entries: Vec<VideoEntry>,
    output_dir: Option<String>,
    state: State<'_, AppState>,
    app_handle: tauri::AppHandle,
) -> Result<BatchReport, String> {
    if entries.is_empty() {
        return Err("No videos to download".to_string());
    }
    let dir = state.run.output_dir(output_dir.as_deref())?;
    let _guard = state.download_lock.lock().await;

    tracing::info!(count = entries.len(), dir = %dir.display(), "starting batch download");
    let sink = ProgressEmitter::new(app_handle);
    Ok(state.downloader().download_all(&entries, &dir, &sink).await)
}

#[tauri::command]
pub fn open_download_dir(
    path: Option<String>,
    state: State<'_, AppState>,
    app_handle: tauri::AppHandle,
) -> Result<(), String> {
    let dir = state.run.output_dir(path.as_deref())?;
    app_handle
        .opener()
        .open_path(dir.to_string_lossy(), None::<&str>)
        .map_err(|e| format!("Failed to open folder: {e}"))
}
