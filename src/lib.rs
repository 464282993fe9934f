mod commands;
mod downloader;
mod logging;
mod session;

use tauri::Manager;
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

use downloader::DownloadError;
use session::AppState;

fn startup_failure_message(err: &DownloadError) -> String {
    format!("Playlist Downloader cannot start.\n\n{err}\n\nFix the problem above and start the app again.")
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    logging::init_tracing();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            match tauri::async_runtime::block_on(AppState::initialize()) {
                Ok(state) => {
                    app.manage(state);
                }
                Err(e) => {
                    // No download folder, no session: tell the user, then quit
                    tracing::error!(error = %e, "startup failed");
                    let handle = app.handle().clone();
                    app.dialog()
                        .message(startup_failure_message(&e))
                        .title("Playlist Downloader")
                        .kind(MessageDialogKind::Error)
                        .show(move |_| handle.exit(1));
                }
            }
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_session,
            commands::get_tools_status,
            commands::resolve_download_dir,
            commands::list_playlist,
            commands::download_video,
            commands::download_all,
            commands::open_download_dir,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn startup_failure_names_the_folder() {
        let err = DownloadError::TargetDir {
            path: PathBuf::from("/readonly/YouTube Downloads"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        };

        let message = startup_failure_message(&err);

        assert!(message.starts_with("Playlist Downloader cannot start."));
        assert!(message.contains("Cannot create download folder /readonly/YouTube Downloads: permission denied"));
    }
}
