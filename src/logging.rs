pub const DEFAULT_FILTER: &str = "playlist_downloader_lib=info,tauri=info";

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    // A second call (tests, re-entry) leaves the first subscriber in place
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
