// Orchestrator: per-video download with isolated failures

use std::collections::BTreeMap;
use std::path::Path;

use super::errors::DownloadError;
use super::format_selector::FormatSelector;
use super::models::{BatchReport, FetchRequest, ItemEvent, ItemReport, ItemStatus, VideoEntry};
use super::tools::MergeCapability;
use super::traits::{MediaExtractor, ProgressSink};

pub struct Downloader<'a> {
    extractor: &'a dyn MediaExtractor,
    merge: &'a MergeCapability,
    headers: &'a BTreeMap<String, String>,
}

impl<'a> Downloader<'a> {
    pub fn new(
        extractor: &'a dyn MediaExtractor,
        merge: &'a MergeCapability,
        headers: &'a BTreeMap<String, String>,
    ) -> Self {
        Self {
            extractor,
            merge,
            headers,
        }
    }

    /// Download one video. Failure is reported in the returned item, never raised.
    pub async fn download_one(
        &self,
        entry: &VideoEntry,
        index: usize,
        output_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> ItemReport {
        let url = entry.watch_url();
        let request = FetchRequest {
            id: entry.id.clone(),
            url: url.clone(),
            config: FormatSelector::build_config(self.merge, output_dir, self.headers),
        };

        sink.item(ItemEvent {
            id: entry.id.clone(),
            index,
            status: ItemStatus::InProgress,
            message: format!("Downloading: {}", entry.title),
        });

        let (status, message, retryable) = match self.extractor.fetch(&request, sink).await {
            Ok(()) => {
                tracing::info!(id = %entry.id, title = %entry.title, "downloaded");
                (ItemStatus::Succeeded, format!("Downloaded: {}", entry.title), true)
            }
            Err(e) => {
                tracing::warn!(id = %entry.id, backend = self.extractor.name(), error = %e, "download failed");
                let retryable = !matches!(&e, DownloadError::Blocked(reason) if reason.is_permanent());
                (
                    ItemStatus::Failed,
                    format!("Error downloading {}: {}", entry.title, e.user_message(None)),
                    retryable,
                )
            }
        };

        sink.item(ItemEvent {
            id: entry.id.clone(),
            index,
            status,
            message: message.clone(),
        });

        ItemReport {
            id: entry.id.clone(),
            title: entry.title.clone(),
            url,
            status,
            message,
            retryable,
        }
    }

    /// Download every entry, strictly one after another.
    pub async fn download_all(
        &self,
        entries: &[VideoEntry],
        output_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> BatchReport {
        for (index, entry) in entries.iter().enumerate() {
            sink.item(ItemEvent {
                id: entry.id.clone(),
                index,
                status: ItemStatus::Pending,
                message: String::new(),
            });
        }

        let mut items = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            items.push(self.download_one(entry, index, output_dir, sink).await);
        }

        let report = BatchReport::from(items);
        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "batch download completed"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::diagnostics::BlockingReason;
    use crate::downloader::format_selector::{MERGE_FORMAT, PROGRESSIVE_FORMAT};
    use crate::downloader::models::{DownloadProgress, ListingRequest};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Records every fetch; fails for ids listed in `failing`.
    struct RecordingExtractor {
        failing: Vec<&'static str>,
        permanent: bool,
        fetched: Mutex<Vec<FetchRequest>>,
    }

    impl RecordingExtractor {
        fn failing(ids: Vec<&'static str>) -> Self {
            Self {
                failing: ids,
                permanent: false,
                fetched: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MediaExtractor for RecordingExtractor {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn list_flat(&self, _: &ListingRequest) -> Result<serde_json::Value, DownloadError> {
            unreachable!("orchestrator never lists")
        }

        async fn fetch(&self, request: &FetchRequest, _: &dyn ProgressSink) -> Result<(), DownloadError> {
            self.fetched.lock().unwrap().push(request.clone());
            if self.failing.contains(&request.id.as_str()) {
                if self.permanent {
                    return Err(DownloadError::Blocked(BlockingReason::VideoUnavailable));
                }
                return Err(DownloadError::ExecutionError("boom".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        items: Mutex<Vec<ItemEvent>>,
    }

    impl ProgressSink for CollectingSink {
        fn progress(&self, _: DownloadProgress) {}

        fn item(&self, event: ItemEvent) {
            self.items.lock().unwrap().push(event);
        }
    }

    fn entries(ids: &[&str]) -> Vec<VideoEntry> {
        ids.iter()
            .map(|id| VideoEntry::new(*id, format!("Title {id}")))
            .collect()
    }

    #[tokio::test]
    async fn batch_continues_past_failure() {
        let extractor = RecordingExtractor::failing(vec!["b"]);
        let merge = MergeCapability::Unavailable;
        let headers = BTreeMap::new();
        let sink = CollectingSink::default();
        let downloader = Downloader::new(&extractor, &merge, &headers);

        let report = downloader
            .download_all(&entries(&["a", "b", "c"]), Path::new("/out"), &sink)
            .await;

        let fetched: Vec<String> = extractor
            .fetched
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(fetched, ["a", "b", "c"]);

        let statuses: Vec<ItemStatus> = report.items.iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            [ItemStatus::Succeeded, ItemStatus::Failed, ItemStatus::Succeeded]
        );
        assert_eq!((report.succeeded, report.failed), (2, 1));
        assert!(report.items[1].message.starts_with("Error downloading Title b"));
        assert!(report.items[1].retryable);
    }

    #[tokio::test]
    async fn item_events_follow_lifecycle() {
        let extractor = RecordingExtractor::failing(vec!["b"]);
        let merge = MergeCapability::Unavailable;
        let headers = BTreeMap::new();
        let sink = CollectingSink::default();
        let downloader = Downloader::new(&extractor, &merge, &headers);

        downloader
            .download_all(&entries(&["a", "b"]), Path::new("/out"), &sink)
            .await;

        let events: Vec<(String, ItemStatus)> = sink
            .items
            .lock()
            .unwrap()
            .iter()
            .map(|e| (e.id.clone(), e.status))
            .collect();
        let expected = [
            ("a", ItemStatus::Pending),
            ("b", ItemStatus::Pending),
            ("a", ItemStatus::InProgress),
            ("a", ItemStatus::Succeeded),
            ("b", ItemStatus::InProgress),
            ("b", ItemStatus::Failed),
        ];
        let expected: Vec<(String, ItemStatus)> =
            expected.iter().map(|(id, s)| (id.to_string(), *s)).collect();
        assert_eq!(events, expected);
    }

    #[tokio::test]
    async fn repeated_video_keeps_its_own_index() {
        let extractor = RecordingExtractor::failing(Vec::new());
        let merge = MergeCapability::Unavailable;
        let headers = BTreeMap::new();
        let sink = CollectingSink::default();

        Downloader::new(&extractor, &merge, &headers)
            .download_all(&entries(&["a", "a"]), Path::new("/out"), &sink)
            .await;

        let finished: Vec<(String, usize)> = sink
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.status == ItemStatus::Succeeded)
            .map(|e| (e.id.clone(), e.index))
            .collect();
        assert_eq!(finished, [("a".to_string(), 0), ("a".to_string(), 1)]);
    }

    #[tokio::test]
    async fn config_follows_merge_capability() {
        let extractor = RecordingExtractor::failing(Vec::new());
        let headers = BTreeMap::from([("User-Agent".to_string(), "ua".to_string())]);
        let sink = CollectingSink::default();
        let entry = VideoEntry::new("a", "T1");

        let merge = MergeCapability::Available(PathBuf::from("/usr/bin/ffmpeg"));
        Downloader::new(&extractor, &merge, &headers)
            .download_one(&entry, 0, Path::new("/out"), &sink)
            .await;
        let unmerged = MergeCapability::Unavailable;
        Downloader::new(&extractor, &unmerged, &headers)
            .download_one(&entry, 0, Path::new("/out"), &sink)
            .await;

        let fetched = extractor.fetched.lock().unwrap();
        assert_eq!(fetched[0].url, "https://www.youtube.com/watch?v=a");
        assert_eq!(fetched[0].config.format_selector, MERGE_FORMAT);
        assert_eq!(fetched[0].config.merge_tool_path, Some(PathBuf::from("/usr/bin/ffmpeg")));
        assert_eq!(fetched[1].config.format_selector, PROGRESSIVE_FORMAT);
        assert_eq!(fetched[1].config.merge_tool_path, None);
        assert_eq!(fetched[1].config.headers, headers);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retryable() {
        let mut extractor = RecordingExtractor::failing(vec!["gone"]);
        extractor.permanent = true;
        let merge = MergeCapability::Unavailable;
        let headers = BTreeMap::new();
        let sink = CollectingSink::default();

        let report = Downloader::new(&extractor, &merge, &headers)
            .download_one(&VideoEntry::new("gone", "Removed"), 3, Path::new("/out"), &sink)
            .await;

        assert_eq!(report.status, ItemStatus::Failed);
        assert!(!report.retryable);
        assert!(report.message.contains("no longer available"));
    }
}
