//! Playlist enumeration.
//!
//! Asks the extraction collaborator for a flat listing and normalizes the
//! info dict to an ordered list of [`VideoEntry`]. A URL that resolves to a
//! single video has no `entries` field and yields one entry.

use std::collections::BTreeMap;

use serde_json::Value;

use super::errors::DownloadError;
use super::models::{ListingRequest, VideoEntry};
use super::traits::MediaExtractor;

/// List the videos behind `url`, in the collaborator's order.
pub async fn enumerate(
    extractor: &dyn MediaExtractor,
    url: &str,
    headers: &BTreeMap<String, String>,
) -> Result<Vec<VideoEntry>, DownloadError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(DownloadError::InvalidUrl("please enter a playlist URL".to_string()));
    }

    let request = ListingRequest {
        url: url.to_string(),
        headers: headers.clone(),
    };
    let info = extractor.list_flat(&request).await?;
    let entries = normalize_listing(&info);

    tracing::info!(%url, count = entries.len(), backend = extractor.name(), "playlist enumerated");
    Ok(entries)
}

/// Turn a flat info dict into entries.
pub fn normalize_listing(info: &Value) -> Vec<VideoEntry> {
    match info.get("entries") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| to_entry(item, i))
            .collect(),
        Some(Value::Null) | None => to_entry(info, 0).into_iter().collect(),
        Some(other) => {
            tracing::warn!(kind = ?other, "unexpected `entries` field, ignoring listing");
            Vec::new()
        }
    }
}

fn to_entry(item: &Value, position: usize) -> Option<VideoEntry> {
    let id = match item.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id,
        _ => {
            tracing::warn!(position = position + 1, "skipping listing entry without id");
            return None;
        }
    };
    let title = item
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Video {}", position + 1));
    Some(VideoEntry::new(id, title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::models::{FetchRequest, ListingRequest};
    use crate::downloader::traits::ProgressSink;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct StubListing {
        response: Result<Value, String>,
        seen: Mutex<Vec<ListingRequest>>,
    }

    impl StubListing {
        fn ok(response: Value) -> Self {
            Self {
                response: Ok(response),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MediaExtractor for StubListing {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn list_flat(&self, request: &ListingRequest) -> Result<Value, DownloadError> {
            self.seen.lock().unwrap().push(request.clone());
            self.response.clone().map_err(DownloadError::from)
        }

        async fn fetch(&self, _: &FetchRequest, _: &dyn ProgressSink) -> Result<(), DownloadError> {
            unreachable!("enumeration never fetches")
        }
    }

    #[tokio::test]
    async fn playlist_entries_in_order() {
        let stub = StubListing::ok(json!({
            "_type": "playlist",
            "entries": [{"id": "a", "title": "T1"}, {"id": "b", "title": "T2"}]
        }));
        let headers = BTreeMap::from([("User-Agent".to_string(), "ua".to_string())]);

        let entries = enumerate(&stub, "https://www.youtube.com/playlist?list=X", &headers)
            .await
            .unwrap();

        assert_eq!(entries, vec![VideoEntry::new("a", "T1"), VideoEntry::new("b", "T2")]);
        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0].url, "https://www.youtube.com/playlist?list=X");
        assert_eq!(seen[0].headers, headers);
    }

    #[tokio::test]
    async fn empty_entries_is_empty_not_error() {
        let stub = StubListing::ok(json!({"_type": "playlist", "entries": []}));
        let entries = enumerate(&stub, "https://x/playlist?list=E", &BTreeMap::new())
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn blank_url_is_rejected_before_listing() {
        let stub = StubListing::ok(json!({}));
        let err = enumerate(&stub, "   ", &BTreeMap::new()).await.unwrap_err();
        assert!(matches!(err, DownloadError::InvalidUrl(_)));
        assert!(stub.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn extraction_error_is_returned() {
        let stub = StubListing {
            response: Err("ERROR: [youtube:tab] PLx: This playlist is private".to_string()),
            seen: Mutex::new(Vec::new()),
        };
        let err = enumerate(&stub, "https://x/playlist?list=P", &BTreeMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Private video or playlist");
    }

    #[test]
    fn single_video_without_entries() {
        let info = json!({"id": "solo", "title": "Only one", "duration": 12});
        assert_eq!(normalize_listing(&info), vec![VideoEntry::new("solo", "Only one")]);
    }

    #[test]
    fn missing_title_gets_positional_placeholder() {
        let info = json!({"entries": [{"id": "a", "title": "T1"}, {"id": "b"}]});
        assert_eq!(
            normalize_listing(&info),
            vec![VideoEntry::new("a", "T1"), VideoEntry::new("b", "Video 2")]
        );
    }

    #[test]
    fn null_and_idless_entries_are_skipped() {
        let info = json!({"entries": [null, {"title": "no id"}, {"id": "c", "title": "T3"}]});
        assert_eq!(normalize_listing(&info), vec![VideoEntry::new("c", "T3")]);
    }
}
