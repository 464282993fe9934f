use regex::Regex;

lazy_static::lazy_static! {
    static ref PROGRESS_RE: Regex = Regex::new(
        r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*(\d+\.?\d*\s*\w+)(?:\s+at\s+(\S+(?:\s*\w+/s)?))?(?:\s+ETA\s+(\S+))?(?:\s+\(frag\s+(\d+)/(\d+)\))?"
    ).unwrap();
    static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").unwrap();
    static ref MERGE_RE: Regex = Regex::new(r"\[Merger?\]\s+Merging").unwrap();
    static ref ALREADY_RE: Regex = Regex::new(r"has already been downloaded").unwrap();
}

/// Parse a yt-dlp `--newline` output line into (percent, status).
///
/// ```text
/// [download]   6.2% of ~ 343.72MiB at  420.30KiB/s ETA 12:32 (frag 29/454)
/// ```
pub fn parse_ytdlp_progress(line: &str) -> Option<(f32, String)> {
    if let Some(caps) = PROGRESS_RE.captures(line) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        let size = caps.get(2).map(|m| m.as_str()).unwrap_or("?");
        let speed = caps.get(3).map(|m| m.as_str()).unwrap_or("?");
        let eta = caps.get(4).map(|m| m.as_str()).unwrap_or("");
        let frag = caps.get(5).zip(caps.get(6));

        let status = match frag {
            Some((fc, ft)) => format!(
                "{:.1}% of {} @ {} ETA {} (frag {}/{})",
                percent,
                size,
                speed,
                eta,
                fc.as_str(),
                ft.as_str()
            ),
            None if !eta.is_empty() => format!("{:.1}% of {} @ {} ETA {}", percent, size, speed, eta),
            None => format!("{:.1}% of {} @ {}", percent, size, speed),
        };

        return Some((percent, status));
    }

    if let Some(caps) = DEST_RE.captures(line) {
        let filename = caps.get(1).map(|m| m.as_str()).unwrap_or("file");
        let short_name: String = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(filename)
            .chars()
            .take(50)
            .collect();
        return Some((0.0, format!("Starting: {}", short_name)));
    }

    if MERGE_RE.is_match(line) {
        return Some((99.0, "Merging video and audio...".to_string()));
    }

    if ALREADY_RE.is_match(line) {
        return Some((100.0, "File already downloaded".to_string()));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_with_eta_and_fragments() {
        let line = "[download]  12.5% of ~ 310.04MiB at  374.36KiB/s ETA 11:59 (frag 56/454)";
        let (percent, status) = parse_ytdlp_progress(line).unwrap();
        assert_eq!(percent, 12.5);
        assert_eq!(status, "12.5% of 310.04MiB @ 374.36KiB/s ETA 11:59 (frag 56/454)");
    }

    #[test]
    fn percent_without_fragments() {
        let line = "[download]  48.0% of 20.00MiB at 2.00MiB/s ETA 00:05";
        let (percent, status) = parse_ytdlp_progress(line).unwrap();
        assert_eq!(percent, 48.0);
        assert_eq!(status, "48.0% of 20.00MiB @ 2.00MiB/s ETA 00:05");
    }

    #[test]
    fn finished_line() {
        let line = "[download] 100% of   20.00MiB in 00:00:10 at 2.00MiB/s";
        let (percent, _) = parse_ytdlp_progress(line).unwrap();
        assert_eq!(percent, 100.0);
    }

    #[test]
    fn destination_line() {
        let line = "[download] Destination: /home/me/Desktop/YouTube Downloads/Song.f137.mp4";
        let (percent, status) = parse_ytdlp_progress(line).unwrap();
        assert_eq!(percent, 0.0);
        assert_eq!(status, "Starting: Song.f137.mp4");
    }

    #[test]
    fn merge_line() {
        let line = "[Merger] Merging formats into \"/tmp/Song.mp4\"";
        assert_eq!(parse_ytdlp_progress(line).unwrap().0, 99.0);
    }

    #[test]
    fn already_downloaded_line() {
        let line = "[download] /tmp/Song.mp4 has already been downloaded";
        assert_eq!(parse_ytdlp_progress(line).unwrap().0, 100.0);
    }

    #[test]
    fn unrelated_line() {
        assert!(parse_ytdlp_progress("[youtube] abc: Downloading webpage").is_none());
    }
}
