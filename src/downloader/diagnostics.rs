// Rejection diagnostics - turns yt-dlp stderr into a reason the user can act on

use serde::{Deserialize, Serialize};

/// Reasons why the source server might refuse a listing or a download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockingReason {
    /// HTTP 403 Forbidden - general access denied
    Http403Forbidden,

    /// SABR streaming protection hides the regular formats
    SabrStreaming,

    /// PO Token (Proof of Origin) required
    PoTokenRequired,

    /// Age-restricted content requiring login
    AgeRestricted,

    /// Geographic restriction
    GeoBlocked,

    /// Network timeout (soft IP block)
    NetworkTimeout,

    /// Rate limiting (429 or similar)
    RateLimited,

    /// Bot detection triggered
    BotDetection,

    /// Private video or private playlist
    PrivateVideo,

    /// Video or playlist deleted or unavailable
    VideoUnavailable,

    /// DRM-protected content (Premium, Music, Movies)
    DrmProtected,

    /// Member-only content
    MembersOnly,

    /// Generic/unknown failure
    Unknown,
}

impl BlockingReason {
    /// Check if this is a permanent restriction (no workaround)
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::DrmProtected | Self::VideoUnavailable)
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::SabrStreaming => "SABR streaming protection active",
            Self::PoTokenRequired => "Proof of Origin token required",
            Self::AgeRestricted => "Age-restricted content",
            Self::GeoBlocked => "Geographic restriction",
            Self::NetworkTimeout => "Network timeout (possible IP throttling)",
            Self::RateLimited => "Rate limited by YouTube",
            Self::BotDetection => "Bot detection triggered",
            Self::PrivateVideo => "Private video or playlist",
            Self::VideoUnavailable => "Video unavailable",
            Self::DrmProtected => "DRM-protected content",
            Self::MembersOnly => "Members-only content",
            Self::Unknown => "Unknown error",
        }
    }

    /// Longer explanation for restrictions the user cannot work around by retrying
    pub fn user_explanation(&self) -> Option<&'static str> {
        match self {
            Self::DrmProtected => Some(
                "This video is DRM-protected and cannot be downloaded as a file.",
            ),
            Self::MembersOnly => Some(
                "This video requires a channel membership.",
            ),
            Self::VideoUnavailable => Some(
                "This video has been removed or is no longer available.",
            ),
            Self::RateLimited | Self::BotDetection => Some(
                "YouTube is throttling requests from your IP address. Wait a while and try again.",
            ),
            _ => None,
        }
    }
}

/// Analyze error message and return the rejection reason
pub fn diagnose_error(error: &str) -> Option<BlockingReason> {
    let lower = error.to_lowercase();

    // Check patterns in order of specificity

    if lower.contains("drm")
        || lower.contains("widevine")
        || lower.contains("youtube premium")
        || lower.contains("requires purchase")
        || lower.contains("this video requires payment")
    {
        return Some(BlockingReason::DrmProtected);
    }

    if lower.contains("members only")
        || lower.contains("members-only")
        || lower.contains("join this channel")
        || lower.contains("available to members")
    {
        return Some(BlockingReason::MembersOnly);
    }

    if lower.contains("sabr") {
        return Some(BlockingReason::SabrStreaming);
    }

    if lower.contains("po token") || lower.contains("proof of origin") {
        return Some(BlockingReason::PoTokenRequired);
    }

    if lower.contains("age-restricted") || lower.contains("sign in to confirm your age") {
        return Some(BlockingReason::AgeRestricted);
    }

    if lower.contains("private video")
        || lower.contains("video is private")
        || lower.contains("playlist is private")
        || lower.contains("sign in if you've been granted access")
    {
        return Some(BlockingReason::PrivateVideo);
    }

    if lower.contains("video unavailable")
        || lower.contains("video has been removed")
        || lower.contains("this video is no longer available")
        || lower.contains("playlist does not exist")
        || lower.contains("the playlist does not exist")
    {
        return Some(BlockingReason::VideoUnavailable);
    }

    if lower.contains("not available in your country")
        || lower.contains("blocked in your country")
        || lower.contains("geo restrict")
    {
        return Some(BlockingReason::GeoBlocked);
    }

    if lower.contains("429") || lower.contains("rate limit") || lower.contains("too many requests") {
        return Some(BlockingReason::RateLimited);
    }

    if lower.contains("confirm you're not a bot")
        || lower.contains("captcha")
        || lower.contains("unusual traffic")
    {
        return Some(BlockingReason::BotDetection);
    }

    if lower.contains("403") || lower.contains("forbidden") {
        return Some(BlockingReason::Http403Forbidden);
    }

    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network is unreachable")
    {
        return Some(BlockingReason::NetworkTimeout);
    }

    if !error.trim().is_empty() {
        return Some(BlockingReason::Unknown);
    }

    None
}
