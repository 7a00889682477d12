//! Error types for the download pipeline.
//!
//! The extraction backend reports failures as free text, so access-restricted
//! content (private accounts, login walls, removed posts, rate limits) is
//! detected by substring matching on the error message. That classification is
//! best-effort: the backend has no stable error taxonomy to lean on.

use thiserror::Error;

/// Everything that can go wrong between a button press and a delivered file.
///
/// The `Display` impl renders the user-visible message for each case; raw
/// backend text, where available, is kept inside the variant for logging.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Access-restriction class: private, login-walled, removed, or rate-limited.
    #[error("Sorry, I couldn't download that. It may be private, removed, or rate-limited.")]
    Restricted(String),

    /// Any other extraction failure, echoed to the user with a contact hint.
    #[error("Error processing your request: {0}. If this keeps happening, contact the bot owner.")]
    Extractor(String),

    #[error("Error: downloaded video is empty or not found.")]
    MissingArtifact,

    #[error("Error: ffmpeg failed to compress the video. Please try a different video.")]
    TranscodeFailed(String),

    #[error("Error: compressed video is empty or not found.")]
    EmptyTranscode,

    #[error("Sorry, the video is too large to send via Telegram (limit is 50 MB). Try a shorter or lower-quality video.")]
    TooLarge,

    #[error("Error processing your request: {0}. If this keeps happening, contact the bot owner.")]
    Io(#[from] std::io::Error),

    #[error("Error processing your request: {0}. If this keeps happening, contact the bot owner.")]
    Delivery(#[from] teloxide::RequestError),
}

impl DownloadError {
    /// Raw downstream text for log context, where a variant carries one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Restricted(raw) | Self::Extractor(raw) | Self::TranscodeFailed(raw) => Some(raw),
            _ => None,
        }
    }
}

/// Substrings that mark an access-restriction failure in backend error text.
const RESTRICTED_MARKERS: [&str; 4] = ["login required", "private", "not available", "rate-limit"];

/// Classify a raw extraction-backend error message.
///
/// The markers come from observed yt-dlp output and are matched
/// case-insensitively. Anything unrecognized stays a generic
/// [`DownloadError::Extractor`].
pub fn classify_extractor_error(raw: &str) -> DownloadError {
    let lower = raw.to_ascii_lowercase();
    if RESTRICTED_MARKERS.iter().any(|marker| lower.contains(marker)) {
        DownloadError::Restricted(raw.to_string())
    } else {
        DownloadError::Extractor(raw.to_string())
    }
}
