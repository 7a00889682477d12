//! Video compression for downloads over the attachment size ceiling.
//!
//! One pass, fixed settings, no retry at lower quality. The encode favors
//! compatibility over speed: H.264 at CRF 23 with stereo AAC audio.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::DownloadError;
use crate::fetcher::remove_artifact;

/// Telegram bot attachment ceiling: 50 MiB.
pub const MAX_ATTACHMENT_BYTES: u64 = 50 * 1024 * 1024;

const POLL_ATTEMPTS: u32 = 10;
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn exceeds_ceiling(bytes: u64) -> bool {
    bytes > MAX_ATTACHMENT_BYTES
}

/// Sibling path for the compressed substitute of a source file.
pub fn compressed_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("clip");
    source.with_file_name(format!("{stem}_compressed.mp4"))
}

/// Race-tolerance shim for filesystem-flush latency: poll until the source
/// file exists with non-zero size. This is not a download retry.
pub async fn wait_for_file(path: &Path) -> bool {
    for attempt in 0..POLL_ATTEMPTS {
        if attempt > 0 {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        if let Ok(metadata) = tokio::fs::metadata(path).await {
            if metadata.len() > 0 {
                return true;
            }
        }
    }
    false
}

/// Compress `source` into a `_compressed.mp4` sibling and validate the result
/// against the size ceiling. The transcoder runs synchronously with no
/// timeout; a non-zero exit is fatal to the request.
pub async fn compress(source: &Path, ffmpeg: Option<&Path>) -> Result<PathBuf, DownloadError> {
    let out = compressed_path(source);
    let program = ffmpeg
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("ffmpeg"));

    tracing::info!(
        source = %source.display(),
        out = %out.display(),
        "compressing oversized video"
    );

    let status = Command::new(&program)
        .arg("-i")
        .arg(source)
        .args([
            "-c:v", "libx264", "-preset", "slow", "-crf", "23", "-c:a", "aac", "-b:a", "192k",
            "-ac", "2", "-y",
        ])
        .arg(&out)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;

    if !status.success() {
        remove_artifact(&out).await;
        return Err(DownloadError::TranscodeFailed(status.to_string()));
    }

    match tokio::fs::metadata(&out).await {
        Ok(metadata) if metadata.len() == 0 => {
            remove_artifact(&out).await;
            Err(DownloadError::EmptyTranscode)
        }
        Ok(metadata) if exceeds_ceiling(metadata.len()) => {
            remove_artifact(&out).await;
            Err(DownloadError::TooLarge)
        }
        Ok(_) => Ok(out),
        Err(_) => Err(DownloadError::EmptyTranscode),
    }
}
