//! Media fetcher: a thin wrapper around the `yt-dlp` binary.
//!
//! Two modes only: best single-file video, or best audio transcoded to mp3 by
//! the backend's own postprocessor. There is no fallback chain and no retry;
//! a failing extraction surfaces its last stderr line, which the error module
//! classifies by substring.
//!
//! `yt-dlp` runs with `--print after_move:filepath`, so the final artifact
//! path is read from the last line of stdout for both modes.

use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{classify_extractor_error, DownloadError};

/// Fixed browser User-Agent sent with every extraction request.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// The two formats a user can pick from the inline keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// Parse the literal callback payload carried by a button press.
    pub fn from_callback_data(data: &str) -> Option<Self> {
        match data {
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }

    pub fn callback_data(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    /// Button label and "Processing ..." display name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Audio => "Audio",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "mp3",
        }
    }

    /// Attachment basename when the extractor reports no title.
    pub fn default_basename(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// A completed extraction: the artifact on disk plus its metadata title.
#[derive(Debug)]
pub struct Download {
    pub path: PathBuf,
    pub title: Option<String>,
}

/// Wraps `yt-dlp` with the small fixed configuration it needs: a browser
/// User-Agent, an optional cookie file, and an optional ffmpeg override.
pub struct Fetcher {
    cookie_path: Option<PathBuf>,
    ffmpeg_path: Option<PathBuf>,
    work_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ExtractorInfo {
    title: Option<String>,
}

impl Fetcher {
    pub fn new(config: &Config) -> Self {
        Self {
            cookie_path: config.cookie_path().map(Path::to_path_buf),
            ffmpeg_path: config.ffmpeg_path.clone(),
            work_dir: std::env::temp_dir(),
        }
    }

    /// Download the chosen kind for a URL. The artifact lands in the temp
    /// directory under a random basename; the caller owns its removal.
    pub async fn fetch(&self, url: &str, kind: MediaKind) -> Result<Download, DownloadError> {
        let title = self.probe_title(url).await;

        let basename = self.work_dir.join(Uuid::new_v4().to_string());
        let template = format!("{}.%(ext)s", basename.display());

        let mut args: Vec<String> = vec![
            "--no-playlist".into(),
            "--no-warnings".into(),
            "--user-agent".into(),
            USER_AGENT.into(),
            "--print".into(),
            "after_move:filepath".into(),
            "-o".into(),
            template,
        ];

        match kind {
            MediaKind::Video => {
                // Best available single-file format, no merge fallback.
                args.push("-f".into());
                args.push("best".into());
            }
            MediaKind::Audio => {
                for arg in [
                    "-f",
                    "bestaudio/best",
                    "-x",
                    "--audio-format",
                    "mp3",
                    "--audio-quality",
                    "192K",
                ] {
                    args.push(arg.into());
                }
            }
        }

        self.push_common_args(&mut args);
        args.push(url.to_string());

        let output = run_yt_dlp(&args).await?;

        let Some(path) = last_line(&output.stdout).map(PathBuf::from) else {
            return Err(DownloadError::MissingArtifact);
        };

        tracing::info!(path = %path.display(), "extraction finished");
        Ok(Download { path, title })
    }

    /// Metadata probe for the title used in the delivered filename. Failures
    /// are swallowed: delivery falls back to a generic name.
    async fn probe_title(&self, url: &str) -> Option<String> {
        let mut args: Vec<String> = vec![
            "-J".into(),
            "--no-playlist".into(),
            "--no-warnings".into(),
            "--user-agent".into(),
            USER_AGENT.into(),
        ];
        self.push_common_args(&mut args);
        args.push(url.to_string());

        let output = match run_yt_dlp(&args).await {
            Ok(output) => output,
            Err(error) => {
                tracing::debug!("title probe failed: {error}");
                return None;
            }
        };

        let info: ExtractorInfo = serde_json::from_slice(&output.stdout).ok()?;
        info.title.filter(|t| !t.trim().is_empty())
    }

    fn push_common_args(&self, args: &mut Vec<String>) {
        if let Some(cookies) = &self.cookie_path {
            args.push("--cookies".into());
            args.push(cookies.display().to_string());
        }
        if let Some(ffmpeg) = &self.ffmpeg_path {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.display().to_string());
        }
    }
}

/// Best-effort artifact removal; a missing file is not an error.
pub async fn remove_artifact(path: &Path) {
    if let Err(error) = tokio::fs::remove_file(path).await {
        if error.kind() != ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), %error, "failed to remove temp file");
        }
    }
}

async fn run_yt_dlp(args: &[String]) -> Result<std::process::Output, DownloadError> {
    tracing::debug!(?args, "running yt-dlp");

    let output = Command::new("yt-dlp")
        .args(args)
        .output()
        .await
        .map_err(|error| {
            if error.kind() == ErrorKind::NotFound {
                DownloadError::Extractor("yt-dlp is not installed on the host".to_string())
            } else {
                DownloadError::Io(error)
            }
        })?;

    if !output.status.success() {
        let raw = last_line(&output.stderr)
            .unwrap_or_else(|| "yt-dlp failed without error output".to_string());
        return Err(classify_extractor_error(&raw));
    }

    Ok(output)
}

fn last_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
        .map(ToString::to_string)
}
