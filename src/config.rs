//! Configuration management

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Runtime configuration, read once at startup.
#[derive(Debug)]
pub struct Config {
    /// Telegram bot token
    pub token: String,

    /// Handle used for group-mention stripping (e.g. "@clipfetch_bot")
    pub bot_username: Option<String>,

    /// Liveness server port; unset disables the server
    pub port: Option<u16>,

    /// Transcoder binary override; defaults to `ffmpeg` on PATH
    pub ffmpeg_path: Option<PathBuf>,

    /// Cookie jar for the extraction backend, held for the process lifetime
    cookie_file: Option<CookieFile>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("TOKEN").context("TOKEN must be set")?;

        let bot_username = std::env::var("BOT_USERNAME")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.trim().parse().ok());

        let ffmpeg_path = std::env::var("FFMPEG_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let cookie_file = match std::env::var("YT_COOKIES") {
            Ok(contents) if !contents.trim().is_empty() => Some(CookieFile::write(&contents)?),
            _ => None,
        };

        Ok(Self {
            token,
            bot_username,
            port,
            ffmpeg_path,
            cookie_file,
        })
    }

    /// Path to the prepared cookie file, if `YT_COOKIES` was provided.
    pub fn cookie_path(&self) -> Option<&Path> {
        self.cookie_file.as_ref().map(|c| c.path.as_path())
    }
}

/// Cookie contents from the environment, written to a private temp file for
/// the extraction backend and removed again when the process shuts down.
#[derive(Debug)]
struct CookieFile {
    path: PathBuf,
}

impl CookieFile {
    fn write(contents: &str) -> Result<Self> {
        let path = std::env::temp_dir().join(format!("{}.cookies.txt", Uuid::new_v4()));
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write cookie file {}", path.display()))?;
        Ok(Self { path })
    }
}

impl Drop for CookieFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_file_written_and_removed_on_drop() {
        let cookie = CookieFile::write("# Netscape HTTP Cookie File\n").unwrap();
        let path = cookie.path.clone();
        assert!(path.exists());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# Netscape HTTP Cookie File\n"
        );

        drop(cookie);
        assert!(!path.exists());
    }

    #[test]
    fn cookie_files_get_unique_paths() {
        let a = CookieFile::write("a").unwrap();
        let b = CookieFile::write("b").unwrap();
        assert_ne!(a.path, b.path);
    }
}
