//! ClipFetch: a Telegram bot for grabbing video and audio clips from
//! social-media links.
//!
//! # Architecture
//!
//! ```text
//! Telegram ──► Dispatcher ──► telegram (request lifecycle)
//!                               │
//!                               ├── links    (URL allow-list + short-link expansion)
//!                               ├── pending  (per-user awaiting-choice state)
//!                               ├── fetcher  (yt-dlp subprocess)
//!                               ├── transcode (ffmpeg, oversized video only)
//!                               └── replies  (commands + small talk)
//!
//! health (axum liveness endpoint) runs beside the dispatcher.
//! ```
//!
//! One update is handled at a time per user interaction; the pipeline is a
//! short linear sequence of delegated steps with temp-file bookkeeping.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod health;
pub mod links;
pub mod pending;
pub mod replies;
pub mod telegram;
pub mod transcode;


pub use config::Config;
pub use error::DownloadError;
pub use fetcher::{Download, Fetcher, MediaKind};
pub use pending::PendingChoices;
