//! URL recognition and shortened-link expansion.
//!
//! A message is treated as a download request when it matches a fixed
//! allow-list of platforms: x.com, twitter.com (alias), instagram.com,
//! youtube.com and youtu.be. Short-form status links (`https://x.com/i/status/...`)
//! are resolved to their final destination before classification.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Shape of a shortened status link that needs redirect resolution first.
pub const SHORT_STATUS_PREFIX: &str = "https://x.com/i/status/";

// Prefix-anchored; a path component after the domain is required, so bare
// domains never match. No percent-decoding or query validation.
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:www\.)?(?:x\.com|twitter\.com|instagram\.com|youtube\.com|youtu\.be)/.+")
        .expect("URL pattern is valid")
});

/// Does the text name a supported platform URL with a non-empty path?
pub fn is_supported_url(text: &str) -> bool {
    URL_PATTERN.is_match(text)
}

pub fn is_short_status_link(text: &str) -> bool {
    text.starts_with(SHORT_STATUS_PREFIX)
}

/// Resolve a shortened link by following HTTP redirects with a HEAD request.
///
/// No retry and no explicit timeout: the first transport failure propagates
/// to the caller.
pub async fn expand_short_link(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .head(url)
        .send()
        .await
        .context("failed to resolve shortened link")?;
    Ok(response.url().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_all_supported_domains() {
        for url in [
            "https://x.com/user/status/123456",
            "https://twitter.com/user/status/123456",
            "https://instagram.com/reel/abc123/",
            "https://youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
        ] {
            assert!(is_supported_url(url), "should accept {url}");
        }
    }

    #[test]
    fn accepts_www_and_plain_http() {
        assert!(is_supported_url("https://www.youtube.com/watch?v=abc"));
        assert!(is_supported_url("http://x.com/some/path"));
    }

    #[test]
    fn rejects_bare_domains() {
        assert!(!is_supported_url("https://x.com"));
        assert!(!is_supported_url("https://youtube.com/"));
    }

    #[test]
    fn rejects_other_domains() {
        assert!(!is_supported_url("https://example.com/watch?v=abc"));
        assert!(!is_supported_url("https://vimeo.com/12345"));
        assert!(!is_supported_url("https://music.youtube.com/watch?v=abc"));
        assert!(!is_supported_url("https://xx.com/status/1"));
    }

    #[test]
    fn rejects_non_urls() {
        assert!(!is_supported_url("hello there"));
        assert!(!is_supported_url("ftp://youtube.com/file"));
        assert!(!is_supported_url(""));
    }

    #[test]
    fn pattern_is_prefix_anchored() {
        assert!(!is_supported_url("see https://youtu.be/abc for the clip"));
    }

    #[test]
    fn detects_short_status_links() {
        assert!(is_short_status_link("https://x.com/i/status/1234567890"));
        assert!(!is_short_status_link("https://x.com/user/status/1234567890"));
        assert!(!is_short_status_link("https://t.co/abc"));
    }

    #[test]
    fn short_status_shape_also_matches_url_pattern() {
        // Even if expansion returns the same URL, classification still passes.
        assert!(is_supported_url("https://x.com/i/status/1234567890"));
    }

    /// Local stand-in for the platform's redirector: `/short` bounces to
    /// `/final` on the same ephemeral port.
    async fn spawn_redirect_server() -> String {
        use axum::response::Redirect;
        use axum::routing::get;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new()
            .route("/short", get(|| async { Redirect::temporary("/final") }))
            .route("/final", get(|| async { "ok" }));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn expansion_follows_redirects_to_the_final_url() {
        let base = spawn_redirect_server().await;
        let client = reqwest::Client::new();

        let expanded = expand_short_link(&client, &format!("{base}/short"))
            .await
            .unwrap();
        assert_eq!(expanded, format!("{base}/final"));
    }

    #[tokio::test]
    async fn expansion_of_a_direct_url_returns_it_unchanged() {
        let base = spawn_redirect_server().await;
        let client = reqwest::Client::new();

        let expanded = expand_short_link(&client, &format!("{base}/final"))
            .await
            .unwrap();
        assert_eq!(expanded, format!("{base}/final"));
    }

    #[tokio::test]
    async fn resolved_target_is_still_subject_to_the_allow_list() {
        let base = spawn_redirect_server().await;
        let client = reqwest::Client::new();

        // Expansion happens first; the destination must then pass
        // classification on its own, and this one does not.
        let expanded = expand_short_link(&client, &format!("{base}/short"))
            .await
            .unwrap();
        assert!(!is_supported_url(&expanded));
    }
}
