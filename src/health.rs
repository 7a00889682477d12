//! Liveness endpoint for platform health checks.
//!
//! Any GET on the configured port answers 200 with a static HTML body. Runs
//! as a background task next to the dispatcher and shares no state with it.

use anyhow::Result;
use axum::{response::Html, routing::get, Router};
use tower_http::trace::TraceLayer;

const BODY: &str = "<html><body><h1>ClipFetch is alive</h1></body></html>";

pub fn router() -> Router {
    // Fallback rather than a route list: every GET path is a liveness probe.
    Router::new()
        .fallback(get(alive))
        .layer(TraceLayer::new_for_http())
}

async fn alive() -> Html<&'static str> {
    tracing::debug!("liveness probe");
    Html(BODY)
}

pub async fn serve(port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Liveness endpoint on http://0.0.0.0:{port}");
    axum::serve(listener, router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn any_get_path_returns_200() {
        for path in ["/", "/health", "/some/arbitrary/path"] {
            let response = router()
                .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "path {path}");
        }
    }

    #[tokio::test]
    async fn body_is_static_html() {
        let response = router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("<html>"));
        assert!(body.contains("alive"));
    }

    #[tokio::test]
    async fn non_get_verbs_are_not_handled() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
