//! ClipFetch entry point.
//!
//! Starts the liveness endpoint (when PORT is set) and runs the Telegram
//! dispatcher until shutdown.

use clipfetch::{health, telegram, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "clipfetch=info,teloxide=warn".to_string()),
        )
        .init();

    tracing::info!("ClipFetch v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    if let Some(port) = config.port {
        tokio::spawn(async move {
            if let Err(error) = health::serve(port).await {
                tracing::error!("liveness server exited: {:#}", error);
            }
        });
    }

    telegram::run_bot(config).await
}
