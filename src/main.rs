use anyhow::Context;
use tracing::info;

use produce_service::config::Config;
use produce_service::{build_router, seed, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,produce_service=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Produce Service  ·  Rust + Axum     ║");
    info!("╚══════════════════════════════════════╝");

    let items = seed::initial_items(config.seed_profile);
    info!(profile = ?config.seed_profile, count = items.len(), "Seeding in-memory store");
    let state = AppState::new(items);

    let app = build_router(state, &config.api_prefix);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Listening on http://{}", addr);
    info!("Try: GET http://{}{}/produce", addr, config.api_prefix);

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
