/// Dating API
///
/// Backend for a dating application: user profiles and photo galleries
/// with a single main photo per user, backed by a remote image host.

mod api;
mod asset_store;
mod auth;
mod config;
mod context;
mod db;
mod error;
mod gallery;
mod metrics;
mod profile;
mod rate_limit;
mod server;

use config::ServerConfig;
use context::AppContext;
use error::ApiResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ApiResult<()> {
    // Load configuration
    let config = ServerConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("dating_api={},tower_http=debug", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting dating API v{}", env!("CARGO_PKG_VERSION"));

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}
