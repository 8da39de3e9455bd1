/// Game Review Hub
///
/// Backend for a game review community: accounts, reviews with
/// collaborators, comments, likes, search, popular games and language
/// model writing assistance.

mod account;
mod ai;
mod api;
mod auth;
mod config;
mod context;
mod db;
mod error;
mod patch;
mod rate_limit;
mod reviews;
mod search;
mod server;

use config::{LoggingConfig, ServerConfig};
use context::AppContext;
use error::AppResult;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = ServerConfig::from_env()?;

    init_logging(&config.logging);

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    let result = server::serve(ctx.clone()).await;

    ctx.close().await;
    tracing::info!("Database pool closed");

    result
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.level)
        .unwrap_or_else(|_| EnvFilter::new("game_review_hub=debug,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
