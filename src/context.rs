/// Application context and dependency injection
use crate::{
    account::{AccountManager, Credentials},
    ai::AiAssistant,
    config::ServerConfig,
    db,
    error::AppResult,
    rate_limit::RateLimiter,
    reviews::ReviewManager,
    search::SearchEngine,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub accounts: Arc<AccountManager>,
    pub reviews: Arc<ReviewManager>,
    pub search: Arc<SearchEngine>,
    pub assistant: Arc<AiAssistant>,
    // Shared budget for the AI endpoints
    pub ai_limiter: RateLimiter,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> AppResult<Self> {
        config.validate()?;

        let db = db::create_pool(
            &config.storage.database_path,
            db::DatabaseOptions {
                max_connections: config.storage.max_connections,
                ..Default::default()
            },
        )
        .await?;

        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        tracing::info!(
            "Database ready at {}",
            config.storage.database_path.display()
        );

        let assistant = AiAssistant::new(&config.ai)?;

        Self::from_parts(config, db, assistant)
    }

    /// Wire services over an existing pool
    pub fn from_parts(
        config: ServerConfig,
        db: SqlitePool,
        assistant: AiAssistant,
    ) -> AppResult<Self> {
        let credentials = Arc::new(Credentials::new(&config.authentication)?);

        Ok(Self {
            accounts: Arc::new(AccountManager::new(db.clone(), credentials)),
            reviews: Arc::new(ReviewManager::new(db.clone())),
            search: Arc::new(SearchEngine::new(db.clone())),
            assistant: Arc::new(assistant),
            ai_limiter: RateLimiter::per_minute(config.ai.requests_per_minute),
            config: Arc::new(config),
            db,
        })
    }

    /// Close the connection pool
    pub async fn close(&self) {
        self.db.close().await;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ai::TextCompletion;
    use crate::config::test_config;

    /// Context over an in-memory store and the given completion backend
    pub(crate) async fn test_context(backend: Arc<dyn TextCompletion>) -> AppContext {
        let config = test_config();
        let assistant = AiAssistant::with_backend(backend, config.ai.max_tokens);
        AppContext::from_parts(config, db::test_pool().await, assistant).unwrap()
    }

    #[tokio::test]
    async fn test_context_wires_services() {
        let ctx = test_context(Arc::new(crate::ai::tests::FakeCompletion::replying("ok"))).await;
        db::test_connection(&ctx.db).await.unwrap();
        assert!(ctx.ai_limiter.check().is_ok());
    }
}
