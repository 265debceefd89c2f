// crates/shared-kernel/src/infrastructure/postgres/factories/postgres_context.rs

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::infrastructure::postgres::factories::{PostgresConfig, PostgresContextBuilder};
use crate::infrastructure::postgres::PostgresConnectionProvider;

pub struct PostgresContext {
    pool: PgPool,
    url: String,
    config: PostgresConfig,
}

impl PostgresContext {
    pub fn builder() -> AppResult<PostgresContextBuilder> {
        PostgresContextBuilder::from_env()
    }

    pub fn builder_raw() -> PostgresContextBuilder {
        PostgresContextBuilder::default()
    }

    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn config(&self) -> PostgresConfig {
        self.config
    }

    /// Provider de connexions partagé par le UnitOfWork et les repositories.
    pub fn connection_provider(&self) -> Arc<PostgresConnectionProvider> {
        Arc::new(PostgresConnectionProvider::new(self.pool()))
    }

    pub(crate) async fn restore(builder: PostgresContextBuilder) -> AppResult<Self> {
        let config = builder.config;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .connect(&builder.url)
            .await
            .map_err(|e| AppError::new(ErrorCode::ServiceUnavailable, format!("Postgres Connection Failed: {}", e)))?;

        tracing::info!(max = config.max_connections, min = config.min_connections, "🐘 Postgres pool ready");

        Ok(Self {
            pool,
            url: builder.url,
            config,
        })
    }
}
