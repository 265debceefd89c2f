// crates/shared-kernel/src/infrastructure/postgres/transactions/postgres_connection_provider.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::transaction::{Connection, ConnectionProvider};
use crate::errors::{internal_err, Result};
use crate::infrastructure::postgres::{PostgresConnection, SqlxErrorExt};

#[derive(Clone)]
pub struct PostgresConnectionProvider {
    pool: PgPool,
}

impl PostgresConnectionProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ConnectionProvider for PostgresConnectionProvider {
    async fn acquire(&self) -> Result<Box<dyn Connection>> {
        let connection = self
            .pool
            .acquire()
            .await
            .map_domain_infra("Pool acquisition failed")?;

        tracing::debug!(pool_size = self.pool.size(), idle = self.pool.num_idle(), "🔌 Postgres connection acquired");
        Ok(Box::new(PostgresConnection::new(connection)))
    }

    async fn release(&self, connection: Box<dyn Connection>) -> Result<()> {
        let connection = connection
            .into_any()
            .downcast::<PostgresConnection>()
            .map_err(|_| internal_err("Connection type mismatch: expected PostgresConnection"))?;

        if connection.is_clean() {
            // Le drop rend la connexion au pool sqlx
            drop(connection);
            return Ok(());
        }

        tracing::warn!("⚠️ Connection released with an unfinished transaction, closing it");
        (*connection).close().await
    }
}
