// crates/shared-kernel/src/infrastructure/postgres/transactions/postgres_connection.rs

use std::any::Any;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{Connection as SqlxConnection, PgConnection, Postgres};

use crate::domain::transaction::Connection;
use crate::errors::{internal_err, Result};
use crate::infrastructure::postgres::SqlxErrorExt;

/// Connexion du pool sqlx, pilotée explicitement en BEGIN / COMMIT / ROLLBACK.
///
/// Hors auto-commit, la transaction est ouverte paresseusement au premier appel à
/// `executor()`, comme le ferait un driver JDBC.
pub struct PostgresConnection {
    inner: Option<PoolConnection<Postgres>>,
    auto_commit: bool,
    in_transaction: bool,
}

impl PostgresConnection {
    pub fn new(connection: PoolConnection<Postgres>) -> Self {
        Self {
            inner: Some(connection),
            auto_commit: true,
            in_transaction: false,
        }
    }

    /// Exécuteur à utiliser pour toute requête des repositories.
    pub async fn executor(&mut self) -> Result<&mut PgConnection> {
        if !self.auto_commit && !self.in_transaction {
            sqlx::query("BEGIN")
                .execute(self.raw()?)
                .await
                .map_domain_infra("Failed to begin transaction")?;
            self.in_transaction = true;
        }
        self.raw()
    }

    /// Vrai si la connexion peut retourner au pool telle quelle.
    pub fn is_clean(&self) -> bool {
        self.auto_commit && !self.in_transaction
    }

    /// Ferme la connexion physique au lieu de la rendre au pool.
    pub async fn close(mut self) -> Result<()> {
        self.in_transaction = false;
        if let Some(connection) = self.inner.take() {
            connection
                .detach()
                .close()
                .await
                .map_domain_infra("Failed to close connection")?;
        }
        Ok(())
    }

    fn raw(&mut self) -> Result<&mut PgConnection> {
        self.inner
            .as_deref_mut()
            .ok_or_else(|| internal_err("Postgres connection already closed"))
    }

    async fn finish(&mut self, statement: &'static str) -> Result<()> {
        if !self.in_transaction {
            // Aucune instruction émise : rien à valider ni à annuler
            return Ok(());
        }
        sqlx::query(statement)
            .execute(self.raw()?)
            .await
            .map_domain_infra(statement)?;
        self.in_transaction = false;
        Ok(())
    }
}

#[async_trait]
impl Connection for PostgresConnection {
    fn is_auto_commit(&self) -> bool {
        self.auto_commit
    }

    async fn set_auto_commit(&mut self, enabled: bool) -> Result<()> {
        if enabled && !self.auto_commit {
            self.finish("COMMIT").await?;
        }
        self.auto_commit = enabled;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if self.auto_commit {
            return Err(internal_err("Cannot commit while auto-commit is enabled"));
        }
        self.finish("COMMIT").await
    }

    async fn rollback(&mut self) -> Result<()> {
        if self.auto_commit {
            return Err(internal_err("Cannot rollback while auto-commit is enabled"));
        }
        self.finish("ROLLBACK").await
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl Drop for PostgresConnection {
    fn drop(&mut self) {
        // Une transaction ouverte ne doit jamais retourner dans le pool
        if self.in_transaction {
            if let Some(connection) = self.inner.take() {
                tracing::warn!("⚠️ Postgres connection dropped inside an open transaction, detaching it from the pool");
                drop(connection.detach());
            }
        }
    }
}
