use async_trait::async_trait;

use crate::domain::transaction::Connection;
use crate::errors::Result;

/// Source de connexions (pool). Les connexions fournies sont en auto-commit.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Échoue avec `DomainError::PoolExhausted` si aucune connexion n'est disponible à temps.
    async fn acquire(&self) -> Result<Box<dyn Connection>>;

    /// Rend la connexion au pool. Une connexion restée hors auto-commit (transaction
    /// non terminée) est fermée au lieu d'être recyclée.
    async fn release(&self, connection: Box<dyn Connection>) -> Result<()>;
}
