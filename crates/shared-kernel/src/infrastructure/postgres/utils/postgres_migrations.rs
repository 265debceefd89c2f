// crates/shared-kernel/src/infrastructure/postgres/utils/postgres_migrations.rs

use std::path::Path;

use sqlx::migrate::Migrator;
use sqlx::PgPool;

use crate::errors::{DomainError, Result};

/// Applique les migrations SQLx présentes dans `path`.
pub async fn run_postgres_migrations(pool: &PgPool, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let migrator = Migrator::new(path).await.map_err(|e| DomainError::DataAccess {
        code: None,
        message: format!("Invalid migration path {}: {}", path.display(), e),
    })?;

    migrator.run(pool).await.map_err(|e| DomainError::DataAccess {
        code: None,
        message: format!("Migration failed: {}", e),
    })?;

    tracing::info!(path = %path.display(), count = migrator.migrations.len(), "✅ Postgres migrations applied");
    Ok(())
}
