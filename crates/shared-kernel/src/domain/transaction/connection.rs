// crates/shared-kernel/src/domain/transaction/connection.rs

use std::any::{type_name, Any};

use async_trait::async_trait;

use crate::errors::{DomainError, Result};

/// Connexion empruntée à un `ConnectionProvider`.
///
/// Même contrat qu'une connexion SQL classique : en auto-commit chaque instruction est
/// validée immédiatement, sinon les écritures restent invisibles pour les autres
/// connexions jusqu'au `commit` (ou disparaissent au `rollback`).
#[async_trait]
pub trait Connection: Any + Send {
    fn is_auto_commit(&self) -> bool;

    /// Repasser en auto-commit valide le travail en attente.
    async fn set_auto_commit(&mut self, enabled: bool) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

/// Accès au type concret de la connexion depuis les adapters (repositories, providers).
pub trait ConnectionExt {
    fn downcast_connection<C: Connection>(&mut self) -> Result<&mut C>;
}

impl ConnectionExt for dyn Connection + '_ {
    fn downcast_connection<C: Connection>(&mut self) -> Result<&mut C> {
        self.as_any_mut()
            .downcast_mut::<C>()
            .ok_or_else(|| DomainError::Internal(format!(
                "Connection type mismatch: expected {}",
                type_name::<C>()
            )))
    }
}
