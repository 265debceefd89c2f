// crates/shared-kernel/src/domain/transaction/transaction_context.rs

use std::fmt;

use futures::future::BoxFuture;

use crate::domain::transaction::{Connection, ConnectionProvider, UnitOfWorkState};
use crate::errors::{DomainError, Result};

/// Contexte d'une chaîne d'appels : porte au plus une connexion liée à l'unité de travail en cours.
///
/// Le contexte est passé explicitement (`&mut TransactionContext`) de la couche application
/// jusqu'aux repositories. Tant qu'une connexion est liée, chaque opération de repository
/// la réutilise ; sinon l'opération emprunte sa propre connexion le temps d'un appel.
#[derive(Default)]
pub struct TransactionContext {
    bound: Option<Box<dyn Connection>>,
    state: UnitOfWorkState,
}

impl TransactionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lie la connexion à la chaîne d'appels. Une seule liaison à la fois :
    /// une connexion refusée est simplement abandonnée.
    pub fn bind(&mut self, connection: Box<dyn Connection>) -> Result<()> {
        self.try_bind(connection).map_err(|_| DomainError::AlreadyBound)
    }

    /// Comme `bind`, mais rend la connexion refusée pour que l'appelant puisse la libérer.
    pub(crate) fn try_bind(
        &mut self,
        connection: Box<dyn Connection>,
    ) -> std::result::Result<(), Box<dyn Connection>> {
        if self.bound.is_some() {
            return Err(connection);
        }
        self.bound = Some(connection);
        Ok(())
    }

    pub fn current(&mut self) -> Option<&mut dyn Connection> {
        self.bound.as_deref_mut()
    }

    /// No-op si rien n'est lié. La connexion d'une unité de travail en cours
    /// appartient au coordinateur : elle n'est pas rendue ici.
    pub fn unbind(&mut self) -> Option<Box<dyn Connection>> {
        if self.state == UnitOfWorkState::Active {
            tracing::warn!("⚠️ unbind() ignored: the connection belongs to the running unit of work");
            return None;
        }
        self.bound.take()
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    pub fn is_transactional(&self) -> bool {
        self.bound.as_ref().is_some_and(|c| !c.is_auto_commit())
    }

    /// État de la dernière unité de travail menée sur ce contexte.
    /// Seul le coordinateur le fait évoluer ; `bind`/`unbind` n'y touchent pas.
    pub fn state(&self) -> UnitOfWorkState {
        self.state
    }

    /// Reprise de la connexion par le coordinateur en fin d'unité de travail.
    pub(crate) fn take_bound(&mut self) -> Option<Box<dyn Connection>> {
        self.bound.take()
    }

    pub(crate) fn settle(&mut self, next: UnitOfWorkState) {
        match self.state.transition(next) {
            Ok(next) => self.state = next,
            Err(e) => {
                tracing::error!(error = %e, "❌ Unit of work state out of sync, forcing it");
                self.state = next;
            }
        }
    }

    /// Exécute `op` sur la connexion liée si elle existe, sinon sur une connexion
    /// empruntée pour ce seul appel et rendue quel que soit le résultat.
    pub async fn execute_on<T, F>(&mut self, provider: &dyn ConnectionProvider, op: F) -> Result<T>
    where
        F: for<'c> FnOnce(&'c mut dyn Connection) -> BoxFuture<'c, Result<T>> + Send,
        T: Send,
    {
        // La connexion liée appartient à l'unité de travail : on ne la rend pas ici
        if let Some(connection) = self.bound.as_deref_mut() {
            return op(connection).await;
        }

        let mut connection = provider.acquire().await?;
        let result = op(connection.as_mut()).await;

        if let Err(e) = provider.release(connection).await {
            tracing::error!(error = %e, "❌ Failed to release ad-hoc connection");
        }

        result
    }
}

impl fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionContext")
            .field("bound", &self.is_bound())
            .field("state", &self.state)
            .finish()
    }
}
