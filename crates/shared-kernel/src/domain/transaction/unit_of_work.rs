// crates/shared-kernel/src/domain/transaction/unit_of_work.rs

use std::panic::{resume_unwind, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::domain::transaction::{
    Connection, ConnectionProvider, TransactionContext, TransactionManager, UnitOfWorkFn,
};
use crate::errors::{internal_err, DomainError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitOfWorkState {
    #[default]
    NotStarted,
    Active,
    Committed,
    RolledBack,
}

impl UnitOfWorkState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack)
    }

    /// Un contexte peut enchaîner plusieurs unités de travail, mais chacune
    /// passe par `Active` et se termine exactement une fois.
    pub fn transition(self, next: Self) -> Result<Self> {
        match (self, next) {
            (Self::NotStarted | Self::Committed | Self::RolledBack, Self::Active)
            | (Self::Active, Self::Committed | Self::RolledBack) => Ok(next),
            _ => Err(DomainError::Internal(format!(
                "Illegal unit of work transition {self:?} -> {next:?}"
            ))),
        }
    }
}

/// Coordinateur d'unité de travail : une connexion, une transaction, un commit ou un rollback.
pub struct UnitOfWork {
    provider: Arc<dyn ConnectionProvider>,
}

impl UnitOfWork {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn ConnectionProvider> {
        &self.provider
    }

    async fn rollback_quietly(connection: &mut dyn Connection) -> bool {
        match connection.rollback().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "❌ Rollback failed, connection will be discarded");
                false
            }
        }
    }

    /// Les erreurs de nettoyage sont journalisées, jamais propagées :
    /// elles ne doivent pas masquer l'issue de l'unité de travail.
    async fn release(&self, mut connection: Box<dyn Connection>, restore_auto_commit: bool) {
        if restore_auto_commit {
            if let Err(e) = connection.set_auto_commit(true).await {
                tracing::error!(error = %e, "❌ Failed to restore auto-commit");
            }
        }

        if let Err(e) = self.provider.release(connection).await {
            tracing::error!(error = %e, "❌ Failed to release transaction connection");
        }
    }
}

impl TransactionManager for UnitOfWork {
    fn in_transaction<'a>(
        &'a self,
        ctx: &'a mut TransactionContext,
        operation: UnitOfWorkFn<'a>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            // 1. Pas de transaction imbriquée : refus avant toute acquisition
            if ctx.is_bound() {
                return Err(DomainError::AlreadyBound);
            }

            // 2. Acquisition et début de transaction
            let mut connection = self.provider.acquire().await?;
            if let Err(e) = connection.set_auto_commit(false).await {
                self.release(connection, false).await;
                return Err(e);
            }
            if let Err(rejected) = ctx.try_bind(connection) {
                self.release(rejected, true).await;
                return Err(DomainError::AlreadyBound);
            }
            ctx.settle(UnitOfWorkState::Active);
            tracing::debug!("🔓 Unit of work started");

            // 3. Exécution (une panique est traitée comme un échec, puis relancée)
            let outcome = AssertUnwindSafe(operation(&mut *ctx)).catch_unwind().await;

            // 4. Le contexte est libéré avant la transition terminale
            let Some(mut connection) = ctx.take_bound() else {
                ctx.settle(UnitOfWorkState::RolledBack);
                tracing::error!("❌ Transaction connection vanished from the context");
                return match outcome {
                    Ok(Ok(())) => Err(internal_err("Transaction connection lost before commit")),
                    Ok(Err(e)) => Err(e),
                    Err(panic) => resume_unwind(panic),
                };
            };

            match outcome {
                Ok(Ok(())) => match connection.commit().await {
                    Ok(()) => {
                        ctx.settle(UnitOfWorkState::Committed);
                        self.release(connection, true).await;
                        tracing::debug!("✅ Unit of work committed");
                        Ok(())
                    }
                    Err(commit_err) => {
                        tracing::error!(error = %commit_err, "❌ Commit failed, rolling back");
                        let clean = Self::rollback_quietly(connection.as_mut()).await;
                        ctx.settle(UnitOfWorkState::RolledBack);
                        self.release(connection, clean).await;
                        Err(commit_err)
                    }
                },
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, "↩️ Unit of work failed, rolling back");
                    let clean = Self::rollback_quietly(connection.as_mut()).await;
                    ctx.settle(UnitOfWorkState::RolledBack);
                    self.release(connection, clean).await;
                    Err(err)
                }
                Err(panic) => {
                    tracing::error!("💥 Unit of work panicked, rolling back");
                    let clean = Self::rollback_quietly(connection.as_mut()).await;
                    ctx.settle(UnitOfWorkState::RolledBack);
                    self.release(connection, clean).await;
                    resume_unwind(panic)
                }
            }
        })
    }
}
