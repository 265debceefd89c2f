// crates/shared-kernel/src/domain/transaction/transaction_manager.rs

use futures::future::BoxFuture;

use crate::domain::transaction::TransactionContext;
use crate::errors::Result;

/// Opération exécutée à l'intérieur d'une unité de travail.
pub type UnitOfWorkFn<'a> = Box<
    dyn for<'c> FnOnce(&'c mut TransactionContext) -> BoxFuture<'c, Result<()>> + Send + 'a,
>;

pub trait TransactionManager: Send + Sync {
    /// Démarque une transaction autour de `operation` : commit si elle réussit,
    /// rollback sinon, et l'erreur d'origine est rendue telle quelle.
    fn in_transaction<'a>(
        &'a self,
        ctx: &'a mut TransactionContext,
        operation: UnitOfWorkFn<'a>,
    ) -> BoxFuture<'a, Result<()>>;
}

pub trait TransactionManagerExt: TransactionManager {
    fn run_in_transaction<'a, F>(
        &'a self,
        ctx: &'a mut TransactionContext,
        operation: F,
    ) -> BoxFuture<'a, Result<()>>
    where
        F: for<'c> FnOnce(&'c mut TransactionContext) -> BoxFuture<'c, Result<()>> + Send + 'a,
    {
        self.in_transaction(ctx, Box::new(operation))
    }
}

impl<T: TransactionManager + ?Sized> TransactionManagerExt for T {}
