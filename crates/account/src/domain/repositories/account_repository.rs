// crates/account/src/domain/repositories/account_repository

use async_trait::async_trait;
use shared_kernel::domain::transaction::TransactionContext;
use shared_kernel::domain::value_objects::AccountId;
use shared_kernel::errors::Result;

use crate::domain::entities::Account;
use crate::domain::value_objects::Money;

/// Accès à la table `accounts`.
///
/// Chaque opération réutilise la connexion liée au contexte quand une unité de travail
/// est en cours ; sinon elle emprunte sa propre connexion le temps de l'appel.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Échoue en `DataAccess` (code `23505`) si l'identifiant existe déjà.
    async fn insert(&self, ctx: &mut TransactionContext, account: &Account) -> Result<()>;

    /// `NotFound` si aucune ligne ne correspond.
    async fn find_by_id(&self, ctx: &mut TransactionContext, id: &AccountId) -> Result<Account>;

    /// `NotFound` si aucune ligne n'a été modifiée.
    async fn update_balance(
        &self,
        ctx: &mut TransactionContext,
        id: &AccountId,
        balance: Money,
    ) -> Result<()>;

    /// Suppression idempotente : un compte absent n'est pas une erreur.
    async fn delete(&self, ctx: &mut TransactionContext, id: &AccountId) -> Result<()>;
}
