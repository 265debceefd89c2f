use std::sync::Arc;

use async_trait::async_trait;
use shared_kernel::domain::entities::{EntityMetadata, EntityOptionExt};
use shared_kernel::domain::transaction::{ConnectionExt, TransactionContext};
use shared_kernel::domain::value_objects::AccountId;
use shared_kernel::errors::Result;
use shared_kernel::infrastructure::memory::{MemoryConnection, MemoryConnectionProvider};

use crate::domain::entities::Account;
use crate::domain::repositories::AccountRepository;
use crate::domain::value_objects::Money;

type Conn = MemoryConnection<Account>;

/// Repository branché sur le pool en mémoire : mêmes règles de connexion que Postgres,
/// ce qui permet d'observer commit, rollback et fuites de connexions dans les tests.
pub struct AccountRepositoryStub {
    pub provider: Arc<MemoryConnectionProvider<Account>>,
}

impl AccountRepositoryStub {
    pub fn new(provider: Arc<MemoryConnectionProvider<Account>>) -> Self {
        Self { provider }
    }

    /// Helper pour injecter un compte directement dans le stockage
    pub fn add_account(&self, id: &str, balance: i64) {
        let id = AccountId::try_new(id).unwrap();
        self.provider.seed(id.as_str(), Account::new(id.clone(), Money::new(balance)));
    }

    /// Solde validé (hors transaction en cours)
    pub fn balance_of(&self, id: &str) -> Option<i64> {
        self.provider.row(id).map(|a| a.balance().amount())
    }
}

#[async_trait]
impl AccountRepository for AccountRepositoryStub {
    async fn insert(&self, ctx: &mut TransactionContext, account: &Account) -> Result<()> {
        let account = account.clone();
        ctx.execute_on(self.provider.as_ref(), move |conn| {
            Box::pin(async move {
                conn.downcast_connection::<Conn>()?
                    .insert(account.id().as_str(), account.clone())
            })
        })
        .await
    }

    async fn find_by_id(&self, ctx: &mut TransactionContext, id: &AccountId) -> Result<Account> {
        let key = id.clone();
        let row = ctx
            .execute_on(self.provider.as_ref(), move |conn| {
                Box::pin(async move { conn.downcast_connection::<Conn>()?.select(key.as_str()) })
            })
            .await?;

        row.ok_or_not_found(id)
    }

    async fn update_balance(
        &self,
        ctx: &mut TransactionContext,
        id: &AccountId,
        balance: Money,
    ) -> Result<()> {
        let key = id.clone();
        let affected = ctx
            .execute_on(self.provider.as_ref(), move |conn| {
                Box::pin(async move {
                    conn.downcast_connection::<Conn>()?
                        .update(key.as_str(), Account::new(key.clone(), balance))
                })
            })
            .await?;

        if affected == 0 {
            return Err(Account::not_found(id));
        }
        Ok(())
    }

    async fn delete(&self, ctx: &mut TransactionContext, id: &AccountId) -> Result<()> {
        let key = id.clone();
        ctx.execute_on(self.provider.as_ref(), move |conn| {
            Box::pin(async move { conn.downcast_connection::<Conn>()?.delete(key.as_str()) })
        })
        .await?;
        Ok(())
    }
}
