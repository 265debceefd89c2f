// crates/account/src/infrastructure/postgres/repositories/account_repository

use std::sync::Arc;

use async_trait::async_trait;
use shared_kernel::domain::entities::{EntityMetadata, EntityOptionExt};
use shared_kernel::domain::transaction::{ConnectionExt, TransactionContext};
use shared_kernel::domain::value_objects::AccountId;
use shared_kernel::errors::Result;
use shared_kernel::infrastructure::postgres::mappers::SqlxErrorExt;
use shared_kernel::infrastructure::postgres::{PostgresConnection, PostgresConnectionProvider};
use sqlx::{query, query_as};

use crate::domain::entities::Account;
use crate::domain::repositories::AccountRepository;
use crate::domain::value_objects::Money;
use crate::infrastructure::postgres::rows::PostgresAccountRow;

pub struct PostgresAccountRepository {
    provider: Arc<PostgresConnectionProvider>,
}

impl PostgresAccountRepository {
    pub fn new(provider: Arc<PostgresConnectionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn insert(&self, ctx: &mut TransactionContext, account: &Account) -> Result<()> {
        let row = PostgresAccountRow::from(account);

        ctx.execute_on(self.provider.as_ref(), move |conn| {
            Box::pin(async move {
                let executor = conn.downcast_connection::<PostgresConnection>()?.executor().await?;
                query("INSERT INTO accounts (account_id, balance) VALUES ($1, $2)")
                    .bind(row.account_id)
                    .bind(row.balance)
                    .execute(executor)
                    .await
                    .map_domain::<Account>()?;
                Ok(())
            })
        })
        .await?;

        tracing::debug!(account_id = %account.id(), balance = %account.balance(), "💾 Account inserted");
        Ok(())
    }

    async fn find_by_id(&self, ctx: &mut TransactionContext, id: &AccountId) -> Result<Account> {
        let account_id = id.as_str().to_string();

        let row = ctx
            .execute_on(self.provider.as_ref(), move |conn| {
                Box::pin(async move {
                    let executor = conn.downcast_connection::<PostgresConnection>()?.executor().await?;
                    query_as::<_, PostgresAccountRow>(
                        "SELECT account_id, balance FROM accounts WHERE account_id = $1",
                    )
                    .bind(account_id)
                    .fetch_optional(executor)
                    .await
                    .map_domain::<Account>()
                })
            })
            .await?;

        row.map(Account::from).ok_or_not_found(id)
    }

    async fn update_balance(
        &self,
        ctx: &mut TransactionContext,
        id: &AccountId,
        balance: Money,
    ) -> Result<()> {
        let account_id = id.as_str().to_string();

        let affected = ctx
            .execute_on(self.provider.as_ref(), move |conn| {
                Box::pin(async move {
                    let executor = conn.downcast_connection::<PostgresConnection>()?.executor().await?;
                    let result = query("UPDATE accounts SET balance = $2 WHERE account_id = $1")
                        .bind(account_id)
                        .bind(balance.amount())
                        .execute(executor)
                        .await
                        .map_domain::<Account>()?;
                    Ok(result.rows_affected())
                })
            })
            .await?;

        if affected == 0 {
            return Err(Account::not_found(id));
        }
        Ok(())
    }

    async fn delete(&self, ctx: &mut TransactionContext, id: &AccountId) -> Result<()> {
        let account_id = id.as_str().to_string();

        let affected = ctx
            .execute_on(self.provider.as_ref(), move |conn| {
                Box::pin(async move {
                    let executor = conn.downcast_connection::<PostgresConnection>()?.executor().await?;
                    let result = query("DELETE FROM accounts WHERE account_id = $1")
                        .bind(account_id)
                        .execute(executor)
                        .await
                        .map_domain::<Account>()?;
                    Ok(result.rows_affected())
                })
            })
            .await?;

        if affected == 0 {
            tracing::debug!(account_id = %id, "Delete on a missing account, nothing to do");
        }
        Ok(())
    }
}
