// crates/account/src/infrastructure/postgres/rows/postgres_account_row

use shared_kernel::domain::value_objects::AccountId;

use crate::domain::entities::Account;
use crate::domain::value_objects::Money;

#[derive(Debug, sqlx::FromRow)]
pub struct PostgresAccountRow {
    pub account_id: String,
    pub balance: i64,
}

impl From<PostgresAccountRow> for Account {
    fn from(row: PostgresAccountRow) -> Self {
        // La colonne VARCHAR(10) garantit déjà le format
        Account::new(AccountId::from_raw(row.account_id), Money::new(row.balance))
    }
}

impl From<&Account> for PostgresAccountRow {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id().as_str().to_string(),
            balance: account.balance().amount(),
        }
    }
}
