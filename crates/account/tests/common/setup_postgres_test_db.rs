// crates/account/tests/common/setup_postgres_test_db.rs

use std::sync::Arc;

use account::domain::entities::Account;
use account::domain::repositories::AccountRepository;
use account::domain::value_objects::Money;
use account::infrastructure::postgres::repositories::PostgresAccountRepository;
use shared_kernel::domain::transaction::{TransactionContext, UnitOfWork};
use shared_kernel::domain::value_objects::AccountId;
use shared_kernel::infrastructure::postgres::utils::setup_test_postgres;
use shared_kernel::infrastructure::postgres::PostgresConnectionProvider;
use sqlx::PgPool;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres as PostgresImage;

pub struct TestDb {
    pub pool: PgPool,
    pub repo: Arc<PostgresAccountRepository>,
    pub uow: Arc<UnitOfWork>,
    _container: ContainerAsync<PostgresImage>,
}

impl TestDb {
    pub async fn seed(&self, id: &str, balance: i64) {
        let account = Account::new(AccountId::try_new(id).unwrap(), Money::new(balance));
        self.repo.insert(&mut TransactionContext::new(), &account).await.unwrap();
    }

    pub async fn balance_of(&self, id: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT balance FROM accounts WHERE account_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

pub async fn setup_postgres_test_db() -> TestDb {
    let (pool, container) = setup_test_postgres(&["./migrations/postgres"]).await;
    let provider = Arc::new(PostgresConnectionProvider::new(pool.clone()));

    TestDb {
        pool,
        repo: Arc::new(PostgresAccountRepository::new(provider.clone())),
        uow: Arc::new(UnitOfWork::new(provider)),
        _container: container,
    }
}
