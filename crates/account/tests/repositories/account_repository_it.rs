// crates/account/tests/repositories/account_repository_it.rs

use account::domain::entities::Account;
use account::domain::repositories::AccountRepository;
use account::domain::value_objects::Money;
use shared_kernel::domain::transaction::{TransactionContext, TransactionManagerExt};
use shared_kernel::domain::value_objects::AccountId;
use shared_kernel::errors::DomainError;

use crate::common::setup_postgres_test_db;

#[tokio::test]
#[ignore = "requires docker"]
async fn test_account_lifecycle() {
    let db = setup_postgres_test_db().await;
    let mut ctx = TransactionContext::new();
    let id = AccountId::try_new("sonny").unwrap();

    db.repo.insert(&mut ctx, &Account::new(id.clone(), Money::new(300))).await.unwrap();

    let found = db.repo.find_by_id(&mut ctx, &id).await.unwrap();
    assert_eq!(found.balance(), Money::new(300));

    db.repo.update_balance(&mut ctx, &id, Money::new(750)).await.unwrap();
    assert_eq!(db.balance_of("sonny").await, 750);

    db.repo.delete(&mut ctx, &id).await.unwrap();
    let result = db.repo.find_by_id(&mut ctx, &id).await;
    assert!(matches!(result, Err(DomainError::NotFound { entity: "Account", .. })));

    // Sans effet sur un compte absent
    db.repo.delete(&mut ctx, &id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_unique_constraint_violation() {
    let db = setup_postgres_test_db().await;
    db.seed("dup", 1).await;

    let result = db
        .repo
        .insert(&mut TransactionContext::new(), &Account::new(AccountId::try_new("dup").unwrap(), Money::new(2)))
        .await;

    assert!(matches!(
        result,
        Err(DomainError::DataAccess { code: Some(ref c), .. }) if c == "23505"
    ));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_update_missing_account_is_not_found() {
    let db = setup_postgres_test_db().await;
    let id = AccountId::try_new("ghost").unwrap();

    let result = db.repo.update_balance(&mut TransactionContext::new(), &id, Money::new(1)).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_uncommitted_writes_stay_invisible_then_roll_back() {
    let db = setup_postgres_test_db().await;
    db.seed("A", 100).await;
    let mut ctx = TransactionContext::new();

    let repo = db.repo.clone();
    let pool = db.pool.clone();
    let result = db
        .uow
        .run_in_transaction(&mut ctx, move |ctx| {
            Box::pin(async move {
                let id = AccountId::try_new("A").unwrap();
                repo.update_balance(ctx, &id, Money::new(0)).await?;

                // Lecture de ses propres écritures dans la transaction
                assert_eq!(repo.find_by_id(ctx, &id).await?.balance(), Money::new(0));

                // Une autre connexion ne voit pas la modification
                let outside: i64 = sqlx::query_scalar("SELECT balance FROM accounts WHERE account_id = 'A'")
                    .fetch_one(&pool)
                    .await
                    .unwrap();
                assert_eq!(outside, 100);

                Err(DomainError::BusinessRule { rule: "test", reason: "abort".into() })
            })
        })
        .await;

    assert!(matches!(result, Err(DomainError::BusinessRule { rule: "test", .. })));
    assert_eq!(db.balance_of("A").await, 100);
    assert!(!ctx.is_bound());
}
