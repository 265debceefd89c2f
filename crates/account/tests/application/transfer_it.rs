// crates/account/tests/application/transfer_it.rs

use account::application::transfer::{TransferCommand, TransferUseCase};
use account::domain::value_objects::Money;
use shared_kernel::domain::value_objects::AccountId;
use shared_kernel::errors::DomainError;

use crate::common::{setup_postgres_test_db, TestDb};

fn use_case(db: &TestDb) -> TransferUseCase {
    TransferUseCase::new(db.repo.clone(), db.uow.clone())
}

fn command(from: &str, to: &str, amount: i64) -> TransferCommand {
    TransferCommand {
        from: AccountId::try_new(from).unwrap(),
        to: AccountId::try_new(to).unwrap(),
        amount: Money::new(amount),
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_transfer_commits_both_updates() {
    let db = setup_postgres_test_db().await;
    db.seed("A", 10_000).await;
    db.seed("B", 10_000).await;

    use_case(&db).execute(command("A", "B", 2_000)).await.unwrap();

    assert_eq!(db.balance_of("A").await, 8_000);
    assert_eq!(db.balance_of("B").await, 12_000);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_transfer_to_rejected_receiver_rolls_back() {
    let db = setup_postgres_test_db().await;
    db.seed("A", 10_000).await;
    db.seed("ex", 10_000).await;

    let result = use_case(&db).execute(command("A", "ex", 2_000)).await;

    assert!(matches!(result, Err(DomainError::BusinessRule { .. })));
    assert_eq!(db.balance_of("A").await, 10_000);
    assert_eq!(db.balance_of("ex").await, 10_000);
}
