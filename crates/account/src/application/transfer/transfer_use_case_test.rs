#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use shared_kernel::domain::transaction::{
        ConnectionProvider, TransactionContext, TransactionManagerExt, UnitOfWork, UnitOfWorkState,
    };
    use shared_kernel::domain::value_objects::AccountId;
    use shared_kernel::errors::{AppError, DomainError, ErrorCode};
    use shared_kernel::infrastructure::memory::{MemoryConnectionProvider, SIMULATED_FAILURE};
    use shared_kernel::infrastructure::retry::RetryConfig;

    use crate::application::transfer::{TransferCommand, TransferUseCase};
    use crate::domain::entities::Account;
    use crate::domain::repositories::{AccountRepository, AccountRepositoryStub};
    use crate::domain::value_objects::Money;

    type Provider = MemoryConnectionProvider<Account>;

    fn setup() -> (Arc<TransferUseCase>, Arc<AccountRepositoryStub>, Arc<Provider>) {
        let provider = Arc::new(Provider::new(2));
        let account_repo = Arc::new(AccountRepositoryStub::new(provider.clone()));
        let tx_manager = Arc::new(UnitOfWork::new(provider.clone()));
        let use_case = TransferUseCase::new(account_repo.clone(), tx_manager);
        (Arc::new(use_case), account_repo, provider)
    }

    fn command(from: &str, to: &str, amount: i64) -> TransferCommand {
        TransferCommand {
            from: AccountId::try_new(from).unwrap(),
            to: AccountId::try_new(to).unwrap(),
            amount: Money::new(amount),
        }
    }

    fn assert_no_leak(provider: &Provider) {
        let stats = provider.stats();
        assert_eq!(stats.in_use, 0, "Aucune connexion ne doit rester empruntée");
        assert_eq!(stats.acquired, stats.released + stats.discarded);
    }

    #[tokio::test]
    async fn test_transfer_success() {
        let (use_case, repo, provider) = setup();
        repo.add_account("A", 10_000);
        repo.add_account("B", 10_000);

        use_case.execute(command("A", "B", 2_000)).await.unwrap();

        assert_eq!(repo.balance_of("A"), Some(8_000));
        assert_eq!(repo.balance_of("B"), Some(12_000));
        assert_eq!(repo.balance_of("A").unwrap() + repo.balance_of("B").unwrap(), 20_000);

        let stats = provider.stats();
        assert_eq!((stats.committed, stats.rolled_back), (1, 0));
        assert_no_leak(&provider);
    }

    #[tokio::test]
    async fn test_transfer_to_rejected_receiver_rolls_back_debit() {
        let (use_case, repo, provider) = setup();
        repo.add_account("A", 10_000);
        repo.add_account("ex", 10_000);

        let result = use_case.execute(command("A", "ex", 2_000)).await;

        assert!(matches!(
            result,
            Err(DomainError::BusinessRule { rule: "transfer.receiver", .. })
        ));
        // Le débit de A avait été émis : il doit avoir disparu
        assert_eq!(repo.balance_of("A"), Some(10_000));
        assert_eq!(repo.balance_of("ex"), Some(10_000));

        let stats = provider.stats();
        assert_eq!((stats.committed, stats.rolled_back), (0, 1));
        assert_no_leak(&provider);
    }

    #[tokio::test]
    async fn test_transfer_from_unknown_account() {
        let (use_case, repo, provider) = setup();
        repo.add_account("B", 10_000);

        let result = use_case.execute(command("ghost", "B", 100)).await;

        assert_eq!(
            result,
            Err(DomainError::NotFound { entity: "Account", id: "ghost".into() })
        );
        assert_eq!(repo.balance_of("B"), Some(10_000));
        assert_no_leak(&provider);
    }

    #[tokio::test]
    async fn test_storage_failure_on_credit_rolls_back_everything() {
        let (use_case, repo, provider) = setup();
        repo.add_account("A", 10_000);
        repo.add_account("B", 10_000);

        // 2 lectures + le débit passent, le crédit échoue
        provider.fail_statement_after(3);

        let result = use_case.execute(command("A", "B", 2_000)).await;

        assert!(matches!(
            result,
            Err(DomainError::DataAccess { code: Some(ref c), .. }) if c == SIMULATED_FAILURE
        ));
        assert_eq!(repo.balance_of("A"), Some(10_000));
        assert_eq!(repo.balance_of("B"), Some(10_000));
        assert_no_leak(&provider);
    }

    #[tokio::test]
    async fn test_context_is_unbound_after_each_attempt() {
        let (use_case, repo, provider) = setup();
        repo.add_account("A", 10_000);
        repo.add_account("B", 10_000);
        let mut ctx = TransactionContext::new();

        use_case.execute_with(&mut ctx, &command("A", "B", 500)).await.unwrap();
        assert!(!ctx.is_bound());
        assert_eq!(ctx.state(), UnitOfWorkState::Committed);

        let result = use_case.execute_with(&mut ctx, &command("B", "ex", 500)).await;
        assert!(result.is_err());
        assert!(!ctx.is_bound());

        // Le même contexte reste réutilisable
        use_case.execute_with(&mut ctx, &command("B", "A", 500)).await.unwrap();
        assert_eq!(repo.balance_of("A"), Some(10_000));
        assert_eq!(repo.balance_of("B"), Some(10_000));
        assert_no_leak(&provider);
    }

    #[tokio::test]
    async fn test_nested_transfer_is_rejected_and_outer_work_rolled_back() {
        let (use_case, repo, provider) = setup();
        repo.add_account("A", 10_000);
        repo.add_account("B", 10_000);
        let uow = UnitOfWork::new(provider.clone());
        let mut ctx = TransactionContext::new();

        let uc = use_case.clone();
        let r = repo.clone();
        let result = uow
            .run_in_transaction(&mut ctx, move |ctx| {
                Box::pin(async move {
                    r.update_balance(ctx, &AccountId::try_new("A").unwrap(), Money::new(1)).await?;
                    uc.execute_with(ctx, &command("A", "B", 2_000)).await
                })
            })
            .await;

        assert_eq!(result, Err(DomainError::AlreadyBound));
        assert_eq!(repo.balance_of("A"), Some(10_000));
        assert_eq!(repo.balance_of("B"), Some(10_000));

        // Une seule connexion : la tentative imbriquée n'en a pas emprunté
        assert_eq!(provider.stats().acquired, 1);
        assert_no_leak(&provider);
    }

    #[tokio::test]
    async fn test_exhausted_pool_is_retried_then_reported() {
        let provider = Arc::new(Provider::new(1).with_acquire_timeout(Duration::from_millis(10)));
        let repo = Arc::new(AccountRepositoryStub::new(provider.clone()));
        let use_case = TransferUseCase::new(repo.clone(), Arc::new(UnitOfWork::new(provider.clone())))
            .with_retry_config(RetryConfig { max_retries: 2, initial_backoff_ms: 1 });
        repo.add_account("A", 10_000);
        repo.add_account("B", 10_000);

        // L'unique connexion du pool reste occupée pendant toute la tentative
        let held = provider.acquire().await.unwrap();

        let result = use_case.execute(command("A", "B", 2_000)).await;
        assert!(matches!(result, Err(DomainError::PoolExhausted(_))));
        assert_eq!(
            AppError::from(result.unwrap_err()).code,
            ErrorCode::ServiceUnavailable
        );

        provider.release(held).await.unwrap();
        assert_eq!(repo.balance_of("A"), Some(10_000));
        assert_no_leak(&provider);
    }

    #[tokio::test]
    async fn test_repository_operations_outside_unit_of_work() {
        let (_, repo, provider) = setup();
        let mut ctx = TransactionContext::new();
        let id = AccountId::try_new("C").unwrap();

        repo.insert(&mut ctx, &Account::new(id.clone(), Money::new(300))).await.unwrap();
        let duplicate = repo.insert(&mut ctx, &Account::new(id.clone(), Money::new(1))).await;
        assert!(matches!(
            duplicate,
            Err(DomainError::DataAccess { code: Some(ref c), .. }) if c == "23505"
        ));

        repo.update_balance(&mut ctx, &id, Money::new(450)).await.unwrap();
        assert_eq!(repo.find_by_id(&mut ctx, &id).await.unwrap().balance(), Money::new(450));

        repo.delete(&mut ctx, &id).await.unwrap();
        assert!(matches!(
            repo.find_by_id(&mut ctx, &id).await,
            Err(DomainError::NotFound { entity: "Account", .. })
        ));

        // Suppression d'un compte absent : sans effet
        repo.delete(&mut ctx, &id).await.unwrap();
        assert!(matches!(
            repo.update_balance(&mut ctx, &id, Money::new(1)).await,
            Err(DomainError::NotFound { .. })
        ));

        // Chaque appel a emprunté et rendu sa propre connexion
        let stats = provider.stats();
        assert_eq!(stats.acquired, 8);
        assert_eq!(stats.committed, 0);
        assert!(!ctx.is_bound());
        assert_no_leak(&provider);
    }
}
