// crates/account/src/application/transfer/transfer_use_case

use std::sync::Arc;

use shared_kernel::domain::transaction::{TransactionContext, TransactionManager, TransactionManagerExt};
use shared_kernel::domain::value_objects::AccountId;
use shared_kernel::errors::{DomainError, Result};
use shared_kernel::infrastructure::retry::{with_retry, RetryConfig};

use crate::application::transfer::TransferCommand;
use crate::domain::repositories::AccountRepository;

/// Compte destinataire systématiquement refusé par la validation métier.
pub const REJECTED_RECEIVER: &str = "ex";

pub struct TransferUseCase {
    account_repo: Arc<dyn AccountRepository>,
    tx_manager: Arc<dyn TransactionManager>,
    retry_config: RetryConfig,
}

impl TransferUseCase {
    pub fn new(account_repo: Arc<dyn AccountRepository>, tx_manager: Arc<dyn TransactionManager>) -> Self {
        Self {
            account_repo,
            tx_manager,
            retry_config: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Chaque tentative repart d'un contexte vierge : une tentative annulée ne laisse rien derrière elle.
    pub async fn execute(&self, command: TransferCommand) -> Result<()> {
        with_retry(self.retry_config, || async {
            let mut ctx = TransactionContext::new();
            self.execute_with(&mut ctx, &command).await
        })
        .await
    }

    /// Une seule tentative dans le contexte fourni. Échoue en `AlreadyBound`
    /// si une unité de travail est déjà en cours sur ce contexte.
    pub async fn execute_with(&self, ctx: &mut TransactionContext, command: &TransferCommand) -> Result<()> {
        let repo = self.account_repo.clone();
        let cmd = command.clone();

        self.tx_manager
            .run_in_transaction(ctx, move |ctx| {
                Box::pin(async move {
                    // 1. LECTURE DES DEUX COMPTES
                    let mut sender = repo.find_by_id(ctx, &cmd.from).await?;
                    let mut receiver = repo.find_by_id(ctx, &cmd.to).await?;

                    // 2. DÉBIT (déjà émis quand la validation échoue : le rollback l'annule)
                    sender.withdraw(cmd.amount)?;
                    repo.update_balance(ctx, sender.id(), sender.balance()).await?;

                    // 3. VALIDATION DU DESTINATAIRE
                    validate_receiver(receiver.id())?;

                    // 4. CRÉDIT
                    receiver.deposit(cmd.amount)?;
                    repo.update_balance(ctx, receiver.id(), receiver.balance()).await?;

                    tracing::info!(
                        from = %cmd.from,
                        to = %cmd.to,
                        amount = %cmd.amount,
                        "💸 Transfer applied"
                    );
                    Ok(())
                })
            })
            .await
    }
}

fn validate_receiver(receiver: &AccountId) -> Result<()> {
    if receiver.as_str() == REJECTED_RECEIVER {
        return Err(DomainError::BusinessRule {
            rule: "transfer.receiver",
            reason: format!("Account '{}' cannot receive transfers", receiver),
        });
    }
    Ok(())
}
