// crates/shared-kernel/src/infrastructure/retry.rs

use rand::Rng;
use crate::errors::{DomainError, Result};

#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

/// Plafond d'attente entre deux tentatives
pub const MAX_BACKOFF_MS: u64 = 5_000;

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 20,
        }
    }
}

/// Exécute une action avec une stratégie de retry (Exponential Backoff + Jitter).
/// Seules les erreurs transitoires (`DomainError::is_retryable`) sont rejouées ;
/// chaque tentative doit repartir d'une unité de travail neuve.
pub async fn with_retry<F, Fut, T>(config: RetryConfig, mut action: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        match action().await {
            Ok(res) => return Ok(res),
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                let base_backoff = base_backoff_ms(&config, attempt);

                // Ajout du Jitter (entre 0 et 25% de la base) pour désynchroniser les clients
                let jitter = rand::rng().random_range(0..base_backoff / 4 + 1);

                let backoff = std::time::Duration::from_millis(base_backoff + jitter);

                tracing::warn!(
                    error = %e,
                    "🔄 Transient failure (attempt {}/{}), retrying in {:?}...",
                    attempt + 1,
                    config.max_retries,
                    backoff
                );

                tokio::time::sleep(backoff).await;
                last_error = Some(e);
            }
            Err(e) if e.is_retryable() => {
                last_error = Some(e);
                break;
            }
            Err(e) => return Err(e),
        }
    }

    // Seuls les conflits répétés changent de nature ; un pool saturé reste un PoolExhausted
    match last_error {
        Some(DomainError::ConcurrencyConflict { reason }) => Err(DomainError::TooManyConflicts(format!(
            "Operation failed after {} retries: {}",
            config.max_retries, reason
        ))),
        Some(e) => Err(e),
        None => Err(DomainError::Internal("Retry loop ended without an outcome".into())),
    }
}

/// 2^attempt * base, plafonné à `MAX_BACKOFF_MS`.
fn base_backoff_ms(config: &RetryConfig, attempt: u32) -> u64 {
    2u64.checked_pow(attempt)
        .map_or(u64::MAX, |factor| config.initial_backoff_ms.saturating_mul(factor))
        .min(MAX_BACKOFF_MS)
}
