// crates/shared-kernel/src/infrastructure/memory/memory_connection_provider.rs

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::domain::transaction::{Connection, ConnectionProvider};
use crate::errors::{internal_err, DomainError, Result};
use crate::infrastructure::memory::{MemoryConnection, SIMULATED_FAILURE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryPoolStats {
    pub acquired: u64,
    pub released: u64,
    /// Connexions rendues avec une transaction ouverte, jetées au lieu d'être recyclées
    pub discarded: u64,
    pub committed: u64,
    pub rolled_back: u64,
    pub in_use: usize,
}

#[derive(Default)]
pub(crate) struct FaultPlan {
    pub(crate) fail_next_commit: bool,
    pub(crate) fail_next_rollback: bool,
    pub(crate) fail_next_release: bool,
    pub(crate) statements_before_failure: Option<u32>,
}

pub(crate) struct MemoryState<R> {
    pub(crate) rows: Mutex<BTreeMap<String, R>>,
    pub(crate) faults: Mutex<FaultPlan>,
    pub(crate) stats: Mutex<MemoryPoolStats>,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Pool borné de connexions en mémoire sur une table clé -> ligne.
pub struct MemoryConnectionProvider<R> {
    state: Arc<MemoryState<R>>,
    permits: Arc<Semaphore>,
    max_connections: usize,
    acquire_timeout: Duration,
    next_id: AtomicU64,
}

impl<R: Clone + Send + Sync + 'static> MemoryConnectionProvider<R> {
    pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_millis(100);

    pub fn new(max_connections: usize) -> Self {
        Self {
            state: Arc::new(MemoryState {
                rows: Mutex::new(BTreeMap::new()),
                faults: Mutex::new(FaultPlan::default()),
                stats: Mutex::new(MemoryPoolStats::default()),
            }),
            permits: Arc::new(Semaphore::new(max_connections)),
            max_connections,
            acquire_timeout: Self::DEFAULT_ACQUIRE_TIMEOUT,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Écrit directement une ligne validée, hors de toute connexion.
    pub fn seed(&self, key: impl Into<String>, row: R) {
        lock(&self.state.rows).insert(key.into(), row);
    }

    /// Vue validée (ce que voit une nouvelle connexion).
    pub fn row(&self, key: &str) -> Option<R> {
        lock(&self.state.rows).get(key).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<String, R> {
        lock(&self.state.rows).clone()
    }

    pub fn stats(&self) -> MemoryPoolStats {
        MemoryPoolStats {
            in_use: self.max_connections - self.permits.available_permits(),
            ..*lock(&self.state.stats)
        }
    }

    pub fn fail_next_commit(&self) {
        lock(&self.state.faults).fail_next_commit = true;
    }

    pub fn fail_next_rollback(&self) {
        lock(&self.state.faults).fail_next_rollback = true;
    }

    pub fn fail_next_release(&self) {
        lock(&self.state.faults).fail_next_release = true;
    }

    /// Les `n` prochaines instructions réussissent, la suivante échoue (toutes connexions confondues).
    pub fn fail_statement_after(&self, n: u32) {
        lock(&self.state.faults).statements_before_failure = Some(n);
    }
}

#[async_trait]
impl<R: Clone + Send + Sync + 'static> ConnectionProvider for MemoryConnectionProvider<R> {
    async fn acquire(&self) -> Result<Box<dyn Connection>> {
        let permit = match tokio::time::timeout(
            self.acquire_timeout,
            self.permits.clone().acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(DomainError::PoolExhausted("memory pool closed".into())),
            Err(_) => {
                return Err(DomainError::PoolExhausted(format!(
                    "no connection available after {:?} ({} in use)",
                    self.acquire_timeout, self.max_connections
                )))
            }
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.state.stats).acquired += 1;
        tracing::debug!(connection_id = id, "🔌 Memory connection acquired");

        Ok(Box::new(MemoryConnection::new(id, self.state.clone(), permit)))
    }

    async fn release(&self, connection: Box<dyn Connection>) -> Result<()> {
        let connection = connection
            .into_any()
            .downcast::<MemoryConnection<R>>()
            .map_err(|_| internal_err("Connection type mismatch: expected MemoryConnection"))?;

        let fail = std::mem::take(&mut lock(&self.state.faults).fail_next_release);

        {
            let mut stats = lock(&self.state.stats);
            if connection.is_dirty() {
                tracing::warn!(connection_id = connection.id(), "⚠️ Connection released inside a transaction, discarding it");
                stats.discarded += 1;
            } else {
                stats.released += 1;
            }
        }

        // Le permis du pool est rendu ici, même si la libération est déclarée en échec
        drop(connection);

        if fail {
            return Err(DomainError::data_access(
                Some(SIMULATED_FAILURE),
                "simulated release failure",
            ));
        }
        Ok(())
    }
}
