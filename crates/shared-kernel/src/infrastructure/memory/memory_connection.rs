// crates/shared-kernel/src/infrastructure/memory/memory_connection.rs

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OwnedSemaphorePermit;

use crate::domain::transaction::Connection;
use crate::errors::{internal_err, DomainError, Result};
use crate::infrastructure::memory::memory_connection_provider::{lock, MemoryState};
use crate::infrastructure::memory::{SIMULATED_FAILURE, UNIQUE_VIOLATION};

/// Connexion vers un `MemoryConnectionProvider`.
///
/// Hors auto-commit, les écritures sont accumulées dans un write-set privé :
/// la connexion lit ses propres écritures, les autres ne les voient qu'après le commit.
pub struct MemoryConnection<R> {
    id: u64,
    state: Arc<MemoryState<R>>,
    auto_commit: bool,
    // Some(row) = upsert, None = suppression
    pending: BTreeMap<String, Option<R>>,
    _permit: OwnedSemaphorePermit,
}

impl<R: Clone + Send + Sync + 'static> MemoryConnection<R> {
    pub(crate) fn new(id: u64, state: Arc<MemoryState<R>>, permit: OwnedSemaphorePermit) -> Self {
        Self {
            id,
            state,
            auto_commit: true,
            pending: BTreeMap::new(),
            _permit: permit,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Vrai si la connexion porte une transaction non terminée.
    pub fn is_dirty(&self) -> bool {
        !self.auto_commit || !self.pending.is_empty()
    }

    pub fn select(&mut self, key: &str) -> Result<Option<R>> {
        self.before_statement()?;
        Ok(self.visible(key))
    }

    /// Échoue avec le code `23505` si la clé existe déjà.
    pub fn insert(&mut self, key: &str, row: R) -> Result<()> {
        self.before_statement()?;
        if self.visible(key).is_some() {
            return Err(DomainError::data_access(
                Some(UNIQUE_VIOLATION),
                format!("duplicate key value violates unique constraint (key '{key}')"),
            ));
        }
        self.write(key, Some(row));
        Ok(())
    }

    /// Retourne le nombre de lignes affectées (0 ou 1).
    pub fn update(&mut self, key: &str, row: R) -> Result<u64> {
        self.before_statement()?;
        if self.visible(key).is_none() {
            return Ok(0);
        }
        self.write(key, Some(row));
        Ok(1)
    }

    pub fn delete(&mut self, key: &str) -> Result<u64> {
        self.before_statement()?;
        if self.visible(key).is_none() {
            return Ok(0);
        }
        self.write(key, None);
        Ok(1)
    }

    fn visible(&self, key: &str) -> Option<R> {
        match self.pending.get(key) {
            Some(change) => change.clone(),
            None => lock(&self.state.rows).get(key).cloned(),
        }
    }

    fn write(&mut self, key: &str, change: Option<R>) {
        if !self.auto_commit {
            self.pending.insert(key.to_owned(), change);
            return;
        }

        let mut rows = lock(&self.state.rows);
        match change {
            Some(row) => rows.insert(key.to_owned(), row),
            None => rows.remove(key),
        };
    }

    fn before_statement(&self) -> Result<()> {
        let mut faults = lock(&self.state.faults);
        if let Some(remaining) = faults.statements_before_failure.as_mut() {
            if *remaining == 0 {
                faults.statements_before_failure = None;
                return Err(DomainError::data_access(
                    Some(SIMULATED_FAILURE),
                    format!("simulated statement failure on connection {}", self.id),
                ));
            }
            *remaining -= 1;
        }
        Ok(())
    }

    fn apply_pending(&mut self) {
        let mut rows = lock(&self.state.rows);
        for (key, change) in std::mem::take(&mut self.pending) {
            match change {
                Some(row) => rows.insert(key, row),
                None => rows.remove(&key),
            };
        }
    }
}

#[async_trait]
impl<R: Clone + Send + Sync + 'static> Connection for MemoryConnection<R> {
    fn is_auto_commit(&self) -> bool {
        self.auto_commit
    }

    async fn set_auto_commit(&mut self, enabled: bool) -> Result<()> {
        if enabled && !self.auto_commit && !self.pending.is_empty() {
            self.apply_pending();
        }
        self.auto_commit = enabled;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if self.auto_commit {
            return Err(internal_err("Cannot commit while auto-commit is enabled"));
        }

        if std::mem::take(&mut lock(&self.state.faults).fail_next_commit) {
            return Err(DomainError::data_access(
                Some(SIMULATED_FAILURE),
                format!("simulated commit failure on connection {}", self.id),
            ));
        }

        self.apply_pending();
        lock(&self.state.stats).committed += 1;
        tracing::debug!(connection_id = self.id, "💾 Memory transaction committed");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if self.auto_commit {
            return Err(internal_err("Cannot rollback while auto-commit is enabled"));
        }

        if std::mem::take(&mut lock(&self.state.faults).fail_next_rollback) {
            return Err(DomainError::data_access(
                Some(SIMULATED_FAILURE),
                format!("simulated rollback failure on connection {}", self.id),
            ));
        }

        self.pending.clear();
        lock(&self.state.stats).rolled_back += 1;
        tracing::debug!(connection_id = self.id, "↩️ Memory transaction rolled back");
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}
