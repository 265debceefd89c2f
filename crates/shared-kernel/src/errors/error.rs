// crates/shared-kernel/src/errors/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation failed for field '{field}': {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    #[error("{entity} not found with id '{id}'")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// Échec du stockage ou du driver. `code` porte le code fournisseur (SQLSTATE pour Postgres).
    #[error("Data access failure{}: {message}", code_suffix(.code))]
    DataAccess {
        code: Option<String>,
        message: String,
    },

    /// Une unité de travail est déjà active sur ce contexte (pas de transactions imbriquées).
    #[error("A connection is already bound to this transaction context")]
    AlreadyBound,

    /// Aucune connexion disponible dans le pool avant l'expiration du délai d'acquisition
    #[error("Connection pool exhausted: {0}")]
    PoolExhausted(String),

    /// Violation d'une règle métier. Déclenche le rollback de l'unité de travail englobante.
    #[error("Business rule '{rule}' violated: {reason}")]
    BusinessRule {
        rule: &'static str,
        reason: String,
    },

    /// Erreur de concurrence (sérialisation / deadlock côté base)
    #[error("Concurrency conflict: {reason}")]
    ConcurrencyConflict {
        reason: String,
    },

    /// Échec définitif après plusieurs tentatives de retry
    #[error("Operation failed after maximum retries: {0}")]
    TooManyConflicts(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn data_access(code: Option<&str>, message: impl Into<String>) -> Self {
        Self::DataAccess {
            code: code.map(str::to_owned),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }

    /// Utilisé par la boucle de retry : seules les erreurs transitoires sont rejouées.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. } | Self::PoolExhausted(_))
    }

    /// Code fournisseur attaché à une erreur de stockage, s'il existe.
    pub fn storage_code(&self) -> Option<&str> {
        match self {
            Self::DataAccess { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" [{c}]")).unwrap_or_default()
}
