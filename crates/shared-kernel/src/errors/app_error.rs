use crate::errors::{DomainError, ErrorCode};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Serialize, Clone)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<DomainError> for AppError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::NotFound { entity, id } => Self::new(
                ErrorCode::NotFound,
                format!("{entity} with id '{id}' not found"),
            ),

            DomainError::Validation { field, reason } => Self {
                code: ErrorCode::ValidationFailed,
                message: format!("Validation failed for {field}"),
                details: Some(serde_json::json!({ "field": field, "reason": reason })),
            },

            DomainError::BusinessRule { rule, reason } => Self {
                code: ErrorCode::BusinessRuleViolation,
                message: reason,
                details: Some(serde_json::json!({ "rule": rule })),
            },

            // Erreurs transitoires : le client peut réessayer
            DomainError::PoolExhausted(_) => Self::new(
                ErrorCode::ServiceUnavailable,
                "No database connection available. Please try again later.",
            ),
            DomainError::ConcurrencyConflict { reason } => {
                Self::new(ErrorCode::ConcurrencyConflict, reason)
            }

            // Erreurs techniques : on masque le détail au client
            DomainError::DataAccess { .. }
            | DomainError::AlreadyBound
            | DomainError::TooManyConflicts(_)
            | DomainError::Internal(_) => {
                tracing::error!(error = %error, "technical failure surfaced to the application layer");
                Self::new(
                    ErrorCode::InternalError,
                    "An unexpected error occurred. Please try again later.",
                )
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
