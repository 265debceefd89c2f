// crates/shared-kernel/src/domain/value_objects/account_id.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ValueObject;
use crate::errors::{DomainError, Result};

/// Identifiant métier d'un compte (clé primaire de la table `accounts`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Taille de la colonne `account_id VARCHAR(10)`
    pub const MAX_LEN: usize = 10;

    /// Validation et création depuis une entrée externe (CLI / API).
    /// La valeur est gardée telle quelle : seules les contraintes de la colonne s'appliquent.
    pub fn try_new(value: impl Into<String>) -> Result<Self> {
        let id = Self::from_raw(value);
        id.validate()?;
        Ok(id)
    }

    /// Reconstruction depuis la base, sans re-validation
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for AccountId {
    fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(DomainError::Validation {
                field: "account_id",
                reason: "Account ID cannot be empty".into(),
            });
        }

        if self.0.chars().count() > Self::MAX_LEN {
            return Err(DomainError::Validation {
                field: "account_id",
                reason: format!("Account ID cannot exceed {} characters", Self::MAX_LEN),
            });
        }

        Ok(())
    }
}

// --- CONVERSIONS ---

impl FromStr for AccountId {
    type Err = DomainError;
    fn from_str(s: &str) -> Result<Self> {
        Self::try_new(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = DomainError;
    fn try_from(value: String) -> Result<Self> {
        Self::try_new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
