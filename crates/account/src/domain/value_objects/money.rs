// crates/account/src/domain/value_objects/money.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use shared_kernel::errors::{DomainError, Result};

/// Montant entier en plus petite unité monétaire.
///
/// Le signe n'est pas contraint : un solde négatif reste représentable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn new(amount: i64) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> i64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> Result<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| overflow(self, other))
    }

    pub fn checked_sub(self, other: Money) -> Result<Money> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or_else(|| overflow(self, other))
    }
}

fn overflow(left: Money, right: Money) -> DomainError {
    DomainError::Validation {
        field: "balance",
        reason: format!("Arithmetic overflow between {} and {}", left, right),
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
