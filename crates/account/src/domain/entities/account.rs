// crates/account/src/domain/entities/account

use serde::Serialize;
use shared_kernel::domain::entities::EntityMetadata;
use shared_kernel::domain::value_objects::AccountId;
use shared_kernel::errors::Result;

use crate::domain::value_objects::Money;

/// Ligne de la table `accounts` : un identifiant métier et un solde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    id: AccountId,
    balance: Money,
}

impl Account {
    pub fn new(id: AccountId, balance: Money) -> Self {
        Self { id, balance }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Débite le compte. Aucun contrôle de solde négatif.
    pub fn withdraw(&mut self, amount: Money) -> Result<()> {
        self.balance = self.balance.checked_sub(amount)?;
        Ok(())
    }

    pub fn deposit(&mut self, amount: Money) -> Result<()> {
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }
}

impl EntityMetadata for Account {
    fn entity_name() -> &'static str {
        "Account"
    }
}
