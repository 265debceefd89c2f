// crates/account/src/application/transfer/transfer_command
use serde::Deserialize;
use shared_kernel::domain::value_objects::AccountId;

use crate::domain::value_objects::Money;

#[derive(Debug, Deserialize, Clone)]
pub struct TransferCommand {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Money,
}
