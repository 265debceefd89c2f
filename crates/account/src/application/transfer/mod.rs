mod transfer_command;
mod transfer_use_case;
mod transfer_use_case_test;

pub use transfer_command::TransferCommand;
pub use transfer_use_case::{TransferUseCase, REJECTED_RECEIVER};
