// Transactions module - treasury operations gated by multisig approval

mod operation;
mod payload;

pub use operation::{Transaction, TransactionError, TransactionReceipt};
pub use payload::{BalanceEffect, TransactionKind, TransactionPayload};
