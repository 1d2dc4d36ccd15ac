// Ledger module - THE SHARED HISTORY
// Append-only, hash-chained blocks recording every organization action

mod block;
mod chain;
mod record;

pub use block::{Block, BlockView, GENESIS_PREVIOUS_FINGERPRINT};
pub use chain::{Ledger, LedgerError};
pub use record::{ActionRecord, GovernanceAction, TransactionRecord, Transfer};
