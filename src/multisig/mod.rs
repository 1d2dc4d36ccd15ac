// Multisig module - who must agree before the treasury moves

mod engine;

pub use engine::{ApprovalEngine, ApprovalId, MultisigError, PendingAction};
