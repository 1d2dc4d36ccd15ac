use crate::governance::proposal::{ProposalId, ProposalStatus};
use thiserror::Error;

/// Errors from organization and proposal operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("Proposal not found.")]
    ProposalNotFound(ProposalId),

    /// A vote or lifecycle step was attempted in a state that does not allow it
    #[error("{}", invalid_transition_message(.action, .status))]
    InvalidTransition {
        action: &'static str,
        status: ProposalStatus,
    },

    #[error("Insufficient tokens to submit proposal: required {required}, available {available}")]
    InsufficientTokens { required: u64, available: i64 },

    #[error("An organization needs at least one founder")]
    NoFounders,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn invalid_transition_message(action: &str, status: &ProposalStatus) -> String {
    if action == "vote" {
        "Voting not active.".to_string()
    } else {
        format!("Cannot {} a proposal that is {}", action, status)
    }
}
