// Governance module - organizations, rules and proposal voting

mod contract;
mod error;
mod organization;
mod proposal;
mod rules;

pub use contract::ContractArtifact;
pub use error::GovernanceError;
pub use organization::{
    Organization, OrganizationConfig, OrganizationId, OrganizationSummary, ProposalRequirements,
};
pub use proposal::{Proposal, ProposalId, ProposalStatus, ProposalTopic, Vote, VotingOutcome};
pub use rules::{GovernanceRule, RuleSet, DEFAULT_VOTING_TIME_HOURS};
