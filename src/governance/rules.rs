// Governance rules - typed settings that drive proposal evaluation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Voting window applied when no rule is set
pub const DEFAULT_VOTING_TIME_HOURS: u64 = 48;

/// A single governance rule and its value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceRule {
    /// Minimum number of votes before an outcome is decided
    Quorum(u32),
    /// Hours a proposal stays open, counted from its creation
    VotingTimeHours(u64),
    /// Tokens a proposer must hold to submit a proposal
    ProposalCost(u64),
    /// Minimum "yes" votes for a decided proposal to pass
    MinVotesToPass(u32),
}

impl GovernanceRule {
    /// Rule name as it appears in confirmations and contracts
    pub fn name(&self) -> &'static str {
        match self {
            GovernanceRule::Quorum(_) => "quorum",
            GovernanceRule::VotingTimeHours(_) => "voting_time_hours",
            GovernanceRule::ProposalCost(_) => "proposal_cost",
            GovernanceRule::MinVotesToPass(_) => "min_votes_to_pass",
        }
    }

    /// Rule value, widened to a common type
    pub fn value(&self) -> u64 {
        match *self {
            GovernanceRule::Quorum(v) => v as u64,
            GovernanceRule::VotingTimeHours(v) => v,
            GovernanceRule::ProposalCost(v) => v,
            GovernanceRule::MinVotesToPass(v) => v as u64,
        }
    }
}

impl fmt::Display for GovernanceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name(), self.value())
    }
}

/// The rules an organization has set explicitly
///
/// Unset rules fall back to defaults that depend on membership size.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    quorum: Option<u32>,
    voting_time_hours: Option<u64>,
    proposal_cost: Option<u64>,
    min_votes_to_pass: Option<u32>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace a rule
    pub fn apply(&mut self, rule: GovernanceRule) {
        match rule {
            GovernanceRule::Quorum(v) => self.quorum = Some(v),
            GovernanceRule::VotingTimeHours(v) => self.voting_time_hours = Some(v),
            GovernanceRule::ProposalCost(v) => self.proposal_cost = Some(v),
            GovernanceRule::MinVotesToPass(v) => self.min_votes_to_pass = Some(v),
        }
    }

    /// Builder form of [`RuleSet::apply`]
    pub fn with(mut self, rule: GovernanceRule) -> Self {
        self.apply(rule);
        self
    }

    /// Rules that have been set, in a fixed order
    pub fn explicit(&self) -> Vec<GovernanceRule> {
        let mut rules = Vec::new();
        if let Some(v) = self.quorum {
            rules.push(GovernanceRule::Quorum(v));
        }
        if let Some(v) = self.voting_time_hours {
            rules.push(GovernanceRule::VotingTimeHours(v));
        }
        if let Some(v) = self.proposal_cost {
            rules.push(GovernanceRule::ProposalCost(v));
        }
        if let Some(v) = self.min_votes_to_pass {
            rules.push(GovernanceRule::MinVotesToPass(v));
        }
        rules
    }

    pub fn is_empty(&self) -> bool {
        self.explicit().is_empty()
    }

    /// Quorum, defaulting to a simple majority of members
    pub fn quorum(&self, member_count: usize) -> u32 {
        self.quorum
            .unwrap_or_else(|| (member_count / 2 + 1).try_into().unwrap_or(u32::MAX))
    }

    pub fn voting_time_hours(&self) -> u64 {
        self.voting_time_hours.unwrap_or(DEFAULT_VOTING_TIME_HOURS)
    }

    pub fn voting_time_secs(&self) -> u64 {
        self.voting_time_hours().saturating_mul(3600)
    }

    pub fn proposal_cost(&self) -> u64 {
        self.proposal_cost.unwrap_or(0)
    }

    /// Pass threshold, defaulting to the quorum
    pub fn min_votes_to_pass(&self, member_count: usize) -> u32 {
        self.min_votes_to_pass
            .unwrap_or_else(|| self.quorum(member_count))
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: Vec<String> = self.explicit().iter().map(ToString::to_string).collect();
        write!(f, "{{{}}}", rules.join(", "))
    }
}
