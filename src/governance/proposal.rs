// Proposal - a governance item and its voting state machine
//
// Draft --start--> Active
// Active --evaluate--> Failed  (deadline reached)
// Active --evaluate--> Draft   (quorum not met)
// Active --evaluate--> Passed  (enough yes votes)
// Active --evaluate--> Failed  (otherwise)

use crate::governance::error::GovernanceError;
use crate::governance::organization::OrganizationId;
use crate::governance::rules::RuleSet;
use crate::id::random_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

random_id!(
    /// Unique identifier for a proposal
    ProposalId,
    "proposal"
);

// ============================================================================
// STATUS AND VOTES
// ============================================================================

/// Lifecycle state of a proposal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Draft,
    Active,
    Passed,
    Failed,
}

impl ProposalStatus {
    /// Passed and failed proposals take no further votes or evaluations
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalStatus::Passed | ProposalStatus::Failed)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProposalStatus::Draft => "draft",
            ProposalStatus::Active => "active",
            ProposalStatus::Passed => "passed",
            ProposalStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A member's vote
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vote {
    Yes,
    No,
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Yes => f.write_str("yes"),
            Vote::No => f.write_str("no"),
        }
    }
}

impl FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Ok(Vote::Yes),
            "no" | "n" => Ok(Vote::No),
            other => Err(format!("unknown vote '{}'", other)),
        }
    }
}

/// Result of evaluating an active proposal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotingOutcome {
    Passed,
    Failed,
    QuorumNotMet,
    Expired,
}

impl fmt::Display for VotingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VotingOutcome::Passed => "Proposal passed.",
            VotingOutcome::Failed => "Proposal failed.",
            VotingOutcome::QuorumNotMet => "Quorum not met.",
            VotingOutcome::Expired => "Voting time expired.",
        };
        f.write_str(s)
    }
}

/// Governance topics a proposal touches, detected from its text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalTopic {
    IncreaseSupply,
    ChangeQuorum,
    SetVotingTime,
    ProposalCost,
}

impl ProposalTopic {
    const KEYWORDS: [(&'static str, ProposalTopic); 4] = [
        ("increase supply", ProposalTopic::IncreaseSupply),
        ("change quorum", ProposalTopic::ChangeQuorum),
        ("set voting time", ProposalTopic::SetVotingTime),
        ("proposal cost", ProposalTopic::ProposalCost),
    ];

    /// Topics whose keyword appears in the text, case-insensitively
    pub fn detect(text: &str) -> Vec<ProposalTopic> {
        let lowered = text.to_lowercase();
        Self::KEYWORDS
            .iter()
            .filter(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, topic)| *topic)
            .collect()
    }
}

// ============================================================================
// PROPOSAL
// ============================================================================

/// A proposal owned by an organization
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    id: ProposalId,
    organization: OrganizationId,
    title: String,
    description: String,
    proposer: String,
    created_at: DateTime<Utc>,
    votes: BTreeMap<String, Vote>,
    status: ProposalStatus,
}

impl Proposal {
    /// Create a draft proposal
    pub fn new(
        organization: OrganizationId,
        title: impl Into<String>,
        description: impl Into<String>,
        proposer: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProposalId::generate(),
            organization,
            title: title.into(),
            description: description.into(),
            proposer: proposer.into(),
            created_at,
            votes: BTreeMap::new(),
            status: ProposalStatus::Draft,
        }
    }

    pub fn id(&self) -> ProposalId {
        self.id
    }

    /// The organization this proposal belongs to
    pub fn organization(&self) -> OrganizationId {
        self.organization
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn proposer(&self) -> &str {
        &self.proposer
    }

    /// Creation time; the voting deadline counts from here
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> ProposalStatus {
        self.status
    }

    pub fn votes(&self) -> &BTreeMap<String, Vote> {
        &self.votes
    }

    pub fn yes_votes(&self) -> usize {
        self.votes.values().filter(|v| **v == Vote::Yes).count()
    }

    pub fn no_votes(&self) -> usize {
        self.votes.values().filter(|v| **v == Vote::No).count()
    }

    /// Topics mentioned in the title or description
    pub fn topics(&self) -> Vec<ProposalTopic> {
        ProposalTopic::detect(&format!("{}\n{}", self.title, self.description))
    }

    /// Open voting on a draft proposal
    ///
    /// Votes from an earlier round that fell short of quorum are kept.
    pub fn start(&mut self) -> Result<(), GovernanceError> {
        if self.status != ProposalStatus::Draft {
            return Err(GovernanceError::InvalidTransition {
                action: "start",
                status: self.status,
            });
        }
        self.status = ProposalStatus::Active;
        Ok(())
    }

    /// Record a vote; a member's later vote replaces the earlier one
    pub fn cast_vote(&mut self, member: &str, vote: Vote) -> Result<(), GovernanceError> {
        if self.status != ProposalStatus::Active {
            return Err(GovernanceError::InvalidTransition {
                action: "vote",
                status: self.status,
            });
        }
        self.votes.insert(member.to_string(), vote);
        Ok(())
    }

    /// Decide an active proposal against the organization's rules
    ///
    /// Checks run in order: deadline, quorum, pass threshold.
    pub fn evaluate(
        &mut self,
        rules: &RuleSet,
        member_count: usize,
        now: DateTime<Utc>,
    ) -> Result<VotingOutcome, GovernanceError> {
        if self.status != ProposalStatus::Active {
            return Err(GovernanceError::InvalidTransition {
                action: "evaluate",
                status: self.status,
            });
        }

        let elapsed = (now - self.created_at).num_seconds();
        if elapsed >= 0 && elapsed as u64 >= rules.voting_time_secs() {
            self.status = ProposalStatus::Failed;
            return Ok(VotingOutcome::Expired);
        }

        let quorum = rules.quorum(member_count) as usize;
        if self.votes.len() < quorum {
            self.status = ProposalStatus::Draft;
            return Ok(VotingOutcome::QuorumNotMet);
        }

        let threshold = rules.min_votes_to_pass(member_count) as usize;
        if self.yes_votes() >= threshold {
            self.status = ProposalStatus::Passed;
            Ok(VotingOutcome::Passed)
        } else {
            self.status = ProposalStatus::Failed;
            Ok(VotingOutcome::Failed)
        }
    }
}

impl fmt::Display for Proposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Proposal: {}\nDescription: {}\nProposer: {}",
            self.title, self.description, self.proposer
        )
    }
}
