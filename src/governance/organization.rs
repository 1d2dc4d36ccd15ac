// Organization - the DAO aggregate root
// Owns balances, rules, membership, proposals and the ledger that records them

use crate::governance::contract::ContractArtifact;
use crate::governance::error::GovernanceError;
use crate::governance::proposal::{Proposal, ProposalId, Vote, VotingOutcome};
use crate::governance::rules::{GovernanceRule, RuleSet};
use crate::id::random_id;
use crate::ledger::{ActionRecord, Block, GovernanceAction, Ledger, TransactionRecord};
use crate::multisig::ApprovalId;
use crate::transactions::TransactionPayload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

random_id!(
    /// Unique identifier for an organization
    OrganizationId,
    "dao"
);

// ============================================================================
// CONFIG
// ============================================================================

/// Token and rule settings for a new organization
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrganizationConfig {
    /// Name of the governance token
    pub token_name: String,
    /// Tokens split evenly between founders at creation
    pub initial_supply: u64,
    /// Rules in force from the start
    pub rules: RuleSet,
}

impl OrganizationConfig {
    /// Create a new config with builder pattern
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token_name(mut self, token_name: impl Into<String>) -> Self {
        self.token_name = token_name.into();
        self
    }

    pub fn with_initial_supply(mut self, initial_supply: u64) -> Self {
        self.initial_supply = initial_supply;
        self
    }

    pub fn with_rule(mut self, rule: GovernanceRule) -> Self {
        self.rules.apply(rule);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.token_name.trim().is_empty() {
            return Err(GovernanceError::InvalidConfig(
                "token_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            token_name: "REVO".to_string(),
            initial_supply: 1_000_000,
            rules: RuleSet::default(),
        }
    }
}

// ============================================================================
// REPORTING
// ============================================================================

/// Full projection of an organization's state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub id: OrganizationId,
    pub name: String,
    pub founders: Vec<String>,
    pub token_name: String,
    pub initial_supply: u64,
    pub created_at: DateTime<Utc>,
    pub members: Vec<String>,
    pub balances: BTreeMap<String, i64>,
    pub rules: RuleSet,
    pub proposals: Vec<Proposal>,
    pub ledger_length: usize,
}

/// What submitting a proposal costs and how it will be judged
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProposalRequirements {
    pub cost: u64,
    pub voting_time_secs: u64,
    pub quorum: u32,
}

// ============================================================================
// ORGANIZATION
// ============================================================================

/// A DAO with its own ledger
///
/// Every mutating method appends exactly one block describing the action.
#[derive(Clone, Debug)]
pub struct Organization {
    id: OrganizationId,
    name: String,
    founders: Vec<String>,
    token_name: String,
    initial_supply: u64,
    created_at: DateTime<Utc>,
    balances: BTreeMap<String, i64>,
    rules: RuleSet,
    proposals: Vec<Proposal>,
    members: BTreeSet<String>,
    applied: BTreeSet<ApprovalId>,
    ledger: Ledger,
}

impl Organization {
    /// Create an organization, splitting the supply evenly between founders
    pub fn new<I, S>(
        name: impl Into<String>,
        founders: I,
        token_name: impl Into<String>,
        initial_supply: u64,
    ) -> Result<Self, GovernanceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = OrganizationConfig::new()
            .with_token_name(token_name)
            .with_initial_supply(initial_supply);
        Self::with_config(name, founders, config)
    }

    /// Create an organization from a config
    pub fn with_config<I, S>(
        name: impl Into<String>,
        founders: I,
        config: OrganizationConfig,
    ) -> Result<Self, GovernanceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        config.validate()?;

        let mut founders: Vec<String> = founders.into_iter().map(Into::into).collect();
        let mut seen = BTreeSet::new();
        founders.retain(|founder| seen.insert(founder.clone()));
        if founders.is_empty() {
            return Err(GovernanceError::NoFounders);
        }

        // Remainder of the division is not allocated
        let share = config.initial_supply / founders.len() as u64;
        let share = i64::try_from(share).unwrap_or(i64::MAX);

        let created_at = Utc::now();
        let mut organization = Self {
            id: OrganizationId::generate(),
            name: name.into(),
            balances: founders.iter().map(|f| (f.clone(), share)).collect(),
            members: founders.iter().cloned().collect(),
            founders,
            token_name: config.token_name,
            initial_supply: config.initial_supply,
            created_at,
            rules: config.rules,
            proposals: Vec::new(),
            applied: BTreeSet::new(),
            ledger: Ledger::with_genesis_time(created_at),
        };

        info!(
            id = %organization.id,
            name = %organization.name,
            founders = organization.founders.len(),
            "organization created"
        );
        organization.record_action("Organization initialized");

        Ok(organization)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn id(&self) -> OrganizationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn founders(&self) -> &[String] {
        &self.founders
    }

    pub fn token_name(&self) -> &str {
        &self.token_name
    }

    pub fn initial_supply(&self) -> u64 {
        self.initial_supply
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    pub fn is_member(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    /// Token balance, zero for unknown identities
    pub fn balance(&self, who: &str) -> i64 {
        self.balances.get(who).copied().unwrap_or(0)
    }

    pub fn balances(&self) -> &BTreeMap<String, i64> {
        &self.balances
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.iter().find(|p| p.id() == id)
    }

    /// All proposals with the given title; titles are not unique
    pub fn find_proposals_by_title(&self, title: &str) -> Vec<ProposalId> {
        self.proposals
            .iter()
            .filter(|p| p.title() == title)
            .map(Proposal::id)
            .collect()
    }

    /// Whether a transaction approved under `approval` was already applied
    pub fn has_applied(&self, approval: ApprovalId) -> bool {
        self.applied.contains(&approval)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Full state projection for reporting
    pub fn summary(&self) -> OrganizationSummary {
        OrganizationSummary {
            id: self.id,
            name: self.name.clone(),
            founders: self.founders.clone(),
            token_name: self.token_name.clone(),
            initial_supply: self.initial_supply,
            created_at: self.created_at,
            members: self.members.iter().cloned().collect(),
            balances: self.balances.clone(),
            rules: self.rules.clone(),
            proposals: self.proposals.clone(),
            ledger_length: self.ledger.len(),
        }
    }

    // ------------------------------------------------------------------------
    // Governance
    // ------------------------------------------------------------------------

    /// Set or replace a governance rule
    pub fn set_rule(&mut self, rule: GovernanceRule) -> String {
        self.rules.apply(rule);
        info!(org = %self.id, rule = %rule, "governance rule set");
        self.record_action(format!("Set governance rule: {} = {}", rule.name(), rule.value()));
        format!("Rule '{}' set to {}", rule.name(), rule.value())
    }

    /// Add a member; new members start with a zero balance
    pub fn add_member(&mut self, name: impl Into<String>) -> String {
        let name = name.into();
        self.members.insert(name.clone());
        self.balances.entry(name.clone()).or_insert(0);
        info!(org = %self.id, member = %name, "member added");
        self.record_action(format!("Added member: {}", name));
        format!("Member '{}' added.", name)
    }

    // ------------------------------------------------------------------------
    // Proposals
    // ------------------------------------------------------------------------

    /// Create a draft proposal
    pub fn create_proposal(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        proposer: impl Into<String>,
    ) -> ProposalId {
        let proposal = Proposal::new(self.id, title, description, proposer, Utc::now());
        let id = proposal.id();
        let title = proposal.title().to_string();
        self.proposals.push(proposal);

        info!(org = %self.id, proposal = %id, %title, "proposal created");
        self.record_action(format!("Created proposal: {}", title));
        id
    }

    /// Check that the proposer can afford the proposal cost
    pub fn validate_proposal(
        &self,
        id: ProposalId,
    ) -> Result<ProposalRequirements, GovernanceError> {
        let proposal = self.proposal(id).ok_or(GovernanceError::ProposalNotFound(id))?;
        let cost = self.rules.proposal_cost();
        let available = self.balance(proposal.proposer());

        if available < 0 || (available as u64) < cost {
            return Err(GovernanceError::InsufficientTokens {
                required: cost,
                available,
            });
        }

        Ok(ProposalRequirements {
            cost,
            voting_time_secs: self.rules.voting_time_secs(),
            quorum: self.rules.quorum(self.members.len()),
        })
    }

    /// Open voting on a draft proposal
    pub fn start_voting(&mut self, id: ProposalId) -> Result<(), GovernanceError> {
        let proposal = self.proposal_mut(id)?;
        proposal.start()?;
        let title = proposal.title().to_string();

        info!(org = %self.id, proposal = %id, "voting started");
        self.record_action(format!("Voting started on proposal: {}", title));
        Ok(())
    }

    /// Record a member's vote on an active proposal
    pub fn cast_vote(
        &mut self,
        id: ProposalId,
        member: &str,
        vote: Vote,
    ) -> Result<String, GovernanceError> {
        let org = self.id;
        let proposal = self.proposal_mut(id)?;
        if let Err(e) = proposal.cast_vote(member, vote) {
            warn!(%org, proposal = %id, member, status = %proposal.status(), "vote rejected");
            return Err(e);
        }

        info!(%org, proposal = %id, member, %vote, "vote recorded");
        self.record_action(format!(
            "{} voted '{}' on proposal '{}'",
            member,
            vote,
            id.to_hex()
        ));
        Ok(format!("{} voted {}", member, vote))
    }

    /// Evaluate a proposal against the current time
    pub fn evaluate_proposal(&mut self, id: ProposalId) -> Result<VotingOutcome, GovernanceError> {
        self.evaluate_proposal_at(id, Utc::now())
    }

    /// Evaluate a proposal as of `now`
    ///
    /// Only a passing outcome writes a block.
    pub fn evaluate_proposal_at(
        &mut self,
        id: ProposalId,
        now: DateTime<Utc>,
    ) -> Result<VotingOutcome, GovernanceError> {
        let member_count = self.members.len();
        let rules = self.rules.clone();
        let proposal = self.proposal_mut(id)?;
        let outcome = proposal.evaluate(&rules, member_count, now)?;
        let title = proposal.title().to_string();

        info!(org = %self.id, proposal = %id, %outcome, "proposal evaluated");
        if outcome == VotingOutcome::Passed {
            self.record_action(format!("Proposal passed and enacted: {}", title));
        }
        Ok(outcome)
    }

    fn proposal_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, GovernanceError> {
        self.proposals
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    // ------------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------------

    /// Append a governance-action block carrying the current contract
    fn record_action(&mut self, action: impl Into<String>) -> &Block {
        let (contract, bytecode) = ContractArtifact::from_summary(&self.summary()).into_parts();
        let record = GovernanceAction::new(action, self.name.clone(), contract, bytecode, Utc::now());
        self.ledger.append(vec![ActionRecord::Governance(record)])
    }

    /// Apply an approved transaction's balance change and record it in one step
    ///
    /// `balance_update` carries the party's new balance, computed by the caller.
    /// `approval` is marked as applied and cannot be committed again.
    pub(crate) fn commit_transaction(
        &mut self,
        approval: ApprovalId,
        payload: TransactionPayload,
        balance_update: Option<(String, i64)>,
    ) -> &Block {
        if let Some((party, balance)) = balance_update {
            self.balances.insert(party, balance);
        }
        self.applied.insert(approval);

        let (contract, bytecode) = ContractArtifact::from_summary(&self.summary()).into_parts();
        let record = TransactionRecord::new(payload, contract, bytecode, Utc::now());
        self.ledger.append(vec![ActionRecord::Transaction(record)])
    }
}
