// Voting Tests
// Tests for the proposal lifecycle driven through an organization

use chrono::Duration;
use dao_ledger::governance::{
    GovernanceError, GovernanceRule, Organization, ProposalId, ProposalStatus, Vote,
    VotingOutcome,
};

/// Founders Mihail, Ben and Moritz with quorum 2, pass threshold 2, 1 hour window
fn test_dao() -> Organization {
    let mut org = Organization::new("TestDAO", ["Mihail", "Ben", "Moritz"], "REVO", 100).unwrap();
    org.set_rule(GovernanceRule::ProposalCost(10));
    org.set_rule(GovernanceRule::Quorum(2));
    org.set_rule(GovernanceRule::VotingTimeHours(1));
    org.set_rule(GovernanceRule::MinVotesToPass(2));
    org
}

fn active_proposal(org: &mut Organization) -> ProposalId {
    let id = org.create_proposal("Increase Supply", "We want more tokens", "Mihail");
    org.start_voting(id).unwrap();
    id
}

// ============================================================================
// STARTING AND CASTING
// ============================================================================

#[test]
fn test_start_voting() {
    let mut org = test_dao();
    let id = org.create_proposal("Increase Supply", "We want more tokens", "Mihail");
    let before = org.ledger().len();

    org.start_voting(id).unwrap();

    assert_eq!(org.proposal(id).unwrap().status(), ProposalStatus::Active);
    assert_eq!(org.ledger().len(), before + 1);
}

#[test]
fn test_cannot_start_twice() {
    let mut org = test_dao();
    let id = active_proposal(&mut org);

    assert!(matches!(
        org.start_voting(id),
        Err(GovernanceError::InvalidTransition { status: ProposalStatus::Active, .. })
    ));
}

#[test]
fn test_cast_vote() {
    let mut org = test_dao();
    let id = active_proposal(&mut org);
    let before = org.ledger().len();

    let message = org.cast_vote(id, "Ben", Vote::Yes).unwrap();

    assert_eq!(message, "Ben voted yes");
    assert_eq!(org.proposal(id).unwrap().votes().get("Ben"), Some(&Vote::Yes));
    assert_eq!(org.ledger().len(), before + 1);
}

#[test]
fn test_vote_on_draft_rejected_without_block() {
    let mut org = test_dao();
    let id = org.create_proposal("Increase Supply", "We want more tokens", "Mihail");
    let before = org.ledger().len();

    let err = org.cast_vote(id, "Ben", Vote::Yes).unwrap_err();

    assert_eq!(err.to_string(), "Voting not active.");
    assert!(org.proposal(id).unwrap().votes().is_empty());
    assert_eq!(org.ledger().len(), before);
}

#[test]
fn test_unknown_proposal() {
    let mut org = test_dao();
    let missing = ProposalId::generate();
    let before = org.ledger().len();

    let vote = org.cast_vote(missing, "Ben", Vote::Yes).unwrap_err();
    let eval = org.evaluate_proposal(missing).unwrap_err();

    assert_eq!(vote, GovernanceError::ProposalNotFound(missing));
    assert_eq!(eval.to_string(), "Proposal not found.");
    assert_eq!(org.ledger().len(), before);
}

// ============================================================================
// EVALUATION
// ============================================================================

#[test]
fn test_voting_flow_passes_and_records() {
    let mut org = test_dao();
    let id = active_proposal(&mut org);
    org.cast_vote(id, "Mihail", Vote::Yes).unwrap();
    org.cast_vote(id, "Ben", Vote::Yes).unwrap();
    let before = org.ledger().len();

    let outcome = org.evaluate_proposal(id).unwrap();

    assert_eq!(outcome, VotingOutcome::Passed);
    assert_eq!(outcome.to_string(), "Proposal passed.");
    assert_eq!(org.proposal(id).unwrap().status(), ProposalStatus::Passed);
    assert_eq!(org.ledger().len(), before + 1);
    let action = org.ledger().tip().payload()[0].as_governance().unwrap();
    assert!(action.action().contains("Proposal passed and enacted"));
    assert!(org.ledger().verify().is_ok());
}

#[test]
fn test_quorum_not_met_reverts_to_draft() {
    let mut org = test_dao();
    let id = active_proposal(&mut org);
    org.cast_vote(id, "Mihail", Vote::Yes).unwrap();
    let before = org.ledger().len();

    let outcome = org.evaluate_proposal(id).unwrap();

    assert_eq!(outcome.to_string(), "Quorum not met.");
    assert_eq!(org.proposal(id).unwrap().status(), ProposalStatus::Draft);
    assert_eq!(org.ledger().len(), before);
}

#[test]
fn test_second_round_reaches_quorum() {
    let mut org = test_dao();
    let id = active_proposal(&mut org);
    org.cast_vote(id, "Mihail", Vote::Yes).unwrap();
    assert_eq!(org.evaluate_proposal(id).unwrap(), VotingOutcome::QuorumNotMet);

    // Earlier votes carry over into the reopened round
    org.start_voting(id).unwrap();
    org.cast_vote(id, "Ben", Vote::Yes).unwrap();
    let before = org.ledger().len();

    let outcome = org.evaluate_proposal(id).unwrap();

    assert_eq!(outcome, VotingOutcome::Passed);
    assert_eq!(org.proposal(id).unwrap().status(), ProposalStatus::Passed);
    assert_eq!(org.ledger().len(), before + 1);
}

#[test]
fn test_voting_time_expired() {
    let mut org = test_dao();
    let id = active_proposal(&mut org);
    org.cast_vote(id, "Mihail", Vote::Yes).unwrap();
    org.cast_vote(id, "Ben", Vote::Yes).unwrap();
    let before = org.ledger().len();

    // Two hours after creation with a one hour window
    let later = org.proposal(id).unwrap().created_at() + Duration::seconds(7200);
    let outcome = org.evaluate_proposal_at(id, later).unwrap();

    assert_eq!(outcome.to_string(), "Voting time expired.");
    assert_eq!(org.proposal(id).unwrap().status(), ProposalStatus::Failed);
    assert_eq!(org.ledger().len(), before);
}

#[test]
fn test_majority_no_fails_without_block() {
    let mut org = test_dao();
    let id = active_proposal(&mut org);
    org.cast_vote(id, "Mihail", Vote::Yes).unwrap();
    org.cast_vote(id, "Ben", Vote::No).unwrap();
    org.cast_vote(id, "Moritz", Vote::No).unwrap();
    let before = org.ledger().len();

    let outcome = org.evaluate_proposal(id).unwrap();

    assert_eq!(outcome.to_string(), "Proposal failed.");
    assert_eq!(org.proposal(id).unwrap().status(), ProposalStatus::Failed);
    assert_eq!(org.ledger().len(), before);
}

#[test]
fn test_terminal_proposal_rejects_votes() {
    let mut org = test_dao();
    let id = active_proposal(&mut org);
    org.cast_vote(id, "Mihail", Vote::Yes).unwrap();
    org.cast_vote(id, "Ben", Vote::Yes).unwrap();
    org.evaluate_proposal(id).unwrap();

    assert!(org.cast_vote(id, "Moritz", Vote::No).is_err());
    assert!(org.evaluate_proposal(id).is_err());
    assert_eq!(org.proposal(id).unwrap().status(), ProposalStatus::Passed);
}

#[test]
fn test_default_quorum_is_majority() {
    let mut org = Organization::new("TestDAO", ["A", "B", "C", "D"], "REVO", 100).unwrap();
    let id = org.create_proposal("Budget", "Spend it", "A");
    org.start_voting(id).unwrap();
    org.cast_vote(id, "A", Vote::Yes).unwrap();
    org.cast_vote(id, "B", Vote::Yes).unwrap();

    // Four members need three votes
    assert_eq!(org.evaluate_proposal(id).unwrap(), VotingOutcome::QuorumNotMet);

    org.start_voting(id).unwrap();
    org.cast_vote(id, "C", Vote::Yes).unwrap();
    assert_eq!(org.evaluate_proposal(id).unwrap(), VotingOutcome::Passed);
}
