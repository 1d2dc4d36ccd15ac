// Registry Tests
// Tests for the shared organization and wallet store

use dao_ledger::governance::{
    GovernanceError, GovernanceRule, OrganizationConfig, OrganizationId, Vote, VotingOutcome,
};
use dao_ledger::multisig::ApprovalEngine;
use dao_ledger::registry::{Registry, RegistryError, WalletId};
use dao_ledger::transactions::Transaction;
use std::sync::Arc;
use std::thread;

const FOUNDERS: [&str; 3] = ["Mihail", "Ben", "Moritz"];

fn setup() -> (Registry, OrganizationId, WalletId) {
    let registry = Registry::new();
    let config = OrganizationConfig::new().with_initial_supply(900);
    let org = registry.create_organization("TestDAO", FOUNDERS, config).unwrap();
    let wallet = registry
        .register_wallet(ApprovalEngine::new(FOUNDERS, 2).unwrap())
        .unwrap();
    (registry, org, wallet)
}

// ============================================================================
// LOOKUP
// ============================================================================

#[test]
fn test_create_and_lookup() {
    let (registry, org, _) = setup();

    assert_eq!(registry.len().unwrap(), 1);
    assert_eq!(registry.organization_ids().unwrap(), vec![org]);
    let name = registry.with_organization(org, |o| o.name().to_string()).unwrap();
    assert_eq!(name, "TestDAO");
}

#[test]
fn test_unknown_ids() {
    let (registry, _, _) = setup();
    let missing_org = OrganizationId::generate();
    let missing_wallet = WalletId::generate();

    assert!(matches!(
        registry.with_organization(missing_org, |_| ()),
        Err(RegistryError::OrganizationNotFound(id)) if id == missing_org
    ));
    assert!(matches!(
        registry.with_wallet(missing_wallet, |_| ()),
        Err(RegistryError::WalletNotFound(id)) if id == missing_wallet
    ));
}

#[test]
fn test_create_without_founders_fails() {
    let registry = Registry::new();
    let founders: Vec<String> = Vec::new();

    let result = registry.create_organization("Empty", founders, OrganizationConfig::new());

    assert!(matches!(result, Err(RegistryError::Governance(_))));
    assert!(registry.is_empty().unwrap());
}

#[test]
fn test_find_proposals_by_title() {
    let (registry, org, _) = setup();
    let ids = registry
        .with_organization(org, |o| {
            vec![
                o.create_proposal("Budget", "v1", "Ben"),
                o.create_proposal("Budget", "v2", "Ben"),
                o.create_proposal("Roadmap", "v1", "Ben"),
            ]
        })
        .unwrap();

    let found = registry.find_proposals_by_title(org, "Budget").unwrap();

    assert_eq!(found, ids[..2].to_vec());
}

// ============================================================================
// TRANSACTIONS THROUGH THE REGISTRY
// ============================================================================

#[test]
fn test_transaction_flow() {
    let (registry, org, wallet) = setup();
    let sale = Transaction::token_sale("Alice", 100, 1.5);

    let approval = registry.submit_transaction(wallet, &sale).unwrap();
    assert!(!registry.approve(wallet, approval, "Mihail").unwrap());
    assert!(registry.approve(wallet, approval, "Ben").unwrap());

    let receipt = registry.execute_transaction(org, wallet, &sale, approval).unwrap();

    assert_eq!(receipt.to_string(), "Token sale executed and recorded on blockchain.");
    let balance = registry.with_organization(org, |o| o.balance("Alice")).unwrap();
    assert_eq!(balance, 100);
}

#[test]
fn test_transaction_without_threshold_fails() {
    let (registry, org, wallet) = setup();
    let sale = Transaction::token_sale("Alice", 100, 1.5);

    let approval = registry.submit_transaction(wallet, &sale).unwrap();
    registry.approve(wallet, approval, "Mihail").unwrap();

    let result = registry.execute_transaction(org, wallet, &sale, approval);

    assert!(matches!(result, Err(RegistryError::Transaction(_))));
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn test_concurrent_members_keep_chain_consistent() {
    let (registry, org, _) = setup();
    let registry = Arc::new(registry);
    let before = registry.with_organization(org, |o| o.ledger().len()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry
                    .with_organization(org, |o| o.add_member(format!("member-{}", n)))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    registry
        .with_organization(org, |o| {
            assert_eq!(o.ledger().len(), before + 8);
            assert_eq!(o.members().len(), 11);
            assert!(o.ledger().verify().is_ok());
        })
        .unwrap();
}

#[test]
fn test_poisoned_entry_reported() {
    let (registry, org, _) = setup();
    let registry = Arc::new(registry);

    let shared = Arc::clone(&registry);
    let panicked = thread::spawn(move || {
        let _ = shared.with_organization(org, |_| panic!("writer died"));
    })
    .join();
    assert!(panicked.is_err());

    let result = registry.with_organization(org, |o| o.ledger().len());
    assert!(matches!(result, Err(RegistryError::LockPoisoned)));
    assert_eq!(registry.len().unwrap(), 1);
}

#[test]
fn test_concurrent_transactions_each_recorded() {
    let (registry, org, wallet) = setup();
    let registry = Arc::new(registry);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let sale = Transaction::token_sale("Alice", 10, 1.0);
                let approval = registry.submit_transaction(wallet, &sale).unwrap();
                registry.approve(wallet, approval, "Ben").unwrap();
                registry.approve(wallet, approval, "Moritz").unwrap();
                registry.execute_transaction(org, wallet, &sale, approval).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    registry
        .with_organization(org, |o| {
            assert_eq!(o.balance("Alice"), 40);
            assert!(o.ledger().verify().is_ok());
        })
        .unwrap();
}

#[test]
fn test_governance_inside_one_lock() {
    let (registry, org, _) = setup();

    let outcome = registry
        .with_organization(org, |o| -> Result<VotingOutcome, GovernanceError> {
            o.set_rule(GovernanceRule::Quorum(2));
            let id = o.create_proposal("Increase Supply", "More tokens", "Mihail");
            o.start_voting(id)?;
            o.cast_vote(id, "Mihail", Vote::Yes)?;
            o.cast_vote(id, "Ben", Vote::Yes)?;
            o.evaluate_proposal(id)
        })
        .unwrap()
        .unwrap();

    assert_eq!(outcome, VotingOutcome::Passed);
}
