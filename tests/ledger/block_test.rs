// Block Tests
// Tests for fingerprinting and block construction

use chrono::{Duration, TimeZone, Utc};
use dao_ledger::ledger::{ActionRecord, Block, Transfer};

const PREVIOUS: &str = "0000000000000000000a7b3c6d8e9f1234567890abcdef1234567890abcdef12";

fn transfer(from: &str, to: &str, amount: u64) -> Vec<ActionRecord> {
    vec![ActionRecord::Transfer(Transfer {
        from: from.to_string(),
        to: to.to_string(),
        amount,
        token: "REVO".to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 6, 26, 12, 0, 0).unwrap(),
    })]
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

#[test]
fn test_block_creation() {
    let payload = transfer("alice", "bob", 1500);
    let block = Block::new(1, Utc::now(), payload.clone(), PREVIOUS);

    assert_eq!(block.index(), 1);
    assert_eq!(block.payload(), payload.as_slice());
    assert_eq!(block.previous_fingerprint(), PREVIOUS);
    assert_eq!(block.fingerprint().len(), 64);
    assert!(block.fingerprint().chars().all(|c| c.is_ascii_hexdigit()));
    assert!(block.is_sealed());
}

#[test]
fn test_view_copies_fields() {
    let block = Block::new(2, Utc::now(), transfer("a", "b", 1), PREVIOUS);
    let view = block.view();

    assert_eq!(view.index, 2);
    assert_eq!(view.created_at, block.created_at());
    assert_eq!(view.fingerprint, block.fingerprint());
    assert_eq!(view.previous_fingerprint, PREVIOUS);
}

// ============================================================================
// FINGERPRINTS
// ============================================================================

#[test]
fn test_different_payloads_different_fingerprints() {
    let at = Utc::now();
    let a = Block::new(1, at, transfer("alice", "bob", 1500), PREVIOUS);
    let b = Block::new(1, at, transfer("carol", "dave", 250), PREVIOUS);

    assert_ne!(a.fingerprint(), b.fingerprint());
}

#[test]
fn test_different_timestamps_different_fingerprints() {
    let at = Utc.with_ymd_and_hms(2024, 6, 26, 12, 0, 0).unwrap();
    let a = Block::new(1, at, transfer("alice", "bob", 1500), PREVIOUS);
    let b = Block::new(1, at + Duration::seconds(1), transfer("alice", "bob", 1500), PREVIOUS);

    assert_ne!(a.fingerprint(), b.fingerprint());
}

#[test]
fn test_sub_microsecond_timestamps_different_fingerprints() {
    let at = Utc.with_ymd_and_hms(2024, 6, 26, 12, 0, 0).unwrap();
    let a = Block::new(1, at, Vec::new(), PREVIOUS);
    let b = Block::new(1, at + Duration::nanoseconds(500), Vec::new(), PREVIOUS);

    assert_ne!(a.fingerprint(), b.fingerprint());
    assert!(b.is_sealed());
}

#[test]
fn test_different_index_different_fingerprints() {
    let at = Utc::now();
    let a = Block::new(1, at, Vec::new(), PREVIOUS);
    let b = Block::new(2, at, Vec::new(), PREVIOUS);

    assert_ne!(a.fingerprint(), b.fingerprint());
}

#[test]
fn test_compute_fingerprint_matches_block() {
    let at = Utc::now();
    let payload = transfer("alice", "bob", 7);
    let block = Block::new(5, at, payload.clone(), PREVIOUS);

    assert_eq!(
        Block::compute_fingerprint(5, &at, &payload, PREVIOUS),
        block.fingerprint()
    );
}
