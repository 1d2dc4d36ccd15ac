// Block - a single fingerprinted ledger entry

use crate::ledger::record::ActionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

/// Previous fingerprint carried by the genesis block
pub const GENESIS_PREVIOUS_FINGERPRINT: &str = "0";

/// A block in the ledger
///
/// The fingerprint binds the index, creation time, payload and the previous
/// block's fingerprint. Blocks are immutable once built; there are no setters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    created_at: DateTime<Utc>,
    payload: Vec<ActionRecord>,
    previous_fingerprint: String,
    fingerprint: String,
}

impl Block {
    /// Build a block and compute its fingerprint
    pub fn new(
        index: u64,
        created_at: DateTime<Utc>,
        payload: Vec<ActionRecord>,
        previous_fingerprint: impl Into<String>,
    ) -> Self {
        let previous_fingerprint = previous_fingerprint.into();
        let fingerprint =
            Self::compute_fingerprint(index, &created_at, &payload, &previous_fingerprint);
        Self {
            index,
            created_at,
            payload,
            previous_fingerprint,
            fingerprint,
        }
    }

    /// Build the genesis block (index 0, empty payload, previous fingerprint "0")
    pub fn genesis(created_at: DateTime<Utc>) -> Self {
        Self::new(0, created_at, Vec::new(), GENESIS_PREVIOUS_FINGERPRINT)
    }

    /// Get the position of this block in the chain
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Get the creation time
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the action records in this block
    pub fn payload(&self) -> &[ActionRecord] {
        &self.payload
    }

    /// Get the fingerprint of the preceding block
    pub fn previous_fingerprint(&self) -> &str {
        &self.previous_fingerprint
    }

    /// Get this block's fingerprint (lowercase hex SHA-256)
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Check whether the stored fingerprint matches the block contents
    pub fn is_sealed(&self) -> bool {
        let expected = Self::compute_fingerprint(
            self.index,
            &self.created_at,
            &self.payload,
            &self.previous_fingerprint,
        );
        expected == self.fingerprint
    }

    /// Compute the fingerprint for a set of block fields
    pub fn compute_fingerprint(
        index: u64,
        created_at: &DateTime<Utc>,
        payload: &[ActionRecord],
        previous_fingerprint: &str,
    ) -> String {
        let bytes = Self::to_hashing_bytes(index, created_at, payload, previous_fingerprint);
        hex::encode(Sha256::digest(&bytes))
    }

    /// Deterministic serialization of the hashed fields
    fn to_hashing_bytes(
        index: u64,
        created_at: &DateTime<Utc>,
        payload: &[ActionRecord],
        previous_fingerprint: &str,
    ) -> Vec<u8> {
        let mut bytes = Vec::new();

        bytes.extend_from_slice(&index.to_le_bytes());
        bytes.extend_from_slice(&created_at.timestamp().to_le_bytes());
        bytes.extend_from_slice(&created_at.timestamp_subsec_nanos().to_le_bytes());

        let payload_bytes = encode_payload(payload);
        bytes.extend_from_slice(&(payload_bytes.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&payload_bytes);

        bytes.extend_from_slice(&(previous_fingerprint.len() as u32).to_le_bytes());
        bytes.extend_from_slice(previous_fingerprint.as_bytes());

        bytes
    }

    /// Owned read-only projection of this block
    pub fn view(&self) -> BlockView {
        BlockView {
            index: self.index,
            created_at: self.created_at,
            payload: self.payload.clone(),
            previous_fingerprint: self.previous_fingerprint.clone(),
            fingerprint: self.fingerprint.clone(),
        }
    }
}

/// Canonical bytes of a block payload
///
/// Falls back to the debug rendering if postcard rejects the records, so the
/// fingerprint still covers every field.
fn encode_payload(payload: &[ActionRecord]) -> Vec<u8> {
    match postcard::to_allocvec(payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, records = payload.len(), "payload encoding failed, hashing debug form");
            let mut bytes = b"debug:".to_vec();
            bytes.extend_from_slice(format!("{:?}", payload).as_bytes());
            bytes
        }
    }
}

/// Detached copy of a block for reporting
///
/// Changing a view has no effect on the ledger it was taken from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockView {
    pub index: u64,
    pub created_at: DateTime<Utc>,
    pub payload: Vec<ActionRecord>,
    pub previous_fingerprint: String,
    pub fingerprint: String,
}
