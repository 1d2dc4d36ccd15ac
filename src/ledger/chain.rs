// Ledger - the append-only chain of blocks

use crate::ledger::block::{Block, BlockView, GENESIS_PREVIOUS_FINGERPRINT};
use crate::ledger::record::ActionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when checking or loading a ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The chain does not satisfy its linking or fingerprint invariants.
    /// Indicates corruption; callers must not keep using the ledger.
    #[error("Ledger invariant violated at block {index}: {reason}")]
    InvariantViolation { index: u64, reason: String },

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

/// Append-only sequence of blocks, starting with a genesis block
///
/// Deserializing runs `verify`, so a loaded ledger always has its genesis block.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "UncheckedLedger")]
pub struct Ledger {
    blocks: Vec<Block>,
}

/// Wire form of a ledger before its chain is checked
#[derive(Deserialize)]
struct UncheckedLedger {
    blocks: Vec<Block>,
}

impl TryFrom<UncheckedLedger> for Ledger {
    type Error = LedgerError;

    fn try_from(unchecked: UncheckedLedger) -> Result<Self, Self::Error> {
        let ledger = Ledger {
            blocks: unchecked.blocks,
        };
        ledger.verify()?;
        Ok(ledger)
    }
}

impl Ledger {
    /// Create a ledger holding only a genesis block
    pub fn new() -> Self {
        Self::with_genesis_time(Utc::now())
    }

    /// Create a ledger whose genesis block carries the given time
    pub fn with_genesis_time(created_at: DateTime<Utc>) -> Self {
        Self {
            blocks: vec![Block::genesis(created_at)],
        }
    }

    /// Append a block chained to the current tip
    pub fn append(&mut self, payload: Vec<ActionRecord>) -> &Block {
        self.append_at(payload, Utc::now())
    }

    /// Append a block with an explicit creation time
    pub fn append_at(&mut self, payload: Vec<ActionRecord>, created_at: DateTime<Utc>) -> &Block {
        let tip = self.tip();
        let index = tip.index() + 1;
        let block = Block::new(index, created_at, payload, tip.fingerprint());

        debug!(
            index,
            records = block.payload().len(),
            fingerprint = %block.fingerprint(),
            "appended ledger block"
        );

        self.blocks.push(block);
        self.tip()
    }

    /// Get the most recent block
    pub fn tip(&self) -> &Block {
        // Construction and deserialization both guarantee a genesis block
        &self.blocks[self.blocks.len() - 1]
    }

    /// Get a block by index
    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    /// Get all blocks
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks, genesis included
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// A ledger always holds its genesis block
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Detached copies of every block, for reporting
    pub fn snapshot(&self) -> Vec<BlockView> {
        self.blocks.iter().map(Block::view).collect()
    }

    /// Check contiguous indices, genesis shape, links and fingerprints
    pub fn verify(&self) -> Result<(), LedgerError> {
        let genesis = self.blocks.first().ok_or_else(|| LedgerError::InvariantViolation {
            index: 0,
            reason: "missing genesis block".to_string(),
        })?;

        if genesis.index() != 0 {
            return Err(violation(genesis.index(), "genesis block must have index 0"));
        }
        if genesis.previous_fingerprint() != GENESIS_PREVIOUS_FINGERPRINT {
            return Err(violation(0, "genesis previous fingerprint must be \"0\""));
        }
        if !genesis.payload().is_empty() {
            return Err(violation(0, "genesis payload must be empty"));
        }

        for (position, block) in self.blocks.iter().enumerate() {
            if block.index() != position as u64 {
                return Err(violation(
                    block.index(),
                    &format!("expected index {}", position),
                ));
            }
            if !block.is_sealed() {
                return Err(violation(block.index(), "fingerprint does not match contents"));
            }
            if position > 0 {
                let previous = &self.blocks[position - 1];
                if block.previous_fingerprint() != previous.fingerprint() {
                    return Err(violation(
                        block.index(),
                        "previous fingerprint does not match preceding block",
                    ));
                }
            }
        }

        Ok(())
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        postcard::to_allocvec(self).map_err(|e| LedgerError::SerializationFailed(e.to_string()))
    }

    /// Deserialize from bytes and verify the chain
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let unchecked: UncheckedLedger = postcard::from_bytes(bytes)
            .map_err(|e| LedgerError::DeserializationFailed(e.to_string()))?;
        Ledger::try_from(unchecked)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

fn violation(index: u64, reason: &str) -> LedgerError {
    LedgerError::InvariantViolation {
        index,
        reason: reason.to_string(),
    }
}
