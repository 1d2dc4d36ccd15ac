// Action records - what a block's payload is made of

use crate::transactions::TransactionPayload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A governance action recorded by an organization
///
/// Carries the pseudo-contract rendered from the organization's full summary at
/// the time of the action, so every block is a self-contained audit snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GovernanceAction {
    action: String,
    organization: String,
    contract: String,
    bytecode: String,
    timestamp: DateTime<Utc>,
}

impl GovernanceAction {
    /// Create a governance action record
    pub fn new(
        action: impl Into<String>,
        organization: impl Into<String>,
        contract: String,
        bytecode: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            action: action.into(),
            organization: organization.into(),
            contract,
            bytecode,
            timestamp,
        }
    }

    /// Human-readable description of the action
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Name of the organization that performed the action
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Pseudo-contract text rendered from the organization summary
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Fingerprint of the contract text
    pub fn bytecode(&self) -> &str {
        &self.bytecode
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// An executed treasury transaction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    payload: TransactionPayload,
    contract: String,
    bytecode: String,
    timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a transaction record
    pub fn new(
        payload: TransactionPayload,
        contract: String,
        bytecode: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            payload,
            contract,
            bytecode,
            timestamp,
        }
    }

    /// The approved payload that was applied
    pub fn payload(&self) -> &TransactionPayload {
        &self.payload
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    pub fn bytecode(&self) -> &str {
        &self.bytecode
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// A plain token transfer, for ledgers used outside an organization
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub amount: u64,
    pub token: String,
    pub timestamp: DateTime<Utc>,
}

/// One entry in a block payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ActionRecord {
    Governance(GovernanceAction),
    Transaction(TransactionRecord),
    Transfer(Transfer),
}

impl ActionRecord {
    /// Short label for the record kind
    pub fn kind(&self) -> &'static str {
        match self {
            ActionRecord::Governance(_) => "governance",
            ActionRecord::Transaction(record) => record.payload().kind(),
            ActionRecord::Transfer(_) => "transfer",
        }
    }

    /// Get the governance action, if this is one
    pub fn as_governance(&self) -> Option<&GovernanceAction> {
        match self {
            ActionRecord::Governance(action) => Some(action),
            _ => None,
        }
    }

    /// Get the transaction record, if this is one
    pub fn as_transaction(&self) -> Option<&TransactionRecord> {
        match self {
            ActionRecord::Transaction(record) => Some(record),
            _ => None,
        }
    }
}
