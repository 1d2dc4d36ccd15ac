// Treasury operations - submit for approval, then execute against an organization
//
// Submission and approval are separate steps: approvers call
// `ApprovalEngine::approve` themselves before anyone executes.

use crate::governance::Organization;
use crate::multisig::{ApprovalEngine, ApprovalId, MultisigError};
use crate::transactions::payload::{BalanceEffect, TransactionKind, TransactionPayload};
use chrono::Utc;
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that abort a treasury operation
///
/// No balance changes and no block is written when any of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("{label} failed multisig approval: {source}")]
    Approval {
        label: &'static str,
        #[source]
        source: MultisigError,
    },

    #[error("Approved payload does not match this transaction")]
    PayloadMismatch,

    #[error("Approval {0} has already been executed")]
    AlreadyExecuted(ApprovalId),

    #[error("Balance would overflow")]
    BalanceOverflow,
}

/// Confirmation of an executed operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    label: &'static str,
    block_index: u64,
    fingerprint: String,
}

impl TransactionReceipt {
    /// Index of the block that recorded the operation
    pub fn block_index(&self) -> u64 {
        self.block_index
    }

    /// Fingerprint of the block that recorded the operation
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl fmt::Display for TransactionReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} executed and recorded on blockchain.", self.label)
    }
}

/// A treasury operation waiting to go through an approval engine
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    payload: TransactionPayload,
}

impl Transaction {
    /// Sell `amount` tokens to `buyer` at `token_price` each
    pub fn token_sale(buyer: impl Into<String>, amount: u64, token_price: f64) -> Self {
        Self::from_kind(
            TransactionKind::TokenSale {
                buyer: buyer.into(),
                token_price,
            },
            amount,
        )
    }

    /// Move `amount` tokens from `contributor` into the treasury
    pub fn treasury_contribution(contributor: impl Into<String>, amount: u64) -> Self {
        Self::from_kind(
            TransactionKind::TreasuryContribution {
                contributor: contributor.into(),
            },
            amount,
        )
    }

    /// Pay `amount` tokens out to `recipient`
    pub fn fund_distribution(
        recipient: impl Into<String>,
        amount: u64,
        reason: Option<String>,
    ) -> Self {
        Self::from_kind(
            TransactionKind::FundDistribution {
                recipient: recipient.into(),
                reason,
            },
            amount,
        )
    }

    /// Commit `amount` to `target_project`; balances are unchanged
    pub fn investment(target_project: impl Into<String>, amount: u64) -> Self {
        Self::from_kind(
            TransactionKind::Investment {
                target_project: target_project.into(),
            },
            amount,
        )
    }

    fn from_kind(kind: TransactionKind, amount: u64) -> Self {
        Self {
            payload: TransactionPayload::new(kind, amount, Utc::now()),
        }
    }

    pub fn payload(&self) -> &TransactionPayload {
        &self.payload
    }

    /// Human label, e.g. "Token sale"
    pub fn label(&self) -> &'static str {
        self.payload.operation().label()
    }

    /// Propose this operation; approvals are collected separately
    pub fn submit(&self, engine: &mut ApprovalEngine) -> ApprovalId {
        let id = engine.propose(self.payload.clone());
        info!(approval = %id, kind = self.payload.kind(), amount = self.payload.amount(), "transaction submitted");
        id
    }

    /// Execute once the engine has enough approvals for `id`
    ///
    /// Each approval authorizes one execution per organization.
    pub fn execute(
        &self,
        organization: &mut Organization,
        engine: &ApprovalEngine,
        id: ApprovalId,
    ) -> Result<TransactionReceipt, TransactionError> {
        if organization.has_applied(id) {
            warn!(approval = %id, "approval already executed");
            return Err(TransactionError::AlreadyExecuted(id));
        }

        let approved = engine.execute(id).map_err(|source| {
            warn!(approval = %id, %source, "transaction not approved");
            TransactionError::Approval {
                label: self.label(),
                source,
            }
        })?;

        if approved != self.payload {
            return Err(TransactionError::PayloadMismatch);
        }

        apply(organization, id, approved)
    }
}

/// Apply an approved payload to an organization and record it
fn apply(
    organization: &mut Organization,
    approval: ApprovalId,
    payload: TransactionPayload,
) -> Result<TransactionReceipt, TransactionError> {
    let balance_update = match payload.operation().balance_effect() {
        Some((party, effect)) => {
            let amount =
                i64::try_from(payload.amount()).map_err(|_| TransactionError::BalanceOverflow)?;
            let current = organization.balance(party);
            let updated = match effect {
                BalanceEffect::Credit => current.checked_add(amount),
                BalanceEffect::Debit => current.checked_sub(amount),
            }
            .ok_or(TransactionError::BalanceOverflow)?;
            Some((party.to_string(), updated))
        }
        None => None,
    };

    let label = payload.operation().label();
    let kind = payload.kind();
    let amount = payload.amount();
    let block = organization.commit_transaction(approval, payload, balance_update);

    info!(kind, amount, block = block.index(), "transaction executed");
    Ok(TransactionReceipt {
        label,
        block_index: block.index(),
        fingerprint: block.fingerprint().to_string(),
    })
}
