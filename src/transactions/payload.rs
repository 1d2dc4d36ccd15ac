// Transaction payloads - what a treasury operation asks the approvers to sign off

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four treasury operations and their parties
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Tokens sold to a buyer at a unit price
    TokenSale { buyer: String, token_price: f64 },
    /// Tokens paid by a member into the treasury
    TreasuryContribution { contributor: String },
    /// Tokens paid out of the treasury to a recipient
    FundDistribution {
        recipient: String,
        reason: Option<String>,
    },
    /// Treasury funds committed to an outside project
    Investment { target_project: String },
}

/// How an operation moves a party's balance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceEffect {
    Credit,
    Debit,
}

impl TransactionKind {
    /// Machine label used in ledger records
    pub fn name(&self) -> &'static str {
        match self {
            TransactionKind::TokenSale { .. } => "token_sale",
            TransactionKind::TreasuryContribution { .. } => "treasury_contribution",
            TransactionKind::FundDistribution { .. } => "fund_distribution",
            TransactionKind::Investment { .. } => "investment",
        }
    }

    /// Human label used in receipts and failures
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::TokenSale { .. } => "Token sale",
            TransactionKind::TreasuryContribution { .. } => "Treasury contribution",
            TransactionKind::FundDistribution { .. } => "Fund distribution",
            TransactionKind::Investment { .. } => "Investment",
        }
    }

    /// The party whose balance changes, and in which direction
    pub fn balance_effect(&self) -> Option<(&str, BalanceEffect)> {
        match self {
            TransactionKind::TokenSale { buyer, .. } => Some((buyer.as_str(), BalanceEffect::Credit)),
            TransactionKind::TreasuryContribution { contributor } => {
                Some((contributor.as_str(), BalanceEffect::Debit))
            }
            TransactionKind::FundDistribution { recipient, .. } => {
                Some((recipient.as_str(), BalanceEffect::Credit))
            }
            TransactionKind::Investment { .. } => None,
        }
    }
}

/// A treasury operation as proposed to an approval engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionPayload {
    kind: TransactionKind,
    amount: u64,
    requested_at: DateTime<Utc>,
}

impl TransactionPayload {
    pub fn new(kind: TransactionKind, amount: u64, requested_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            amount,
            requested_at,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind.name()
    }

    pub fn operation(&self) -> &TransactionKind {
        &self.kind
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }
}
