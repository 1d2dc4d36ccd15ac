// Approval engine - threshold approvals for proposed actions

use crate::id::random_id;
use crate::transactions::TransactionPayload;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

random_id!(
    /// Handle for an action queued in an approval engine
    ApprovalId,
    "approval"
);

/// Errors from approval engine operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultisigError {
    #[error("Pending action not found: {0}")]
    NotFound(ApprovalId),

    #[error("Not enough approvals: have {approvals}, need {required}")]
    InsufficientApprovals { approvals: usize, required: usize },

    #[error("Invalid threshold: {required} approvals required from {owners} owners")]
    InvalidThreshold { required: usize, owners: usize },
}

/// A proposed action and the owners who approved it
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingAction<P> {
    id: ApprovalId,
    payload: P,
    approvals: BTreeSet<String>,
}

impl<P> PendingAction<P> {
    pub fn id(&self) -> ApprovalId {
        self.id
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Owners who have approved so far
    pub fn approvals(&self) -> &BTreeSet<String> {
        &self.approvals
    }
}

/// Multisig wallet: actions execute only once enough owners approve
///
/// Entries stay in the queue after execution and are addressed by the
/// [`ApprovalId`] returned from [`ApprovalEngine::propose`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApprovalEngine<P = TransactionPayload> {
    owners: BTreeSet<String>,
    required: usize,
    pending: Vec<PendingAction<P>>,
}

impl<P: Clone> ApprovalEngine<P> {
    /// Create an engine; `required` must be between 1 and the number of distinct owners
    pub fn new<I, S>(owners: I, required: usize) -> Result<Self, MultisigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let owners: BTreeSet<String> = owners.into_iter().map(Into::into).collect();

        if required == 0 || required > owners.len() {
            return Err(MultisigError::InvalidThreshold {
                required,
                owners: owners.len(),
            });
        }

        Ok(Self {
            owners,
            required,
            pending: Vec::new(),
        })
    }

    /// Queue an action with no approvals
    pub fn propose(&mut self, payload: P) -> ApprovalId {
        let id = ApprovalId::generate();
        self.pending.push(PendingAction {
            id,
            payload,
            approvals: BTreeSet::new(),
        });
        debug!(%id, "proposed action");
        id
    }

    /// Record an owner's approval and report whether the threshold is met
    ///
    /// Re-approving is a no-op. Approvals from non-owners are ignored.
    pub fn approve(&mut self, id: ApprovalId, approver: &str) -> Result<bool, MultisigError> {
        let required = self.required;
        let is_owner = self.owners.contains(approver);
        let entry = self.entry_mut(id)?;

        if is_owner {
            if entry.approvals.insert(approver.to_string()) {
                debug!(%id, approver, approvals = entry.approvals.len(), "approval recorded");
            }
        } else {
            warn!(%id, approver, "ignoring approval from non-owner");
        }

        Ok(entry.approvals.len() >= required)
    }

    /// Release the payload once the threshold is met
    pub fn execute(&self, id: ApprovalId) -> Result<P, MultisigError> {
        let entry = self.entry(id)?;
        let approvals = entry.approvals.len();

        if approvals < self.required {
            return Err(MultisigError::InsufficientApprovals {
                approvals,
                required: self.required,
            });
        }

        Ok(entry.payload.clone())
    }

    /// Number of approvals an action has
    pub fn approval_count(&self, id: ApprovalId) -> Result<usize, MultisigError> {
        Ok(self.entry(id)?.approvals.len())
    }

    /// Whether an action has reached the threshold
    pub fn is_approved(&self, id: ApprovalId) -> Result<bool, MultisigError> {
        Ok(self.entry(id)?.approvals.len() >= self.required)
    }

    /// Get a queued action
    pub fn get(&self, id: ApprovalId) -> Option<&PendingAction<P>> {
        self.pending.iter().find(|entry| entry.id == id)
    }

    pub fn owners(&self) -> &BTreeSet<String> {
        &self.owners
    }

    pub fn is_owner(&self, identity: &str) -> bool {
        self.owners.contains(identity)
    }

    pub fn required(&self) -> usize {
        self.required
    }

    /// All queued actions in proposal order
    pub fn pending(&self) -> &[PendingAction<P>] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn entry(&self, id: ApprovalId) -> Result<&PendingAction<P>, MultisigError> {
        self.get(id).ok_or(MultisigError::NotFound(id))
    }

    fn entry_mut(&mut self, id: ApprovalId) -> Result<&mut PendingAction<P>, MultisigError> {
        self.pending
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(MultisigError::NotFound(id))
    }
}
