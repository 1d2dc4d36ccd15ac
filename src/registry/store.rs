// Registry - shared store of organizations and approval wallets
//
// Each organization and wallet sits behind its own mutex, so the
// mutate-then-append sequence of one entry is atomic for concurrent callers
// while other entries stay available. Transactions lock the organization
// before the wallet.

use crate::governance::{GovernanceError, Organization, OrganizationConfig, OrganizationId, ProposalId};
use crate::id::random_id;
use crate::multisig::{ApprovalEngine, ApprovalId, MultisigError};
use crate::transactions::{Transaction, TransactionError, TransactionReceipt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;
use tracing::info;

random_id!(
    /// Unique identifier for a registered approval wallet
    WalletId,
    "wallet"
);

/// Errors from registry operations
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Organization not found: {0}")]
    OrganizationNotFound(OrganizationId),

    #[error("Wallet not found: {0}")]
    WalletNotFound(WalletId),

    #[error("Registry lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Multisig(#[from] MultisigError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// In-memory store of organizations and wallets
#[derive(Default)]
pub struct Registry {
    organizations: RwLock<HashMap<OrganizationId, Arc<Mutex<Organization>>>>,
    wallets: RwLock<HashMap<WalletId, Arc<Mutex<ApprovalEngine>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register an organization
    pub fn create_organization<I, S>(
        &self,
        name: &str,
        founders: I,
        config: OrganizationConfig,
    ) -> Result<OrganizationId, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let organization = Organization::with_config(name, founders, config)?;
        self.insert_organization(organization)
    }

    /// Register an existing organization
    pub fn insert_organization(
        &self,
        organization: Organization,
    ) -> Result<OrganizationId, RegistryError> {
        let id = organization.id();
        self.organizations
            .write()
            .map_err(|_| RegistryError::LockPoisoned)?
            .insert(id, Arc::new(Mutex::new(organization)));
        info!(org = %id, "organization registered");
        Ok(id)
    }

    /// Register an approval wallet
    pub fn register_wallet(&self, engine: ApprovalEngine) -> Result<WalletId, RegistryError> {
        let id = WalletId::generate();
        self.wallets
            .write()
            .map_err(|_| RegistryError::LockPoisoned)?
            .insert(id, Arc::new(Mutex::new(engine)));
        info!(wallet = %id, "wallet registered");
        Ok(id)
    }

    /// Run `f` with exclusive access to an organization
    pub fn with_organization<T>(
        &self,
        id: OrganizationId,
        f: impl FnOnce(&mut Organization) -> T,
    ) -> Result<T, RegistryError> {
        let entry = self.organization_entry(id)?;
        let mut organization = entry.lock().map_err(|_| RegistryError::LockPoisoned)?;
        Ok(f(&mut organization))
    }

    /// Run `f` with exclusive access to a wallet
    pub fn with_wallet<T>(
        &self,
        id: WalletId,
        f: impl FnOnce(&mut ApprovalEngine) -> T,
    ) -> Result<T, RegistryError> {
        let entry = self.wallet_entry(id)?;
        let mut engine = entry.lock().map_err(|_| RegistryError::LockPoisoned)?;
        Ok(f(&mut engine))
    }

    /// Submit a transaction to a wallet for approval
    pub fn submit_transaction(
        &self,
        wallet: WalletId,
        transaction: &Transaction,
    ) -> Result<ApprovalId, RegistryError> {
        self.with_wallet(wallet, |engine| transaction.submit(engine))
    }

    /// Record one approver's approval
    pub fn approve(
        &self,
        wallet: WalletId,
        approval: ApprovalId,
        approver: &str,
    ) -> Result<bool, RegistryError> {
        Ok(self.with_wallet(wallet, |engine| engine.approve(approval, approver))??)
    }

    /// Execute an approved transaction against an organization
    pub fn execute_transaction(
        &self,
        organization: OrganizationId,
        wallet: WalletId,
        transaction: &Transaction,
        approval: ApprovalId,
    ) -> Result<TransactionReceipt, RegistryError> {
        let org_entry = self.organization_entry(organization)?;
        let wallet_entry = self.wallet_entry(wallet)?;

        let mut org = org_entry.lock().map_err(|_| RegistryError::LockPoisoned)?;
        let engine = wallet_entry.lock().map_err(|_| RegistryError::LockPoisoned)?;

        Ok(transaction.execute(&mut org, &engine, approval)?)
    }

    /// Proposals in an organization with the given title
    pub fn find_proposals_by_title(
        &self,
        organization: OrganizationId,
        title: &str,
    ) -> Result<Vec<ProposalId>, RegistryError> {
        self.with_organization(organization, |org| org.find_proposals_by_title(title))
    }

    /// IDs of all registered organizations
    pub fn organization_ids(&self) -> Result<Vec<OrganizationId>, RegistryError> {
        let organizations = self
            .organizations
            .read()
            .map_err(|_| RegistryError::LockPoisoned)?;
        Ok(organizations.keys().copied().collect())
    }

    /// Number of registered organizations
    pub fn len(&self) -> Result<usize, RegistryError> {
        let organizations = self
            .organizations
            .read()
            .map_err(|_| RegistryError::LockPoisoned)?;
        Ok(organizations.len())
    }

    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        Ok(self.len()? == 0)
    }

    fn organization_entry(
        &self,
        id: OrganizationId,
    ) -> Result<Arc<Mutex<Organization>>, RegistryError> {
        self.organizations
            .read()
            .map_err(|_| RegistryError::LockPoisoned)?
            .get(&id)
            .cloned()
            .ok_or(RegistryError::OrganizationNotFound(id))
    }

    fn wallet_entry(&self, id: WalletId) -> Result<Arc<Mutex<ApprovalEngine>>, RegistryError> {
        self.wallets
            .read()
            .map_err(|_| RegistryError::LockPoisoned)?
            .get(&id)
            .cloned()
            .ok_or(RegistryError::WalletNotFound(id))
    }
}
