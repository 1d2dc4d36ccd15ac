// DAO Ledger - hash-chained governance ledger for a single organization
//
// Modules, leaves first:
// - ledger: append-only block chain with SHA-256 fingerprints
// - multisig: threshold approval engine for treasury actions
// - governance: organizations, typed rules, proposal voting
// - transactions: treasury operations gated by the approval engine
// - registry: shared store of organizations and wallets for concurrent callers

pub mod governance;
pub mod ledger;
pub mod multisig;
pub mod registry;
pub mod transactions;

mod id;
