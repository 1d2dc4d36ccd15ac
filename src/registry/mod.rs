// Registry module - explicit store replacing process-wide lookup tables

mod store;

pub use store::{Registry, RegistryError, WalletId};
