//! QuoteLink Store - persistence of the shared ledger
//!
//! Provides:
//! - The `LedgerStore` contract: wholesale read, wholesale write with no
//!   compare-and-set, and a change-notification channel
//! - `MemoryLedgerStore`, a process-local store shared by cloning its handle
//! - `FileLedgerStore`, a JSON document on disk written via temp→rename
//! - `CasLedgerStore`, a hardened wrapper that commits mutations with
//!   versioned compare-and-set and re-applies them on conflict

mod atomic;
pub mod errors;
pub mod file;
pub mod hardened;
pub mod memory;
pub mod store;

pub use errors::Result;
pub use file::FileLedgerStore;
pub use hardened::{CasLedgerStore, DEFAULT_CAS_MAX_ATTEMPTS};
pub use memory::MemoryLedgerStore;
pub use store::{
    CasOutcome, LedgerStore, Notification, Subscription, UpdateOutcome, VersionedLedgerStore,
    LEDGER_KEY, NOTIFICATION_CAPACITY,
};
