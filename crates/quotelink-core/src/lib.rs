//! QuoteLink Core - ledger model and pure domain logic
//!
//! This crate provides the pieces of the optimistic quote-link ledger that
//! do not perform I/O:
//! - The record lifecycle as an explicit tagged type (pending, failed, complete)
//! - The ordered `Ledger` and its content-derived version
//! - Pure `LedgerMutation`s (insert placeholder, finalize in place, remove)
//! - Selection validation and share-link derivation
//! - The error facility, logging facility and runtime settings

pub mod clock;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod mutation;
pub mod rules;
pub mod settings;
pub mod share;

pub use quotelink_core_types::schema;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use errors::{ExError, ExErrorKind, QuoteLinkError, Result};
pub use model::{
    CompleteRecord, Ledger, LedgerVersion, Placeholder, QuoteLinkRecord, TEMPORARY_TOKEN_PREFIX,
};
pub use mutation::{apply, LedgerMutation, MutationEffect};
pub use rules::validation::{validate_selection, SubmissionPolicy, ValidatedSelection};
pub use settings::{Settings, WriteMode};
