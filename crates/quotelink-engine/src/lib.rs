//! QuoteLink Engine - orchestration layer
//!
//! Coordinates the pure ledger logic in `quotelink-core` with the store and
//! the remote client:
//! - `SubmissionOrchestrator` drives one submission from trigger to a
//!   finalized or rolled-back ledger and returns the effects to perform
//! - `LedgerView` mirrors the ledger for a UI surface and issues deletes

pub mod effects;
pub mod messages;
pub mod observer;
pub mod orchestrator;
pub mod wiring;

pub use effects::{PostCommitEffect, NOTIFY_DISMISS_AFTER};
pub use observer::{LedgerView, LinkItem, LinkStatus};
pub use orchestrator::{
    SubmissionOrchestrator, SubmissionOutcome, SubmissionReport, SubmissionState, TriggerPayload,
};
pub use wiring::open_store;
