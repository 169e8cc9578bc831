//! Ledger mutations and the pure `apply()` function
//!
//! Every change the orchestrator or an observer makes to the ledger is one
//! of these mutations. `apply()` takes a snapshot and returns the next
//! snapshot without touching storage, so the same mutation can be replayed
//! against a fresher snapshot when a compare-and-set write loses a race.
//!
//! ## Example
//!
//! ```
//! use quotelink_core::{apply, Ledger, LedgerMutation, MutationEffect, QuoteLinkRecord};
//!
//! let placeholder = QuoteLinkRecord::pending("tmp-1-a", "hello", "https://zenn.dev/u/articles/1");
//! let insert = LedgerMutation::InsertPlaceholder(placeholder);
//! let (ledger, effect) = apply(&Ledger::new(), &insert).unwrap();
//!
//! assert_eq!(effect, MutationEffect::Inserted);
//! assert_eq!(ledger.len(), 1);
//! ```

use crate::errors::{QuoteLinkError, Result};
use crate::model::{Ledger, QuoteLinkRecord};

/// A single change to the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerMutation {
    /// Prepend a pending placeholder
    InsertPlaceholder(QuoteLinkRecord),

    /// Replace the placeholder `token` with `record` at the same position
    Finalize {
        token: String,
        record: QuoteLinkRecord,
    },

    /// Remove every record with `id`
    Remove { id: String },
}

impl LedgerMutation {
    /// Operation name used in logs
    pub fn op_name(&self) -> &'static str {
        match self {
            LedgerMutation::InsertPlaceholder(_) => "insert_placeholder",
            LedgerMutation::Finalize { .. } => "finalize",
            LedgerMutation::Remove { .. } => "remove",
        }
    }

    /// The id this mutation looks up in the ledger
    pub fn target_id(&self) -> &str {
        match self {
            LedgerMutation::InsertPlaceholder(record) => record.id(),
            LedgerMutation::Finalize { token, .. } => token,
            LedgerMutation::Remove { id } => id,
        }
    }
}

/// What a mutation did to the snapshot it was applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationEffect {
    /// Placeholder prepended at position 0
    Inserted,
    /// Target replaced; the finalized record sits at `position`
    Replaced { position: usize },
    /// Target removed from `position` (first occurrence)
    Removed { position: usize },
    /// Target id not present; ledger returned unchanged
    Absent,
}

impl MutationEffect {
    pub fn is_absent(&self) -> bool {
        matches!(self, MutationEffect::Absent)
    }
}

/// Apply a mutation to a ledger snapshot
///
/// # Errors
///
/// - `DuplicateRecordId` when inserting a placeholder whose token is already present
/// - `InvalidRecord` when inserting anything other than a pending record
pub fn apply(ledger: &Ledger, mutation: &LedgerMutation) -> Result<(Ledger, MutationEffect)> {
    match mutation {
        LedgerMutation::InsertPlaceholder(record) => insert_placeholder(ledger, record),
        LedgerMutation::Finalize { token, record } => Ok(finalize(ledger, token, record)),
        LedgerMutation::Remove { id } => Ok(remove(ledger, id)),
    }
}

fn insert_placeholder(
    ledger: &Ledger,
    record: &QuoteLinkRecord,
) -> Result<(Ledger, MutationEffect)> {
    if !record.is_pending() {
        return Err(QuoteLinkError::InvalidRecord {
            id: record.id().to_string(),
            reason: "only pending placeholders can be inserted".to_string(),
        });
    }

    if ledger.contains(record.id()) {
        return Err(QuoteLinkError::DuplicateRecordId {
            id: record.id().to_string(),
        });
    }

    let mut next = Ledger::new();
    next.records_mut().reserve(ledger.len() + 1);
    next.records_mut().push(record.clone());
    next.records_mut().extend(ledger.iter().cloned());
    Ok((next, MutationEffect::Inserted))
}

/// Replace the token slot in place.
///
/// An older record already carrying the finalized id is dropped so the
/// ledger keeps at most one record per id.
fn finalize(ledger: &Ledger, token: &str, record: &QuoteLinkRecord) -> (Ledger, MutationEffect) {
    if !ledger.contains(token) {
        return (ledger.clone(), MutationEffect::Absent);
    }

    let final_id = record.id();
    let mut next = Ledger::new();
    let mut position = None;

    for existing in ledger {
        if existing.id() == token {
            if position.is_none() {
                position = Some(next.len());
                next.records_mut().push(record.clone());
            }
        } else if existing.id() != final_id {
            next.records_mut().push(existing.clone());
        }
    }

    match position {
        Some(position) => (next, MutationEffect::Replaced { position }),
        None => (ledger.clone(), MutationEffect::Absent),
    }
}

fn remove(ledger: &Ledger, id: &str) -> (Ledger, MutationEffect) {
    match ledger.position(id) {
        Some(position) => {
            let kept = ledger.iter().filter(|r| r.id() != id).cloned().collect();
            (Ledger::from_records(kept), MutationEffect::Removed { position })
        }
        None => (ledger.clone(), MutationEffect::Absent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://zenn.dev/u/articles/1";

    fn pending(id: &str) -> QuoteLinkRecord {
        QuoteLinkRecord::pending(id, "q", URL)
    }

    fn complete(id: &str) -> QuoteLinkRecord {
        QuoteLinkRecord::complete(id, "q", URL, "https://img/x.png", 10)
    }

    #[test]
    fn test_insert_prepends() {
        let ledger = Ledger::from_records(vec![complete("b")]);
        let (next, effect) =
            apply(&ledger, &LedgerMutation::InsertPlaceholder(pending("tmp-1"))).unwrap();

        assert_eq!(effect, MutationEffect::Inserted);
        assert_eq!(next.ids(), vec!["tmp-1", "b"]);
    }

    #[test]
    fn test_insert_rejects_existing_token() {
        let ledger = Ledger::from_records(vec![pending("tmp-1")]);
        let err = apply(&ledger, &LedgerMutation::InsertPlaceholder(pending("tmp-1"))).unwrap_err();

        assert_eq!(err, QuoteLinkError::DuplicateRecordId { id: "tmp-1".to_string() });
    }

    #[test]
    fn test_insert_rejects_complete_record() {
        let result = apply(&Ledger::new(), &LedgerMutation::InsertPlaceholder(complete("abc")));
        assert!(matches!(result, Err(QuoteLinkError::InvalidRecord { .. })));
    }

    #[test]
    fn test_finalize_keeps_position() {
        let ledger = Ledger::from_records(vec![complete("a"), pending("tmp-1"), complete("b")]);
        let mutation = LedgerMutation::Finalize {
            token: "tmp-1".to_string(),
            record: complete("c"),
        };

        let (next, effect) = apply(&ledger, &mutation).unwrap();

        assert_eq!(effect, MutationEffect::Replaced { position: 1 });
        assert_eq!(next.ids(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_finalize_missing_token_drops_record() {
        let ledger = Ledger::from_records(vec![complete("b")]);
        let mutation = LedgerMutation::Finalize {
            token: "tmp-1".to_string(),
            record: complete("c"),
        };

        let (next, effect) = apply(&ledger, &mutation).unwrap();

        assert_eq!(effect, MutationEffect::Absent);
        assert_eq!(next, ledger);
    }

    #[test]
    fn test_finalize_replaces_older_record_with_same_remote_id() {
        let ledger = Ledger::from_records(vec![pending("tmp-2"), complete("c")]);
        let mutation = LedgerMutation::Finalize {
            token: "tmp-2".to_string(),
            record: complete("c"),
        };

        let (next, effect) = apply(&ledger, &mutation).unwrap();

        assert_eq!(effect, MutationEffect::Replaced { position: 0 });
        assert_eq!(next.ids(), vec!["c"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let ledger = Ledger::from_records(vec![complete("a")]);
        let remove = LedgerMutation::Remove { id: "zzz".to_string() };
        let (next, effect) = apply(&ledger, &remove).unwrap();

        assert!(effect.is_absent());
        assert_eq!(next, ledger);
    }

    #[test]
    fn test_remove_reports_first_position() {
        let ledger = Ledger::from_records(vec![complete("a"), pending("tmp-1"), complete("b")]);
        let remove = LedgerMutation::Remove { id: "tmp-1".to_string() };
        let (next, effect) = apply(&ledger, &remove).unwrap();

        assert_eq!(effect, MutationEffect::Removed { position: 1 });
        assert_eq!(next.ids(), vec!["a", "b"]);
    }
}
