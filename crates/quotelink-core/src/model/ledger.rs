//! The ordered ledger of quote links
//!
//! Order is insertion order, newest first. Positions are stable across
//! finalization and rollback: those operations rewrite or drop an element
//! in place and never move the others.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use super::record::QuoteLinkRecord;
use super::token::is_temporary_id;
use crate::errors::Result;

/// Content-derived version of a ledger
///
/// SHA-256 of the canonical JSON encoding, hex encoded. Two ledgers with the
/// same records in the same order have the same version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LedgerVersion(String);

impl LedgerVersion {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LedgerVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ledger - the full persisted sequence of quote links
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger(Vec<QuoteLinkRecord>);

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_records(records: Vec<QuoteLinkRecord>) -> Self {
        Self(records)
    }

    pub fn records(&self) -> &[QuoteLinkRecord] {
        &self.0
    }

    pub fn into_records(self) -> Vec<QuoteLinkRecord> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuoteLinkRecord> {
        self.0.iter()
    }

    /// Position of the first record with `id`
    pub fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|r| r.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&QuoteLinkRecord> {
        self.0.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.0.iter().map(QuoteLinkRecord::id).collect()
    }

    /// Ids that appear more than once, in first-seen order
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for id in self.ids() {
            if !seen.insert(id) && !duplicates.iter().any(|d: &String| d == id) {
                duplicates.push(id.to_string());
            }
        }
        duplicates
    }

    /// Records still carrying a temporary token
    pub fn temporary_ids(&self) -> Vec<&str> {
        self.ids().into_iter().filter(|id| is_temporary_id(id)).collect()
    }

    /// Compute the content-derived version
    ///
    /// # Errors
    ///
    /// Returns `QuoteLinkError::Serialization` if JSON encoding fails.
    pub fn version(&self) -> Result<LedgerVersion> {
        let canonical = serde_json::to_string(self)?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Ok(LedgerVersion(hex::encode(hasher.finalize())))
    }

    pub(crate) fn records_mut(&mut self) -> &mut Vec<QuoteLinkRecord> {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a QuoteLinkRecord;
    type IntoIter = std::slice::Iter<'a, QuoteLinkRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(id: &str) -> QuoteLinkRecord {
        QuoteLinkRecord::complete(id, "q", "https://zenn.dev/a/articles/1", "https://img", 1)
    }

    #[test]
    fn test_empty_ledger_serializes_as_array() {
        let json = serde_json::to_string(&Ledger::new()).unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn test_duplicate_ids_reported_once() {
        let ledger = Ledger::from_records(vec![
            complete("a"),
            complete("b"),
            complete("a"),
            complete("a"),
        ]);
        assert_eq!(ledger.duplicate_ids(), vec!["a".to_string()]);
    }

    #[test]
    fn test_temporary_ids() {
        let ledger = Ledger::from_records(vec![
            QuoteLinkRecord::pending("tmp-1-x", "q", "https://zenn.dev/"),
            complete("abc"),
        ]);
        assert_eq!(ledger.temporary_ids(), vec!["tmp-1-x"]);
    }

    #[test]
    fn test_version_is_order_sensitive() {
        let ab = Ledger::from_records(vec![complete("a"), complete("b")]);
        let ba = Ledger::from_records(vec![complete("b"), complete("a")]);

        assert_eq!(ab.version().unwrap(), ab.clone().version().unwrap());
        assert_ne!(ab.version().unwrap(), ba.version().unwrap());
        assert_eq!(ab.version().unwrap().as_str().len(), 64);
    }
}
