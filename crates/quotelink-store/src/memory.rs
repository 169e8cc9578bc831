//! Process-local ledger store
//!
//! Clones share the same slot and notification channel, so every actor in
//! the process (orchestrator tasks, observer views) sees one ledger.

use async_trait::async_trait;
use quotelink_core::{Ledger, LedgerVersion};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

use crate::errors::{persistence_error, Result};
use crate::store::{
    CasOutcome, LedgerStore, Subscription, VersionedLedgerStore, NOTIFICATION_CAPACITY,
};
use quotelink_core::errors::ExError;

struct Inner {
    /// `None` until the first write
    slot: Mutex<Option<Ledger>>,
    notifier: broadcast::Sender<Ledger>,
    writes: AtomicU64,
}

/// In-memory ledger store
#[derive(Clone)]
pub struct MemoryLedgerStore {
    inner: Arc<Inner>,
}

impl MemoryLedgerStore {
    /// Create a store whose slot has never been written
    pub fn new() -> Self {
        let (notifier, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(None),
                notifier,
                writes: AtomicU64::new(0),
            }),
        }
    }

    /// Create a store pre-populated with `ledger`
    ///
    /// Seeding is not a write: no notification, write count stays zero.
    pub fn with_ledger(ledger: Ledger) -> Self {
        let store = Self::new();
        if let Ok(mut slot) = store.inner.slot.lock() {
            *slot = Some(ledger);
        }
        store
    }

    /// Number of committed writes since creation
    pub fn write_count(&self) -> u64 {
        self.inner.writes.load(Ordering::SeqCst)
    }

    fn lock(&self, operation: &str) -> Result<MutexGuard<'_, Option<Ledger>>> {
        self.inner
            .slot
            .lock()
            .map_err(|_| persistence_error(operation, "ledger slot lock poisoned"))
    }

    fn commit(&self, slot: &mut Option<Ledger>, ledger: Ledger) {
        *slot = Some(ledger.clone());
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        // No receivers is not an error
        let _ = self.inner.notifier.send(ledger);
    }

    fn read_sync(&self) -> Result<Ledger> {
        Ok(self.lock("ledger_read")?.clone().unwrap_or_default())
    }

    fn write_sync(&self, ledger: Ledger) -> Result<()> {
        let mut slot = self.lock("ledger_write")?;
        tracing::debug!(op = "ledger_write", ledger_len = ledger.len(), "memory store write");
        self.commit(&mut slot, ledger);
        Ok(())
    }

    fn compare_and_write_sync(
        &self,
        expected: &LedgerVersion,
        ledger: Ledger,
    ) -> Result<CasOutcome> {
        let mut slot = self.lock("compare_and_write")?;
        let current = slot.clone().unwrap_or_default().version().map_err(ExError::from)?;
        if &current != expected {
            return Ok(CasOutcome::Conflict { current });
        }
        let version = ledger.version().map_err(ExError::from)?;
        self.commit(&mut slot, ledger);
        Ok(CasOutcome::Committed(version))
    }
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn read(&self) -> Result<Ledger> {
        self.read_sync()
    }

    async fn write(&self, ledger: Ledger) -> Result<()> {
        self.write_sync(ledger)
    }

    fn subscribe(&self) -> Subscription {
        Subscription::new(self.inner.notifier.subscribe())
    }

    fn subscriber_count(&self) -> usize {
        self.inner.notifier.receiver_count()
    }
}

#[async_trait]
impl VersionedLedgerStore for MemoryLedgerStore {
    async fn read_versioned(&self) -> Result<(LedgerVersion, Ledger)> {
        let ledger = self.read_sync()?;
        let version = ledger.version().map_err(ExError::from)?;
        Ok((version, ledger))
    }

    async fn compare_and_write(
        &self,
        expected: &LedgerVersion,
        ledger: Ledger,
    ) -> Result<CasOutcome> {
        self.compare_and_write_sync(expected, ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Notification;
    use quotelink_core::QuoteLinkRecord;

    const URL: &str = "https://zenn.dev/u/articles/1";

    fn ledger_of(ids: &[&str]) -> Ledger {
        Ledger::from_records(
            ids.iter()
                .map(|id| QuoteLinkRecord::complete(*id, "q", URL, "https://img", 1))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_unwritten_slot_reads_empty() {
        let store = MemoryLedgerStore::new();
        assert!(store.read().await.unwrap().is_empty());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_slot_and_channel() {
        let store = MemoryLedgerStore::new();
        let other = store.clone();
        let mut sub = other.subscribe();

        store.write(ledger_of(&["a"])).await.unwrap();

        assert_eq!(other.read().await.unwrap().ids(), vec!["a"]);
        assert_eq!(sub.try_recv(), Some(Notification::Changed(ledger_of(&["a"]))));
    }

    #[tokio::test]
    async fn test_compare_and_write_detects_stale_version() {
        let store = MemoryLedgerStore::with_ledger(ledger_of(&["a"]));
        let (stale, _) = store.read_versioned().await.unwrap();

        store.write(ledger_of(&["a", "b"])).await.unwrap();

        let outcome = store.compare_and_write(&stale, ledger_of(&[])).await.unwrap();
        assert!(matches!(outcome, CasOutcome::Conflict { .. }));
        assert_eq!(store.read().await.unwrap().ids(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_subscriber_count_tracks_drops() {
        let store = MemoryLedgerStore::new();
        let mut first = store.subscribe();
        let second = store.subscribe();
        assert_eq!(store.subscriber_count(), 2);

        first.unsubscribe();
        first.unsubscribe();
        drop(second);
        assert_eq!(store.subscriber_count(), 0);
    }
}
