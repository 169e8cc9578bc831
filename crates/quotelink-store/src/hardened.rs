//! Compare-and-set wrapper around a versioned store
//!
//! `update` reads a versioned snapshot, applies the mutation and commits only
//! if the stored version is unchanged. On conflict the mutation is re-applied
//! to the fresh snapshot, so a concurrent delete is never undone and a
//! finalize that lost its placeholder is reported as absent instead of
//! resurrecting it.

use async_trait::async_trait;
use quotelink_core::errors::ExError;
use quotelink_core::{apply, Ledger, LedgerMutation};

use crate::errors::{conflict_exhausted, Result};
use crate::store::{CasOutcome, LedgerStore, Subscription, UpdateOutcome, VersionedLedgerStore};

/// Default number of compare-and-set attempts per update
pub const DEFAULT_CAS_MAX_ATTEMPTS: u32 = 8;

/// Ledger store whose `update` is a compare-and-set retry loop
#[derive(Clone)]
pub struct CasLedgerStore<S> {
    inner: S,
    max_attempts: u32,
}

impl<S: VersionedLedgerStore> CasLedgerStore<S> {
    pub fn new(inner: S) -> Self {
        Self::with_max_attempts(inner, DEFAULT_CAS_MAX_ATTEMPTS)
    }

    /// `max_attempts` is clamped to at least one
    pub fn with_max_attempts(inner: S, max_attempts: u32) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[async_trait]
impl<S: VersionedLedgerStore> LedgerStore for CasLedgerStore<S> {
    async fn read(&self) -> Result<Ledger> {
        self.inner.read().await
    }

    async fn write(&self, ledger: Ledger) -> Result<()> {
        self.inner.write(ledger).await
    }

    fn subscribe(&self) -> Subscription {
        self.inner.subscribe()
    }

    fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }

    async fn update(&self, mutation: &LedgerMutation) -> Result<UpdateOutcome> {
        for attempt in 1..=self.max_attempts {
            let (version, current) = self.inner.read_versioned().await?;
            let (next, effect) = apply(&current, mutation).map_err(ExError::from)?;
            if effect.is_absent() {
                return Ok(UpdateOutcome {
                    ledger: current,
                    effect,
                    written: false,
                });
            }

            match self.inner.compare_and_write(&version, next.clone()).await? {
                CasOutcome::Committed(_) => {
                    return Ok(UpdateOutcome {
                        ledger: next,
                        effect,
                        written: true,
                    });
                }
                CasOutcome::Conflict { current } => {
                    tracing::debug!(
                        op = mutation.op_name(),
                        record_id = mutation.target_id(),
                        attempt,
                        expected = %version,
                        current = %current,
                        "compare-and-set conflict, retrying"
                    );
                }
            }
        }

        Err(conflict_exhausted(mutation.target_id(), self.max_attempts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLedgerStore;
    use quotelink_core::errors::ExErrorKind;
    use quotelink_core::{LedgerVersion, MutationEffect, QuoteLinkRecord};
    use std::sync::atomic::{AtomicU32, Ordering};

    const URL: &str = "https://zenn.dev/u/articles/1";

    /// Store that reports a conflict for the first `conflicts` CAS calls
    struct Contended {
        inner: MemoryLedgerStore,
        conflicts: AtomicU32,
    }

    #[async_trait]
    impl LedgerStore for Contended {
        async fn read(&self) -> Result<Ledger> {
            self.inner.read().await
        }
        async fn write(&self, ledger: Ledger) -> Result<()> {
            self.inner.write(ledger).await
        }
        fn subscribe(&self) -> Subscription {
            self.inner.subscribe()
        }
        fn subscriber_count(&self) -> usize {
            self.inner.subscriber_count()
        }
    }

    #[async_trait]
    impl VersionedLedgerStore for Contended {
        async fn read_versioned(&self) -> Result<(LedgerVersion, Ledger)> {
            self.inner.read_versioned().await
        }
        async fn compare_and_write(
            &self,
            expected: &LedgerVersion,
            ledger: Ledger,
        ) -> Result<CasOutcome> {
            let remaining = self.conflicts.load(Ordering::SeqCst);
            if remaining > 0 {
                self.conflicts.store(remaining - 1, Ordering::SeqCst);
                return Ok(CasOutcome::Conflict {
                    current: expected.clone(),
                });
            }
            self.inner.compare_and_write(expected, ledger).await
        }
    }

    fn contended(conflicts: u32) -> Contended {
        Contended {
            inner: MemoryLedgerStore::with_ledger(Ledger::from_records(vec![
                QuoteLinkRecord::pending("tmp-1-a", "q", URL),
            ])),
            conflicts: AtomicU32::new(conflicts),
        }
    }

    fn finalize() -> LedgerMutation {
        LedgerMutation::Finalize {
            token: "tmp-1-a".to_string(),
            record: QuoteLinkRecord::complete("C", "q", URL, "https://img/C", 5),
        }
    }

    #[tokio::test]
    async fn test_update_retries_through_conflicts() {
        let store = CasLedgerStore::with_max_attempts(contended(2), 3);

        let outcome = store.update(&finalize()).await.unwrap();

        assert!(outcome.written);
        assert_eq!(outcome.effect, MutationEffect::Replaced { position: 0 });
        assert_eq!(store.read().await.unwrap().ids(), vec!["C"]);
    }

    #[tokio::test]
    async fn test_update_gives_up_after_max_attempts() {
        let store = CasLedgerStore::with_max_attempts(contended(5), 3);

        let err = store.update(&finalize()).await.unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::Concurrency);
        assert_eq!(err.record_id(), Some("tmp-1-a"));
        assert_eq!(store.read().await.unwrap().ids(), vec!["tmp-1-a"]);
    }

    #[tokio::test]
    async fn test_absent_target_writes_nothing() {
        let memory = MemoryLedgerStore::new();
        let store = CasLedgerStore::new(memory.clone());

        let outcome = store
            .update(&LedgerMutation::Remove { id: "missing".to_string() })
            .await
            .unwrap();

        assert!(!outcome.written);
        assert_eq!(memory.write_count(), 0);
    }

    #[test]
    fn test_zero_attempts_is_clamped() {
        let store = CasLedgerStore::with_max_attempts(MemoryLedgerStore::new(), 0);
        assert_eq!(store.max_attempts(), 1);
    }
}
