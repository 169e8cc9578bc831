//! The ledger store contract
//!
//! `read` and `write` are two independent calls. A writer does not learn
//! what it overwrote, so two actors that each read, mutate their copy and
//! write back will lose one of the updates. `update` on the plain trait is
//! exactly that read-apply-write sequence; `CasLedgerStore` replaces it with
//! a versioned loop.

use async_trait::async_trait;
use quotelink_core::errors::ExError;
use quotelink_core::{apply, Ledger, LedgerMutation, LedgerVersion, MutationEffect};
use tokio::sync::broadcast;

use crate::errors::Result;

/// Key of the persisted slot holding the ledger
pub const LEDGER_KEY: &str = "quoteLinks";

/// Buffered notifications per subscriber before it is reported as lagged
pub const NOTIFICATION_CAPACITY: usize = 64;

/// Result of a store-level update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// The ledger as committed, or as read when nothing was written
    pub ledger: Ledger,
    pub effect: MutationEffect,
    /// False when the mutation found nothing to change and no write was issued
    pub written: bool,
}

/// Result of a compare-and-set write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasOutcome {
    Committed(LedgerVersion),
    Conflict { current: LedgerVersion },
}

/// What a subscriber receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A write was committed; carries the new ledger
    Changed(Ledger),
    /// `n` notifications were dropped; the subscriber should re-read
    Lagged(u64),
    /// The store is gone or the subscription was released
    Closed,
}

/// Handle on the change-notification channel
///
/// Dropping the handle unsubscribes. `unsubscribe` does the same eagerly
/// and may be called any number of times.
#[derive(Debug)]
pub struct Subscription {
    receiver: Option<broadcast::Receiver<Ledger>>,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<Ledger>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// Wait for the next notification
    pub async fn recv(&mut self) -> Notification {
        let Some(receiver) = self.receiver.as_mut() else {
            return Notification::Closed;
        };
        match receiver.recv().await {
            Ok(ledger) => Notification::Changed(ledger),
            Err(broadcast::error::RecvError::Lagged(n)) => Notification::Lagged(n),
            Err(broadcast::error::RecvError::Closed) => Notification::Closed,
        }
    }

    /// Take a notification if one is already queued
    pub fn try_recv(&mut self) -> Option<Notification> {
        let receiver = self.receiver.as_mut()?;
        match receiver.try_recv() {
            Ok(ledger) => Some(Notification::Changed(ledger)),
            Err(broadcast::error::TryRecvError::Lagged(n)) => Some(Notification::Lagged(n)),
            Err(broadcast::error::TryRecvError::Closed) => Some(Notification::Closed),
            Err(broadcast::error::TryRecvError::Empty) => None,
        }
    }

    /// Release the subscription
    pub fn unsubscribe(&mut self) {
        self.receiver = None;
    }

    pub fn is_active(&self) -> bool {
        self.receiver.is_some()
    }
}

/// Persisted ledger with change notification
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Current ledger; empty if the slot was never written
    async fn read(&self) -> Result<Ledger>;

    /// Replace the whole ledger and notify every subscriber
    ///
    /// Does not check what it replaces.
    async fn write(&self, ledger: Ledger) -> Result<()>;

    /// Subscribe to committed writes, delivered in commit order
    fn subscribe(&self) -> Subscription;

    /// Number of live subscriptions
    fn subscriber_count(&self) -> usize;

    /// Read, apply `mutation`, write back
    ///
    /// Nothing is written when the mutation finds its target absent.
    async fn update(&self, mutation: &LedgerMutation) -> Result<UpdateOutcome> {
        let current = self.read().await?;
        let (next, effect) = apply(&current, mutation).map_err(ExError::from)?;
        if effect.is_absent() {
            return Ok(UpdateOutcome {
                ledger: current,
                effect,
                written: false,
            });
        }
        self.write(next.clone()).await?;
        Ok(UpdateOutcome {
            ledger: next,
            effect,
            written: true,
        })
    }
}

/// A store that can also commit conditionally on the version it read
#[async_trait]
pub trait VersionedLedgerStore: LedgerStore {
    async fn read_versioned(&self) -> Result<(LedgerVersion, Ledger)>;

    /// Write `ledger` only if the stored version still equals `expected`
    async fn compare_and_write(
        &self,
        expected: &LedgerVersion,
        ledger: Ledger,
    ) -> Result<CasOutcome>;
}
