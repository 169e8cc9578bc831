//! Observer views over the ledger
//!
//! A view holds the last snapshot it was told about and replaces it
//! wholesale on every notification. It never patches its snapshot locally:
//! a delete goes to the store and comes back as a notification like any
//! other write, so every mounted view converges on the same ledger.

use quotelink_core::errors::ExError;
use quotelink_core::share::{share_intent_url, share_link};
use quotelink_core::{Ledger, LedgerMutation, QuoteLinkRecord, Settings};
use quotelink_store::{LedgerStore, Notification, Subscription, UpdateOutcome};
use std::sync::Arc;
use std::time::Instant;

/// Lifecycle state shown for an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Pending,
    Failed,
    Complete,
}

/// Presentation model of one ledger record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkItem {
    pub id: String,
    pub quote: String,
    pub original_url: String,
    pub status: LinkStatus,
    pub preview_image_url: Option<String>,
    pub created_at: Option<i64>,
    /// Only complete records can be shared
    pub share_link: Option<String>,
    pub share_intent_url: Option<String>,
}

impl LinkItem {
    fn from_record(record: &QuoteLinkRecord, share_base_url: &str) -> Self {
        match record {
            QuoteLinkRecord::Pending(p) | QuoteLinkRecord::Failed(p) => LinkItem {
                id: p.id.clone(),
                quote: p.quote.clone(),
                original_url: p.original_url.clone(),
                status: if record.is_pending() {
                    LinkStatus::Pending
                } else {
                    LinkStatus::Failed
                },
                preview_image_url: None,
                created_at: None,
                share_link: None,
                share_intent_url: None,
            },
            QuoteLinkRecord::Complete(c) => {
                let link = share_link(share_base_url, &c.id);
                LinkItem {
                    id: c.id.clone(),
                    quote: c.quote.clone(),
                    original_url: c.original_url.clone(),
                    status: LinkStatus::Complete,
                    preview_image_url: Some(c.preview_image_url.clone()),
                    created_at: Some(c.created_at),
                    share_intent_url: Some(share_intent_url(&link, &c.quote)),
                    share_link: Some(link),
                }
            }
        }
    }
}

/// A mounted view of the ledger
pub struct LedgerView {
    store: Arc<dyn LedgerStore>,
    subscription: Subscription,
    snapshot: Ledger,
    share_base_url: String,
}

impl LedgerView {
    /// Subscribe, then read the initial snapshot
    ///
    /// Subscribing first means a write landing between the two calls is
    /// still delivered; replaying it over a snapshot that already contains
    /// it is harmless.
    ///
    /// # Errors
    ///
    /// Returns the store error if the initial read fails.
    pub async fn mount(
        store: Arc<dyn LedgerStore>,
        share_base_url: impl Into<String>,
    ) -> Result<Self, ExError> {
        let subscription = store.subscribe();
        let snapshot = store.read().await?;
        tracing::debug!(op = "view_mount", ledger_len = snapshot.len(), "view mounted");
        Ok(Self {
            store,
            subscription,
            snapshot,
            share_base_url: share_base_url.into(),
        })
    }

    /// Mount using the share base URL from `settings`
    ///
    /// # Errors
    ///
    /// See [`LedgerView::mount`].
    pub async fn mount_with_settings(
        store: Arc<dyn LedgerStore>,
        settings: &Settings,
    ) -> Result<Self, ExError> {
        Self::mount(store, settings.share_base_url.clone()).await
    }

    pub fn snapshot(&self) -> &Ledger {
        &self.snapshot
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_active()
    }

    /// Presentation models for the current snapshot, newest first
    pub fn items(&self) -> Vec<LinkItem> {
        self.snapshot
            .iter()
            .map(|record| LinkItem::from_record(record, &self.share_base_url))
            .collect()
    }

    /// Wait for the next change and apply it
    ///
    /// Returns `Ok(false)` once the view is unmounted or the store is gone.
    ///
    /// # Errors
    ///
    /// Returns the store error if a resync read fails.
    pub async fn next_change(&mut self) -> Result<bool, ExError> {
        let notification = self.subscription.recv().await;
        self.handle(notification).await
    }

    /// Apply every notification already queued, without waiting
    ///
    /// Returns the number of notifications applied.
    ///
    /// # Errors
    ///
    /// Returns the store error if a resync read fails.
    pub async fn apply_pending(&mut self) -> Result<usize, ExError> {
        let mut applied = 0;
        while let Some(notification) = self.subscription.try_recv() {
            if !self.handle(notification).await? {
                break;
            }
            applied += 1;
        }
        Ok(applied)
    }

    /// Re-read the store, returning whether the snapshot changed
    ///
    /// For writers that do not share this view's notification channel,
    /// such as another process writing the same storage file.
    ///
    /// # Errors
    ///
    /// Returns the store error if the read fails.
    pub async fn refresh(&mut self) -> Result<bool, ExError> {
        let current = self.store.read().await?;
        if current == self.snapshot {
            return Ok(false);
        }
        self.snapshot = current;
        Ok(true)
    }

    async fn handle(&mut self, notification: Notification) -> Result<bool, ExError> {
        match notification {
            Notification::Changed(ledger) => {
                self.snapshot = ledger;
                Ok(true)
            }
            Notification::Lagged(missed) => {
                tracing::warn!(op = "view_resync", missed, "view lagged, re-reading ledger");
                self.snapshot = self.store.read().await?;
                Ok(true)
            }
            Notification::Closed => Ok(false),
        }
    }

    /// Remove every record with `id`
    ///
    /// The view's own snapshot is refreshed by the resulting notification.
    /// Deleting an id that is not present is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the store error if the read or write fails.
    pub async fn delete(&self, id: &str) -> Result<UpdateOutcome, ExError> {
        let start = Instant::now();
        quotelink_core::log_op_start!("delete", record_id = id);

        let result = self
            .store
            .update(&LedgerMutation::Remove { id: id.to_string() })
            .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(outcome) => {
                quotelink_core::log_op_end!(
                    "delete",
                    duration_ms = duration_ms,
                    record_id = id,
                    written = outcome.written
                );
            }
            Err(err) => {
                quotelink_core::log_op_error!(
                    "delete",
                    err.clone(),
                    duration_ms = duration_ms,
                    record_id = id
                );
            }
        }
        result
    }

    /// Stop receiving notifications; safe to call more than once
    pub fn unmount(&mut self) {
        if self.subscription.is_active() {
            tracing::debug!(op = "view_unmount", "view unmounted");
        }
        self.subscription.unsubscribe();
    }
}
