// Shared fixtures for engine integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use quotelink_client::{RemoteLink, SubmissionClient, SubmitError};
use quotelink_core::errors::{ExError, ExErrorKind};
use quotelink_core::model::TokenSource;
use quotelink_core::{Ledger, SubmissionPolicy};
use quotelink_store::{LedgerStore, MemoryLedgerStore, Subscription};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub const ALLOWED_ORIGIN: &str = "https://allowed.example/";
pub const ARTICLE: &str = "https://allowed.example/articles/1";
pub const SHARE_BASE: &str = "https://share.example";

pub fn policy() -> SubmissionPolicy {
    SubmissionPolicy {
        allowed_origin: ALLOWED_ORIGIN.to_string(),
        max_quote_chars: 200,
    }
}

pub fn remote_link(id: &str) -> RemoteLink {
    RemoteLink {
        id: id.to_string(),
        preview_image_url: format!("https://img/{}.png", id),
    }
}

/// Client that returns a fixed result and counts calls
///
/// When gated, each call waits for a permit from [`ScriptedClient::release`].
pub struct ScriptedClient {
    result: Result<RemoteLink, SubmitError>,
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
    entered: Arc<Semaphore>,
}

impl ScriptedClient {
    pub fn ok(id: &str) -> Self {
        Self::returning(Ok(remote_link(id)))
    }

    pub fn failing(err: SubmitError) -> Self {
        Self::returning(Err(err))
    }

    pub fn returning(result: Result<RemoteLink, SubmitError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            gate: None,
            entered: Arc::new(Semaphore::new(0)),
        }
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Wait until a call is blocked on the gate
    pub async fn wait_until_called(&self) {
        self.entered.acquire().await.unwrap().forget();
    }

    /// Let one gated call complete
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }
}

#[async_trait]
impl SubmissionClient for ScriptedClient {
    async fn submit(&self, _quote: &str, _source_url: &str) -> Result<RemoteLink, SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.add_permits(1);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.result.clone()
    }
}

/// Memory store whose n-th writes fail (1-based)
pub struct FailingStore {
    inner: MemoryLedgerStore,
    failing_writes: Vec<u64>,
    attempts: AtomicU64,
}

impl FailingStore {
    pub fn new(inner: MemoryLedgerStore, failing_writes: &[u64]) -> Self {
        Self {
            inner,
            failing_writes: failing_writes.to_vec(),
            attempts: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl LedgerStore for FailingStore {
    async fn read(&self) -> Result<Ledger, ExError> {
        self.inner.read().await
    }

    async fn write(&self, ledger: Ledger) -> Result<(), ExError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_writes.contains(&attempt) {
            return Err(ExError::new(ExErrorKind::Io)
                .with_op("ledger_write")
                .with_message("disk full"));
        }
        self.inner.write(ledger).await
    }

    fn subscribe(&self) -> Subscription {
        self.inner.subscribe()
    }

    fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }
}

/// Hands out a fixed sequence of tokens, then repeats the last one
pub struct SequenceTokens {
    tokens: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl SequenceTokens {
    pub fn new(tokens: &[&str]) -> Self {
        Self {
            tokens: Mutex::new(tokens.iter().map(|t| t.to_string()).collect()),
            last: Mutex::new(tokens.last().map(|t| t.to_string()).unwrap_or_default()),
        }
    }
}

impl TokenSource for SequenceTokens {
    fn next_token(&self, _now_ms: i64) -> String {
        match self.tokens.lock().unwrap().pop_front() {
            Some(token) => {
                *self.last.lock().unwrap() = token.clone();
                token
            }
            None => self.last.lock().unwrap().clone(),
        }
    }
}
