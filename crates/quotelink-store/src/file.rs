//! JSON-file ledger store
//!
//! The file holds a keyed document; the ledger lives under `quoteLinks` and
//! other keys are carried through untouched. A missing file or a missing key
//! reads as an empty ledger.
//!
//! Notifications reach subscribers of the same handle (and its clones).
//! File I/O runs on tokio's blocking pool.
//! Writes made by another process are not observed until the next `read`.

use async_trait::async_trait;
use quotelink_core::errors::ExError;
use quotelink_core::{Ledger, LedgerVersion};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

use crate::atomic::atomic_write;
use crate::errors::{io_error, persistence_error, serialization_error, Result};
use crate::store::{
    CasOutcome, LedgerStore, Subscription, VersionedLedgerStore, LEDGER_KEY,
    NOTIFICATION_CAPACITY,
};

struct Inner {
    path: PathBuf,
    /// Serializes file access through this handle
    io_lock: Mutex<()>,
    notifier: broadcast::Sender<Ledger>,
}

/// Ledger store backed by a JSON file
#[derive(Clone)]
pub struct FileLedgerStore {
    inner: Arc<Inner>,
}

impl FileLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (notifier, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                path: path.into(),
                io_lock: Mutex::new(()),
                notifier,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    fn lock(&self, operation: &str) -> Result<MutexGuard<'_, ()>> {
        self.inner
            .io_lock
            .lock()
            .map_err(|_| persistence_error(operation, "storage file lock poisoned"))
    }

    fn load_document(&self) -> Result<Map<String, Value>> {
        let bytes = match std::fs::read(&self.inner.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(io_error("read_storage", e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        let document = serde_json::from_slice::<Value>(&bytes)
            .map_err(|e| serialization_error("parse_storage", e))?;
        match document {
            Value::Object(map) => Ok(map),
            other => Err(serialization_error(
                "parse_storage",
                format!(
                    "storage document must be an object, found {}",
                    type_name(&other)
                ),
            )),
        }
    }

    fn ledger_from(document: &Map<String, Value>) -> Result<Ledger> {
        match document.get(LEDGER_KEY) {
            None | Some(Value::Null) => Ok(Ledger::new()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| serialization_error("decode_ledger", e)),
        }
    }

    fn store_document(&self, mut document: Map<String, Value>, ledger: &Ledger) -> Result<()> {
        let value =
            serde_json::to_value(ledger).map_err(|e| serialization_error("encode_ledger", e))?;
        document.insert(LEDGER_KEY.to_string(), value);
        let bytes = serde_json::to_vec_pretty(&Value::Object(document))
            .map_err(|e| serialization_error("encode_storage", e))?;
        atomic_write(&self.inner.path, &bytes)
    }

    fn read_sync(&self) -> Result<Ledger> {
        let _guard = self.lock("ledger_read")?;
        Self::ledger_from(&self.load_document()?)
    }

    /// Broadcasts before the guard drops, so notification order is commit order
    fn write_sync(&self, ledger: Ledger) -> Result<()> {
        let _guard = self.lock("ledger_write")?;
        let document = self.load_document()?;
        self.store_document(document, &ledger)?;
        tracing::debug!(
            op = "ledger_write",
            ledger_len = ledger.len(),
            path = %self.inner.path.display(),
            "file store write"
        );
        let _ = self.inner.notifier.send(ledger);
        Ok(())
    }

    fn read_versioned_sync(&self) -> Result<(LedgerVersion, Ledger)> {
        let ledger = self.read_sync()?;
        let version = ledger.version().map_err(ExError::from)?;
        Ok((version, ledger))
    }

    fn compare_and_write_sync(
        &self,
        expected: &LedgerVersion,
        ledger: Ledger,
    ) -> Result<CasOutcome> {
        let _guard = self.lock("compare_and_write")?;
        let document = self.load_document()?;
        let current = Self::ledger_from(&document)?
            .version()
            .map_err(ExError::from)?;
        if &current != expected {
            return Ok(CasOutcome::Conflict { current });
        }
        self.store_document(document, &ledger)?;
        let version = ledger.version().map_err(ExError::from)?;
        let _ = self.inner.notifier.send(ledger);
        Ok(CasOutcome::Committed(version))
    }

    /// Run file I/O on the blocking pool
    async fn blocking<T, F>(&self, operation: &str, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&FileLedgerStore) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || work(&store))
            .await
            .map_err(|e| persistence_error(operation, &format!("storage task failed: {e}")))?
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl LedgerStore for FileLedgerStore {
    async fn read(&self) -> Result<Ledger> {
        self.blocking("ledger_read", |store| store.read_sync()).await
    }

    async fn write(&self, ledger: Ledger) -> Result<()> {
        self.blocking("ledger_write", move |store| store.write_sync(ledger))
            .await
    }

    fn subscribe(&self) -> Subscription {
        Subscription::new(self.inner.notifier.subscribe())
    }

    fn subscriber_count(&self) -> usize {
        self.inner.notifier.receiver_count()
    }
}

#[async_trait]
impl VersionedLedgerStore for FileLedgerStore {
    async fn read_versioned(&self) -> Result<(LedgerVersion, Ledger)> {
        self.blocking("ledger_read", |store| store.read_versioned_sync())
            .await
    }

    async fn compare_and_write(
        &self,
        expected: &LedgerVersion,
        ledger: Ledger,
    ) -> Result<CasOutcome> {
        let expected = expected.clone();
        self.blocking("compare_and_write", move |store| {
            store.compare_and_write_sync(&expected, ledger)
        })
        .await
    }
}
