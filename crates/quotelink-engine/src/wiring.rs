//! Store selection from settings

use quotelink_core::{Settings, WriteMode};
use quotelink_store::{CasLedgerStore, FileLedgerStore, LedgerStore};
use std::sync::Arc;

/// Open the file store at `settings.storage_path` in the configured write mode
pub fn open_store(settings: &Settings) -> Arc<dyn LedgerStore> {
    let file = FileLedgerStore::new(settings.storage_path.clone());
    match settings.write_mode {
        WriteMode::LastWriterWins => Arc::new(file),
        WriteMode::CompareAndSet => {
            Arc::new(CasLedgerStore::with_max_attempts(file, settings.cas_max_attempts))
        }
    }
}
