//! Delete command
//!
//! Usage: quotelink delete <ID>

use anyhow::Result;
use clap::Args;
use quotelink_core::Settings;
use quotelink_engine::{open_store, LedgerView};

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Id of the quote link to delete
    pub id: String,
}

/// Execute delete command
pub async fn execute(args: DeleteArgs, settings: &Settings) -> Result<()> {
    let store = open_store(settings);
    let mut view = LedgerView::mount_with_settings(store, settings).await?;

    let outcome = view.delete(&args.id).await?;
    if outcome.written {
        println!("✓ Deleted {}", args.id);
    } else {
        println!("No quote link with id {}", args.id);
    }
    view.unmount();
    Ok(())
}
