//! List command
//!
//! Usage: quotelink list [--json]

use anyhow::Result;
use clap::Args;
use quotelink_core::Settings;
use quotelink_engine::{open_store, LedgerView};
use quotelink_store::LedgerStore;

use super::render_items;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Print the raw ledger as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute list command
pub async fn execute(args: ListArgs, settings: &Settings) -> Result<()> {
    let store = open_store(settings);

    if args.json {
        let ledger = store.read().await?;
        println!("{}", serde_json::to_string_pretty(&ledger)?);
        return Ok(());
    }

    let mut view = LedgerView::mount_with_settings(store, settings).await?;
    print!("{}", render_items(&view.items()));
    view.unmount();
    Ok(())
}
