//! Watch command
//!
//! Usage: quotelink watch [--poll-ms <MS>]
//!
//! Writes through this process's store handle arrive as notifications.
//! Writes by other processes are picked up by re-reading the storage file
//! every `--poll-ms`.

use anyhow::Result;
use clap::Args;
use quotelink_core::Settings;
use quotelink_engine::{open_store, LedgerView};
use std::time::Duration;

use super::render_items;

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Interval between storage re-reads, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub poll_ms: u64,
}

/// Execute watch command
pub async fn execute(args: WatchArgs, settings: &Settings) -> Result<()> {
    let store = open_store(settings);
    let mut view = LedgerView::mount_with_settings(store, settings).await?;
    print!("{}", render_items(&view.items()));

    let mut poll = tokio::time::interval(Duration::from_millis(args.poll_ms.max(50)));
    loop {
        let changed = tokio::select! {
            changed = view.next_change() => {
                if !changed? {
                    break;
                }
                true
            }
            _ = poll.tick() => view.refresh().await?,
            _ = tokio::signal::ctrl_c() => break,
        };
        if changed {
            println!("--");
            print!("{}", render_items(&view.items()));
        }
    }

    view.unmount();
    Ok(())
}
