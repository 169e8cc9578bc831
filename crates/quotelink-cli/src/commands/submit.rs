//! Submit command
//!
//! Usage: quotelink submit --text <TEXT> --url <URL>

use anyhow::{bail, Result};
use clap::Args;
use quotelink_client::HttpSubmissionClient;
use quotelink_core::Settings;
use quotelink_engine::{open_store, PostCommitEffect, SubmissionOrchestrator, TriggerPayload};
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Selected text to quote
    #[arg(short, long)]
    pub text: Option<String>,

    /// Article page the text was selected on
    #[arg(short, long)]
    pub url: String,
}

/// Execute submit command
pub async fn execute(args: SubmitArgs, settings: &Settings) -> Result<()> {
    let store = open_store(settings);
    let client = Arc::new(HttpSubmissionClient::from_settings(settings)?);
    let orchestrator = SubmissionOrchestrator::from_settings(settings, store, client);

    let report = orchestrator
        .submit(TriggerPayload {
            selected_text: args.text,
            page_url: args.url,
        })
        .await;

    // No clipboard or notification surface here; print what would be performed
    for effect in &report.effects {
        match effect {
            PostCommitEffect::CopyToClipboard { text } => println!("copy: {}", text),
            PostCommitEffect::Notify { message, .. } => println!("notify: {}", message),
        }
    }

    if let Some(error) = report.outcome.error() {
        bail!("{} (request {})", error, report.request_id);
    }
    Ok(())
}
