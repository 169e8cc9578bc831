//! QuoteLink CLI
//!
//! Command-line front end for the quote link ledger

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Debug, Parser)]
#[command(name = "quotelink")]
#[command(about = "QuoteLink - shareable links for quoted article passages", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: config::GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a quote link for a selection on an article page
    Submit(commands::submit::SubmitArgs),
    /// Print the ledger, newest first
    List(commands::list::ListArgs),
    /// Delete a quote link by id
    Delete(commands::delete::DeleteArgs),
    /// Print the ledger every time it changes, until Ctrl-C
    Watch(commands::watch::WatchArgs),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = match config::load_settings(&cli.global) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    config::init_logging(&settings);

    let result = match cli.command {
        Commands::Submit(args) => commands::submit::execute(args, &settings).await,
        Commands::List(args) => commands::list::execute(args, &settings).await,
        Commands::Delete(args) => commands::delete::execute(args, &settings).await,
        Commands::Watch(args) => commands::watch::execute(args, &settings).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
