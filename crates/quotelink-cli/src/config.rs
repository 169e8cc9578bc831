//! Settings resolution: TOML file, then environment and flag overrides

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use quotelink_core::logging_facility::{self, Profile};
use quotelink_core::{Settings, WriteMode};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WriteModeArg {
    LastWriterWins,
    CompareAndSet,
}

impl From<WriteModeArg> for WriteMode {
    fn from(arg: WriteModeArg) -> Self {
        match arg {
            WriteModeArg::LastWriterWins => WriteMode::LastWriterWins,
            WriteModeArg::CompareAndSet => WriteMode::CompareAndSet,
        }
    }
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Settings file (TOML)
    #[arg(long, env = "QUOTELINK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Remote submission endpoint
    #[arg(long, env = "QUOTELINK_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Ledger storage file
    #[arg(long, env = "QUOTELINK_STORAGE_PATH", global = true)]
    pub storage_path: Option<PathBuf>,

    /// Base URL of the share pages
    #[arg(long, env = "QUOTELINK_SHARE_BASE_URL", global = true)]
    pub share_base_url: Option<String>,

    #[arg(long, env = "QUOTELINK_WRITE_MODE", value_enum, global = true)]
    pub write_mode: Option<WriteModeArg>,

    /// Remote request timeout in seconds
    #[arg(long, env = "QUOTELINK_REQUEST_TIMEOUT_SECS", global = true)]
    pub request_timeout_secs: Option<u64>,

    /// `development` or `production`
    #[arg(long, env = "QUOTELINK_LOG_PROFILE", global = true)]
    pub log_profile: Option<String>,
}

/// Load the settings file (if any) and apply overrides
pub fn load_settings(args: &GlobalArgs) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref()).context("failed to load settings")?;

    if let Some(endpoint) = &args.endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(path) = &args.storage_path {
        settings.storage_path = path.clone();
    }
    if let Some(base) = &args.share_base_url {
        settings.share_base_url = base.clone();
    }
    if let Some(mode) = args.write_mode {
        settings.write_mode = mode.into();
    }
    if let Some(secs) = args.request_timeout_secs {
        settings.request_timeout_secs = secs;
    }
    if let Some(profile) = &args.log_profile {
        settings.log_profile = profile.clone();
    }

    settings.validate().context("invalid settings")?;
    Ok(settings)
}

pub fn init_logging(settings: &Settings) {
    let profile = Profile::from_name(&settings.log_profile).unwrap_or(Profile::Development);
    logging_facility::init(profile);
}
