//! Runtime settings
//!
//! Loaded from an optional TOML file. Every field has a default, so an
//! empty or missing file yields a working local-development setup. The CLI
//! applies flag and environment overrides on top.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{QuoteLinkError, Result};
use crate::rules::validation::{SubmissionPolicy, DEFAULT_ALLOWED_ORIGIN, DEFAULT_MAX_QUOTE_CHARS};
use crate::share::DEFAULT_SHARE_BASE_URL;

/// Local development backend
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8787/api/ogp";

/// How ledger writes are committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Plain read-then-write; concurrent writers can lose updates
    #[default]
    LastWriterWins,
    /// Versioned compare-and-set, re-applying the mutation on conflict
    CompareAndSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Remote submission endpoint
    pub endpoint: String,
    /// Base URL of the deployed share pages
    pub share_base_url: String,
    pub allowed_origin: String,
    pub max_quote_chars: usize,
    /// JSON document holding the ledger
    pub storage_path: PathBuf,
    pub request_timeout_secs: u64,
    pub write_mode: WriteMode,
    /// Attempts per mutation in `compare_and_set` mode
    pub cas_max_attempts: u32,
    /// `development` or `production`
    pub log_profile: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            max_quote_chars: DEFAULT_MAX_QUOTE_CHARS,
            storage_path: PathBuf::from(".quotelink/storage.json"),
            request_timeout_secs: 30,
            write_mode: WriteMode::default(),
            cas_max_attempts: 8,
            log_profile: "development".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when `path` is `None`
    ///
    /// # Errors
    ///
    /// Returns `InvalidSetting` if the file cannot be read, is not valid
    /// TOML, or fails [`Settings::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let text =
                    std::fs::read_to_string(path).map_err(|e| QuoteLinkError::InvalidSetting {
                        key: path.display().to_string(),
                        reason: e.to_string(),
                    })?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text
    ///
    /// # Errors
    ///
    /// Returns `InvalidSetting` on malformed TOML or unknown enum values.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| QuoteLinkError::InvalidSetting {
            key: "settings".to_string(),
            reason: e.to_string(),
        })
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns `InvalidSetting` naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, reason: &str| {
            Err(QuoteLinkError::InvalidSetting {
                key: key.to_string(),
                reason: reason.to_string(),
            })
        };

        if self.endpoint.trim().is_empty() {
            return invalid("endpoint", "must not be empty");
        }
        if self.allowed_origin.trim().is_empty() {
            return invalid("allowed_origin", "must not be empty");
        }
        if self.max_quote_chars == 0 {
            return invalid("max_quote_chars", "must be at least 1");
        }
        if self.cas_max_attempts == 0 {
            return invalid("cas_max_attempts", "must be at least 1");
        }
        Ok(())
    }

    pub fn submission_policy(&self) -> SubmissionPolicy {
        SubmissionPolicy {
            allowed_origin: self.allowed_origin.clone(),
            max_quote_chars: self.max_quote_chars,
        }
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
