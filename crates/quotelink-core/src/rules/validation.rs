use crate::errors::{QuoteLinkError, Result};

/// Default character limit for a quote
pub const DEFAULT_MAX_QUOTE_CHARS: usize = 200;

/// Default origin a page must belong to
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://zenn.dev/";

/// Limits applied to a trigger before anything is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPolicy {
    /// Page URLs must start with this prefix
    pub allowed_origin: String,
    /// Maximum quote length in characters (after trimming)
    pub max_quote_chars: usize,
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self {
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            max_quote_chars: DEFAULT_MAX_QUOTE_CHARS,
        }
    }
}

/// A trigger payload that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSelection {
    /// Trimmed selection text
    pub quote: String,
    pub source_url: String,
}

/// Validate a trigger payload
///
/// Checks run in a fixed order so the reported error is deterministic:
/// 1. The selection is present and non-empty after trimming
/// 2. The trimmed selection is within `max_quote_chars` characters
/// 3. `page_url` starts with `allowed_origin`
///
/// The trigger surface filters pages by its own pattern; the origin check
/// here runs regardless.
///
/// # Errors
///
/// Returns `EmptySelection`, `SelectionTooLong` or `DisallowedOrigin`.
pub fn validate_selection(
    selected_text: Option<&str>,
    page_url: &str,
    policy: &SubmissionPolicy,
) -> Result<ValidatedSelection> {
    let quote = selected_text.map(str::trim).unwrap_or_default();
    if quote.is_empty() {
        return Err(QuoteLinkError::EmptySelection);
    }

    let len = quote.chars().count();
    if len > policy.max_quote_chars {
        return Err(QuoteLinkError::SelectionTooLong {
            len,
            max: policy.max_quote_chars,
        });
    }

    if !page_url.starts_with(&policy.allowed_origin) {
        return Err(QuoteLinkError::DisallowedOrigin {
            url: page_url.to_string(),
            origin: policy.allowed_origin.clone(),
        });
    }

    Ok(ValidatedSelection {
        quote: quote.to_string(),
        source_url: page_url.to_string(),
    })
}
