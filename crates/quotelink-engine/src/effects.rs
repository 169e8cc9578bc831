//! Effects produced by a submission
//!
//! The orchestrator never touches the clipboard or the notification surface
//! itself. It returns these in the order they should be performed, after the
//! ledger has been committed. A failing effect does not undo the ledger.

use std::time::Duration;

/// How long a notification stays visible
pub const NOTIFY_DISMISS_AFTER: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostCommitEffect {
    /// Show `message` and dismiss it after `dismiss_after`
    Notify {
        message: String,
        dismiss_after: Duration,
    },
    /// Put `text` on the clipboard
    CopyToClipboard { text: String },
}

impl PostCommitEffect {
    pub fn notify(message: impl Into<String>) -> Self {
        PostCommitEffect::Notify {
            message: message.into(),
            dismiss_after: NOTIFY_DISMISS_AFTER,
        }
    }

    pub fn copy(text: impl Into<String>) -> Self {
        PostCommitEffect::CopyToClipboard { text: text.into() }
    }

    /// The notification text, if this is a `Notify`
    pub fn message(&self) -> Option<&str> {
        match self {
            PostCommitEffect::Notify { message, .. } => Some(message),
            PostCommitEffect::CopyToClipboard { .. } => None,
        }
    }
}
