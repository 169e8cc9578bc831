//! User-facing notification text, one per outcome kind

use quotelink_client::SubmitError;
use quotelink_core::errors::{ExError, ExErrorKind, QuoteLinkError};

pub const EMPTY_SELECTION: &str = "No text is selected to quote.";
pub const TRANSPORT_UNREACHABLE: &str =
    "Could not reach the quote link service. Check that the backend is running.";
pub const MALFORMED_RESPONSE: &str = "The quote link service returned an invalid response.";
pub const COPIED: &str = "Quote link copied to the clipboard!";
pub const DROPPED: &str =
    "The quote link was created, but its entry was deleted before it was saved.";

pub fn selection_too_long(len: usize, max: usize) -> String {
    format!(
        "The selection is too long ({}/{}). Select {} characters or fewer.",
        len, max, max
    )
}

pub fn disallowed_origin(origin: &str) -> String {
    format!("Quote links can only be created on {} article pages.", origin)
}

pub fn storage_failure(detail: &str) -> String {
    format!("Could not save the quote link: {}", detail)
}

pub fn request_rejected(status: u16, body: &str) -> String {
    format!("The quote link service rejected the request ({}): {}", status, body)
}

/// Message for a selection that failed validation
pub fn for_validation(err: &QuoteLinkError, allowed_origin: &str) -> String {
    match err {
        QuoteLinkError::EmptySelection => EMPTY_SELECTION.to_string(),
        QuoteLinkError::SelectionTooLong { len, max } => selection_too_long(*len, *max),
        QuoteLinkError::DisallowedOrigin { .. } => disallowed_origin(allowed_origin),
        other => storage_failure(&other.to_string()),
    }
}

/// Message for a failed remote call
pub fn for_submit_error(err: &SubmitError) -> String {
    match err {
        SubmitError::TransportUnreachable { .. } => TRANSPORT_UNREACHABLE.to_string(),
        SubmitError::RequestRejected { status, body } => request_rejected(*status, body),
        SubmitError::MalformedResponse { .. } => MALFORMED_RESPONSE.to_string(),
    }
}

/// Message for a failed ledger write
pub fn for_storage_error(err: &ExError) -> String {
    let detail = if err.message().is_empty() {
        err.code()
    } else {
        err.message()
    };
    match err.kind() {
        ExErrorKind::DuplicateId => storage_failure("could not allocate a unique temporary id"),
        _ => storage_failure(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_failure_messages_are_distinct() {
        let transport = for_submit_error(&SubmitError::TransportUnreachable {
            detail: "refused".to_string(),
        });
        let malformed = for_submit_error(&SubmitError::MalformedResponse {
            detail: "no id".to_string(),
        });
        let rejected = for_submit_error(&SubmitError::RequestRejected {
            status: 500,
            body: "boom".to_string(),
        });

        assert_ne!(transport, malformed);
        assert_ne!(transport, rejected);
        assert_eq!(rejected, "The quote link service rejected the request (500): boom");
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            for_validation(
                &QuoteLinkError::SelectionTooLong { len: 201, max: 200 },
                "https://zenn.dev/"
            ),
            "The selection is too long (201/200). Select 200 characters or fewer."
        );
        assert_eq!(
            for_validation(
                &QuoteLinkError::DisallowedOrigin {
                    url: "https://example.com".to_string(),
                    origin: "https://zenn.dev/".to_string(),
                },
                "https://zenn.dev/"
            ),
            "Quote links can only be created on https://zenn.dev/ article pages."
        );
    }

    #[test]
    fn test_storage_message_uses_error_detail() {
        let err = ExError::new(ExErrorKind::Io).with_message("disk full");
        assert_eq!(for_storage_error(&err), "Could not save the quote link: disk full");
    }
}
