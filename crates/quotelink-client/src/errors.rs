//! Error handling for quotelink-client
//!
//! `SubmitError` is the three-way classification the orchestrator branches
//! on. It converts into the structured `ExError` for logging.

use quotelink_core::errors::{ExError, ExErrorKind};
use thiserror::Error;

/// Result type alias for remote submissions
pub type Result<T> = std::result::Result<T, SubmitError>;

/// Why a submission did not produce a remote link
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Connection refused, DNS failure, timeout or an interrupted exchange
    #[error("Remote service unreachable: {detail}")]
    TransportUnreachable { detail: String },

    /// The service answered with a non-success status
    #[error("Remote service rejected the request ({status}): {body}")]
    RequestRejected { status: u16, body: String },

    /// Success status but the body is not the expected shape
    #[error("Malformed response: {detail}")]
    MalformedResponse { detail: String },
}

impl SubmitError {
    pub fn kind(&self) -> ExErrorKind {
        match self {
            SubmitError::TransportUnreachable { .. } => ExErrorKind::TransportUnreachable,
            SubmitError::RequestRejected { .. } => ExErrorKind::RequestRejected,
            SubmitError::MalformedResponse { .. } => ExErrorKind::MalformedResponse,
        }
    }
}

impl From<SubmitError> for ExError {
    fn from(err: SubmitError) -> Self {
        let base = ExError::new(err.kind()).with_op("remote_submit");
        match err {
            SubmitError::TransportUnreachable { detail } => base.with_message(detail),
            SubmitError::RequestRejected { status, body } => {
                base.with_status(status).with_message(body)
            }
            SubmitError::MalformedResponse { detail } => base.with_message(detail),
        }
    }
}

/// Create a transport failure from a reqwest error
pub fn transport_error(err: &reqwest::Error) -> SubmitError {
    let detail = if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    };
    SubmitError::TransportUnreachable { detail }
}

/// Create a malformed-response error
pub fn malformed(detail: impl Into<String>) -> SubmitError {
    SubmitError::MalformedResponse {
        detail: detail.into(),
    }
}
