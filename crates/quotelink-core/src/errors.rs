use quotelink_core_types::RequestId;
use thiserror::Error;

/// Result type alias using QuoteLinkError
pub type Result<T> = std::result::Result<T, QuoteLinkError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every error that crosses a crate boundary is classified by one of these
/// kinds. Each kind maps to a stable code that tests, logs and the CLI rely
/// on instead of matching message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    EmptySelection,
    SelectionTooLong,
    DisallowedOrigin,

    // Ledger
    NotFound,
    DuplicateId,
    InvalidRecord,

    // Storage
    Io,
    Serialization,
    Persistence,
    Concurrency,

    // Remote service
    TransportUnreachable,
    RequestRejected,
    MalformedResponse,

    // Configuration
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::EmptySelection => "ERR_EMPTY_SELECTION",
            ExErrorKind::SelectionTooLong => "ERR_SELECTION_TOO_LONG",
            ExErrorKind::DisallowedOrigin => "ERR_DISALLOWED_ORIGIN",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::DuplicateId => "ERR_DUPLICATE_ID",
            ExErrorKind::InvalidRecord => "ERR_INVALID_RECORD",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::TransportUnreachable => "ERR_TRANSPORT_UNREACHABLE",
            ExErrorKind::RequestRejected => "ERR_REQUEST_REJECTED",
            ExErrorKind::MalformedResponse => "ERR_MALFORMED_RESPONSE",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// True for the kinds produced by the ledger store
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            ExErrorKind::Io
                | ExErrorKind::Serialization
                | ExErrorKind::Persistence
                | ExErrorKind::Concurrency
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification kind plus optional context for debugging.
/// The remote HTTP status and response body travel here for
/// `RequestRejected` so the caller can build a diagnostic message.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    record_id: Option<String>,
    request_id: Option<RequestId>,
    status: Option<u16>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            record_id: None,
            request_id: None,
            status: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add record ID context
    pub fn with_record_id(mut self, id: impl Into<String>) -> Self {
        self.record_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add the HTTP status returned by the remote service
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the record ID context, if any
    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the remote HTTP status, if any
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if let Some(status) = self.status {
            write!(f, " (status: {})", status)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(record_id) = &self.record_id {
            write!(f, " (record_id: {})", record_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain errors raised by the ledger model, validation and settings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteLinkError {
    /// Selection is absent or only whitespace
    #[error("No text is selected")]
    EmptySelection,

    /// Selection exceeds the configured character limit
    #[error("Selection is too long: {len}/{max} characters")]
    SelectionTooLong { len: usize, max: usize },

    /// Page URL is outside the allowed origin
    #[error("Page URL {url} is not under {origin}")]
    DisallowedOrigin { url: String, origin: String },

    /// A record with this id already exists in the ledger
    #[error("Record id already present in ledger: {id}")]
    DuplicateRecordId { id: String },

    /// A persisted record could not be mapped onto a lifecycle state
    #[error("Invalid record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    /// JSON or TOML (de)serialization failed
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// Settings could not be loaded or are inconsistent
    #[error("Invalid setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },
}

impl From<QuoteLinkError> for ExError {
    fn from(err: QuoteLinkError) -> Self {
        match err {
            QuoteLinkError::EmptySelection => ExError::new(ExErrorKind::EmptySelection)
                .with_message("Selection is empty after trimming"),

            QuoteLinkError::SelectionTooLong { len, max } => {
                ExError::new(ExErrorKind::SelectionTooLong)
                    .with_message(format!("Selection has {} characters, limit is {}", len, max))
            }

            QuoteLinkError::DisallowedOrigin { url, origin } => {
                ExError::new(ExErrorKind::DisallowedOrigin)
                    .with_message(format!("{} does not start with {}", url, origin))
            }

            QuoteLinkError::DuplicateRecordId { id } => ExError::new(ExErrorKind::DuplicateId)
                .with_record_id(id)
                .with_message("Record id already present"),

            QuoteLinkError::InvalidRecord { id, reason } => {
                ExError::new(ExErrorKind::InvalidRecord)
                    .with_record_id(id)
                    .with_message(reason)
            }

            QuoteLinkError::Serialization { reason } => {
                ExError::new(ExErrorKind::Serialization).with_message(reason)
            }

            QuoteLinkError::InvalidSetting { key, reason } => ExError::new(ExErrorKind::Config)
                .with_message(format!("{}: {}", key, reason)),
        }
    }
}

impl From<serde_json::Error> for QuoteLinkError {
    fn from(err: serde_json::Error) -> Self {
        QuoteLinkError::Serialization {
            reason: err.to_string(),
        }
    }
}
