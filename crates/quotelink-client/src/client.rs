//! The submission client contract

use async_trait::async_trait;

use crate::errors::Result;

/// What the remote service issues for an accepted quote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLink {
    /// Permanent identifier, never in the temporary token space
    pub id: String,
    pub preview_image_url: String,
}

/// Sends one quote to the remote service
///
/// Implementations make exactly one attempt per call.
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn submit(&self, quote: &str, source_url: &str) -> Result<RemoteLink>;
}
