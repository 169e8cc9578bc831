//! reqwest-backed submission client

use async_trait::async_trait;
use quotelink_core::errors::{ExError, ExErrorKind};
use quotelink_core::Settings;
use serde::Serialize;
use std::time::Duration;

use crate::client::{RemoteLink, SubmissionClient};
use crate::errors::{transport_error, Result, SubmitError};
use crate::response::parse_response_body;

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    quote: &'a str,
    url: &'a str,
}

/// Posts quotes as JSON to a fixed endpoint
#[derive(Debug, Clone)]
pub struct HttpSubmissionClient {
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpSubmissionClient {
    /// Build a client whose requests fail as unreachable after `timeout`
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the HTTP client cannot be initialized.
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> std::result::Result<Self, ExError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ExError::new(ExErrorKind::Config)
                    .with_op("http_client_build")
                    .with_message(e.to_string())
            })?;

        Ok(Self {
            endpoint: endpoint.into(),
            http_client,
        })
    }

    /// Build a client from the endpoint and timeout in `settings`
    ///
    /// # Errors
    ///
    /// See [`HttpSubmissionClient::new`].
    pub fn from_settings(settings: &Settings) -> std::result::Result<Self, ExError> {
        Self::new(settings.endpoint.clone(), settings.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionClient for HttpSubmissionClient {
    async fn submit(&self, quote: &str, source_url: &str) -> Result<RemoteLink> {
        let payload = SubmitRequest {
            quote,
            url: source_url,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            tracing::debug!(
                op = "remote_submit",
                status = status.as_u16(),
                "remote rejected submission"
            );
            return Err(SubmitError::RequestRejected {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(|e| transport_error(&e))?;
        parse_response_body(&body)
    }
}
