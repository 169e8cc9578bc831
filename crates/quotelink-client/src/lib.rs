//! QuoteLink Client - the remote submission service
//!
//! One `POST` per submission carrying `{"quote", "url"}`. A successful
//! response yields the remote id and preview image; everything else is
//! classified into one of three failure kinds. The client never retries.

pub mod client;
pub mod errors;
pub mod http;
pub mod response;

pub use client::{RemoteLink, SubmissionClient};
pub use errors::{Result, SubmitError};
pub use http::HttpSubmissionClient;
pub use response::parse_response_body;
