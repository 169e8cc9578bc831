//! Decoding of a successful response body
//!
//! The body must be a JSON object with a non-empty string `id` and a
//! non-empty string image URL under `previewImageUrl` (or the older
//! `ogpImageUrl`). Anything else, including an `id` in the reserved
//! temporary token space, is a malformed response.

use quotelink_core::model::is_temporary_id;
use serde_json::Value;

use crate::client::RemoteLink;
use crate::errors::{malformed, Result};

const IMAGE_FIELDS: [&str; 2] = ["previewImageUrl", "ogpImageUrl"];

/// Decode a 2xx response body into a `RemoteLink`
pub fn parse_response_body(body: &[u8]) -> Result<RemoteLink> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| malformed(format!("body is not JSON: {}", e)))?;
    let Value::Object(fields) = value else {
        return Err(malformed("body is not a JSON object"));
    };

    let id = match fields.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(_) => return Err(malformed("`id` is not a non-empty string")),
        None => return Err(malformed("`id` is missing")),
    };
    if is_temporary_id(&id) {
        return Err(malformed(format!("`id` {} uses the reserved temporary prefix", id)));
    }

    let preview_image_url = IMAGE_FIELDS
        .iter()
        .find_map(|name| match fields.get(*name) {
            Some(Value::String(url)) if !url.is_empty() => Some(url.clone()),
            _ => None,
        })
        .ok_or_else(|| malformed("`previewImageUrl` is missing or not a non-empty string"))?;

    Ok(RemoteLink {
        id,
        preview_image_url,
    })
}
