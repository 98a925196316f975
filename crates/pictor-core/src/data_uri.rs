//! Base64 data URI helpers.
//!
//! Edited images travel through the application as `data:{mime};base64,{data}`
//! strings, the same renderable form the generation service's inline parts
//! decode to. These helpers build and dismantle that form losslessly.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::error::{PictorError, Result};

/// Builds a data URI from a declared media type and already base64-encoded data.
pub fn build(mime_type: &str, base64_data: &str) -> String {
    format!("data:{mime_type};base64,{base64_data}")
}

/// Encodes raw bytes into a data URI.
pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> String {
    build(mime_type, &BASE64_STANDARD.encode(bytes))
}

/// Decodes a base64 data URI back into `(media type, bytes)`.
///
/// Only the `data:{mime};base64,{data}` form is accepted; anything else is a
/// serialization error.
pub fn decode(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:").ok_or_else(|| malformed(uri))?;
    let (header, payload) = rest.split_once(',').ok_or_else(|| malformed(uri))?;
    let mime_type = header.strip_suffix(";base64").ok_or_else(|| malformed(uri))?;

    let bytes = BASE64_STANDARD
        .decode(payload)
        .map_err(|err| PictorError::Serialization {
            format: "data URI".to_string(),
            message: format!("invalid base64 payload: {err}"),
        })?;

    Ok((mime_type.to_string(), bytes))
}

fn malformed(uri: &str) -> PictorError {
    // Truncate so a huge (or sensitive) URI never lands in a message verbatim.
    let head: String = uri.chars().take(32).collect();
    PictorError::Serialization {
        format: "data URI".to_string(),
        message: format!("not a base64 data URI: {head}..."),
    }
}
