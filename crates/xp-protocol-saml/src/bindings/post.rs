//! HTTP-POST binding.
//!
//! The serialized response travels base64 encoded in a `SAMLResponse` form
//! field. The receiver decodes the field and hands the XML to the reader.

use base64::Engine;

use crate::error::{SamlError, SamlResult};

/// Encodes serialized XML for the `SAMLResponse` form field.
#[must_use]
pub fn encode_post_message(xml: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(xml.as_bytes())
}

/// Decodes a `SAMLResponse` form field back to XML.
///
/// Whitespace inside the value is ignored, since form posts and copy-pasted
/// values commonly wrap long base64 strings.
///
/// # Errors
///
/// Returns [`SamlError::Base64Decode`] if the value is not base64 or does not
/// decode to UTF-8.
pub fn decode_post_message(encoded: &str) -> SamlResult<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let decoded = base64::engine::general_purpose::STANDARD.decode(compact)?;
    String::from_utf8(decoded)
        .map_err(|e| SamlError::Base64Decode(format!("invalid UTF-8 in message: {e}")))
}
