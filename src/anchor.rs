//! Anchor tokens
//!
//! Encodes page anchors as opaque, URL-safe strings so they can travel in a
//! query parameter or on the command line. A token is the unpadded URL-safe
//! base64 of the key's JSON form, which keeps the key's type: `"7"` as text
//! and `7` as an integer decode to different anchors.

use crate::error::{Error, Result};
use crate::types::KeyValue;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

/// Encode an anchor key as a token
pub fn encode(key: &KeyValue) -> String {
    // serializing a KeyValue cannot fail
    let json = serde_json::to_vec(key).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decode a token produced by [`encode`]
pub fn decode(token: &str) -> Result<KeyValue> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|e| Error::invalid_anchor(format!("not base64: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| Error::invalid_anchor(format!("not a key: {e}")))
}
