use base64::{
    Engine as _,
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
};
use thiserror::Error;

/// Encodes bytes as unpadded base64url, the form every binary WebAuthn field
/// takes on the wire.
pub fn base64url_encode(input: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Decodes a base64url string, with or without trailing `=` padding.
///
/// The input is re-padded to a multiple of four before decoding, so a length
/// that leaves a remainder of one can never be valid and is rejected up front.
pub fn base64url_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    let missing = (4 - input.len() % 4) % 4;
    if missing == 3 {
        return Err(UtilError::Format(format!(
            "Impossible base64url length: {}",
            input.len()
        )));
    }

    let mut padded = String::with_capacity(input.len() + missing);
    padded.push_str(input);
    padded.extend(std::iter::repeat_n('=', missing));

    URL_SAFE
        .decode(padded)
        .map_err(|e| UtilError::Format(format!("Failed to decode base64url: {e}")))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UtilError {
    #[error("Invalid format: {0}")]
    Format(String),
}
