//! Hex-encoded SHA-512 digests of text payloads.

use std::string::FromUtf8Error;

use sha2::{Digest, Sha512};
use thiserror::Error;
use tracing::trace;

/// Length of every digest returned by [`to_sha512`].
pub const DIGEST_HEX_LENGTH: usize = 128;

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("could not decode input to UTF-8: {message}")]
    Encoding { message: FromUtf8Error },
}

/// Returns the lowercase hex SHA-512 of the UTF-8 bytes of `text`.
pub fn to_sha512(text: &str) -> String {
    trace!(msg = "hashing input", input_bytes = text.len());
    let mut hasher = Sha512::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Turns bytes of unknown encoding into hashable text.
pub fn decode(bytes: Vec<u8>) -> Result<String, DigestError> {
    String::from_utf8(bytes).map_err(|reason| DigestError::Encoding { message: reason })
}

/// Same as [`to_sha512`] for input of unknown encoding. Bytes must be valid UTF-8.
pub fn try_to_sha512(bytes: Vec<u8>) -> Result<String, DigestError> {
    Ok(to_sha512(&decode(bytes)?))
}

pub fn is_sha512_hex(value: &str) -> bool {
    value.len() == DIGEST_HEX_LENGTH
        && value
            .bytes()
            .all(|byte| matches!(byte, b'0'..=b'9' | b'a'..=b'f'))
}
