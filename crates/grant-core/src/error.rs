//! Error types for the Grant core library

use thiserror::Error;

/// Result type alias using GrantError
pub type Result<T> = std::result::Result<T, GrantError>;

/// Errors that can occur in the Grant core library
#[derive(Error, Debug)]
pub enum GrantError {
    /// A hex-encoded value could not be decoded
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    /// Public key bytes are not a valid Ed25519 key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Signature is malformed or does not verify
    #[error("Signature verification failed: {0}")]
    SignatureInvalid(String),

    /// JSON serialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Encoded export does not fit in a single reply
    #[error("Export payload is {length} characters, limit is {limit}")]
    ExportTooLarge { length: usize, limit: usize },

    /// Import payload was empty
    #[error("Import payload is empty")]
    EmptyPayload,

    /// Import payload was not valid base64
    #[error("Import payload is not valid base64: {0}")]
    InvalidEncoding(String),

    /// Decoded import payload was not an object with a `rows` array
    #[error("Import payload has an invalid format")]
    InvalidFormat,
}

impl From<hex::FromHexError> for GrantError {
    fn from(err: hex::FromHexError) -> Self {
        GrantError::InvalidHex(err.to_string())
    }
}

impl From<ed25519_dalek::SignatureError> for GrantError {
    fn from(err: ed25519_dalek::SignatureError) -> Self {
        GrantError::SignatureInvalid(err.to_string())
    }
}

impl From<serde_json::Error> for GrantError {
    fn from(err: serde_json::Error) -> Self {
        GrantError::SerializationError(err.to_string())
    }
}

impl From<base64::DecodeError> for GrantError {
    fn from(err: base64::DecodeError) -> Self {
        GrantError::InvalidEncoding(err.to_string())
    }
}
