//! Interaction signature verification
//!
//! Every inbound webhook is signed by the chat platform with the
//! application's Ed25519 key. The signed message is the request timestamp
//! header followed by the raw, unparsed request body.

use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH};
use tracing::debug;

use crate::error::{GrantError, Result};

/// Ed25519 verifier bound to the application's public key
#[derive(Clone)]
pub struct InteractionVerifier {
    verifying_key: VerifyingKey,
}

impl std::fmt::Debug for InteractionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionVerifier")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

impl InteractionVerifier {
    /// Create a verifier from a hex-encoded public key
    pub fn from_hex(public_key_hex: &str) -> Result<Self> {
        if public_key_hex.is_empty() {
            return Err(GrantError::InvalidPublicKey("public key is empty".into()));
        }

        let bytes = hex::decode(public_key_hex)?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            GrantError::InvalidPublicKey(format!(
                "expected {} bytes, got {}",
                PUBLIC_KEY_LENGTH,
                bytes.len()
            ))
        })?;

        Self::from_bytes(&bytes)
    }

    /// Create a verifier from raw public key bytes
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LENGTH]) -> Result<Self> {
        let verifying_key = VerifyingKey::from_bytes(bytes)
            .map_err(|e| GrantError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { verifying_key })
    }

    /// Hex encoding of the bound public key
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.verifying_key.to_bytes())
    }

    /// Accept or reject a signed request.
    ///
    /// Empty timestamps or signatures are rejected before any decoding.
    pub fn verify(&self, timestamp: &str, body: &[u8], signature_hex: &str) -> bool {
        if timestamp.is_empty() || signature_hex.is_empty() {
            return false;
        }

        match self.check(timestamp, body, signature_hex) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Interaction signature rejected");
                false
            }
        }
    }

    fn check(&self, timestamp: &str, body: &[u8], signature_hex: &str) -> Result<()> {
        let signature_bytes = hex::decode(signature_hex)?;
        let signature = Signature::from_slice(&signature_bytes)?;

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.verifying_key.verify(&message, &signature)?;
        Ok(())
    }
}

/// Verify `signature_hex` over `timestamp || body` with `public_key_hex`.
///
/// Never errors: any empty input or undecodable hex is a rejection.
pub fn verify_signature(
    public_key_hex: &str,
    timestamp: &str,
    body: &[u8],
    signature_hex: &str,
) -> bool {
    if public_key_hex.is_empty() || timestamp.is_empty() || signature_hex.is_empty() {
        return false;
    }

    match InteractionVerifier::from_hex(public_key_hex) {
        Ok(verifier) => verifier.verify(timestamp, body, signature_hex),
        Err(e) => {
            debug!(error = %e, "Public key rejected");
            false
        }
    }
}
