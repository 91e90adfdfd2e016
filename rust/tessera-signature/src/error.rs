use tessera_abi::EncodingError;
use thiserror::Error;

use crate::Scheme;

/// Errors that can occur while verifying a request signature.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The scheme identifier is unknown, or no verifier is registered for it.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The signature bytes are not shaped like a signature of this scheme.
    #[error("Malformed {scheme} signature: {reason}")]
    MalformedSignature {
        /// The scheme the signature was checked against
        scheme: Scheme,
        /// What was wrong with it
        reason: String,
    },

    /// The scheme needs public key material that the envelope did not carry.
    #[error("Missing public key for {0}")]
    MissingPublicKey(Scheme),

    /// The public key material could not be parsed.
    #[error("Invalid {scheme} public key: {reason}")]
    InvalidPublicKey {
        /// The scheme the key was parsed for
        scheme: Scheme,
        /// What was wrong with it
        reason: String,
    },

    /// The signature is well-formed but does not verify.
    #[error("The {0} signature does not verify")]
    Invalid(Scheme),

    /// The signed payload could not be reconstructed.
    #[error("Failed to encode the signed payload: {0}")]
    Encoding(#[from] EncodingError),
}

impl VerifyError {
    pub(crate) fn malformed(scheme: Scheme, reason: impl Into<String>) -> Self {
        VerifyError::MalformedSignature {
            scheme,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_key(scheme: Scheme, reason: impl Into<String>) -> Self {
        VerifyError::InvalidPublicKey {
            scheme,
            reason: reason.into(),
        }
    }
}
