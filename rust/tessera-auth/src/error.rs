//! Error types for authorization and action dispatch.
//!
//! Every error here is fatal to the request that raised it: the working state
//! is discarded and the submitter receives the [`ErrorCode`] and message.

use serde::Serialize;
use tessera_abi::EncodingError;
use tessera_signature::{Principal, VerifyError};
use thiserror::Error;

/// Stable classification of a rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authorization
    /// Scheme unknown, unregistered or not allowed
    UnsupportedAlgorithm,
    /// Signature did not verify
    BadSignature,
    /// Signer does not act as the claimed caller
    CallerMismatch,
    /// Claimed nonce is not the next one
    BadNonce,
    /// Signed payload could not be reconstructed
    InvalidEncoding,

    // Dispatch
    /// Caller lacks the required ownership
    NotOwner,
    /// Delegate is already linked elsewhere
    LinkConflict,
    /// Delegate has no link
    NotLinked,
    /// Arguments do not fit the function
    InvalidQuery,
    /// Document write failed
    WriteFailed,
}

/// Reasons a write request fails authorization.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The declared scheme is unknown, not allowed, or has no verifier.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The signature does not verify for the reconstructed payload.
    #[error("Bad signature: {0}")]
    BadSignature(#[source] VerifyError),

    /// The resolved signer differs from the caller the envelope claims.
    #[error("Signer {signer} is not caller {caller}")]
    CallerMismatch {
        /// Effective principal after delegation
        signer: Principal,
        /// Claimed caller
        caller: Principal,
    },

    /// The claimed nonce is not exactly one past the signer's last nonce.
    #[error("Bad nonce: expected {expected}, found {found}")]
    BadNonce {
        /// The only acceptable nonce
        expected: u64,
        /// The claimed nonce
        found: u64,
    },

    /// The payload could not be encoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl AuthError {
    /// The classification reported to the submitter.
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::UnsupportedAlgorithm(_) => ErrorCode::UnsupportedAlgorithm,
            AuthError::BadSignature(_) => ErrorCode::BadSignature,
            AuthError::CallerMismatch { .. } => ErrorCode::CallerMismatch,
            AuthError::BadNonce { .. } => ErrorCode::BadNonce,
            AuthError::Encoding(_) => ErrorCode::InvalidEncoding,
        }
    }
}

impl From<VerifyError> for AuthError {
    fn from(error: VerifyError) -> Self {
        match error {
            VerifyError::UnsupportedAlgorithm(scheme) => AuthError::UnsupportedAlgorithm(scheme),
            VerifyError::Encoding(error) => AuthError::Encoding(error),
            error => AuthError::BadSignature(error),
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        AuthError::Encoding(error.into())
    }
}

/// Reasons a write action fails.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The request was not authorized.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The caller does not own what it tried to change.
    #[error("{0} is not permitted to perform this action")]
    NotOwner(Principal),

    /// The delegate is already linked to another principal.
    #[error("{delegate} is already linked to {address}")]
    LinkConflict {
        /// The delegate key
        delegate: Principal,
        /// Its current backing principal
        address: Principal,
    },

    /// The delegate has no link to remove.
    #[error("{0} is not linked")]
    NotLinked(Principal),

    /// The arguments do not fit the function.
    #[error("Invalid query for {function}: {reason}")]
    InvalidQuery {
        /// The invoked function
        function: String,
        /// What was wrong
        reason: String,
    },

    /// The document write handler rejected the request.
    #[error("Write failed: {0}")]
    Handler(String),
}

impl ActionError {
    pub(crate) fn invalid_query(function: impl Into<String>, reason: impl ToString) -> Self {
        ActionError::InvalidQuery {
            function: function.into(),
            reason: reason.to_string(),
        }
    }

    /// The classification reported to the submitter.
    pub fn code(&self) -> ErrorCode {
        match self {
            ActionError::Auth(error) => error.code(),
            ActionError::NotOwner(_) => ErrorCode::NotOwner,
            ActionError::LinkConflict { .. } => ErrorCode::LinkConflict,
            ActionError::NotLinked(_) => ErrorCode::NotLinked,
            ActionError::InvalidQuery { .. } => ErrorCode::InvalidQuery,
            ActionError::Handler(_) => ErrorCode::WriteFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_signature::Scheme;

    #[test]
    fn it_maps_verifier_failures() {
        assert_eq!(
            AuthError::from(VerifyError::UnsupportedAlgorithm("poseidon".into())).code(),
            ErrorCode::UnsupportedAlgorithm
        );
        assert_eq!(
            AuthError::from(VerifyError::Invalid(Scheme::Ed25519)).code(),
            ErrorCode::BadSignature
        );
        assert_eq!(
            AuthError::from(VerifyError::Encoding(EncodingError::UnknownType("x".into()))).code(),
            ErrorCode::InvalidEncoding
        );
    }

    #[test]
    fn it_serializes_codes_for_submitters() -> Result<(), serde_json::Error> {
        assert_eq!(
            serde_json::to_string(&ErrorCode::BadNonce)?,
            "\"BAD_NONCE\""
        );
        let error = ActionError::from(AuthError::BadNonce {
            expected: 2,
            found: 1,
        });
        assert_eq!(error.code(), ErrorCode::BadNonce);
        assert_eq!(error.to_string(), "Bad nonce: expected 2, found 1");
        Ok(())
    }
}
