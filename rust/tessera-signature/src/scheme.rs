//! Signature scheme identifiers.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::VerifyError;

/// A signature scheme a request envelope may declare.
///
/// The textual identifiers are part of the wire format and of every
/// deployment's allow-list, so they never change.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Scheme {
    /// Recoverable secp256k1 ECDSA over the structured-data hash.
    #[default]
    #[serde(rename = "secp256k1")]
    Secp256k1,
    /// Recoverable secp256k1 ECDSA over the personal-message hash.
    #[serde(rename = "secp256k1-2")]
    Secp256k1Legacy,
    /// Ed25519 over the structured-data hash.
    #[serde(rename = "ed25519")]
    Ed25519,
    /// RSASSA-PKCS1-v1_5 with SHA-256 over the serialized payload.
    #[serde(rename = "rsa256")]
    Rsa256,
    /// A zero-knowledge friendly hash-based scheme, verified by a
    /// deployment-supplied verifier.
    #[serde(rename = "poseidon")]
    Poseidon,
}

impl Scheme {
    /// Every scheme, which is also the default allow-list.
    pub const ALL: [Scheme; 5] = [
        Scheme::Secp256k1,
        Scheme::Secp256k1Legacy,
        Scheme::Ed25519,
        Scheme::Rsa256,
        Scheme::Poseidon,
    ];

    /// The wire identifier of this scheme.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Scheme::Secp256k1 => "secp256k1",
            Scheme::Secp256k1Legacy => "secp256k1-2",
            Scheme::Ed25519 => "ed25519",
            Scheme::Rsa256 => "rsa256",
            Scheme::Poseidon => "poseidon",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == s)
            .ok_or_else(|| VerifyError::UnsupportedAlgorithm(s.to_string()))
    }
}
