//! Ed25519 over the structured-data signing hash.

use async_trait::async_trait;
use base58::{FromBase58, ToBase58};
use ed25519_dalek::{Signature, VerifyingKey};
use std::{fmt, str::FromStr};
use tessera_abi::TypedData;
use thiserror::Error;

use crate::{Principal, Scheme, SchemeVerifier, SignatureEnvelope, VerifyError};

const DID_KEY_PREFIX: &str = "did:key:z";
const ED25519_PUB: [u8; 2] = [0xed, 0x01];

/// Errors parsing an Ed25519 `did:key`.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DidKeyError {
    /// Not of the form `did:key:z…`.
    #[error("Expected a did:key with a base58btc multibase prefix")]
    InvalidHeader,
    /// The payload is not an ed25519-pub multicodec key.
    #[error("Not an ed25519 public key")]
    InvalidKey,
}

/// An Ed25519 public key addressed as a `did:key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ed25519DidKey(pub VerifyingKey);

impl From<VerifyingKey> for Ed25519DidKey {
    fn from(key: VerifyingKey) -> Self {
        Ed25519DidKey(key)
    }
}

impl fmt::Display for Ed25519DidKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = Vec::with_capacity(34);
        raw.extend_from_slice(&ED25519_PUB);
        raw.extend_from_slice(self.0.as_bytes());
        write!(f, "{DID_KEY_PREFIX}{}", raw.to_base58())
    }
}

impl FromStr for Ed25519DidKey {
    type Err = DidKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoded = s
            .strip_prefix(DID_KEY_PREFIX)
            .ok_or(DidKeyError::InvalidHeader)?;
        let decoded = encoded.from_base58().map_err(|_| DidKeyError::InvalidKey)?;
        let raw = <[u8; 34]>::try_from(decoded.as_slice()).map_err(|_| DidKeyError::InvalidKey)?;
        if raw[..2] != ED25519_PUB {
            return Err(DidKeyError::InvalidKey);
        }
        let key: [u8; 32] = raw[2..].try_into().map_err(|_| DidKeyError::InvalidKey)?;
        let key = VerifyingKey::from_bytes(&key).map_err(|_| DidKeyError::InvalidKey)?;
        Ok(Ed25519DidKey(key))
    }
}

/// Verifies Ed25519 signatures made by the key the caller names.
///
/// The caller field carries the signer's `did:key`; the signature must verify
/// under that key, and the principal is the key's canonical `did:key` form.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl SchemeVerifier for Ed25519Verifier {
    async fn verify(
        &self,
        data: &TypedData,
        envelope: &SignatureEnvelope,
    ) -> Result<Principal, VerifyError> {
        let key: Ed25519DidKey = envelope
            .caller
            .parse()
            .map_err(|error: DidKeyError| {
                VerifyError::invalid_key(Scheme::Ed25519, error.to_string())
            })?;
        let signature = Signature::from_slice(&envelope.signature)
            .map_err(|error| VerifyError::malformed(Scheme::Ed25519, error.to_string()))?;
        let digest = data.signing_hash()?;

        key.0
            .verify_strict(digest.as_slice(), &signature)
            .map_err(|_| VerifyError::Invalid(Scheme::Ed25519))?;

        Ok(Principal::new(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Domain, Payload};
    use ed25519_dalek::{Signer, SigningKey};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use testresult::TestResult;

    fn data(contract: &str) -> Result<TypedData, serde_json::Error> {
        Ok(Payload::new("post", &json!({ "body": "hello" }), 1)?
            .typed_data(&Domain::new("app", "1", contract)))
    }

    fn signed(key: &SigningKey, data: &TypedData) -> TestResult<SignatureEnvelope> {
        let signature = key.sign(data.signing_hash()?.as_slice());
        let caller = Ed25519DidKey(key.verifying_key()).to_string();
        Ok(SignatureEnvelope::new(
            Scheme::Ed25519,
            signature.to_bytes().to_vec(),
            caller,
            1,
        ))
    }

    #[test]
    fn it_round_trips_did_keys() -> TestResult {
        let key = SigningKey::from_bytes(&[3u8; 32]).verifying_key();
        let did = Ed25519DidKey(key).to_string();
        assert!(did.starts_with("did:key:z6Mk"));
        assert_eq!(did.parse::<Ed25519DidKey>()?, Ed25519DidKey(key));
        Ok(())
    }

    #[test]
    fn it_rejects_non_key_dids() {
        assert_eq!(
            "did:web:example.com".parse::<Ed25519DidKey>(),
            Err(DidKeyError::InvalidHeader)
        );
        assert_eq!(
            "did:key:z111".parse::<Ed25519DidKey>(),
            Err(DidKeyError::InvalidKey)
        );
    }

    #[tokio::test]
    async fn it_verifies_signatures_from_the_named_key() -> TestResult {
        let key = SigningKey::from_bytes(&[3u8; 32]);
        let data = data("contract")?;
        let envelope = signed(&key, &data)?;

        let principal = Ed25519Verifier.verify(&data, &envelope).await?;
        assert_eq!(principal.as_str(), envelope.caller);
        Ok(())
    }

    #[tokio::test]
    async fn it_rejects_signatures_for_another_contract() -> TestResult {
        let key = SigningKey::from_bytes(&[3u8; 32]);
        let envelope = signed(&key, &data("contract-a")?)?;

        let result = Ed25519Verifier.verify(&data("contract-b")?, &envelope).await;
        assert!(matches!(result, Err(VerifyError::Invalid(Scheme::Ed25519))));
        Ok(())
    }

    #[tokio::test]
    async fn it_rejects_signatures_from_another_key() -> TestResult {
        let data = data("contract")?;
        let mut envelope = signed(&SigningKey::from_bytes(&[3u8; 32]), &data)?;
        let other = SigningKey::from_bytes(&[4u8; 32]).verifying_key();
        envelope.caller = Ed25519DidKey(other).to_string();

        let result = Ed25519Verifier.verify(&data, &envelope).await;
        assert!(matches!(result, Err(VerifyError::Invalid(Scheme::Ed25519))));
        Ok(())
    }

    #[tokio::test]
    async fn it_rejects_callers_that_are_not_keys() -> TestResult {
        let data = data("contract")?;
        let mut envelope = signed(&SigningKey::from_bytes(&[3u8; 32]), &data)?;
        envelope.caller = "0xabc".into();

        let result = Ed25519Verifier.verify(&data, &envelope).await;
        assert!(matches!(result, Err(VerifyError::InvalidPublicKey { .. })));
        Ok(())
    }
}
