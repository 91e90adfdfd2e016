//! Recoverable secp256k1 ECDSA.

use async_trait::async_trait;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use tessera_abi::{B256, TypedData, keccak256};

use crate::{Principal, Scheme, SchemeVerifier, SignatureEnvelope, VerifyError};

/// Length of an `r ‖ s ‖ v` signature.
pub const RECOVERABLE_SIGNATURE_LENGTH: usize = 65;

/// Which digest of the payload the signer signed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Digest {
    /// The structured-data signing hash.
    #[default]
    Structured,
    /// The personal-message hash wrapping the structured-data signing hash.
    Personal,
}

/// Recovers the signer's address from a recoverable secp256k1 signature.
///
/// The public key is never transmitted: it is recovered from the signature
/// and the digest, and the principal is the Ethereum style address of it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Verifier {
    digest: Digest,
}

impl Secp256k1Verifier {
    /// Verifier for signatures over the structured-data hash.
    pub const fn structured() -> Self {
        Self {
            digest: Digest::Structured,
        }
    }

    /// Verifier for signatures over the personal-message hash.
    pub const fn personal() -> Self {
        Self {
            digest: Digest::Personal,
        }
    }

    fn scheme(&self) -> Scheme {
        match self.digest {
            Digest::Structured => Scheme::Secp256k1,
            Digest::Personal => Scheme::Secp256k1Legacy,
        }
    }

    /// The digest this verifier expects signatures over.
    pub fn digest_of(&self, data: &TypedData) -> Result<B256, VerifyError> {
        Ok(match self.digest {
            Digest::Structured => data.signing_hash()?,
            Digest::Personal => data.personal_hash()?,
        })
    }

    fn recover(&self, digest: &B256, bytes: &[u8]) -> Result<VerifyingKey, VerifyError> {
        let scheme = self.scheme();
        if bytes.len() != RECOVERABLE_SIGNATURE_LENGTH {
            return Err(VerifyError::malformed(
                scheme,
                format!(
                    "expected {RECOVERABLE_SIGNATURE_LENGTH} bytes, got {}",
                    bytes.len()
                ),
            ));
        }

        let (rs, v) = bytes.split_at(64);
        let signature = Signature::from_slice(rs)
            .map_err(|error| VerifyError::malformed(scheme, error.to_string()))?;
        let v = match v[0] {
            v @ 27.. => v - 27,
            v => v,
        };
        let mut recovery = RecoveryId::from_byte(v)
            .filter(|id| !id.is_x_reduced())
            .ok_or_else(|| VerifyError::malformed(scheme, format!("invalid recovery byte {v}")))?;

        // High-s signatures recover against the negated point.
        let signature = match signature.normalize_s() {
            Some(normalized) => {
                recovery = RecoveryId::new(!recovery.is_y_odd(), recovery.is_x_reduced());
                normalized
            }
            None => signature,
        };

        VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery)
            .map_err(|_| VerifyError::Invalid(scheme))
    }
}

/// The Ethereum style address of a secp256k1 public key.
pub fn ethereum_address(key: &VerifyingKey) -> Principal {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Principal::new(format!("0x{}", hex::encode(&hash[12..])))
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl SchemeVerifier for Secp256k1Verifier {
    async fn verify(
        &self,
        data: &TypedData,
        envelope: &SignatureEnvelope,
    ) -> Result<Principal, VerifyError> {
        let digest = self.digest_of(data)?;
        let key = self.recover(&digest, &envelope.signature)?;
        Ok(ethereum_address(&key))
    }
}
