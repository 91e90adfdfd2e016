//! RSASSA-PKCS1-v1_5 with SHA-256.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rsa::{
    BigUint, RsaPublicKey,
    pkcs1v15::{Signature, VerifyingKey},
    traits::PublicKeyParts,
};
use sha2::{Digest, Sha256};
use signature::Verifier;
use tessera_abi::TypedData;

use crate::{Principal, Scheme, SchemeVerifier, SignatureEnvelope, VerifyError};

/// The public exponent every owner key uses.
pub const PUBLIC_EXPONENT: u32 = 65537;

/// Verifies RSA signatures over the JSON rendering of the payload.
///
/// RSA keys cannot be recovered from a signature, so the envelope carries the
/// modulus as its public key. The principal is the owner address derived from
/// that modulus.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rsa256Verifier;

/// The owner address of an RSA key: the unpadded base64url SHA-256 digest of
/// its big-endian modulus.
pub fn owner_address(key: &RsaPublicKey) -> Principal {
    let digest = Sha256::digest(key.n().to_bytes_be());
    Principal::new(URL_SAFE_NO_PAD.encode(digest))
}

fn public_key(modulus: &[u8]) -> Result<RsaPublicKey, VerifyError> {
    RsaPublicKey::new(
        BigUint::from_bytes_be(modulus),
        BigUint::from(PUBLIC_EXPONENT),
    )
    .map_err(|error| VerifyError::invalid_key(Scheme::Rsa256, error.to_string()))
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl SchemeVerifier for Rsa256Verifier {
    async fn verify(
        &self,
        data: &TypedData,
        envelope: &SignatureEnvelope,
    ) -> Result<Principal, VerifyError> {
        let modulus = envelope
            .public_key
            .as_deref()
            .ok_or(VerifyError::MissingPublicKey(Scheme::Rsa256))?;
        let key = public_key(modulus)?;
        let signature = Signature::try_from(envelope.signature.as_slice())
            .map_err(|error| VerifyError::malformed(Scheme::Rsa256, error.to_string()))?;
        let message = data.to_json_bytes()?;

        VerifyingKey::<Sha256>::new(key.clone())
            .verify(&message, &signature)
            .map_err(|_| VerifyError::Invalid(Scheme::Rsa256))?;

        Ok(owner_address(&key))
    }
}
