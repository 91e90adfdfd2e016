//! Signature verification trait.

use async_trait::async_trait;
use tessera_abi::TypedData;

use crate::{Principal, SignatureEnvelope, VerifyError};

/// Checks a request signature against the payload it claims to cover.
///
/// On success a verifier yields the principal the signature proves control
/// of: a recovered address, a parsed public key identity or a digest of the
/// supplied key material. Verifiers never consult or mutate contract state.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait SchemeVerifier: Send + Sync {
    /// Verify `envelope` over `data`.
    async fn verify(
        &self,
        data: &TypedData,
        envelope: &SignatureEnvelope,
    ) -> Result<Principal, VerifyError>;
}
