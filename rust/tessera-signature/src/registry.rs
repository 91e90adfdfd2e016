//! Scheme identifier to verifier mapping.

use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::{Domain, Payload, Principal, Scheme, SchemeVerifier, SignatureEnvelope, VerifyError};

/// Maps each supported [`Scheme`] to the verifier that checks it.
///
/// The registry is built once per deployment and shared read-only across
/// requests. Schemes without a registered verifier (such as
/// [`Scheme::Poseidon`] in the standard registry) are unsupported.
#[derive(Clone, Default)]
pub struct Registry {
    verifiers: BTreeMap<Scheme, Arc<dyn SchemeVerifier>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in verifier enabled by crate features.
    pub fn standard() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "secp256k1")]
        {
            use crate::algorithm::Secp256k1Verifier;
            registry.insert(Scheme::Secp256k1, Secp256k1Verifier::structured());
            registry.insert(Scheme::Secp256k1Legacy, Secp256k1Verifier::personal());
        }
        #[cfg(feature = "ed25519")]
        registry.insert(Scheme::Ed25519, crate::algorithm::Ed25519Verifier);
        #[cfg(feature = "rsa256")]
        registry.insert(Scheme::Rsa256, crate::algorithm::Rsa256Verifier);

        registry
    }

    /// Register `verifier` for `scheme`, replacing any previous one.
    pub fn insert(&mut self, scheme: Scheme, verifier: impl SchemeVerifier + 'static) {
        self.verifiers.insert(scheme, Arc::new(verifier));
    }

    /// Builder form of [`Registry::insert`].
    pub fn with(mut self, scheme: Scheme, verifier: impl SchemeVerifier + 'static) -> Self {
        self.insert(scheme, verifier);
        self
    }

    /// Whether a verifier is registered for `scheme`.
    pub fn supports(&self, scheme: Scheme) -> bool {
        self.verifiers.contains_key(&scheme)
    }

    /// Registered schemes in identifier order.
    pub fn schemes(&self) -> impl Iterator<Item = Scheme> + '_ {
        self.verifiers.keys().copied()
    }

    /// Verify `envelope` for `payload` under `domain` with the verifier
    /// registered for `scheme`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::UnsupportedAlgorithm`] if no verifier is
    /// registered, or whatever the verifier reports.
    pub async fn verify(
        &self,
        scheme: Scheme,
        payload: &Payload,
        envelope: &SignatureEnvelope,
        domain: &Domain,
    ) -> Result<Principal, VerifyError> {
        let verifier = self
            .verifiers
            .get(&scheme)
            .ok_or_else(|| VerifyError::UnsupportedAlgorithm(scheme.to_string()))?;

        let data = payload.typed_data(domain);
        let principal = verifier.verify(&data, envelope).await?;
        tracing::trace!(%scheme, %principal, "signature verified");
        Ok(principal)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.schemes()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use tessera_abi::TypedData;
    use testresult::TestResult;

    struct Fixed(&'static str);

    #[async_trait]
    impl SchemeVerifier for Fixed {
        async fn verify(
            &self,
            _data: &TypedData,
            _envelope: &SignatureEnvelope,
        ) -> Result<Principal, VerifyError> {
            Ok(Principal::new(self.0))
        }
    }

    #[test]
    fn it_leaves_poseidon_unregistered_by_default() {
        let registry = Registry::standard();
        assert!(registry.supports(Scheme::Secp256k1));
        assert!(registry.supports(Scheme::Secp256k1Legacy));
        assert!(registry.supports(Scheme::Ed25519));
        assert!(registry.supports(Scheme::Rsa256));
        assert!(!registry.supports(Scheme::Poseidon));
    }

    #[tokio::test]
    async fn it_reports_unregistered_schemes_as_unsupported() -> TestResult {
        let payload = Payload::new("noop", &json!({}), 1)?;
        let envelope = SignatureEnvelope::new(Scheme::Poseidon, vec![], "0xabc", 1);

        let result = Registry::standard()
            .verify(
                Scheme::Poseidon,
                &payload,
                &envelope,
                &Domain::new("app", "1", "c"),
            )
            .await;

        assert!(matches!(
            result,
            Err(VerifyError::UnsupportedAlgorithm(id)) if id == "poseidon"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn it_dispatches_to_registered_verifiers() -> TestResult {
        let registry = Registry::standard().with(Scheme::Poseidon, Fixed("0xPOSEIDON"));
        let payload = Payload::new("noop", &json!({}), 1)?;
        let envelope = SignatureEnvelope::new(Scheme::Poseidon, vec![], "0xabc", 1);

        let principal = registry
            .verify(
                Scheme::Poseidon,
                &payload,
                &envelope,
                &Domain::new("app", "1", "c"),
            )
            .await?;

        assert_eq!(principal.as_str(), "0xposeidon");
        Ok(())
    }
}
