//! The authorization orchestrator.
//!
//! Every write request passes through [`authorize`], which moves through a
//! fixed sequence of checks:
//!
//! 1. the declared scheme is allowed by the deployment,
//! 2. the signature verifies over the request payload and domain,
//! 3. the recovered signer is resolved through its delegation link,
//! 4. the resolved principal equals the claimed caller,
//! 5. the claimed nonce is exactly one past the signer's last nonce,
//!
//! and finally commits the nonce. Nothing is written before the commit, so a
//! rejected request leaves the state untouched.

use serde::{Deserialize, Serialize};
use tessera_signature::{Domain, Payload, Principal, Registry, Scheme, SignatureEnvelope};
use tracing::{debug, instrument, warn};

use crate::{AuthError, State, resolve};

/// Facts about the executing ledger, fixed for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Identifier of the contract instance
    pub contract: String,
    /// Current ledger timestamp
    pub timestamp: u64,
}

impl Environment {
    /// Create an environment.
    pub fn new(contract: impl Into<String>, timestamp: u64) -> Self {
        Self {
            contract: contract.into(),
            timestamp,
        }
    }
}

/// A signed write request as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// The function to invoke
    pub function: String,
    /// The function's arguments
    #[serde(default)]
    pub query: serde_json::Value,
    /// The signature over `function`, `query` and the nonce
    #[serde(flatten)]
    pub envelope: SignatureEnvelope,
}

/// The outcome of a successful authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorized {
    /// The principal the request acts as
    pub principal: Principal,
    /// The scheme the signature was checked with
    pub scheme: Scheme,
    /// The key that actually signed, before delegation
    pub signer: Principal,
}

/// Authorize `request` against `state`, consuming the signer's next nonce.
///
/// # Errors
///
/// Fails with the [`AuthError`] of the first check that does not pass; in
/// that case `state` is unchanged.
#[instrument(skip(state, registry, request), fields(function = %request.function, scheme = %request.envelope.scheme))]
pub async fn authorize(
    state: &mut State,
    registry: &Registry,
    env: &Environment,
    request: &Request,
) -> Result<Authorized, AuthError> {
    let envelope = &request.envelope;

    let scheme = match envelope.scheme.parse::<Scheme>() {
        Ok(scheme) if state.auth.allows(scheme) => scheme,
        _ => {
            warn!("algorithm not allowed");
            return Err(AuthError::UnsupportedAlgorithm(envelope.scheme.clone()));
        }
    };
    debug!("algorithm checked");

    let payload = Payload::new(&request.function, &request.query, envelope.nonce)?;
    let domain = Domain::new(&state.auth.name, &state.auth.version, &env.contract);
    let signer = registry
        .verify(scheme, &payload, envelope, &domain)
        .await
        .inspect_err(|error| warn!(%error, "signature rejected"))?;
    debug!(%signer, "signature verified");

    let resolution = resolve(&*state, &signer, env.timestamp);
    debug!(principal = %resolution.effective, lapsed = resolution.lapsed, "principal resolved");

    let caller = Principal::new(&envelope.caller);
    if resolution.effective != caller {
        warn!(%caller, principal = %resolution.effective, "caller mismatch");
        return Err(AuthError::CallerMismatch {
            signer: resolution.effective,
            caller,
        });
    }

    state
        .nonces
        .check(&signer, envelope.nonce)
        .inspect_err(|error| warn!(%error, "nonce rejected"))?;
    state.nonces.commit(signer.clone(), envelope.nonce);
    debug!(nonce = envelope.nonce, "nonce committed");

    Ok(Authorized {
        principal: resolution.effective,
        scheme,
        signer,
    })
}
