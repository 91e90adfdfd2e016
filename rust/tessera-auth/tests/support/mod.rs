//! Signing helpers shared by the integration tests.

#![allow(dead_code)]

use ed25519_dalek::Signer as _;
use serde_json::Value;
use tessera_auth::{Environment, Principal, Request, Scheme, SignatureEnvelope, State};
use tessera_signature::{
    Domain, Payload,
    algorithm::{Ed25519DidKey, ethereum_address},
};

pub const CONTRACT: &str = "tessera-test-contract";

pub fn env(timestamp: u64) -> Environment {
    Environment::new(CONTRACT, timestamp)
}

/// A deterministic secp256k1 wallet.
pub struct Wallet(k256::ecdsa::SigningKey);

impl Wallet {
    pub fn new(seed: u8) -> anyhow::Result<Self> {
        Ok(Wallet(k256::ecdsa::SigningKey::from_slice(&[seed; 32])?))
    }

    pub fn address(&self) -> Principal {
        ethereum_address(self.0.verifying_key())
    }

    /// Sign `function(query)` at `nonce` for `env`, claiming to act as `caller`.
    pub fn sign(
        &self,
        state: &State,
        env: &Environment,
        function: &str,
        query: Value,
        nonce: u64,
        caller: &str,
    ) -> anyhow::Result<Request> {
        let digest = typed_data(state, env, function, &query, nonce)?.signing_hash()?;
        let (signature, recovery) = self.0.sign_prehash_recoverable(digest.as_slice())?;
        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(27 + recovery.to_byte());

        Ok(Request {
            function: function.into(),
            query,
            envelope: SignatureEnvelope::new(Scheme::Secp256k1, bytes, caller, nonce),
        })
    }

    /// Sign as the wallet's own address.
    pub fn sign_as_self(
        &self,
        state: &State,
        env: &Environment,
        function: &str,
        query: Value,
        nonce: u64,
    ) -> anyhow::Result<Request> {
        let caller = self.address();
        self.sign(state, env, function, query, nonce, caller.as_str())
    }
}

/// A deterministic Ed25519 key addressed by its `did:key`.
pub struct DidKey(ed25519_dalek::SigningKey);

impl DidKey {
    pub fn new(seed: u8) -> Self {
        DidKey(ed25519_dalek::SigningKey::from_bytes(&[seed; 32]))
    }

    pub fn did(&self) -> String {
        Ed25519DidKey(self.0.verifying_key()).to_string()
    }

    pub fn sign(
        &self,
        state: &State,
        env: &Environment,
        function: &str,
        query: Value,
        nonce: u64,
    ) -> anyhow::Result<Request> {
        let digest = typed_data(state, env, function, &query, nonce)?.signing_hash()?;
        let signature = self.0.sign(digest.as_slice());

        Ok(Request {
            function: function.into(),
            query,
            envelope: SignatureEnvelope::new(
                Scheme::Ed25519,
                signature.to_bytes().to_vec(),
                self.did(),
                nonce,
            ),
        })
    }
}

fn typed_data(
    state: &State,
    env: &Environment,
    function: &str,
    query: &Value,
    nonce: u64,
) -> anyhow::Result<tessera_abi::TypedData> {
    let domain = Domain::new(&state.auth.name, &state.auth.version, &env.contract);
    Ok(Payload::new(function, query, nonce)?.typed_data(&domain))
}
