//! Signature verification for signed write requests.
//!
//! A write request carries a [`SignatureEnvelope`] declaring a [`Scheme`].
//! The [`Registry`] maps each scheme to a [`SchemeVerifier`], which checks the
//! signature against the request's structured [`Payload`] bound to a
//! [`Domain`] and yields the [`Principal`] the signer controls.
//!
//! Built-in verifiers live in [`algorithm`] and are gated by crate features
//! (`secp256k1`, `ed25519`, `rsa256`). Any other scheme, including
//! `poseidon`, is supported only once a deployment registers a verifier for
//! it.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod algorithm;

mod envelope;
pub use envelope::*;

mod error;
pub use error::*;

mod payload;
pub use payload::*;

mod principal;
pub use principal::*;

mod registry;
pub use registry::*;

mod scheme;
pub use scheme::*;

mod verifier;
pub use verifier::*;
