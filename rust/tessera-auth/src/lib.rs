//! Tessera Auth - Write-Path Authorization
//!
//! Every mutation of a replicated Tessera database arrives as a signed
//! [`Request`]. Before anything changes, [`authorize`] checks that:
//!
//! - the declared signature scheme is allowed by the deployment,
//! - the signature verifies over the request and the deployment's domain,
//! - the signer, after following its delegation link, is the claimed caller,
//! - the claimed nonce is exactly the signer's next one.
//!
//! [`Machine`] wraps this in clone-then-commit execution of [`Action`]s, so
//! that a rejected request leaves the committed [`State`] exactly as it was.
//!
//! Execution is deterministic: the ledger timestamp and contract identifier
//! are passed in through [`Environment`] and nothing reads the clock.

mod action;
pub use action::*;

mod authorize;
pub use authorize::*;

mod error;
pub use error::*;

mod link;
pub use link::*;

mod machine;
pub use machine::*;

mod nonce;
pub use nonce::*;

mod settings;
pub use settings::*;

mod state;
pub use state::*;

pub use tessera_signature::{Principal, Registry, Scheme, SchemeVerifier, SignatureEnvelope};
