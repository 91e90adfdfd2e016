//! Built-in signature scheme verifiers.

#[cfg(feature = "secp256k1")]
mod secp256k1;
#[cfg(feature = "secp256k1")]
pub use secp256k1::*;

#[cfg(feature = "ed25519")]
mod ed25519;
#[cfg(feature = "ed25519")]
pub use ed25519::*;

#[cfg(feature = "rsa256")]
mod rsa;
#[cfg(feature = "rsa256")]
pub use rsa::*;
