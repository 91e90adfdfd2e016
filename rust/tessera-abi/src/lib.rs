//! Tessera ABI - Canonical Deterministic Encoding
//!
//! This crate turns typed value trees into a fixed binary layout that is
//! suitable for hashing and signing. Every node that re-executes a request
//! history must reconstruct byte-identical payloads, so the encoding is a pure
//! function of its input: no maps with unspecified order, no platform
//! dependent widths, no allocation-dependent output.
//!
//! # Basic Usage
//!
//! ```rust
//! use tessera_abi::{encode_tags, Value};
//!
//! let bytes = encode_tags(&["uint256", "string"], &[5u64.into(), "hi".into()]).unwrap();
//!
//! // One head slot per value, then the string's length and padded bytes.
//! assert_eq!(bytes.len(), 96);
//! assert_eq!(bytes[63], 0x40);
//! ```
//!
//! # Structured Data
//!
//! [`TypedData`] builds on the encoder to hash named structures together with
//! a domain separator. Signature schemes that sign a digest reconstruct it via
//! [`TypedData::signing_hash`]; schemes that sign raw bytes use
//! [`TypedData::to_json_bytes`].
//!
//! See the [`encode`](mod@encode) module documentation for the binary layout.

mod error;
pub use error::*;

mod kind;
pub use kind::*;

mod value;
pub use value::*;

pub mod encode;
pub use encode::{encode, encode_tags};

mod typed;
pub use typed::*;

pub use alloy_primitives::{Address, B256, I256, U256, keccak256};
