//! Canonical head/tail encoding.
//!
//! # Binary Layout
//!
//! A sequence of values is laid out as a fixed-size head followed by a tail:
//!
//! ```text
//! ┌──────────────┬──────────────┬───────┬──────────────┬──────────────┬───────┐
//! │   Slot 0     │   Slot 1     │  ...  │   Tail 0     │   Tail 1     │  ...  │
//! │ (value or    │ (value or    │       │ (dynamic     │ (dynamic     │       │
//! │  offset)     │  offset)     │       │  value)      │  value)      │       │
//! └──────────────┴──────────────┴───────┴──────────────┴──────────────┴───────┘
//! ```
//!
//! Static values are written into their head slot directly. Dynamic values
//! write a 32-byte offset, measured from the start of the sequence, to their
//! encoding in the tail. Arrays encode their elements as a nested sequence,
//! so nested offsets are relative to the array's own payload.
//!
//! Every word is 32 bytes, so the total length is always a multiple of 32.

use alloy_primitives::U256;

use crate::{EncodingError, Kind, Value, WORD};

/// Encodes `values` against `kinds` into the canonical byte layout.
///
/// Identical inputs always produce identical output, which is what lets a
/// verifier rebuild the exact bytes a client signed.
///
/// ```rust
/// use tessera_abi::{encode, Kind, Value};
///
/// let bytes = encode(&[Kind::Uint(256), Kind::String], &[5u64.into(), "hi".into()]).unwrap();
/// assert_eq!(bytes.len(), 96);
/// ```
pub fn encode(kinds: &[Kind], values: &[Value]) -> Result<Vec<u8>, EncodingError> {
    if kinds.len() != values.len() {
        return Err(EncodingError::ArityMismatch {
            kinds: kinds.len(),
            values: values.len(),
        });
    }
    for kind in kinds {
        kind.validate()?;
    }
    let items = kinds.iter().zip(values.iter()).collect::<Vec<_>>();
    encode_sequence(&items)
}

/// Like [`encode`], but parses textual type tags first.
pub fn encode_tags(tags: &[&str], values: &[Value]) -> Result<Vec<u8>, EncodingError> {
    let kinds = tags
        .iter()
        .map(|tag| tag.parse::<Kind>())
        .collect::<Result<Vec<_>, _>>()?;
    encode(&kinds, values)
}

fn encode_sequence(items: &[(&Kind, &Value)]) -> Result<Vec<u8>, EncodingError> {
    // Values are encoded before the head is sized, so declared array sizes
    // are checked against the supplied elements first.
    let mut encoded = Vec::with_capacity(items.len());
    for (kind, value) in items {
        encoded.push((kind.is_dynamic(), encode_value(kind, value)?));
    }

    let head_length = encoded
        .iter()
        .map(|(dynamic, bytes)| if *dynamic { WORD } else { bytes.len() })
        .sum::<usize>();
    let mut head = Vec::with_capacity(head_length);
    let mut tail = Vec::new();

    for (dynamic, bytes) in encoded {
        if dynamic {
            head.extend_from_slice(&word_from_usize(head_length + tail.len()));
            tail.extend(bytes);
        } else {
            head.extend(bytes);
        }
    }

    head.extend(tail);
    Ok(head)
}

/// Encodes a single value without head/tail framing.
///
/// Atomic kinds yield exactly one word; the structured-data hasher relies on
/// this to build its per-field words.
pub(crate) fn encode_value(kind: &Kind, value: &Value) -> Result<Vec<u8>, EncodingError> {
    match (kind, value) {
        (Kind::Uint(width), _) => Ok(unsigned_word(kind, *width, value)?.to_vec()),
        (Kind::Int(width), _) => Ok(signed_word(kind, *width, value, 0)?.to_vec()),
        (Kind::Bool, Value::Bool(flag)) => Ok(word_from_usize(usize::from(*flag)).to_vec()),
        (Kind::Address, Value::Address(address)) => {
            let mut word = [0u8; WORD];
            word[WORD - 20..].copy_from_slice(address.as_slice());
            Ok(word.to_vec())
        }
        (Kind::Address, Value::Uint(_) | Value::Int(_)) => {
            Ok(unsigned_word(kind, 160, value)?.to_vec())
        }
        (
            Kind::Fixed {
                width,
                fraction,
                signed,
            },
            _,
        ) => {
            if *signed {
                Ok(signed_word(kind, *width, value, *fraction)?.to_vec())
            } else {
                let (negative, magnitude) = numeric(kind, value)?;
                if negative && !magnitude.is_zero() {
                    return Err(EncodingError::SignViolation(kind.to_string()));
                }
                let scaled = scale(kind, *width, magnitude, *fraction)?;
                Ok(bounded_unsigned(kind, *width, scaled)?.to_vec())
            }
        }
        (Kind::FixedBytes(width), Value::Bytes(bytes)) => {
            if bytes.len() > *width {
                return Err(EncodingError::FixedBytesOverflow {
                    width: *width,
                    found: bytes.len(),
                });
            }
            let mut word = [0u8; WORD];
            word[..bytes.len()].copy_from_slice(bytes);
            Ok(word.to_vec())
        }
        (Kind::Bytes, Value::Bytes(bytes)) => Ok(length_prefixed(bytes)),
        (Kind::String, Value::String(text)) => Ok(length_prefixed(text.as_bytes())),
        (Kind::Array(element, size), Value::Array(items)) => {
            if let Some(size) = size {
                if items.len() != *size {
                    return Err(EncodingError::SizeMismatch {
                        expected: *size,
                        found: items.len(),
                    });
                }
            }
            let pairs = items
                .iter()
                .map(|item| (element.as_ref(), item))
                .collect::<Vec<_>>();
            let body = encode_sequence(&pairs)?;
            match size {
                Some(_) => Ok(body),
                None => {
                    let mut encoded = word_from_usize(items.len()).to_vec();
                    encoded.extend(body);
                    Ok(encoded)
                }
            }
        }
        _ => Err(EncodingError::TypeMismatch {
            kind: kind.to_string(),
            value: value.variant(),
        }),
    }
}

fn numeric(kind: &Kind, value: &Value) -> Result<(bool, U256), EncodingError> {
    value
        .sign_magnitude()
        .ok_or_else(|| EncodingError::TypeMismatch {
            kind: kind.to_string(),
            value: value.variant(),
        })
}

fn unsigned_word(kind: &Kind, width: usize, value: &Value) -> Result<[u8; WORD], EncodingError> {
    let (negative, magnitude) = numeric(kind, value)?;
    let word = bounded_unsigned(kind, width, magnitude)?;
    if negative && !magnitude.is_zero() {
        return Err(EncodingError::SignViolation(kind.to_string()));
    }
    Ok(word)
}

fn bounded_unsigned(kind: &Kind, width: usize, magnitude: U256) -> Result<[u8; WORD], EncodingError> {
    let bits = magnitude.bit_len();
    if bits > width {
        return Err(EncodingError::WidthOverflow {
            kind: kind.to_string(),
            width,
            bits,
        });
    }
    Ok(magnitude.to_be_bytes::<WORD>())
}

fn signed_word(
    kind: &Kind,
    width: usize,
    value: &Value,
    fraction: usize,
) -> Result<[u8; WORD], EncodingError> {
    let (negative, magnitude) = numeric(kind, value)?;
    let magnitude = scale(kind, width, magnitude, fraction)?;

    // Two's complement range of an N-bit integer is [-2^(N-1), 2^(N-1)).
    let limit = U256::from(1u8) << (width - 1);
    let fits = if negative {
        magnitude <= limit
    } else {
        magnitude < limit
    };
    if !fits {
        return Err(EncodingError::WidthOverflow {
            kind: kind.to_string(),
            width,
            bits: magnitude.bit_len() + 1,
        });
    }

    let raw = if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    };
    Ok(raw.to_be_bytes::<WORD>())
}

fn scale(kind: &Kind, width: usize, magnitude: U256, fraction: usize) -> Result<U256, EncodingError> {
    if fraction == 0 || magnitude.is_zero() {
        return Ok(magnitude);
    }
    let bits = magnitude.bit_len() + fraction;
    if bits > 256 {
        return Err(EncodingError::WidthOverflow {
            kind: kind.to_string(),
            width,
            bits,
        });
    }
    Ok(magnitude << fraction)
}

fn length_prefixed(bytes: &[u8]) -> Vec<u8> {
    let padding = (WORD - bytes.len() % WORD) % WORD;
    let mut encoded = Vec::with_capacity(WORD + bytes.len() + padding);
    encoded.extend_from_slice(&word_from_usize(bytes.len()));
    encoded.extend_from_slice(bytes);
    encoded.resize(encoded.len() + padding, 0);
    encoded
}

pub(crate) fn word_from_usize(value: usize) -> [u8; WORD] {
    U256::from(value).to_be_bytes::<WORD>()
}
