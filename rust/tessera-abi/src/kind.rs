//! Type tags understood by the canonical encoder.

use std::{fmt, str::FromStr};

use crate::EncodingError;

/// Size of a single encoded slot, in bytes.
pub const WORD: usize = 32;

/// The declared type of a value to be encoded.
///
/// Kinds are usually parsed from their textual tag (`"uint256"`,
/// `"string[]"`, `"fixed128x18"`, ...) and render back to the same canonical
/// text, which is what structured-data type strings are built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `uint<N>`
    Uint(usize),
    /// `int<N>`
    Int(usize),
    /// `bool`
    Bool,
    /// `fixed<N>x<M>` / `ufixed<N>x<M>`; `M` is the number of fractional
    /// bits the value is scaled by
    Fixed {
        /// Total width in bits
        width: usize,
        /// Fractional bits
        fraction: usize,
        /// Whether negative values are permitted
        signed: bool,
    },
    /// `address`, a 160-bit identifier
    Address,
    /// `bytes<N>` with `N` in 1..=32
    FixedBytes(usize),
    /// `bytes`
    Bytes,
    /// `string`
    String,
    /// `T[k]` (`Some(k)`) or `T[]` (`None`)
    Array(Box<Kind>, Option<usize>),
}

impl Kind {
    /// Whether values of this kind are placed in the tail region and
    /// referenced from the head by offset.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Kind::Bytes | Kind::String | Kind::Array(_, None) => true,
            Kind::Array(element, Some(_)) => element.is_dynamic(),
            _ => false,
        }
    }

    /// Number of bytes this kind occupies in the head of an enclosing
    /// sequence, or `None` if a declared array size makes it overflow.
    pub fn head_size(&self) -> Option<usize> {
        match self {
            Kind::Array(element, Some(size)) if !element.is_dynamic() => {
                element.head_size()?.checked_mul(*size)
            }
            _ => Some(WORD),
        }
    }

    /// Check the widths of a kind that was built directly rather than parsed
    /// from a tag.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::InvalidWidth`] for a numeric width that is
    /// not a multiple of 8 in 8..=256, or a `bytes<N>` width outside 1..=32.
    pub fn validate(&self) -> Result<(), EncodingError> {
        match self {
            Kind::Uint(width) => check_width("uint", *width),
            Kind::Int(width) => check_width("int", *width),
            Kind::Fixed { width, signed, .. } => {
                check_width(if *signed { "fixed" } else { "ufixed" }, *width)
            }
            Kind::FixedBytes(width) if !(1..=WORD).contains(width) => {
                Err(EncodingError::InvalidWidth {
                    kind: "bytes",
                    width: *width,
                })
            }
            Kind::Array(element, _) => element.validate(),
            _ => Ok(()),
        }
    }

    /// Whether this kind encodes to a single word with no indirection.
    pub fn is_atomic(&self) -> bool {
        !matches!(self, Kind::Bytes | Kind::String | Kind::Array(..))
    }
}

fn check_width(kind: &'static str, width: usize) -> Result<(), EncodingError> {
    if width % 8 != 0 || !(8..=256).contains(&width) {
        return Err(EncodingError::InvalidWidth { kind, width });
    }
    Ok(())
}

fn numeric_width(kind: &'static str, digits: &str) -> Result<usize, EncodingError> {
    let width = digits
        .parse::<usize>()
        .map_err(|_| EncodingError::UnknownType(format!("{kind}{digits}")))?;
    check_width(kind, width)?;
    Ok(width)
}

fn fixed(tag: &str, digits: &str, signed: bool) -> Result<Kind, EncodingError> {
    let (width, fraction) = digits
        .split_once('x')
        .ok_or_else(|| EncodingError::UnknownType(tag.to_string()))?;
    let family = if signed { "fixed" } else { "ufixed" };
    let width = numeric_width(family, width)?;
    let fraction = fraction
        .parse::<usize>()
        .map_err(|_| EncodingError::UnknownType(tag.to_string()))?;
    Ok(Kind::Fixed {
        width,
        fraction,
        signed,
    })
}

fn elementary(tag: &str) -> Result<Kind, EncodingError> {
    match tag {
        "bool" => return Ok(Kind::Bool),
        "address" => return Ok(Kind::Address),
        "string" => return Ok(Kind::String),
        "bytes" => return Ok(Kind::Bytes),
        "uint" => return Ok(Kind::Uint(256)),
        "int" => return Ok(Kind::Int(256)),
        "fixed" => return Ok(Kind::Fixed {
            width: 128,
            fraction: 128,
            signed: true,
        }),
        "ufixed" => return Ok(Kind::Fixed {
            width: 128,
            fraction: 128,
            signed: false,
        }),
        _ => {}
    }

    // Order matters: `uint` before `int`, `ufixed` before `fixed`.
    if let Some(digits) = tag.strip_prefix("uint") {
        Ok(Kind::Uint(numeric_width("uint", digits)?))
    } else if let Some(digits) = tag.strip_prefix("int") {
        Ok(Kind::Int(numeric_width("int", digits)?))
    } else if let Some(digits) = tag.strip_prefix("ufixed") {
        fixed(tag, digits, false)
    } else if let Some(digits) = tag.strip_prefix("fixed") {
        fixed(tag, digits, true)
    } else if let Some(digits) = tag.strip_prefix("bytes") {
        let width = digits
            .parse::<usize>()
            .map_err(|_| EncodingError::UnknownType(tag.to_string()))?;
        if !(1..=WORD).contains(&width) {
            return Err(EncodingError::InvalidWidth {
                kind: "bytes",
                width,
            });
        }
        Ok(Kind::FixedBytes(width))
    } else {
        Err(EncodingError::UnknownType(tag.to_string()))
    }
}

impl FromStr for Kind {
    type Err = EncodingError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let tag = tag.trim();
        let Some(inner) = tag.strip_suffix(']') else {
            return elementary(tag);
        };
        let open = inner
            .rfind('[')
            .ok_or_else(|| EncodingError::UnknownType(tag.to_string()))?;
        let element = inner[..open].parse::<Kind>()?;
        let size = match &inner[open + 1..] {
            "" => None,
            digits => Some(
                digits
                    .parse::<usize>()
                    .map_err(|_| EncodingError::UnknownType(tag.to_string()))?,
            ),
        };
        Ok(Kind::Array(Box::new(element), size))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Uint(width) => write!(f, "uint{width}"),
            Kind::Int(width) => write!(f, "int{width}"),
            Kind::Bool => f.write_str("bool"),
            Kind::Fixed {
                width,
                fraction,
                signed,
            } => {
                let prefix = if *signed { "" } else { "u" };
                write!(f, "{prefix}fixed{width}x{fraction}")
            }
            Kind::Address => f.write_str("address"),
            Kind::FixedBytes(width) => write!(f, "bytes{width}"),
            Kind::Bytes => f.write_str("bytes"),
            Kind::String => f.write_str("string"),
            Kind::Array(element, Some(size)) => write!(f, "{element}[{size}]"),
            Kind::Array(element, None) => write!(f, "{element}[]"),
        }
    }
}
