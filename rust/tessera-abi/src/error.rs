use thiserror::Error;

/// Errors that can occur while producing a canonical encoding.
///
/// Every variant is fatal to the encoding attempt: no partial output is ever
/// returned, so a caller either holds the complete canonical bytes or an
/// explanation of why they could not be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// A type tag could not be parsed.
    #[error("Unsupported or invalid type: {0}")]
    UnknownType(String),

    /// A numeric width is not a multiple of 8 in the range 8..=256, or a
    /// `bytes<N>` width is outside 1..=32.
    #[error("Invalid width for {kind}: {width}")]
    InvalidWidth {
        /// The kind family (`uint`, `int`, `bytes`, ...)
        kind: &'static str,
        /// The declared width
        width: usize,
    },

    /// The value needs more bits than the declared width allows.
    #[error("Supplied {kind} exceeds width: {width} vs {bits}")]
    WidthOverflow {
        /// The declared kind, rendered as a type tag
        kind: String,
        /// The declared width in bits
        width: usize,
        /// The number of bits the value actually needs
        bits: usize,
    },

    /// A negative value was supplied for an unsigned kind.
    #[error("Supplied {0} is negative")]
    SignViolation(String),

    /// A fixed-size array was supplied with the wrong number of elements.
    #[error("Elements do not match array size: expected {expected}, found {found}")]
    SizeMismatch {
        /// Declared element count
        expected: usize,
        /// Supplied element count
        found: usize,
    },

    /// More bytes were supplied than a `bytes<N>` kind can hold.
    #[error("Supplied {found} bytes for bytes{width}")]
    FixedBytesOverflow {
        /// The declared width in bytes
        width: usize,
        /// The number of supplied bytes
        found: usize,
    },

    /// The value variant cannot be encoded as the declared kind.
    #[error("Cannot encode {value} as {kind}")]
    TypeMismatch {
        /// The declared kind, rendered as a type tag
        kind: String,
        /// A short name of the supplied value variant
        value: &'static str,
    },

    /// The number of kinds and values differ.
    #[error("Expected {kinds} values, found {values}")]
    ArityMismatch {
        /// Number of declared kinds
        kinds: usize,
        /// Number of supplied values
        values: usize,
    },

    /// A typed structure could not be serialized to its JSON form.
    #[error("Failed to serialize typed data: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EncodingError {
    fn from(value: serde_json::Error) -> Self {
        EncodingError::Serialization(value.to_string())
    }
}
