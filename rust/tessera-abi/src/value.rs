use alloy_primitives::{Address, I256, U256};
use serde::{Serialize, Serializer, ser::SerializeSeq};

/// A value to be encoded against some [`Kind`](crate::Kind).
///
/// Values are deliberately looser than kinds: numeric kinds accept either
/// integer variant and check bounds at encoding time, which is where width
/// and sign violations are reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A non-negative integer
    Uint(U256),
    /// A signed integer
    Int(I256),
    /// A boolean
    Bool(bool),
    /// A 20-byte address
    Address(Address),
    /// Raw bytes for `bytes<N>` or `bytes`
    Bytes(Vec<u8>),
    /// UTF-8 text
    String(String),
    /// Elements of a fixed-size or variable-size array
    Array(Vec<Value>),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn variant(&self) -> &'static str {
        match self {
            Value::Uint(_) => "uint",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Address(_) => "address",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
        }
    }

    /// Split a numeric value into its sign and magnitude.
    pub(crate) fn sign_magnitude(&self) -> Option<(bool, U256)> {
        match self {
            Value::Uint(value) => Some((false, *value)),
            Value::Int(value) => Some((value.is_negative(), value.unsigned_abs())),
            _ => None,
        }
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(U256::from(value))
    }
}

impl From<U256> for Value {
    fn from(value: U256) -> Self {
        Value::Uint(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        let magnitude = U256::from(value.unsigned_abs());
        let raw = if value < 0 {
            magnitude.wrapping_neg()
        } else {
            magnitude
        };
        Value::Int(I256::from_raw(raw))
    }
}

impl From<I256> for Value {
    fn from(value: I256) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Address> for Value {
    fn from(value: Address) -> Self {
        Value::Address(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

/// JSON rendering used by the serialized form of typed data.
///
/// Integers that fit in 64 bits become JSON numbers, larger ones decimal
/// strings; addresses and bytes become `0x`-prefixed lowercase hex.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Uint(value) => match u64::try_from(*value) {
                Ok(small) => serializer.serialize_u64(small),
                Err(_) => serializer.serialize_str(&value.to_string()),
            },
            Value::Int(value) => match i64::try_from(*value) {
                Ok(small) => serializer.serialize_i64(small),
                Err(_) => serializer.serialize_str(&value.to_string()),
            },
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Address(address) => {
                serializer.serialize_str(&format!("0x{}", hex::encode(address.as_slice())))
            }
            Value::Bytes(bytes) => serializer.serialize_str(&format!("0x{}", hex::encode(bytes))),
            Value::String(text) => serializer.serialize_str(text),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
