//! Structured-data hashing with a domain separator.
//!
//! A [`TypedStruct`] is a named, ordered list of typed fields. Its hash binds
//! both the field values and the type's own signature, and a [`TypedData`]
//! pairs a message struct with a domain struct so that a signature over
//! [`TypedData::signing_hash`] is only valid for one deployment.

use alloy_primitives::{B256, keccak256};
use serde::{
    Serialize, Serializer,
    ser::{SerializeMap, SerializeStruct},
};

use crate::{EncodingError, Kind, Value, encode::encode_value};

/// Prefix of a structured-data signing hash.
const STRUCTURED_PREFIX: [u8; 2] = [0x19, 0x01];

/// Prefix of a personal-message signing hash over a 32-byte digest.
const PERSONAL_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// A single named field of a [`TypedStruct`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field kind
    pub kind: Kind,
    /// Field value
    pub value: Value,
}

/// A named structure of typed fields, hashed as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedStruct {
    name: String,
    fields: Vec<Field>,
    value_order: Vec<String>,
}

impl TypedStruct {
    /// Create an empty struct type called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            value_order: Vec::new(),
        }
    }

    /// Serialize the values of the named fields first, in the given order,
    /// when rendering JSON. Hashing always follows declaration order.
    pub fn with_value_order(mut self, names: &[&str]) -> Self {
        self.value_order = names.iter().map(|name| name.to_string()).collect();
        self
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, kind: Kind, value: impl Into<Value>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            kind,
            value: value.into(),
        });
        self
    }

    /// The struct's type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The struct's fields, in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// The type signature, e.g. `Query(string query,uint256 nonce)`.
    pub fn encode_type(&self) -> String {
        let members = self
            .fields
            .iter()
            .map(|field| format!("{} {}", field.kind, field.name))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({members})", self.name)
    }

    /// Hash of the type signature.
    pub fn type_hash(&self) -> B256 {
        keccak256(self.encode_type().as_bytes())
    }

    /// One 32-byte word per field.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodingError`] if a field value does not fit its kind.
    pub fn encode_data(&self) -> Result<Vec<u8>, EncodingError> {
        let mut data = Vec::with_capacity(self.fields.len() * crate::WORD);
        for field in &self.fields {
            field.kind.validate()?;
            data.extend(field_word(&field.kind, &field.value)?);
        }
        Ok(data)
    }

    /// Hash of the type hash followed by the encoded data.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodingError`] if a field value does not fit its kind.
    pub fn hash_struct(&self) -> Result<B256, EncodingError> {
        let mut buffer = self.type_hash().to_vec();
        buffer.extend(self.encode_data()?);
        Ok(keccak256(&buffer))
    }
}

fn field_word(kind: &Kind, value: &Value) -> Result<Vec<u8>, EncodingError> {
    match (kind, value) {
        (Kind::String, Value::String(text)) => Ok(keccak256(text.as_bytes()).to_vec()),
        (Kind::Bytes, Value::Bytes(bytes)) => Ok(keccak256(bytes).to_vec()),
        (Kind::Array(element, size), Value::Array(items)) => {
            if let Some(size) = size {
                if items.len() != *size {
                    return Err(EncodingError::SizeMismatch {
                        expected: *size,
                        found: items.len(),
                    });
                }
            }
            let mut words = Vec::with_capacity(items.len() * crate::WORD);
            for item in items {
                words.extend(field_word(element, item)?);
            }
            Ok(keccak256(&words).to_vec())
        }
        _ => encode_value(kind, value),
    }
}

/// A message struct bound to a domain struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedData {
    /// The domain separator struct (conventionally `EIP712Domain`)
    pub domain: TypedStruct,
    /// The signed message
    pub message: TypedStruct,
}

impl TypedData {
    /// Pair `message` with `domain`.
    pub fn new(domain: TypedStruct, message: TypedStruct) -> Self {
        Self { domain, message }
    }

    /// `keccak256(0x19 0x01 ‖ hash(domain) ‖ hash(message))`.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodingError`] if either struct fails to encode.
    pub fn signing_hash(&self) -> Result<B256, EncodingError> {
        let mut buffer = STRUCTURED_PREFIX.to_vec();
        buffer.extend_from_slice(self.domain.hash_struct()?.as_slice());
        buffer.extend_from_slice(self.message.hash_struct()?.as_slice());
        Ok(keccak256(&buffer))
    }

    /// The personal-message hash of [`TypedData::signing_hash`], as produced
    /// by wallets that sign a raw 32-byte digest.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodingError`] if either struct fails to encode.
    pub fn personal_hash(&self) -> Result<B256, EncodingError> {
        let mut buffer = PERSONAL_PREFIX.to_vec();
        buffer.extend_from_slice(self.signing_hash()?.as_slice());
        Ok(keccak256(&buffer))
    }

    /// The JSON serialization of this payload, for schemes that sign bytes
    /// rather than a digest.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::Serialization`] if serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        Ok(serde_json::to_vec(self)?)
    }
}

struct Types<'a>(&'a TypedData);

struct Members<'a>(&'a TypedStruct);

struct Member<'a>(&'a Field);

struct Values<'a>(&'a TypedStruct);

impl Serialize for Member<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut member = serializer.serialize_struct("Member", 2)?;
        member.serialize_field("name", &self.0.name)?;
        member.serialize_field("type", &self.0.kind.to_string())?;
        member.end()
    }
}

impl Serialize for Members<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.fields.iter().map(Member))
    }
}

impl Serialize for Types<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut types = serializer.serialize_map(Some(2))?;
        types.serialize_entry(self.0.domain.name(), &Members(&self.0.domain))?;
        types.serialize_entry(self.0.message.name(), &Members(&self.0.message))?;
        types.end()
    }
}

impl Serialize for Values<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let TypedStruct {
            fields,
            value_order,
            ..
        } = self.0;
        let leading = value_order
            .iter()
            .filter_map(|name| fields.iter().find(|field| &field.name == name));
        let rest = fields
            .iter()
            .filter(|field| !value_order.contains(&field.name));

        let mut values = serializer.serialize_map(Some(fields.len()))?;
        for field in leading.chain(rest) {
            values.serialize_entry(&field.name, &field.value)?;
        }
        values.end()
    }
}

impl Serialize for TypedData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut data = serializer.serialize_struct("TypedData", 4)?;
        data.serialize_field("types", &Types(self))?;
        data.serialize_field("domain", &Values(&self.domain))?;
        data.serialize_field("primaryType", self.message.name())?;
        data.serialize_field("message", &Values(&self.message))?;
        data.end()
    }
}
