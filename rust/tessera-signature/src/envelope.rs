use serde::{Deserialize, Serialize};

use crate::Scheme;

/// The signature material attached to a write request.
///
/// `scheme` is kept as raw text so that an unknown identifier surfaces as an
/// unsupported-algorithm rejection instead of a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureEnvelope {
    /// Declared scheme identifier
    #[serde(rename = "type", default = "default_scheme")]
    pub scheme: String,
    /// Raw signature bytes, hex encoded on the wire
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
    /// Public key material for schemes that cannot recover it
    #[serde(
        default,
        alias = "pubKey",
        with = "hex_bytes::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub public_key: Option<Vec<u8>>,
    /// The identity the caller claims to sign as
    pub caller: String,
    /// The nonce the caller claims for this request
    pub nonce: u64,
}

impl SignatureEnvelope {
    /// Create an envelope for the given scheme.
    pub fn new(
        scheme: Scheme,
        signature: Vec<u8>,
        caller: impl Into<String>,
        nonce: u64,
    ) -> Self {
        Self {
            scheme: scheme.as_str().to_string(),
            signature,
            public_key: None,
            caller: caller.into(),
            nonce,
        }
    }

    /// Attach public key material.
    pub fn with_public_key(mut self, public_key: Vec<u8>) -> Self {
        self.public_key = Some(public_key);
        self
    }
}

fn default_scheme() -> String {
    Scheme::default().as_str().to_string()
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(&text);
        hex::decode(digits).map_err(D::Error::custom)
    }

    pub mod optional {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            bytes: &Option<Vec<u8>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match bytes {
                Some(bytes) => super::serialize(bytes, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Vec<u8>>, D::Error> {
            #[derive(Deserialize)]
            struct Wrapped(#[serde(with = "super")] Vec<u8>);

            Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(bytes)| bytes))
        }
    }
}
