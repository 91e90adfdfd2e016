//! Principal identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The identity a request is authorized as.
///
/// Identifiers are opaque text: an Ethereum style `0x` address, a `did:key`,
/// or an RSA owner address. Hex identifiers are case-insensitive, so they are
/// lowercased exactly once when a `Principal` is constructed; every
/// comparison, map lookup and nonce key downstream sees the normalized form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Create a principal from its textual form, normalizing hex identifiers.
    pub fn new(identifier: impl AsRef<str>) -> Self {
        let identifier = identifier.as_ref().trim();
        if identifier.starts_with("0x") || identifier.starts_with("0X") {
            Principal(identifier.to_ascii_lowercase())
        } else {
            Principal(identifier.to_string())
        }
    }

    /// The normalized identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Principal {
    fn from(value: String) -> Self {
        Principal::new(value)
    }
}

impl From<&str> for Principal {
    fn from(value: &str) -> Self {
        Principal::new(value)
    }
}

impl From<Principal> for String {
    fn from(value: Principal) -> Self {
        value.0
    }
}

impl AsRef<str> for Principal {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_lowercases_hex_identifiers() {
        assert_eq!(
            Principal::new("0xAbCDef0123"),
            Principal::new("0xabcdef0123")
        );
        assert_eq!(Principal::new("0XABC").as_str(), "0xabc");
    }

    #[test]
    fn it_preserves_case_sensitive_identifiers() {
        let did = "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK";
        assert_eq!(Principal::new(did).as_str(), did);
    }

    #[test]
    fn it_normalizes_when_deserialized() -> Result<(), serde_json::Error> {
        let principal: Principal = serde_json::from_str("\"0xABCDEF\"")?;
        assert_eq!(principal.as_str(), "0xabcdef");
        Ok(())
    }
}
