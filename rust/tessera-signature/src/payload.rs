//! The structured payload a request signature covers.
//!
//! A signature binds three things: the function being invoked together with
//! its arguments, the caller's nonce, and the domain of the contract instance
//! being written to. Reusing a signature against another instance, or with
//! another nonce, changes the digest and fails verification.

use serde::Serialize;
use tessera_abi::{Kind, TypedData, TypedStruct, U256};

/// The domain separator: which deployment a signature is valid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    /// Application name from the contract's settings
    pub name: String,
    /// Application version from the contract's settings
    pub version: String,
    /// Identifier of the contract instance
    pub verifying_contract: String,
}

impl Domain {
    /// Create a domain.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        verifying_contract: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            verifying_contract: verifying_contract.into(),
        }
    }

    /// The `EIP712Domain` structure for this domain.
    pub fn typed_struct(&self) -> TypedStruct {
        TypedStruct::new("EIP712Domain")
            .field("name", Kind::String, self.name.as_str())
            .field("version", Kind::String, self.version.as_str())
            .field(
                "verifyingContract",
                Kind::String,
                self.verifying_contract.as_str(),
            )
    }
}

/// The message part of a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    function: String,
    query: String,
    nonce: u64,
}

#[derive(Serialize)]
struct QueryText<'a> {
    func: &'a str,
    query: &'a serde_json::Value,
}

impl Payload {
    /// Build the payload for invoking `function` with `arguments` at `nonce`.
    ///
    /// Arguments are serialized with their keys in the order they were
    /// received, so the signer and every verifier produce the same text.
    pub fn new(
        function: impl Into<String>,
        arguments: &serde_json::Value,
        nonce: u64,
    ) -> Result<Self, serde_json::Error> {
        let function = function.into();
        let query = serde_json::to_string(&QueryText {
            func: &function,
            query: arguments,
        })?;

        Ok(Self {
            function,
            query,
            nonce,
        })
    }

    /// The invoked function.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// The serialized function-and-arguments text that is signed.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The claimed nonce.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The `Query` message structure.
    ///
    /// The type declares `query` before `nonce`, while the rendered message
    /// lists `nonce` first; both orders are part of what clients sign.
    pub fn typed_struct(&self) -> TypedStruct {
        TypedStruct::new("Query")
            .field("query", Kind::String, self.query.as_str())
            .field("nonce", Kind::Uint(256), U256::from(self.nonce))
            .with_value_order(&["nonce", "query"])
    }

    /// The complete structured data for this payload under `domain`.
    pub fn typed_data(&self, domain: &Domain) -> TypedData {
        TypedData::new(domain.typed_struct(), self.typed_struct())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use testresult::TestResult;

    #[test]
    fn it_serializes_the_query_in_received_order() -> TestResult {
        let payload = Payload::new("transfer", &json!({ "to": "0xab", "amount": 5 }), 1)?;
        assert_eq!(
            payload.query(),
            r#"{"func":"transfer","query":{"to":"0xab","amount":5}}"#
        );
        Ok(())
    }

    #[test]
    fn it_binds_the_nonce() -> TestResult {
        let domain = Domain::new("app", "1", "contract-a");
        let first = Payload::new("noop", &json!({}), 1)?.typed_data(&domain);
        let second = Payload::new("noop", &json!({}), 2)?.typed_data(&domain);
        assert_ne!(first.signing_hash()?, second.signing_hash()?);
        Ok(())
    }

    #[test]
    fn it_binds_the_contract_instance() -> TestResult {
        let payload = Payload::new("noop", &json!({}), 1)?;
        let a = payload.typed_data(&Domain::new("app", "1", "contract-a"));
        let b = payload.typed_data(&Domain::new("app", "1", "contract-b"));
        assert_ne!(a.signing_hash()?, b.signing_hash()?);
        Ok(())
    }

    #[test]
    fn it_renders_the_payload_as_json() -> TestResult {
        let payload = Payload::new("noop", &json!({}), 7)?;
        let data = payload.typed_data(&Domain::new("app", "1", "c"));
        let json: serde_json::Value = serde_json::from_slice(&data.to_json_bytes()?)?;

        assert_eq!(json["primaryType"], "Query");
        assert_eq!(json["domain"]["verifyingContract"], "c");
        assert_eq!(json["message"]["nonce"], 7);
        assert_eq!(json["types"]["Query"][0]["name"], "query");
        Ok(())
    }

    #[test]
    fn it_renders_the_exact_bytes_clients_sign() -> TestResult {
        let payload = Payload::new("add", &json!([{ "n": 1 }, "ppl"]), 3)?;
        let data = payload.typed_data(&Domain::new("app", "1", "c"));

        assert_eq!(
            String::from_utf8(data.to_json_bytes()?)?,
            concat!(
                r#"{"types":{"EIP712Domain":[{"name":"name","type":"string"},"#,
                r#"{"name":"version","type":"string"},"#,
                r#"{"name":"verifyingContract","type":"string"}],"#,
                r#""Query":[{"name":"query","type":"string"},{"name":"nonce","type":"uint256"}]},"#,
                r#""domain":{"name":"app","version":"1","verifyingContract":"c"},"#,
                r#""primaryType":"Query","#,
                r#""message":{"nonce":3,"query":"{\"func\":\"add\",\"query\":[{\"n\":1},\"ppl\"]}"}}"#
            )
        );
        Ok(())
    }
}
