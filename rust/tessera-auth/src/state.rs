use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tessera_signature::Principal;

use crate::{AuthSettings, DelegationLink, LinkStore, NonceLedger};

/// The replicated state the authorization core reads and writes.
///
/// Every node applies the same requests to the same state in the same order,
/// so everything here is ordered and serializes deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Deployment configuration and delegation links
    pub auth: AuthSettings,
    /// Last accepted nonce per signer
    #[serde(default)]
    pub nonces: NonceLedger,
    /// Principals allowed to administer the deployment
    #[serde(default, rename = "owner", deserialize_with = "one_or_many")]
    pub owners: Vec<Principal>,
    /// Named contract addresses
    #[serde(default)]
    pub contracts: BTreeMap<String, String>,
    /// Documents, owned by the embedder's write handler
    #[serde(default)]
    pub documents: serde_json::Map<String, serde_json::Value>,
}

impl State {
    /// A fresh state administered by `owner`.
    pub fn new(auth: AuthSettings, owner: impl Into<Principal>) -> Self {
        Self {
            auth,
            owners: vec![owner.into()],
            ..Self::default()
        }
    }

    /// Load a state from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The JSON form of this state.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Whether `principal` administers the deployment.
    pub fn is_owner(&self, principal: &Principal) -> bool {
        self.owners.contains(principal)
    }
}

impl LinkStore for State {
    fn link(&self, delegate: &Principal) -> Option<&DelegationLink> {
        self.auth.links.get(delegate)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Principal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Owners {
        One(Principal),
        Many(Vec<Principal>),
    }

    Ok(match Owners::deserialize(deserializer)? {
        Owners::One(owner) => vec![owner],
        Owners::Many(owners) => owners,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    #[test]
    fn it_loads_a_minimal_state() -> TestResult {
        let state = State::from_json(
            r#"{
                "auth": {
                    "name": "app",
                    "version": "1",
                    "links": { "0xDELEGATE": { "address": "0xOwner", "expiry": 10 } }
                },
                "owner": "0xOWNER"
            }"#,
        )?;

        assert_eq!(state.owners, vec![Principal::new("0xowner")]);
        assert!(state.is_owner(&Principal::new("0xOwner")));
        assert_eq!(
            state.link(&Principal::new("0xdelegate")),
            Some(&DelegationLink::until("0xowner", 10))
        );
        assert_eq!(state.nonces, NonceLedger::new());
        Ok(())
    }

    #[test]
    fn it_accepts_several_owners() -> TestResult {
        let state = State::from_json(
            r#"{"auth":{"name":"app","version":"1"},"owner":["0xa","0xB"]}"#,
        )?;
        assert_eq!(
            state.owners,
            vec![Principal::new("0xa"), Principal::new("0xb")]
        );
        Ok(())
    }

    #[test]
    fn it_survives_a_json_round_trip() -> TestResult {
        let mut state = State::new(AuthSettings::new("app", "1"), "0xowner");
        state.nonces.commit(Principal::new("0xowner"), 3);
        state
            .auth
            .links
            .insert(Principal::new("0xkey"), DelegationLink::permanent("0xowner"));

        assert_eq!(State::from_json(&state.to_json()?)?, state);
        Ok(())
    }
}
