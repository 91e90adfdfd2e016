use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessera_signature::{Principal, Scheme};

use crate::DelegationLink;

/// Per-deployment authorization configuration.
///
/// `name` and `version` form the domain separator together with the
/// contract identifier, so they must not change once signatures exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSettings {
    /// Application name
    pub name: String,
    /// Application version
    pub version: String,
    /// Accepted schemes; `None` means every scheme in [`Scheme::ALL`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithms: Option<Vec<Scheme>>,
    /// Delegation links keyed by delegate
    #[serde(default)]
    pub links: BTreeMap<Principal, DelegationLink>,
}

impl AuthSettings {
    /// Settings with the default allow-list and no links.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// The effective allow-list.
    pub fn algorithms(&self) -> &[Scheme] {
        self.algorithms.as_deref().unwrap_or(&Scheme::ALL)
    }

    /// Whether envelopes declaring `scheme` are accepted.
    pub fn allows(&self, scheme: Scheme) -> bool {
        self.algorithms().contains(&scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[test]
    fn it_allows_every_scheme_by_default() {
        let settings = AuthSettings::new("app", "1");
        for scheme in Scheme::ALL {
            assert!(settings.allows(scheme));
        }
    }

    #[test]
    fn it_restricts_to_the_configured_list() -> TestResult {
        let settings: AuthSettings = serde_json::from_str(
            r#"{"name":"app","version":"1","algorithms":["ed25519"]}"#,
        )?;
        assert!(settings.allows(Scheme::Ed25519));
        assert!(!settings.allows(Scheme::Secp256k1));
        Ok(())
    }
}
