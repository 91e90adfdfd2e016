use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessera_signature::Principal;

use crate::AuthError;

/// Last accepted nonce per signer.
///
/// Signers absent from the ledger have an implicit last nonce of `0`, so the
/// first request a signer ever makes claims nonce `1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NonceLedger(BTreeMap<Principal, u64>);

impl NonceLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last nonce accepted from `signer`.
    pub fn last(&self, signer: &Principal) -> u64 {
        self.0.get(signer).copied().unwrap_or(0)
    }

    /// The only nonce `signer` may claim next.
    pub fn expected(&self, signer: &Principal) -> u64 {
        self.last(signer).saturating_add(1)
    }

    /// Check that `claimed` is exactly the next nonce for `signer`.
    pub fn check(&self, signer: &Principal, claimed: u64) -> Result<(), AuthError> {
        let expected = self.expected(signer);
        // A saturated counter accepts nothing further.
        if claimed == expected && claimed > self.last(signer) {
            Ok(())
        } else {
            Err(AuthError::BadNonce {
                expected,
                found: claimed,
            })
        }
    }

    /// Record `nonce` as the last accepted nonce of `signer`.
    pub fn commit(&mut self, signer: Principal, nonce: u64) {
        self.0.insert(signer, nonce);
    }

    /// Every signer with its last accepted nonce.
    pub fn iter(&self) -> impl Iterator<Item = (&Principal, u64)> {
        self.0.iter().map(|(signer, nonce)| (signer, *nonce))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_expects_one_for_new_signers() {
        let ledger = NonceLedger::new();
        let signer = Principal::new("0xabc");
        assert_eq!(ledger.last(&signer), 0);
        assert!(ledger.check(&signer, 1).is_ok());
    }

    #[test]
    fn it_rejects_gaps_and_replays() {
        let signer = Principal::new("0xabc");
        let mut ledger = NonceLedger::new();
        ledger.commit(signer.clone(), 4);

        for claimed in [4, 6, 0] {
            assert!(matches!(
                ledger.check(&signer, claimed),
                Err(AuthError::BadNonce { expected: 5, found }) if found == claimed
            ));
        }
        assert!(ledger.check(&signer, 5).is_ok());
    }

    #[test]
    fn it_refuses_everything_once_saturated() {
        let signer = Principal::new("0xabc");
        let mut ledger = NonceLedger::new();
        ledger.commit(signer.clone(), u64::MAX);
        assert!(ledger.check(&signer, u64::MAX).is_err());
    }

    #[test]
    fn it_keeps_signers_independent() {
        let mut ledger = NonceLedger::new();
        ledger.commit(Principal::new("0xa"), 3);
        assert_eq!(ledger.last(&Principal::new("0xA")), 3);
        assert_eq!(ledger.last(&Principal::new("0xb")), 0);
    }
}
