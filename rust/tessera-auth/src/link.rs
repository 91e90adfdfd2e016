//! Key delegation.
//!
//! A delegate key may be linked to a backing principal, optionally until an
//! expiry timestamp. Requests signed by the delegate then act as the backing
//! principal. Resolution is a single hop: the backing principal's own links
//! are never followed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessera_signature::Principal;

/// A delegate's link to the principal it acts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LinkRecord", into = "LinkRecord")]
pub struct DelegationLink {
    /// The principal the delegate acts as
    pub address: Principal,
    /// Ledger timestamp the link stays valid until; `0` never expires
    pub expiry: u64,
}

/// Stored form of a link: a bare address, or an address with an expiry.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LinkRecord {
    Bare(Principal),
    Expiring {
        address: Principal,
        #[serde(default)]
        expiry: u64,
    },
}

impl From<LinkRecord> for DelegationLink {
    fn from(record: LinkRecord) -> Self {
        match record {
            LinkRecord::Bare(address) => DelegationLink { address, expiry: 0 },
            LinkRecord::Expiring { address, expiry } => DelegationLink { address, expiry },
        }
    }
}

impl From<DelegationLink> for LinkRecord {
    fn from(link: DelegationLink) -> Self {
        match link.expiry {
            0 => LinkRecord::Bare(link.address),
            expiry => LinkRecord::Expiring {
                address: link.address,
                expiry,
            },
        }
    }
}

impl DelegationLink {
    /// A link that never expires.
    pub fn permanent(address: impl Into<Principal>) -> Self {
        Self {
            address: address.into(),
            expiry: 0,
        }
    }

    /// A link valid while the ledger timestamp is before `expiry`.
    pub fn until(address: impl Into<Principal>, expiry: u64) -> Self {
        Self {
            address: address.into(),
            expiry,
        }
    }

    /// Whether the link is in force at `timestamp`.
    pub fn is_active(&self, timestamp: u64) -> bool {
        self.expiry == 0 || self.expiry > timestamp
    }
}

/// Read access to delegation links.
pub trait LinkStore {
    /// The link registered for `delegate`, if any.
    fn link(&self, delegate: &Principal) -> Option<&DelegationLink>;
}

impl LinkStore for BTreeMap<Principal, DelegationLink> {
    fn link(&self, delegate: &Principal) -> Option<&DelegationLink> {
        self.get(delegate)
    }
}

/// The outcome of resolving a signer through the link store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The principal the request acts as
    pub effective: Principal,
    /// A link existed but had expired, so it was ignored
    pub lapsed: bool,
}

/// Resolve `principal` to the principal it acts as at `timestamp`.
///
/// Expired links lapse silently: the signer then acts as itself and
/// [`Resolution::lapsed`] is set.
pub fn resolve<S>(links: &S, principal: &Principal, timestamp: u64) -> Resolution
where
    S: LinkStore + ?Sized,
{
    match links.link(principal) {
        None => Resolution {
            effective: principal.clone(),
            lapsed: false,
        },
        Some(link) if link.is_active(timestamp) => Resolution {
            effective: link.address.clone(),
            lapsed: false,
        },
        Some(link) => {
            tracing::warn!(
                delegate = %principal,
                backing = %link.address,
                expiry = link.expiry,
                timestamp,
                "delegation expired"
            );
            Resolution {
                effective: principal.clone(),
                lapsed: true,
            }
        }
    }
}
