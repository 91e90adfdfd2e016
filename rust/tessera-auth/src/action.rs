//! Write actions.
//!
//! Each signed request names a function and carries its arguments. The
//! functions that administer authorization itself are built in; any other
//! function is a document write forwarded to the embedder's [`WriteHandler`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tessera_signature::{Principal, Scheme};

use crate::{ActionError, Authorized, DelegationLink, Environment, State};

/// A write, decoded from a request's function name and arguments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "function", content = "query", rename_all = "camelCase")]
pub enum Action {
    /// Let `address` act as the caller's principal, until `expiry` if non-zero.
    AddAddressLink {
        /// The delegate key
        address: Principal,
        /// Ledger timestamp the link lapses at; `0` never
        #[serde(default)]
        expiry: u64,
    },
    /// Remove the link of `address`.
    RemoveAddressLink {
        /// The delegate key
        address: Principal,
    },
    /// Replace the allow-list of signature schemes.
    SetAlgorithms(Vec<Scheme>),
    /// Record a named contract address.
    LinkContract(String, String),
    /// Grant administration rights.
    AddOwner(Principal),
    /// Revoke administration rights.
    RemoveOwner(Principal),
    /// A document write handled by the embedder.
    #[serde(skip_deserializing)]
    Write {
        /// The invoked function
        function: String,
        /// Its arguments
        query: serde_json::Value,
    },
}

impl Action {
    /// Names of the built-in functions.
    pub const BUILTIN: [&'static str; 6] = [
        "addAddressLink",
        "removeAddressLink",
        "setAlgorithms",
        "linkContract",
        "addOwner",
        "removeOwner",
    ];

    /// Decode the action for `function` invoked with `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InvalidQuery`] if a built-in function's
    /// arguments do not have the expected shape.
    pub fn parse(function: &str, query: &serde_json::Value) -> Result<Self, ActionError> {
        if Self::BUILTIN.iter().any(|name| *name == function) {
            serde_json::from_value(json!({ "function": function, "query": query }))
                .map_err(|error| ActionError::invalid_query(function, error))
        } else {
            Ok(Action::Write {
                function: function.to_string(),
                query: query.clone(),
            })
        }
    }

    /// The function name of this action.
    pub fn function(&self) -> &str {
        match self {
            Action::AddAddressLink { .. } => "addAddressLink",
            Action::RemoveAddressLink { .. } => "removeAddressLink",
            Action::SetAlgorithms(_) => "setAlgorithms",
            Action::LinkContract(..) => "linkContract",
            Action::AddOwner(_) => "addOwner",
            Action::RemoveOwner(_) => "removeOwner",
            Action::Write { function, .. } => function,
        }
    }

    /// Apply this action to an authorized working state.
    pub async fn apply<H>(
        self,
        state: &mut State,
        authorized: &Authorized,
        env: &Environment,
        handler: &H,
    ) -> Result<(), ActionError>
    where
        H: WriteHandler + ?Sized,
    {
        let function = self.function().to_string();
        match self {
            Action::AddAddressLink { address, expiry } => {
                // Links are managed by the principal's own key, never a delegate.
                if authorized.signer != authorized.principal {
                    return Err(ActionError::NotOwner(authorized.signer.clone()));
                }
                if address == authorized.principal {
                    return Err(ActionError::invalid_query(
                        function,
                        "a principal cannot delegate to itself",
                    ));
                }
                if expiry != 0 && expiry <= env.timestamp {
                    return Err(ActionError::invalid_query(function, "expiry is in the past"));
                }
                if let Some(existing) = state.auth.links.get(&address) {
                    if existing.address != authorized.principal && existing.is_active(env.timestamp)
                    {
                        return Err(ActionError::LinkConflict {
                            delegate: address,
                            address: existing.address.clone(),
                        });
                    }
                }
                state.auth.links.insert(
                    address,
                    DelegationLink::until(authorized.principal.clone(), expiry),
                );
            }
            Action::RemoveAddressLink { address } => {
                let link = state
                    .auth
                    .links
                    .get(&address)
                    .ok_or_else(|| ActionError::NotLinked(address.clone()))?;
                let by_backing = link.address == authorized.principal
                    && authorized.signer == authorized.principal;
                if !by_backing && address != authorized.signer {
                    return Err(ActionError::NotOwner(authorized.signer.clone()));
                }
                state.auth.links.remove(&address);
            }
            Action::SetAlgorithms(schemes) => {
                require_owner(state, authorized)?;
                let mut algorithms = Vec::with_capacity(schemes.len());
                for scheme in schemes {
                    if !algorithms.contains(&scheme) {
                        algorithms.push(scheme);
                    }
                }
                if algorithms.is_empty() {
                    return Err(ActionError::invalid_query(
                        function,
                        "at least one algorithm must stay allowed",
                    ));
                }
                state.auth.algorithms = Some(algorithms);
            }
            Action::LinkContract(key, address) => {
                require_owner(state, authorized)?;
                if key.is_empty() || address.is_empty() {
                    return Err(ActionError::invalid_query(
                        function,
                        "key or address not specified",
                    ));
                }
                state.contracts.insert(key, address);
            }
            Action::AddOwner(owner) => {
                require_owner(state, authorized)?;
                if state.is_owner(&owner) {
                    return Err(ActionError::invalid_query(
                        function,
                        format!("{owner} is already an owner"),
                    ));
                }
                state.owners.push(owner);
            }
            Action::RemoveOwner(owner) => {
                require_owner(state, authorized)?;
                if !state.is_owner(&owner) {
                    return Err(ActionError::invalid_query(
                        function,
                        format!("{owner} is not an owner"),
                    ));
                }
                state.owners.retain(|existing| existing != &owner);
            }
            Action::Write { function, query } => {
                handler.write(state, authorized, &function, &query).await?;
            }
        }
        Ok(())
    }
}

fn require_owner(state: &State, authorized: &Authorized) -> Result<(), ActionError> {
    if state.is_owner(&authorized.principal) {
        Ok(())
    } else {
        Err(ActionError::NotOwner(authorized.principal.clone()))
    }
}

/// Applies document writes on behalf of authorized callers.
///
/// The handler mutates the working state only; the dispatcher discards it if
/// the handler fails.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait WriteHandler: Send + Sync {
    /// Apply `function` with `query` as `caller`.
    async fn write(
        &self,
        state: &mut State,
        caller: &Authorized,
        function: &str,
        query: &serde_json::Value,
    ) -> Result<(), ActionError>;
}

/// A handler for deployments without documents: every unknown function is
/// rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectWrites;

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl WriteHandler for RejectWrites {
    async fn write(
        &self,
        _state: &mut State,
        _caller: &Authorized,
        function: &str,
        _query: &serde_json::Value,
    ) -> Result<(), ActionError> {
        Err(ActionError::invalid_query(function, "function not recognised"))
    }
}
