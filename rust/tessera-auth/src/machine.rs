use tessera_signature::{Principal, Registry, Scheme};
use tracing::{debug, instrument, warn};

use crate::{
    Action, ActionError, Authorized, DelegationLink, Environment, LinkStore, RejectWrites,
    Request, State, WriteHandler, authorize,
};

/// Applies signed requests to a committed state.
///
/// Each request runs against a clone of the committed state. The clone
/// replaces the committed state only if authorization and the action both
/// succeed; otherwise it is dropped and the committed state is unchanged.
#[derive(Debug)]
pub struct Machine<H = RejectWrites> {
    state: State,
    registry: Registry,
    handler: H,
}

impl Machine {
    /// A machine that only serves the built-in functions.
    pub fn new(state: State, registry: Registry) -> Self {
        Self::with_handler(state, registry, RejectWrites)
    }
}

impl<H> Machine<H>
where
    H: WriteHandler,
{
    /// A machine forwarding document writes to `handler`.
    pub fn with_handler(state: State, registry: Registry, handler: H) -> Self {
        Self {
            state,
            registry,
            handler,
        }
    }

    /// Authorize and apply `request`.
    ///
    /// # Errors
    ///
    /// Any [`ActionError`]; the committed state is then left as it was.
    #[instrument(skip(self, request), fields(function = %request.function))]
    pub async fn execute(
        &mut self,
        env: &Environment,
        request: &Request,
    ) -> Result<Authorized, ActionError> {
        let mut working = self.state.clone();

        let outcome = async {
            let authorized = authorize(&mut working, &self.registry, env, request).await?;
            Action::parse(&request.function, &request.query)?
                .apply(&mut working, &authorized, env, &self.handler)
                .await?;
            Ok::<_, ActionError>(authorized)
        }
        .await;

        match outcome {
            Ok(authorized) => {
                self.state = working;
                debug!(principal = %authorized.principal, "committed");
                Ok(authorized)
            }
            Err(error) => {
                warn!(%error, code = ?error.code(), "aborted");
                Err(error)
            }
        }
    }

    /// The committed state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Give up the machine, keeping its committed state.
    pub fn into_state(self) -> State {
        self.state
    }

    /// The last nonce accepted from `signer`.
    pub fn nonce(&self, signer: &Principal) -> u64 {
        self.state.nonces.last(signer)
    }

    /// The link registered for `delegate`.
    pub fn address_link(&self, delegate: &Principal) -> Option<&DelegationLink> {
        self.state.link(delegate)
    }

    /// The schemes currently accepted.
    pub fn algorithms(&self) -> &[Scheme] {
        self.state.auth.algorithms()
    }

    /// The deployment's owners.
    pub fn owners(&self) -> &[Principal] {
        &self.state.owners
    }
}
