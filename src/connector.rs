//! The connection lifecycle state machine.
//!
//! [`Ledger`] adapts the Connect Kit into the uniform [`Connector`] contract
//! shared by wallet integrations: silent reconnection on mount
//! ([`Connector::connect_eagerly`]), explicit user-initiated connection
//! ([`Connector::activate`]) and teardown ([`Connector::deactivate`]), all
//! committing into the injected [`Actions`] store.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use serde_json::Value;

use crate::{
    actions::{Actions, StateUpdate},
    bridge::{BridgeKit, KitLoader, Provider, RequestArgs},
    chain,
    config::ConnectorOptions,
    error::{ConnectorError, ProviderRpcError},
    events::{ErrorHandler, ListenerBridge},
    loader::SingleFlight,
};

type KitProvider<L> = <<L as KitLoader>::Kit as BridgeKit>::Provider;

/// Lifecycle contract shared by every wallet connector.
#[allow(async_fn_in_trait)]
pub trait Connector {
    /// Silently restore a prior session, intended to run unattended on
    /// mount. Never rejects: every internal failure resets the state and is
    /// swallowed after a diagnostic log line.
    async fn connect_eagerly(&self) -> Result<(), ConnectorError>;

    /// Explicit, user-initiated connection. On failure the provider is
    /// released, the state is reset and the error is returned so the UI can
    /// surface it.
    async fn activate(&self) -> Result<(), ConnectorError>;

    /// Release the provider and reset the state. Idempotent, never fails.
    async fn deactivate(&self);
}

/// Connector for Ethereum wallets reached through the Ledger Connect Kit.
///
/// Owns at most one live provider at a time and the memoized kit load. The
/// actions store is shared, injected at construction, and outlives the
/// connector.
pub struct Ledger<L: KitLoader> {
    actions: Rc<dyn Actions>,
    options: ConnectorOptions,
    default_chain_id: Option<u64>,
    loader: SingleFlight<L>,
    bridge: ListenerBridge,
    provider: RefCell<Option<KitProvider<L>>>,
    // serializes activation attempts: `activate` and `connect_eagerly`
    // overlapping would otherwise both initialize and register listeners
    // twice
    busy: Rc<Cell<bool>>,
}

impl<L: KitLoader> Ledger<L> {
    pub fn new(loader: L, actions: Rc<dyn Actions>, options: ConnectorOptions) -> Self {
        Self {
            bridge: ListenerBridge::new(Rc::clone(&actions), None),
            actions,
            options,
            default_chain_id: None,
            loader: SingleFlight::new(loader),
            provider: RefCell::new(None),
            busy: Rc::new(Cell::new(false)),
        }
    }

    /// Chain id to report as desired when initializing the session. Chain
    /// switching itself happens through later explicit wallet requests.
    pub fn with_default_chain_id(mut self, chain_id: u64) -> Self {
        self.default_chain_id = Some(chain_id);
        self
    }

    /// Callback receiving errors carried by provider `disconnect` events.
    pub fn with_on_error(mut self, on_error: impl Fn(ProviderRpcError) + 'static) -> Self {
        let on_error: ErrorHandler = Rc::new(on_error);
        self.bridge = ListenerBridge::new(Rc::clone(&self.actions), Some(on_error));
        self
    }

    /// The live provider, if one has been initialized.
    pub fn provider(&self) -> Option<KitProvider<L>> {
        self.provider.borrow().clone()
    }

    /// Negotiate a provider session, once.
    ///
    /// Idempotent fast path: an existing provider is returned without
    /// re-negotiating. Otherwise this awaits the single-flight kit load,
    /// runs the capability check, retrieves the provider and attaches the
    /// standing listeners before publishing it.
    async fn initialize(
        &self,
        desired_chain_id: Option<u64>,
    ) -> Result<KitProvider<L>, ConnectorError> {
        if let Some(provider) = self.provider.borrow().clone() {
            return Ok(provider);
        }

        log::debug!("initializing provider session (desired chain id: {desired_chain_id:?})");
        let kit = self.loader.load().await?;
        kit.check_support(&self.options.support_request())?;
        kit.enable_debug_logs();

        let provider = kit.get_provider().await?;
        self.bridge.attach(&provider);
        *self.provider.borrow_mut() = Some(provider.clone());
        Ok(provider)
    }

    async fn restore_session(&self) -> Result<(), ConnectorError> {
        let provider = self.initialize(self.default_chain_id).await?;

        // the kit persists and restores sessions itself; without one there
        // is nothing to reconnect to
        if !provider.has_session() {
            return Err(ConnectorError::NoActiveSession);
        }

        let (chain_id, accounts) = futures::try_join!(
            provider.request(RequestArgs::new("eth_chainId")),
            provider.request(RequestArgs::new("eth_accounts")),
        )?;
        self.commit(chain_id, accounts)
    }

    async fn request_authorization(&self) -> Result<(), ConnectorError> {
        let provider = self.initialize(self.default_chain_id).await?;

        let accounts = provider
            .request(RequestArgs::new("eth_requestAccounts"))
            .await?;
        let chain_id = provider.request(RequestArgs::new("eth_chainId")).await?;
        self.commit(chain_id, accounts)
    }

    /// Normalize and commit a (chain id, accounts) pair in one update.
    fn commit(&self, chain_id: Value, accounts: Value) -> Result<(), ConnectorError> {
        let chain_id = chain::parse_chain_id(&chain_id)?;
        let accounts: Vec<String> = serde_json::from_value(accounts)
            .map_err(|error| ConnectorError::MalformedResponse(error.to_string()))?;

        self.actions.update(StateUpdate {
            chain_id: Some(chain_id),
            accounts: Some(accounts),
        });
        Ok(())
    }

    /// Release the provider (detaching listeners, best-effort disconnect)
    /// and reset the shared state.
    async fn teardown(&self) {
        let provider = self.provider.borrow_mut().take();
        if let Some(provider) = provider {
            self.bridge.detach(&provider);
            provider.disconnect().await;
        }
        self.actions.reset_state();
    }
}

impl<L: KitLoader> Connector for Ledger<L> {
    async fn connect_eagerly(&self) -> Result<(), ConnectorError> {
        let Some(_guard) = ActivationGuard::acquire(&self.busy) else {
            log::debug!("activation already in flight, skipping eager connection");
            return Ok(());
        };

        let cancel = self.actions.start_activation();
        match self.restore_session().await {
            Ok(()) => Ok(()),
            Err(ConnectorError::NoActiveSession) => {
                // soft failure: roll back the marker, keep the provider
                log::debug!("no session to restore");
                cancel();
                Ok(())
            }
            Err(error) => {
                log::debug!("could not connect eagerly: {error}");
                self.teardown().await;
                Ok(())
            }
        }
    }

    async fn activate(&self) -> Result<(), ConnectorError> {
        // outside a browser context this connector has nothing to do
        if !self.loader.supported_host() {
            log::debug!("unsupported host, skipping activation");
            return Ok(());
        }
        let Some(_guard) = ActivationGuard::acquire(&self.busy) else {
            log::debug!("activation already in flight, skipping");
            return Ok(());
        };

        // the marker starts before the kit load so the "connecting"
        // indicator covers time spent fetching the kit
        let cancel = self.actions.start_activation();
        match self.request_authorization().await {
            Ok(()) => Ok(()),
            Err(error) => {
                self.teardown().await;
                cancel();
                Err(error)
            }
        }
    }

    async fn deactivate(&self) {
        self.teardown().await;
    }
}

/// Releases the in-flight activation flag on drop, whichever way the
/// activation attempt exits.
struct ActivationGuard(Rc<Cell<bool>>);

impl ActivationGuard {
    fn acquire(flag: &Rc<Cell<bool>>) -> Option<Self> {
        if flag.get() {
            return None;
        }
        flag.set(true);
        Some(Self(Rc::clone(flag)))
    }
}

impl Drop for ActivationGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
