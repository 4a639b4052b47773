//! Seams between the connector core and the Connect Kit.
//!
//! The wasm boundary (the `ffi` module, on wasm targets) implements these
//! traits over the real kit global and its provider object; tests implement
//! them over in-memory mocks. Everything above this module is written
//! against the traits only.

use std::rc::Rc;

use serde_json::Value;

use crate::{
    config::SupportRequest,
    error::{LoadError, ProviderRpcError, ProviderUnavailable, UnsupportedConfiguration},
};

/// Event name for the provider's session teardown notification.
pub const DISCONNECT: &str = "disconnect";
/// Event name for the provider's chain switch notification. The payload is a
/// hexadecimal chain id string.
pub const CHAIN_CHANGED: &str = "chainChanged";
/// Event name for the provider's account list notification.
pub const ACCOUNTS_CHANGED: &str = "accountsChanged";

/// A JSON-RPC style request submitted to the provider.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RequestArgs {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RequestArgs {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: None,
        }
    }

    pub fn with_params(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params: Some(params),
        }
    }
}

/// A provider event handler with a stable identity.
///
/// Listeners are cloneable handles comparing by pointer, so the same handle
/// registered with [`Provider::on`] can later be passed to
/// [`Provider::remove_listener`] for symmetric teardown.
#[derive(Clone)]
pub struct EventListener(Rc<dyn Fn(Value)>);

impl EventListener {
    pub fn new(listener: impl Fn(Value) + 'static) -> Self {
        Self(Rc::new(listener))
    }

    /// Invoke the listener with a raw event payload.
    pub fn emit(&self, payload: Value) {
        (self.0)(payload)
    }

    /// Whether two handles refer to the same registered listener.
    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for EventListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EventListener({:p})", Rc::as_ptr(&self.0))
    }
}

/// The wallet provider object handed out by the Connect Kit.
///
/// A capability handle, not an owned resource: the kit retains its own
/// references, clones of this handle all address the same underlying
/// provider.
#[allow(async_fn_in_trait)]
pub trait Provider: Clone + 'static {
    /// Submit a JSON-RPC request to the wallet.
    async fn request(&self, args: RequestArgs) -> Result<Value, ProviderRpcError>;

    /// Register a listener for one of the provider events.
    fn on(&self, event: &str, listener: EventListener);

    /// Remove a previously registered listener, matched by identity.
    fn remove_listener(&self, event: &str, listener: &EventListener);

    /// Whether the provider carries a restorable session. The kit persists
    /// sessions itself; this flag is how eager connection detects one.
    fn has_session(&self) -> bool;

    /// Tear down the provider's session, when the provider supports it.
    /// Best effort, failures are handled (and logged) by the implementation.
    async fn disconnect(&self) {}
}

/// The loaded Connect Kit library.
#[allow(async_fn_in_trait)]
pub trait BridgeKit: Clone + 'static {
    type Provider: Provider;

    /// Negotiate the requested chains, methods and events with the kit.
    fn check_support(&self, request: &SupportRequest) -> Result<(), UnsupportedConfiguration>;

    /// Ask the kit to emit its debug logs.
    fn enable_debug_logs(&self);

    /// Retrieve the concrete wallet provider.
    async fn get_provider(&self) -> Result<Self::Provider, ProviderUnavailable>;
}

/// Acquisition of the Connect Kit library, one per host environment.
///
/// `load` consumes a clone of the loader so the resulting future is
/// `'static` and can be memoized by [`SingleFlight`].
///
/// [`SingleFlight`]: crate::loader::SingleFlight
#[allow(async_fn_in_trait)]
pub trait KitLoader: Clone + 'static {
    type Kit: BridgeKit;

    /// Whether the host environment can run the kit at all. On wasm this is
    /// the presence of a DOM document; outside a browser context the
    /// connector performs no meaningful action.
    fn supported_host(&self) -> bool;

    /// Acquire the kit library.
    async fn load(self) -> Result<Self::Kit, LoadError>;
}
