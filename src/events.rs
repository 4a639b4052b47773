//! Standing provider event listeners.
//!
//! Three handlers are built once per connector and registered on every
//! provider the connector initializes: session teardown, chain switches and
//! account changes. Each handler is side-effect-only and defensive, a
//! malformed payload is logged and dropped rather than propagated. The
//! handlers keep stable identities so registration and removal stay
//! symmetric.

use std::rc::Rc;

use crate::{
    actions::{Actions, StateUpdate},
    bridge::{ACCOUNTS_CHANGED, CHAIN_CHANGED, DISCONNECT, EventListener, Provider},
    chain,
    error::ProviderRpcError,
};

/// Event name under which the Connect Kit surfaces the out-of-band pairing
/// URI, for applications that render it themselves.
pub const URI_AVAILABLE: &str = "URI_AVAILABLE";

/// Callback invoked with errors carried by provider `disconnect` events.
pub type ErrorHandler = Rc<dyn Fn(ProviderRpcError)>;

pub(crate) struct ListenerBridge {
    disconnect: EventListener,
    chain_changed: EventListener,
    accounts_changed: EventListener,
}

impl ListenerBridge {
    pub(crate) fn new(actions: Rc<dyn Actions>, on_error: Option<ErrorHandler>) -> Self {
        let chain_changed = {
            let actions = Rc::clone(&actions);
            EventListener::new(move |payload| match chain::parse_chain_id(&payload) {
                Ok(chain_id) => actions.update(StateUpdate::chain_id(chain_id)),
                Err(error) => log::warn!("ignoring chainChanged event: {error}"),
            })
        };

        let accounts_changed = {
            let actions = Rc::clone(&actions);
            EventListener::new(move |payload| {
                match serde_json::from_value::<Vec<String>>(payload) {
                    Ok(accounts) => actions.update(StateUpdate::accounts(accounts)),
                    Err(error) => log::warn!("ignoring accountsChanged event: {error}"),
                }
            })
        };

        let disconnect = EventListener::new(move |payload| {
            log::debug!("provider disconnected");
            actions.reset_state();
            if payload.is_null() {
                return;
            }
            match serde_json::from_value::<ProviderRpcError>(payload) {
                Ok(error) => {
                    if let Some(on_error) = &on_error {
                        on_error(error);
                    }
                }
                Err(error) => log::warn!("undecodable disconnect payload: {error}"),
            }
        });

        Self {
            disconnect,
            chain_changed,
            accounts_changed,
        }
    }

    pub(crate) fn attach<P: Provider>(&self, provider: &P) {
        provider.on(DISCONNECT, self.disconnect.clone());
        provider.on(CHAIN_CHANGED, self.chain_changed.clone());
        provider.on(ACCOUNTS_CHANGED, self.accounts_changed.clone());
    }

    pub(crate) fn detach<P: Provider>(&self, provider: &P) {
        provider.remove_listener(DISCONNECT, &self.disconnect);
        provider.remove_listener(CHAIN_CHANGED, &self.chain_changed);
        provider.remove_listener(ACCOUNTS_CHANGED, &self.accounts_changed);
    }
}
