/*!

# Ledger Connect Kit connector for Ethereum wallets

This library adapts the Ledger Connect Kit into a uniform connector
lifecycle for web applications: lazily load the kit exactly once, negotiate
a wallet provider, keep a shared connection state store up to date with the
provider's events, and guarantee the state lands somewhere consistent after
any partial failure.

## Features

- Silent session restoration on mount ([`Connector::connect_eagerly`])
- Explicit user-initiated connection ([`Connector::activate`])
- Single-flight, retry-friendly loading of the kit script
- Provider event bridging (disconnect, chain and account changes) into an
  observable [`ConnectionStore`]

## Usage

Construct the connector with a shared [`ConnectionStore`] (or any
[`Actions`] implementation your application already carries) and a kit
loader; on wasm targets `ffi::ScriptLoader` injects the kit script on first
use.

```no_run
use std::rc::Rc;

use ledger_connector::{Connector as _, ConnectionStore, ConnectorOptions, KitLoader, Ledger};

async fn connect<L: KitLoader>(loader: L) -> anyhow::Result<()> {
    let store = ConnectionStore::new();
    let ledger = Ledger::new(
        loader,
        Rc::new(store.clone()),
        ConnectorOptions::new("my-project-id", [1, 137]),
    );

    // silently restore a previous session on mount; never fails
    ledger.connect_eagerly().await?;

    if !store.state().is_active() {
        // explicit, user-initiated connection; failures surface here
        ledger.activate().await?;
    }

    Ok(())
}
```

The connector core is target independent and everything JS-side sits behind
the [`bridge`] traits, so the whole lifecycle is testable natively with mock
implementations.

*/

pub mod actions;
pub mod bridge;
pub mod chain;
pub mod config;
mod connector;
pub mod error;
mod events;
#[cfg(target_arch = "wasm32")]
pub mod ffi;
pub mod loader;
mod store;
#[cfg(test)]
mod testing;

pub use self::{
    actions::{Actions, CancelActivation, StateUpdate},
    bridge::{BridgeKit, EventListener, KitLoader, Provider, RequestArgs},
    config::ConnectorOptions,
    connector::{Connector, Ledger},
    error::{ConnectorError, LoadError, ProviderRpcError},
    events::{ErrorHandler, URI_AVAILABLE},
    store::{ConnectionState, ConnectionStore},
};
