//! A concrete, observable [`Actions`] store.
//!
//! Applications that do not already carry their own state container can use
//! [`ConnectionStore`]: it keeps the canonical `{activating, chain_id,
//! accounts}` triple, notifies subscribers on every change, and hands out
//! cheap clones so the same store can back several widgets and the
//! connector at once.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::actions::{Actions, CancelActivation, StateUpdate};

/// Snapshot of the shared connection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    /// An activation attempt is in flight.
    pub activating: bool,
    /// Chain id of the connected network, decimal.
    pub chain_id: Option<u64>,
    /// Connected account addresses, primary first.
    pub accounts: Vec<String>,
}

impl ConnectionState {
    /// Both a chain id and at least one account are committed.
    pub fn is_active(&self) -> bool {
        self.chain_id.is_some() && !self.accounts.is_empty()
    }
}

type Subscriber = Rc<dyn Fn(&ConnectionState)>;

#[derive(Default)]
struct Inner {
    state: RefCell<ConnectionState>,
    subscribers: RefCell<Vec<(usize, Subscriber)>>,
    next_subscriber: Cell<usize>,
    // bumped on every commit/reset so a stale cancel closure cannot roll
    // back a newer activation
    activation_nonce: Cell<u64>,
}

impl Inner {
    fn notify(&self) {
        let state = self.state.borrow().clone();
        let subscribers = self.subscribers.borrow().clone();
        for (_, subscriber) in subscribers {
            subscriber(&state);
        }
    }
}

/// Observable connection state store. Clones share the same state.
#[derive(Clone, Default)]
pub struct ConnectionStore {
    inner: Rc<Inner>,
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state snapshot.
    pub fn state(&self) -> ConnectionState {
        self.inner.state.borrow().clone()
    }

    /// Register a callback invoked after every state change. Returns an id
    /// accepted by [`ConnectionStore::unsubscribe`].
    pub fn subscribe(&self, subscriber: impl Fn(&ConnectionState) + 'static) -> usize {
        let id = self.inner.next_subscriber.get();
        self.inner.next_subscriber.set(id + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(subscriber)));
        id
    }

    pub fn unsubscribe(&self, id: usize) {
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|(subscriber_id, _)| *subscriber_id != id);
    }
}

impl Actions for ConnectionStore {
    fn start_activation(&self) -> CancelActivation {
        let nonce = self.inner.activation_nonce.get() + 1;
        self.inner.activation_nonce.set(nonce);
        self.inner.state.borrow_mut().activating = true;
        self.inner.notify();

        let inner = Rc::clone(&self.inner);
        Box::new(move || {
            if inner.activation_nonce.get() != nonce {
                return;
            }
            inner.state.borrow_mut().activating = false;
            inner.notify();
        })
    }

    fn update(&self, update: StateUpdate) {
        {
            let mut state = self.inner.state.borrow_mut();
            if let Some(chain_id) = update.chain_id {
                state.chain_id = Some(chain_id);
            }
            if let Some(accounts) = update.accounts {
                state.accounts = accounts;
            }
            if state.is_active() {
                state.activating = false;
                self.inner
                    .activation_nonce
                    .set(self.inner.activation_nonce.get() + 1);
            }
        }
        self.inner.notify();
    }

    fn reset_state(&self) {
        *self.inner.state.borrow_mut() = ConnectionState::default();
        self.inner
            .activation_nonce
            .set(self.inner.activation_nonce.get() + 1);
        self.inner.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_rolls_back_only_the_activation_marker() {
        let store = ConnectionStore::new();
        store.update(StateUpdate::chain_id(1));

        let cancel = store.start_activation();
        assert!(store.state().activating);

        cancel();
        assert_eq!(
            store.state(),
            ConnectionState {
                activating: false,
                chain_id: Some(1),
                accounts: vec![],
            }
        );
    }

    #[test]
    fn commit_clears_the_activating_marker() {
        let store = ConnectionStore::new();
        let _cancel = store.start_activation();

        store.update(StateUpdate {
            chain_id: Some(137),
            accounts: Some(vec!["0xABC".to_owned()]),
        });

        let state = store.state();
        assert!(!state.activating);
        assert!(state.is_active());
    }

    #[test]
    fn stale_cancel_is_a_no_op_after_commit() {
        let store = ConnectionStore::new();
        let cancel = store.start_activation();

        store.update(StateUpdate {
            chain_id: Some(1),
            accounts: Some(vec!["0xABC".to_owned()]),
        });
        cancel();

        // the committed state survives the stale cancel
        assert!(store.state().is_active());
    }

    #[test]
    fn reset_returns_to_default() {
        let store = ConnectionStore::new();
        store.update(StateUpdate {
            chain_id: Some(1),
            accounts: Some(vec!["0xABC".to_owned()]),
        });

        store.reset_state();
        assert_eq!(store.state(), ConnectionState::default());
    }

    #[test]
    fn subscribers_observe_changes_until_unsubscribed() {
        let store = ConnectionStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let observed = Rc::clone(&seen);
        let id = store.subscribe(move |state| observed.borrow_mut().push(state.chain_id));

        store.update(StateUpdate::chain_id(1));
        store.unsubscribe(id);
        store.update(StateUpdate::chain_id(137));

        assert_eq!(*seen.borrow(), vec![Some(1)]);
    }
}
