//! The shared connection state store consumed by the connector.
//!
//! The store is an external collaborator: it outlives the connector, is
//! shared with every UI widget that displays connection state, and is
//! injected at construction. The connector only ever mutates it through the
//! three operations of the [`Actions`] trait, never by reaching into its
//! state directly.

/// A partial update of the connection state.
///
/// Fields left as `None` are untouched, so the event listener bridge can
/// update the chain id without clobbering the accounts and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    pub chain_id: Option<u64>,
    pub accounts: Option<Vec<String>>,
}

impl StateUpdate {
    pub fn chain_id(chain_id: u64) -> Self {
        Self {
            chain_id: Some(chain_id),
            ..Self::default()
        }
    }

    pub fn accounts(accounts: Vec<String>) -> Self {
        Self {
            accounts: Some(accounts),
            ..Self::default()
        }
    }
}

/// Closure rolling back one activation attempt.
///
/// Returned by [`Actions::start_activation`]; calling it clears the
/// activating marker for that attempt and nothing else. It is a no-op once
/// the attempt has been committed or the state has been reset.
pub type CancelActivation = Box<dyn FnOnce()>;

/// Mutation surface of the shared connection state store.
pub trait Actions {
    /// Mark the state as activating. The returned closure rolls the marker
    /// back, for the soft-failure paths that must not reset committed state.
    fn start_activation(&self) -> CancelActivation;

    /// Apply a partial update of chain id and/or accounts.
    fn update(&self, update: StateUpdate);

    /// Return the state to its default: not activating, no chain id, no
    /// accounts.
    fn reset_state(&self);
}
