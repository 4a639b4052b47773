//! Single-flight memoization of the Connect Kit acquisition.

use std::cell::RefCell;

use futures::{
    FutureExt,
    future::{LocalBoxFuture, Shared},
};

use crate::{bridge::KitLoader, error::LoadError};

type LoadFuture<L> = Shared<LocalBoxFuture<'static, Result<<L as KitLoader>::Kit, LoadError>>>;

/// Memoizes a [`KitLoader`] as a shared future.
///
/// The first call to [`SingleFlight::load`] starts the acquisition and
/// caches the in-flight future; every other call, concurrent or later,
/// awaits that same future so exactly one underlying acquisition happens. A
/// failed acquisition is evicted from the slot, allowing a retry; a
/// successful one is cached for the life of this value.
///
/// The future is held per instance, not in global state, so connectors do
/// not interfere with each other.
pub struct SingleFlight<L: KitLoader> {
    loader: L,
    inflight: RefCell<Option<LoadFuture<L>>>,
}

impl<L: KitLoader> SingleFlight<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            inflight: RefCell::new(None),
        }
    }

    /// Whether the host environment can run the kit, see
    /// [`KitLoader::supported_host`].
    pub fn supported_host(&self) -> bool {
        self.loader.supported_host()
    }

    pub async fn load(&self) -> Result<L::Kit, LoadError> {
        let future = {
            let mut slot = self.inflight.borrow_mut();
            match slot.as_ref() {
                Some(future) => future.clone(),
                None => {
                    let loader = self.loader.clone();
                    let future = async move { loader.load().await }.boxed_local().shared();
                    *slot = Some(future.clone());
                    future
                }
            }
        };

        let outcome = future.clone().await;
        if outcome.is_err() {
            // evict only our own future: a concurrent retry may already
            // have installed a fresh one
            let mut slot = self.inflight.borrow_mut();
            if slot.as_ref().is_some_and(|current| current.ptr_eq(&future)) {
                *slot = None;
            }
        }
        outcome
    }
}
