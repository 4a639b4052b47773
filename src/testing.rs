//! In-memory implementations of the bridge seams, for tests.

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    rc::Rc,
};

use futures::channel::oneshot;
use serde_json::Value;

use crate::{
    bridge::{BridgeKit, EventListener, KitLoader, Provider, RequestArgs},
    config::SupportRequest,
    error::{LoadError, ProviderRpcError, ProviderUnavailable, UnsupportedConfiguration},
};

#[derive(Default)]
struct ProviderInner {
    session: Cell<bool>,
    responses: RefCell<HashMap<String, Result<Value, ProviderRpcError>>>,
    listeners: RefCell<Vec<(String, EventListener)>>,
    requests: RefCell<Vec<String>>,
    disconnects: Cell<usize>,
}

/// Scriptable wallet provider. Clones share state, like the JS object the
/// kit hands out.
#[derive(Clone, Default)]
pub(crate) struct MockProvider {
    inner: Rc<ProviderInner>,
}

impl MockProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Pretend a persisted session is restorable.
    pub(crate) fn with_session(self) -> Self {
        self.inner.session.set(true);
        self
    }

    /// Script the response for one request method.
    pub(crate) fn respond(self, method: &str, response: Result<Value, ProviderRpcError>) -> Self {
        self.inner
            .responses
            .borrow_mut()
            .insert(method.to_owned(), response);
        self
    }

    /// Fire an event at every listener registered for it.
    pub(crate) fn emit(&self, event: &str, payload: Value) {
        let listeners = self.inner.listeners.borrow().clone();
        for (name, listener) in listeners {
            if name == event {
                listener.emit(payload.clone());
            }
        }
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.inner.requests.borrow().clone()
    }

    pub(crate) fn disconnect_count(&self) -> usize {
        self.inner.disconnects.get()
    }

    pub(crate) fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Provider for MockProvider {
    async fn request(&self, args: RequestArgs) -> Result<Value, ProviderRpcError> {
        self.inner.requests.borrow_mut().push(args.method.clone());
        match self.inner.responses.borrow().get(&args.method) {
            Some(response) => response.clone(),
            None => Err(ProviderRpcError::new(
                -32601,
                format!("no scripted response for {}", args.method),
            )),
        }
    }

    fn on(&self, event: &str, listener: EventListener) {
        self.inner
            .listeners
            .borrow_mut()
            .push((event.to_owned(), listener));
    }

    fn remove_listener(&self, event: &str, listener: &EventListener) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(name, registered)| name != event || !registered.same(listener));
    }

    fn has_session(&self) -> bool {
        self.inner.session.get()
    }

    async fn disconnect(&self) {
        self.inner.disconnects.set(self.inner.disconnects.get() + 1);
    }
}

#[derive(Default)]
struct KitInner {
    provider: Option<MockProvider>,
    rejection: Option<UnsupportedConfiguration>,
    support_checks: Cell<usize>,
    debug_logs: Cell<bool>,
}

/// Scriptable Connect Kit library handle.
#[derive(Clone, Default)]
pub(crate) struct MockKit {
    inner: Rc<KitInner>,
}

impl MockKit {
    pub(crate) fn with_provider(provider: MockProvider) -> Self {
        Self {
            inner: Rc::new(KitInner {
                provider: Some(provider),
                ..KitInner::default()
            }),
        }
    }

    pub(crate) fn rejecting(reason: &str) -> Self {
        Self {
            inner: Rc::new(KitInner {
                rejection: Some(UnsupportedConfiguration {
                    reason: reason.to_owned(),
                }),
                ..KitInner::default()
            }),
        }
    }

    pub(crate) fn support_checks(&self) -> usize {
        self.inner.support_checks.get()
    }

    pub(crate) fn debug_logs_enabled(&self) -> bool {
        self.inner.debug_logs.get()
    }
}

impl BridgeKit for MockKit {
    type Provider = MockProvider;

    fn check_support(&self, _request: &SupportRequest) -> Result<(), UnsupportedConfiguration> {
        self.inner
            .support_checks
            .set(self.inner.support_checks.get() + 1);
        match &self.inner.rejection {
            Some(rejection) => Err(rejection.clone()),
            None => Ok(()),
        }
    }

    fn enable_debug_logs(&self) {
        self.inner.debug_logs.set(true);
    }

    async fn get_provider(&self) -> Result<MockProvider, ProviderUnavailable> {
        self.inner
            .provider
            .clone()
            .ok_or_else(|| ProviderUnavailable {
                reason: "no provider scripted".to_owned(),
            })
    }
}

struct LoaderInner {
    kit: MockKit,
    failures: RefCell<VecDeque<LoadError>>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    supported: bool,
    loads: Cell<usize>,
}

/// Scriptable kit acquisition: can fail, block on a gate, or report an
/// unsupported host.
#[derive(Clone)]
pub(crate) struct MockLoader {
    inner: Rc<LoaderInner>,
}

impl MockLoader {
    pub(crate) fn new(kit: MockKit) -> Self {
        Self {
            inner: Rc::new(LoaderInner {
                kit,
                failures: RefCell::new(VecDeque::new()),
                gate: RefCell::new(None),
                supported: true,
                loads: Cell::new(0),
            }),
        }
    }

    /// A loader for a host without a DOM document.
    pub(crate) fn unsupported() -> Self {
        Self {
            inner: Rc::new(LoaderInner {
                kit: MockKit::default(),
                failures: RefCell::new(VecDeque::new()),
                gate: RefCell::new(None),
                supported: false,
                loads: Cell::new(0),
            }),
        }
    }

    /// Queue one load failure before successful loads.
    pub(crate) fn fail_once(self, error: LoadError) -> Self {
        self.inner.failures.borrow_mut().push_back(error);
        self
    }

    /// Park the first load until the sender side of `gate` fires.
    pub(crate) fn gated(self, gate: oneshot::Receiver<()>) -> Self {
        *self.inner.gate.borrow_mut() = Some(gate);
        self
    }

    pub(crate) fn loads(&self) -> usize {
        self.inner.loads.get()
    }
}

impl KitLoader for MockLoader {
    type Kit = MockKit;

    fn supported_host(&self) -> bool {
        self.inner.supported
    }

    async fn load(self) -> Result<MockKit, LoadError> {
        self.inner.loads.set(self.inner.loads.get() + 1);
        if !self.inner.supported {
            return Err(LoadError::UnsupportedHost);
        }
        let gate = self.inner.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(failure) = self.inner.failures.borrow_mut().pop_front() {
            return Err(failure);
        }
        Ok(self.inner.kit.clone())
    }
}
