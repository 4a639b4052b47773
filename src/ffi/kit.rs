//! [`BridgeKit`] and [`Provider`] implementations over the real Connect Kit
//! objects.

use std::{cell::RefCell, rc::Rc};

use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue, prelude::Closure};
use wasm_bindgen_futures::JsFuture;

use super::bindings;
use crate::{
    bridge::{BridgeKit, EventListener, Provider, RequestArgs},
    config::SupportRequest,
    error::{ProviderRpcError, ProviderUnavailable, UnsupportedConfiguration},
};

/// Render a raw JS error for a diagnostic message, preferring its EIP-1193
/// shape when it decodes.
fn describe(error: &JsValue) -> String {
    match serde_wasm_bindgen::from_value::<ProviderRpcError>(error.clone()) {
        Ok(error) => error.to_string(),
        Err(_) => format!("{error:?}"),
    }
}

/// The loaded Connect Kit library.
#[derive(Clone)]
pub struct ConnectKit {
    inner: bindings::LedgerConnectKit,
}

impl From<JsValue> for ConnectKit {
    fn from(value: JsValue) -> Self {
        Self {
            inner: bindings::LedgerConnectKit::from(value),
        }
    }
}

impl BridgeKit for ConnectKit {
    type Provider = JsProvider;

    fn check_support(&self, request: &SupportRequest) -> Result<(), UnsupportedConfiguration> {
        let request =
            serde_wasm_bindgen::to_value(request).map_err(|error| UnsupportedConfiguration {
                reason: format!("unencodable support request: {error}"),
            })?;
        self.inner
            .check_support(request)
            .map(|_| ())
            .map_err(|error| UnsupportedConfiguration {
                reason: describe(&error),
            })
    }

    fn enable_debug_logs(&self) {
        self.inner.enable_debug_logs();
    }

    async fn get_provider(&self) -> Result<JsProvider, ProviderUnavailable> {
        match self.inner.get_provider().await {
            Ok(value) if value.is_object() => Ok(JsProvider::new(value.into())),
            Ok(_) => Err(ProviderUnavailable {
                reason: "the kit returned no provider object".to_owned(),
            }),
            Err(error) => Err(ProviderUnavailable {
                reason: describe(&error),
            }),
        }
    }
}

struct Registration {
    event: String,
    listener: EventListener,
    // owns the JS-side callback; dropped on removal
    closure: Closure<dyn Fn(JsValue)>,
}

struct ProviderHandle {
    provider: bindings::EthereumProvider,
    registrations: RefCell<Vec<Registration>>,
}

/// A wallet provider living on the JS side. Clones share the registration
/// table so listeners registered through one handle can be removed through
/// another.
#[derive(Clone)]
pub struct JsProvider {
    inner: Rc<ProviderHandle>,
}

impl JsProvider {
    pub(crate) fn new(provider: bindings::EthereumProvider) -> Self {
        Self {
            inner: Rc::new(ProviderHandle {
                provider,
                registrations: RefCell::new(Vec::new()),
            }),
        }
    }
}

impl Provider for JsProvider {
    async fn request(&self, args: RequestArgs) -> Result<Value, ProviderRpcError> {
        let args = serde_wasm_bindgen::to_value(&args).map_err(|error| {
            ProviderRpcError::new(-32600, format!("unencodable request: {error}"))
        })?;

        match self.inner.provider.request(args).await {
            Ok(value) => serde_wasm_bindgen::from_value(value).map_err(|error| {
                ProviderRpcError::new(-32603, format!("undecodable response: {error}"))
            }),
            Err(error) => Err(serde_wasm_bindgen::from_value(error.clone())
                .unwrap_or_else(|_| ProviderRpcError::new(-32603, format!("{error:?}")))),
        }
    }

    fn on(&self, event: &str, listener: EventListener) {
        let handler = listener.clone();
        let closure = Closure::wrap(Box::new(move |payload: JsValue| {
            // events may carry no payload at all; normalize to null
            let payload = serde_wasm_bindgen::from_value(payload).unwrap_or(Value::Null);
            handler.emit(payload);
        }) as Box<dyn Fn(JsValue)>);

        self.inner
            .provider
            .on(event, closure.as_ref().unchecked_ref());
        self.inner.registrations.borrow_mut().push(Registration {
            event: event.to_owned(),
            listener,
            closure,
        });
    }

    fn remove_listener(&self, event: &str, listener: &EventListener) {
        let mut registrations = self.inner.registrations.borrow_mut();
        registrations.retain(|registration| {
            if registration.event != event || !registration.listener.same(listener) {
                return true;
            }
            self.inner
                .provider
                .remove_listener(event, registration.closure.as_ref().unchecked_ref());
            false
        });
    }

    fn has_session(&self) -> bool {
        let session = self.inner.provider.session();
        !session.is_undefined() && !session.is_null()
    }

    async fn disconnect(&self) {
        // `disconnect` is an optional capability, probe before calling
        let disconnect =
            match js_sys::Reflect::get(&self.inner.provider, &JsValue::from_str("disconnect")) {
                Ok(value) if value.is_function() => js_sys::Function::from(value),
                _ => return,
            };

        match disconnect.call0(&self.inner.provider) {
            Ok(result) => {
                let promise = js_sys::Promise::resolve(&result);
                if let Err(error) = JsFuture::from(promise).await {
                    log::warn!("provider disconnect rejected: {}", describe(&error));
                }
            }
            Err(error) => log::warn!("provider disconnect threw: {}", describe(&error)),
        }
    }
}
