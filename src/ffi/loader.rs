//! One-time injection of the Connect Kit script.

use std::{cell::RefCell, rc::Rc};

use futures::channel::oneshot;
use wasm_bindgen::{JsCast, JsValue, prelude::Closure};

use super::kit::ConnectKit;
use crate::{bridge::KitLoader, error::LoadError};

/// Where the Connect Kit UMD bundle is published.
pub const CONNECT_KIT_SRC: &str = "https://statuesque-naiad-0cb980.netlify.app/umd/index.js";

/// Global the kit installs on `window` once its script has run.
const GLOBAL_NAME: &str = "ledgerConnectKit";

/// Stable element id preventing duplicate script tags across connector
/// instances on the same page.
const SCRIPT_ID: &str = "ledger-ck-script-ledgerConnectKit";

/// Loads the Connect Kit by injecting its `<script>` tag into the document
/// head and resolving the global it installs.
#[derive(Clone)]
pub struct ScriptLoader {
    src: String,
}

impl Default for ScriptLoader {
    fn default() -> Self {
        Self {
            src: CONNECT_KIT_SRC.to_owned(),
        }
    }
}

impl ScriptLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the kit bundle from a different URL, e.g. a self-hosted copy.
    pub fn with_src(src: impl Into<String>) -> Self {
        Self { src: src.into() }
    }
}

fn kit_global() -> Result<ConnectKit, LoadError> {
    let kit = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str(GLOBAL_NAME))
        .map_err(|_| LoadError::MissingGlobal)?;
    if kit.is_undefined() || kit.is_null() {
        return Err(LoadError::MissingGlobal);
    }
    Ok(ConnectKit::from(kit))
}

impl KitLoader for ScriptLoader {
    type Kit = ConnectKit;

    fn supported_host(&self) -> bool {
        web_sys::window()
            .and_then(|window| window.document())
            .is_some()
    }

    async fn load(self) -> Result<ConnectKit, LoadError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or(LoadError::UnsupportedHost)?;

        // a previous connector already injected the script
        if document.get_element_by_id(SCRIPT_ID).is_some() {
            return kit_global();
        }

        let script: web_sys::HtmlScriptElement = document
            .create_element("script")
            .map_err(|error| LoadError::Script(format!("{error:?}")))?
            .unchecked_into();
        script.set_src(&self.src);
        script.set_id(SCRIPT_ID);

        let (sender, receiver) = oneshot::channel::<Result<(), LoadError>>();
        let sender = Rc::new(RefCell::new(Some(sender)));

        let on_load = {
            let sender = Rc::clone(&sender);
            Closure::wrap(Box::new(move |_: JsValue| {
                if let Some(sender) = sender.borrow_mut().take() {
                    let _ = sender.send(Ok(()));
                }
            }) as Box<dyn Fn(JsValue)>)
        };
        let on_error = {
            let sender = Rc::clone(&sender);
            let src = self.src.clone();
            Closure::wrap(Box::new(move |_: JsValue| {
                if let Some(sender) = sender.borrow_mut().take() {
                    let _ = sender.send(Err(LoadError::Script(format!(
                        "failed to download or execute {src}"
                    ))));
                }
            }) as Box<dyn Fn(JsValue)>)
        };

        script
            .add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())
            .map_err(|error| LoadError::Script(format!("{error:?}")))?;
        script
            .add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())
            .map_err(|error| LoadError::Script(format!("{error:?}")))?;

        document
            .head()
            .ok_or(LoadError::UnsupportedHost)?
            .append_child(&script)
            .map_err(|error| LoadError::Script(format!("{error:?}")))?;

        let outcome = receiver
            .await
            .unwrap_or_else(|_| Err(LoadError::Script("script load interrupted".to_owned())));

        // the closures must outlive the events they listen for
        drop(on_load);
        drop(on_error);

        outcome?;
        kit_global()
    }
}
