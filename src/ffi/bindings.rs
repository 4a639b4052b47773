//! Raw wasm-bindgen declarations for the Connect Kit global and the
//! provider object it hands out.

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// The `window.ledgerConnectKit` global installed by the kit script.
    #[derive(Clone)]
    pub type LedgerConnectKit;

    /// Negotiate the requested chains, methods and events. Throws when the
    /// requested configuration is not supported.
    #[wasm_bindgen(method, catch, js_name = "checkSupport")]
    pub fn check_support(this: &LedgerConnectKit, request: JsValue) -> Result<JsValue, JsValue>;

    /// Ask the kit to emit its debug logs to the console.
    #[wasm_bindgen(method, js_name = "enableDebugLogs")]
    pub fn enable_debug_logs(this: &LedgerConnectKit);

    /// Retrieve the concrete wallet provider object.
    #[wasm_bindgen(method, catch, js_name = "getProvider")]
    pub async fn get_provider(this: &LedgerConnectKit) -> Result<JsValue, JsValue>;
}

#[wasm_bindgen]
extern "C" {
    /// An EIP-1193 provider as returned by the kit.
    #[derive(Clone)]
    pub type EthereumProvider;

    /// The restored WalletConnect session, `undefined` when none exists.
    #[wasm_bindgen(method, getter)]
    pub fn session(this: &EthereumProvider) -> JsValue;

    #[wasm_bindgen(method, catch)]
    pub async fn request(this: &EthereumProvider, args: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method)]
    pub fn on(this: &EthereumProvider, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method, js_name = "removeListener")]
    pub fn remove_listener(this: &EthereumProvider, event: &str, listener: &js_sys::Function);
}
