//! The wasm boundary: bindings to the real Connect Kit and the glue
//! implementing the crate's bridge traits over them.

pub mod bindings;
mod kit;
mod loader;

pub use self::{
    kit::{ConnectKit, JsProvider},
    loader::{CONNECT_KIT_SRC, ScriptLoader},
};

/// Route the crate's `log` output to the browser console. Call once at
/// application start.
pub fn init_console_log(level: log::Level) {
    let _ = console_log::init_with_level(level);
}
