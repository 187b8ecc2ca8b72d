pub mod api;
mod app;
pub mod config;
pub mod debounce;
pub mod document;
pub mod engine;
pub mod models;
pub mod mutations;
pub mod reconcile;
pub mod saved;
mod state;
mod storage;
#[cfg(target_arch = "wasm32")]
pub mod stream;
pub mod util;

pub use app::App;
pub use engine::{Notice, NoticeLevel, SyncEngine, UiSink};

use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

#[cfg(target_arch = "wasm32")]
fn init_tracing() {
    let level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(level)
            .build(),
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn init_tracing() {}

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    init_tracing();
    mount_to_body(App);
}
