use wasm_bindgen::prelude::*;

mod common;
mod session;

pub use session::WasmTilegram;

/// Called automatically when the WASM module is instantiated.
/// Sets up panic hook so Rust panics appear as console.error in the browser.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Cadence (steps per second) at which the page should call `iterate`.
#[wasm_bindgen]
pub fn compute_fps() -> f64 {
    tilegram::COMPUTE_FPS
}
