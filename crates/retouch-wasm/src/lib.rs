//! Retouch WASM - WebAssembly bindings for Retouch
//!
//! This crate provides WASM bindings to expose the retouch-core editor
//! to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `editor` - The editing session: image load, effects, gestures, crop,
//!   overlays, preview/export rendering
//! - `types` - WASM-compatible wrapper types for frame data
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor } from '@retouch/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const editor = new JsEditor(canvas.width, canvas.height);
//! editor.load_image(image.width, image.height, rgbaBytes);
//! editor.set_brightness(20);
//! editor.tick();
//! const frame = editor.preview();
//! ctx.putImageData(new ImageData(frame.pixels(), frame.width), 0, 0);
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod types;

// Re-export public types
pub use editor::JsEditor;
pub use types::JsFrame;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Future: Set up panic hook for better error messages in browser console
    // when console_error_panic_hook feature is added
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
