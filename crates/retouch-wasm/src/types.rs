//! WASM-compatible wrapper types for frame data.
//!
//! This module provides JavaScript-friendly types that wrap the core
//! bitmap representation, handling the conversion between Rust and
//! JavaScript data layouts.

use image::RgbaImage;
use wasm_bindgen::prelude::*;

use retouch_core::{CropRatio, Filter, FontId};

/// A rendered frame for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a
/// copy is made to JavaScript memory as a `Uint8Array`, in the layout
/// `ImageData` expects (RGBA, row-major, 4 bytes per pixel).
#[wasm_bindgen]
pub struct JsFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsFrame {
    /// Get the frame width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the frame height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup
    /// automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsFrame {
    pub(crate) fn from_image(image: RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        }
    }
}

/// Build a core bitmap from raw RGBA bytes coming over the boundary.
///
/// Errors are plain strings so this stays testable on native targets;
/// callers convert to `JsValue` at the binding surface.
pub(crate) fn image_from_rgba(
    width: u32,
    height: u32,
    pixels: Vec<u8>,
) -> Result<RgbaImage, String> {
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(format!(
            "pixel buffer is {} bytes, expected {} for {}x{} RGBA",
            pixels.len(),
            expected,
            width,
            height
        ));
    }
    RgbaImage::from_raw(width, height, pixels).ok_or_else(|| "invalid image dimensions".to_string())
}

/// Convert a u8 filter value to the core Filter enum.
///
/// Values:
/// - 0 = Original (no filter)
/// - 1 = BlackWhite
/// - 2 = Vintage
/// - 3 = Fresh
/// - 4 = Warm
/// - 5 = Cold
///
/// Any other value defaults to Original.
pub(crate) fn filter_from_u8(value: u8) -> Filter {
    match value {
        1 => Filter::BlackWhite,
        2 => Filter::Vintage,
        3 => Filter::Fresh,
        4 => Filter::Warm,
        5 => Filter::Cold,
        _ => Filter::Original,
    }
}

/// Convert a u8 font value to the core FontId enum.
///
/// Values:
/// - 0 = SimSun
/// - 1 = SimHei
/// - 2 = MicrosoftYaHei
/// - 3 = KaiTi
/// - 4 = DengXian
///
/// Any other value defaults to SimSun.
pub(crate) fn font_from_u8(value: u8) -> FontId {
    match value {
        1 => FontId::SimHei,
        2 => FontId::MicrosoftYaHei,
        3 => FontId::KaiTi,
        4 => FontId::DengXian,
        _ => FontId::SimSun,
    }
}

/// Convert a width/height ratio to the core crop ratio. Zero, negative
/// and non-finite values select the free ratio.
pub(crate) fn crop_ratio_from_f32(value: f32) -> CropRatio {
    if value.is_finite() && value > 0.0 {
        CropRatio::Fixed(value)
    } else {
        CropRatio::Free
    }
}
