//! Transient overlay annotations: text and stickers.
//!
//! Elements live in view coordinates and stay independently editable until
//! baked into the canonical bitmap by a confirm operation. Z-order is
//! insertion order; the last element in a list renders topmost.

pub mod sticker;
pub mod text;

/// Touch radius for resize-corner handles.
pub const HANDLE_RADIUS: f32 = 20.0;

/// Touch radius and center-offset padding for the rotate handle.
pub const ROTATE_THRESHOLD: f32 = 40.0;

/// Stable identity of an overlay element within one editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ElementId(pub u64);

/// One of the four resize corners of an element's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}
