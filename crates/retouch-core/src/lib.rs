//! Retouch Core - Touch-driven image editing engine
//!
//! This crate provides the transform-and-composite core of Retouch: the
//! pan/zoom transform model, crop frame, brightness/contrast/filter color
//! pipeline, text and sticker overlay elements, the gesture state machine
//! that maps pointer input to edits, and the compositors that flatten
//! everything into preview and export bitmaps. It has no UI dependencies;
//! the host shell feeds it pointer events and reads bitmaps back.

pub mod color;
pub mod composite;
pub mod crop;
pub mod editor;
pub mod geom;
pub mod gesture;
pub mod overlay;
pub mod render;
pub mod transform;

#[cfg(test)]
pub mod testutil;

pub use color::Filter;
pub use crop::CropRatio;
pub use editor::{Editor, EditorEvent};
pub use geom::{Point, Rect};
pub use gesture::{GestureState, ToolMode};
pub use overlay::sticker::{MemoryStickerResolver, StickerId, StickerResolver};
pub use overlay::text::FontId;
pub use overlay::ElementId;
pub use render::font::{AbGlyphFonts, FontProvider};
pub use transform::AffineTransform;

/// Color effect parameters applied to the canonical bitmap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EffectParams {
    /// Brightness (-100 to 100)
    pub brightness: i32,
    /// Contrast (-50 to 150)
    pub contrast: i32,
    /// Canned color filter applied on top
    pub filter: Filter,
}

impl EffectParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Errors surfaced by fallible editor operations.
///
/// All of these are recoverable: the operation leaves prior state
/// untouched and the host decides how to notify the user.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditError {
    /// No image has been loaded yet.
    #[error("no image loaded")]
    NoImage,

    /// The crop frame maps to an empty pixel region.
    #[error("crop region is empty")]
    DegenerateCrop,

    /// The view transform cannot be inverted for coordinate mapping.
    #[error("view transform is not invertible")]
    NonInvertibleTransform,

    /// A sticker resource could not be resolved.
    #[error("sticker resource {0:?} not found")]
    MissingResource(StickerId),

    /// A crop operation was requested outside crop mode.
    #[error("not in crop mode")]
    NotInCropMode,
}
