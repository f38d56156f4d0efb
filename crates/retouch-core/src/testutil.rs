//! Shared fixtures for the unit tests: a fixed-metric font, deterministic
//! bitmaps and a pre-stocked editor.

use image::{Rgba, RgbaImage};

use crate::editor::Editor;
use crate::overlay::sticker::{MemoryStickerResolver, StickerId};
use crate::overlay::text::FontId;
use crate::render::font::{FontProvider, LineRaster};

/// Fixed-metric font: spaces are 10 units wide, every other char 16,
/// regardless of size. Ascent 12, descent 4, so lines are 16 tall.
/// Size independence makes wrap expectations trivial to compute by hand.
pub struct FakeFont;

fn char_width(c: char) -> f32 {
    if c == ' ' {
        10.0
    } else {
        16.0
    }
}

impl FontProvider for FakeFont {
    fn measure(&self, _font: FontId, _size: f32, text: &str) -> f32 {
        text.chars().map(char_width).sum()
    }

    fn ascent(&self, _font: FontId, _size: f32) -> f32 {
        12.0
    }

    fn descent(&self, _font: FontId, _size: f32) -> f32 {
        4.0
    }

    /// Full coverage over the line's advance box; no per-glyph shaping.
    fn raster_line(&self, font: FontId, size: f32, text: &str) -> LineRaster {
        let width = self.measure(font, size, text).ceil() as u32;
        let height = (self.ascent(font, size) + self.descent(font, size)) as u32;
        if width == 0 {
            return LineRaster::empty();
        }
        LineRaster {
            width,
            height,
            left: 0.0,
            top: -self.ascent(font, size),
            coverage: vec![255; (width * height) as usize],
        }
    }
}

/// Diagonal gradient so translations and flips change pixel values.
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
            255,
        ])
    })
}

/// Resolver stocked with the two fixtures the tests reference:
/// `StickerId(1)` is a 300x100 solid green bitmap, `StickerId(2)` a 40x40
/// solid red one.
pub fn test_resolver() -> MemoryStickerResolver {
    let mut resolver = MemoryStickerResolver::new();
    resolver.insert(
        StickerId(1),
        RgbaImage::from_pixel(300, 100, Rgba([0, 255, 0, 255])),
    );
    resolver.insert(
        StickerId(2),
        RgbaImage::from_pixel(40, 40, Rgba([255, 0, 0, 255])),
    );
    resolver
}

/// Editor wired to [`FakeFont`] and [`test_resolver`].
pub fn test_editor(view_w: f32, view_h: f32) -> Editor {
    Editor::new(view_w, view_h, Box::new(FakeFont), Box::new(test_resolver()))
}
