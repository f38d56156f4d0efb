//! Font metrics and glyph rasterization behind the [`FontProvider`] seam.
//!
//! The overlay model only needs three things from a font: line measurement
//! for word wrap, vertical metrics for bounds, and a rasterized coverage
//! strip for drawing. `AbGlyphFonts` supplies all three from registered
//! `ab_glyph` fonts; tests substitute a fixed-metric fake.

use std::collections::HashMap;

use ab_glyph::{Font, FontArc, ScaleFont};

use crate::overlay::text::FontId;

/// Alpha coverage for one laid-out line of text.
///
/// `left`/`top` position the strip relative to the line's baseline origin:
/// the strip's top-left corner sits at `(origin_x + left, baseline + top)`.
pub struct LineRaster {
    pub width: u32,
    pub height: u32,
    pub left: f32,
    pub top: f32,
    /// Row-major alpha coverage, 0..=255, `width * height` entries.
    pub coverage: Vec<u8>,
}

impl LineRaster {
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            left: 0.0,
            top: 0.0,
            coverage: Vec::new(),
        }
    }
}

/// Metric and rasterization source for overlay text.
///
/// Metrics must be linear in `size` so word wrap is scale-invariant:
/// `measure(f, k*s, t) == k * measure(f, s, t)`.
pub trait FontProvider {
    /// Advance width of `text` as a single line.
    fn measure(&self, font: FontId, size: f32, text: &str) -> f32;

    /// Distance from baseline to the top of the tallest glyph, positive.
    fn ascent(&self, font: FontId, size: f32) -> f32;

    /// Distance from baseline to the bottom of the lowest glyph, positive.
    fn descent(&self, font: FontId, size: f32) -> f32;

    /// Rasterize one line of text into an alpha strip.
    fn raster_line(&self, font: FontId, size: f32, text: &str) -> LineRaster;

    /// Baseline-to-baseline line height.
    fn line_height(&self, font: FontId, size: f32) -> f32 {
        self.ascent(font, size) + self.descent(font, size)
    }
}

/// `FontProvider` over `ab_glyph` fonts registered per family.
///
/// Families without a registered face fall back to the first registered
/// font, so a host may load a single face and still use every `FontId`.
#[derive(Default)]
pub struct AbGlyphFonts {
    fonts: HashMap<FontId, FontArc>,
    fallback: Option<FontArc>,
}

impl AbGlyphFonts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: FontId, font: FontArc) {
        if self.fallback.is_none() {
            self.fallback = Some(font.clone());
        }
        self.fonts.insert(id, font);
    }

    /// Registers a font family from raw font-file bytes (TTF/OTF).
    pub fn register_bytes(&mut self, id: FontId, bytes: Vec<u8>) -> Result<(), ab_glyph::InvalidFont> {
        let font = FontArc::try_from_vec(bytes)?;
        self.register(id, font);
        Ok(())
    }

    fn face(&self, id: FontId) -> Option<&FontArc> {
        self.fonts.get(&id).or(self.fallback.as_ref())
    }

    pub fn has_any(&self) -> bool {
        self.fallback.is_some()
    }
}

impl FontProvider for AbGlyphFonts {
    fn measure(&self, font: FontId, size: f32, text: &str) -> f32 {
        let Some(face) = self.face(font) else {
            return 0.0;
        };
        let scaled = face.as_scaled(size);
        let mut width = 0.0;
        let mut last = None;
        for ch in text.chars() {
            let id = face.glyph_id(ch);
            if let Some(prev) = last {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            last = Some(id);
        }
        width
    }

    fn ascent(&self, font: FontId, size: f32) -> f32 {
        self.face(font)
            .map(|f| f.as_scaled(size).ascent())
            .unwrap_or(0.0)
    }

    fn descent(&self, font: FontId, size: f32) -> f32 {
        // ab_glyph reports descent as a negative offset from the baseline.
        self.face(font)
            .map(|f| -f.as_scaled(size).descent())
            .unwrap_or(0.0)
    }

    fn raster_line(&self, font: FontId, size: f32, text: &str) -> LineRaster {
        let Some(face) = self.face(font) else {
            return LineRaster::empty();
        };
        let scaled = face.as_scaled(size);

        // First pass: lay out glyph positions along the baseline.
        let mut glyphs = Vec::new();
        let mut cursor_x = 0.0f32;
        let mut last = None;
        for ch in text.chars() {
            let id = face.glyph_id(ch);
            if let Some(prev) = last {
                cursor_x += scaled.kern(prev, id);
            }
            glyphs.push((id, cursor_x));
            cursor_x += scaled.h_advance(id);
            last = Some(id);
        }

        // Second pass: union of outline pixel bounds.
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        let mut outlined = Vec::new();
        for (id, x) in &glyphs {
            let glyph = id.with_scale_and_position(size, ab_glyph::point(*x, 0.0));
            if let Some(outline) = face.outline_glyph(glyph) {
                let b = outline.px_bounds();
                min_x = min_x.min(b.min.x);
                min_y = min_y.min(b.min.y);
                max_x = max_x.max(b.max.x);
                max_y = max_y.max(b.max.y);
                outlined.push(outline);
            }
        }
        if outlined.is_empty() {
            return LineRaster::empty();
        }

        let width = (max_x - min_x).ceil() as u32 + 1;
        let height = (max_y - min_y).ceil() as u32 + 1;
        let mut coverage = vec![0u8; (width * height) as usize];
        for outline in &outlined {
            let b = outline.px_bounds();
            let ox = (b.min.x - min_x) as i32;
            let oy = (b.min.y - min_y) as i32;
            outline.draw(|gx, gy, c| {
                let px = gx as i32 + ox;
                let py = gy as i32 + oy;
                if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                    let idx = (py as u32 * width + px as u32) as usize;
                    let v = (c * 255.0) as u16 + coverage[idx] as u16;
                    coverage[idx] = v.min(255) as u8;
                }
            });
        }

        LineRaster {
            width,
            height,
            left: min_x,
            top: min_y,
            coverage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeFont;

    #[test]
    fn test_empty_registry_measures_zero() {
        let fonts = AbGlyphFonts::new();
        assert!(!fonts.has_any());
        assert_eq!(fonts.measure(FontId::SimSun, 60.0, "hello"), 0.0);
        let raster = fonts.raster_line(FontId::SimSun, 60.0, "hello");
        assert_eq!(raster.width, 0);
    }

    #[test]
    fn test_fake_font_metrics_are_linear() {
        let fonts = FakeFont;
        let w1 = fonts.measure(FontId::SimSun, 10.0, "ab cd");
        let w2 = fonts.measure(FontId::SimSun, 20.0, "ab cd");
        // FakeFont metrics are size-independent by design; linearity of the
        // real provider is exercised through wrap determinism tests.
        assert_eq!(w1, w2);
    }

    #[test]
    fn test_line_height_is_ascent_plus_descent() {
        let fonts = FakeFont;
        let h = fonts.line_height(FontId::SimSun, 60.0);
        let expected = fonts.ascent(FontId::SimSun, 60.0) + fonts.descent(FontId::SimSun, 60.0);
        assert_eq!(h, expected);
    }
}
