//! Color-matrix math for brightness, contrast and the canned filters.
//!
//! A 4×5 matrix transforms RGBA channels:
//!
//! ```text
//! | r' |   | m00 m01 m02 m03 m04 |   | r |
//! | g' | = | m10 m11 m12 m13 m14 | * | g |
//! | b' |   | m20 m21 m22 m23 m24 |   | b |
//! | a' |   | m30 m31 m32 m33 m34 |   | a |
//!                                    | 1 |
//! ```
//!
//! The fifth column is an additive offset in 0..=255 channel units.
//! Brightness/contrast form the inner matrix, the selected filter is
//! concatenated as the outer transform.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Luminance weights used for desaturation (ITU-R BT.709).
const LUM_R: f32 = 0.2126;
const LUM_G: f32 = 0.7152;
const LUM_B: f32 = 0.0722;

/// Canned color filter applied on top of brightness/contrast.
///
/// The per-filter coefficients are hand-tuned constants, kept as opaque
/// configuration data rather than derived values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Filter {
    /// No filtering.
    #[default]
    Original,
    /// Full desaturation.
    BlackWhite,
    /// Desaturated with a warm cast.
    Vintage,
    /// Slightly brightened, blue-leaning.
    Fresh,
    /// Red boosted, blue suppressed.
    Warm,
    /// Blue boosted, red suppressed.
    Cold,
}

/// A 4×5 color transform, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix {
    pub m: [f32; 20],
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl ColorMatrix {
    #[rustfmt::skip]
    pub const fn identity() -> Self {
        Self {
            m: [
                1.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 1.0, 0.0,
            ],
        }
    }

    pub const fn new(m: [f32; 20]) -> Self {
        Self { m }
    }

    /// Saturation matrix; `1.0` is identity, `0.0` is grayscale.
    #[rustfmt::skip]
    pub fn saturation(s: f32) -> Self {
        let inv = 1.0 - s;
        let r = inv * LUM_R;
        let g = inv * LUM_G;
        let b = inv * LUM_B;
        Self {
            m: [
                r + s, g,     b,     0.0, 0.0,
                r,     g + s, b,     0.0, 0.0,
                r,     g,     b + s, 0.0, 0.0,
                0.0,   0.0,   0.0,   1.0, 0.0,
            ],
        }
    }

    /// `result = self ∘ inner`: `inner` is applied to the pixel first.
    pub fn concat(&self, inner: &ColorMatrix) -> ColorMatrix {
        let a = &self.m;
        let b = &inner.m;
        let mut out = [0.0f32; 20];
        for row in 0..4 {
            for col in 0..5 {
                let mut v = 0.0;
                for k in 0..4 {
                    v += a[row * 5 + k] * b[k * 5 + col];
                }
                if col == 4 {
                    v += a[row * 5 + 4];
                }
                out[row * 5 + col] = v;
            }
        }
        ColorMatrix { m: out }
    }

    /// `self = outer ∘ self`.
    pub fn post_concat(&mut self, outer: &ColorMatrix) {
        *self = outer.concat(self);
    }

    /// Transform a single RGBA pixel, clamping each channel to 0..=255.
    pub fn apply(&self, px: [u8; 4]) -> [u8; 4] {
        let input = [px[0] as f32, px[1] as f32, px[2] as f32, px[3] as f32];
        let mut out = [0u8; 4];
        for row in 0..4 {
            let base = row * 5;
            let v = self.m[base] * input[0]
                + self.m[base + 1] * input[1]
                + self.m[base + 2] * input[2]
                + self.m[base + 3] * input[3]
                + self.m[base + 4];
            out[row] = v.clamp(0.0, 255.0).round() as u8;
        }
        out
    }

    pub fn is_identity(&self) -> bool {
        let id = Self::identity();
        self.m
            .iter()
            .zip(id.m.iter())
            .all(|(a, b)| (a - b).abs() < f32::EPSILON)
    }
}

/// Combined brightness+contrast matrix.
///
/// `brightness` in −100..=100, `contrast` in −50..=150; the scalar factors
/// are clamped to 0.1..=1.9 and 0.5..=2.5 respectively. The RGB channels
/// share one diagonal/offset pair; alpha is untouched:
///
/// ```text
/// diag   = bScale * cScale
/// offset = (1 - cScale) * 128 * bScale
/// ```
#[rustfmt::skip]
pub fn brightness_contrast_matrix(brightness: i32, contrast: i32) -> ColorMatrix {
    let b_scale = (1.0 + brightness as f32 / 100.0).clamp(0.1, 1.9);
    let c_scale = (1.0 + contrast as f32 / 100.0).clamp(0.5, 2.5);

    let diag = b_scale * c_scale;
    let offset = (1.0 - c_scale) * 128.0 * b_scale;

    ColorMatrix::new([
        diag, 0.0,  0.0,  0.0, offset,
        0.0,  diag, 0.0,  0.0, offset,
        0.0,  0.0,  diag, 0.0, offset,
        0.0,  0.0,  0.0,  1.0, 0.0,
    ])
}

/// Color matrix for a canned filter.
#[rustfmt::skip]
pub fn filter_matrix(filter: Filter) -> ColorMatrix {
    match filter {
        Filter::Original => ColorMatrix::identity(),
        Filter::BlackWhite => ColorMatrix::saturation(0.0),
        Filter::Vintage => {
            // Desaturate, then warm the remaining color.
            let mut m = ColorMatrix::saturation(0.3);
            m.post_concat(&ColorMatrix::new([
                1.0, 0.0,  0.0, 0.0, 10.0,
                0.0, 0.95, 0.0, 0.0, 10.0,
                0.0, 0.0,  0.8, 0.0, 0.0,
                0.0, 0.0,  0.0, 1.0, 0.0,
            ]));
            m
        }
        Filter::Fresh => ColorMatrix::new([
            1.1, 0.0, 0.0, 0.0, 5.0,
            0.0, 1.1, 0.0, 0.0, 10.0,
            0.0, 0.0, 1.2, 0.0, 10.0,
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]),
        Filter::Warm => ColorMatrix::new([
            1.0, 0.0, 0.0, 0.0, 20.0,
            0.0, 0.9, 0.0, 0.0, 10.0,
            0.0, 0.0, 0.7, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]),
        Filter::Cold => ColorMatrix::new([
            0.8, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.9, 0.0, 0.0, 0.0,
            0.0, 0.0, 1.2, 0.0, 20.0,
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]),
    }
}

/// The full effect matrix: brightness/contrast first, filter on the outside.
pub fn effect_matrix(brightness: i32, contrast: i32, filter: Filter) -> ColorMatrix {
    let mut combined = brightness_contrast_matrix(brightness, contrast);
    combined.post_concat(&filter_matrix(filter));
    combined
}

/// Apply a color matrix to every pixel of an image, producing a new buffer.
pub fn apply_color_matrix(src: &RgbaImage, matrix: &ColorMatrix) -> RgbaImage {
    if matrix.is_identity() {
        return src.clone();
    }
    let mut out = src.clone();
    for px in out.pixels_mut() {
        px.0 = matrix.apply(px.0);
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: applying the same matrix to the same pixel is
        /// deterministic (no hidden state).
        #[test]
        fn prop_apply_deterministic(
            r in 0u8..=255, g in 0u8..=255, b in 0u8..=255, a in 0u8..=255,
            brightness in -100i32..=100,
            contrast in -50i32..=150,
        ) {
            let m = brightness_contrast_matrix(brightness, contrast);
            prop_assert_eq!(m.apply([r, g, b, a]), m.apply([r, g, b, a]));
        }

        /// Property: output channels are always valid (clamping holds) and
        /// alpha is preserved by the effect matrix.
        #[test]
        fn prop_alpha_preserved(
            r in 0u8..=255, g in 0u8..=255, b in 0u8..=255, a in 0u8..=255,
            brightness in -100i32..=100,
            contrast in -50i32..=150,
        ) {
            for filter in [
                Filter::Original, Filter::BlackWhite, Filter::Vintage,
                Filter::Fresh, Filter::Warm, Filter::Cold,
            ] {
                let m = effect_matrix(brightness, contrast, filter);
                let out = m.apply([r, g, b, a]);
                prop_assert_eq!(out[3], a);
            }
        }
    }
}
