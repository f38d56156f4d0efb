//! The pan/zoom/rotate/flip transform applied to the base image.
//!
//! A 2×3 affine matrix mapping image coordinates to view coordinates:
//!
//! ```text
//! | m00 m01 m02 |   | x |
//! | m10 m11 m12 | * | y |
//!                   | 1 |
//! ```
//!
//! "Post" operations compose on the outside (applied after the existing
//! transform), "pre" operations on the inside. Flips are pre-multiplied −1
//! scales about an axis through the given center.

use crate::geom::{Point, Rect};

/// 2D affine transform, row-major 2×3.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub m00: f32,
    pub m01: f32,
    pub m02: f32,
    pub m10: f32,
    pub m11: f32,
    pub m12: f32,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    pub const fn identity() -> Self {
        Self {
            m00: 1.0,
            m01: 0.0,
            m02: 0.0,
            m10: 0.0,
            m11: 1.0,
            m12: 0.0,
        }
    }

    pub const fn translation(dx: f32, dy: f32) -> Self {
        Self {
            m00: 1.0,
            m01: 0.0,
            m02: dx,
            m10: 0.0,
            m11: 1.0,
            m12: dy,
        }
    }

    /// Uniform (or per-axis, for flips) scale about a pivot point.
    pub fn scale_about(sx: f32, sy: f32, px: f32, py: f32) -> Self {
        Self {
            m00: sx,
            m01: 0.0,
            m02: px - sx * px,
            m10: 0.0,
            m11: sy,
            m12: py - sy * py,
        }
    }

    /// Rotation by `degrees` about a pivot point.
    pub fn rotation_about(degrees: f32, px: f32, py: f32) -> Self {
        let r = degrees.to_radians();
        let cos = r.cos();
        let sin = r.sin();
        Self {
            m00: cos,
            m01: -sin,
            m02: px - cos * px + sin * py,
            m10: sin,
            m11: cos,
            m12: py - sin * px - cos * py,
        }
    }

    /// Transform that scales `(img_w, img_h)` to fit inside the view and
    /// centers it. Used after crop confirm and rotate/flip commits.
    pub fn fit_center(img_w: f32, img_h: f32, view_w: f32, view_h: f32) -> Self {
        let scale = (view_w / img_w).min(view_h / img_h);
        let mut t = Self::scale_about(scale, scale, 0.0, 0.0);
        t.post_translate(
            (view_w - img_w * scale) / 2.0,
            (view_h - img_h * scale) / 2.0,
        );
        t
    }

    /// `self = other ∘ self` (the new transform applies last).
    pub fn post_concat(&mut self, other: &AffineTransform) {
        *self = other.concat(self);
    }

    /// `self = self ∘ other` (the new transform applies first).
    pub fn pre_concat(&mut self, other: &AffineTransform) {
        *self = self.concat(other);
    }

    /// `result = self ∘ other`: maps a point through `other`, then `self`.
    pub fn concat(&self, other: &AffineTransform) -> AffineTransform {
        AffineTransform {
            m00: self.m00 * other.m00 + self.m01 * other.m10,
            m01: self.m00 * other.m01 + self.m01 * other.m11,
            m02: self.m00 * other.m02 + self.m01 * other.m12 + self.m02,
            m10: self.m10 * other.m00 + self.m11 * other.m10,
            m11: self.m10 * other.m01 + self.m11 * other.m11,
            m12: self.m10 * other.m02 + self.m11 * other.m12 + self.m12,
        }
    }

    pub fn post_translate(&mut self, dx: f32, dy: f32) {
        self.m02 += dx;
        self.m12 += dy;
    }

    pub fn post_scale(&mut self, factor: f32, px: f32, py: f32) {
        self.post_concat(&Self::scale_about(factor, factor, px, py));
    }

    pub fn post_rotate(&mut self, degrees: f32, px: f32, py: f32) {
        self.post_concat(&Self::rotation_about(degrees, px, py));
    }

    /// Mirror across a vertical or horizontal axis through `(px, py)`.
    /// Pre-multiplied so the flip happens in image space, under any
    /// pan/zoom already applied.
    pub fn pre_flip(&mut self, horizontal: bool, px: f32, py: f32) {
        let (sx, sy) = if horizontal { (-1.0, 1.0) } else { (1.0, -1.0) };
        self.pre_concat(&Self::scale_about(sx, sy, px, py));
    }

    /// Effective uniform scale factor, recovered from the first row.
    ///
    /// `hypot(m00, m01)` stays correct under combined rotate+scale, where
    /// reading `m00` alone would not.
    pub fn scale(&self) -> f32 {
        self.m00.hypot(self.m01)
    }

    /// Translation components.
    pub fn translation_part(&self) -> (f32, f32) {
        (self.m02, self.m12)
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<AffineTransform> {
        let det = self.m00 * self.m11 - self.m01 * self.m10;
        if det.abs() < 1e-9 {
            return None;
        }
        let inv_det = 1.0 / det;
        let m00 = self.m11 * inv_det;
        let m01 = -self.m01 * inv_det;
        let m10 = -self.m10 * inv_det;
        let m11 = self.m00 * inv_det;
        Some(AffineTransform {
            m00,
            m01,
            m02: -(m00 * self.m02 + m01 * self.m12),
            m10,
            m11,
            m12: -(m10 * self.m02 + m11 * self.m12),
        })
    }

    pub fn map_point(&self, p: Point) -> Point {
        Point::new(
            self.m00 * p.x + self.m01 * p.y + self.m02,
            self.m10 * p.x + self.m11 * p.y + self.m12,
        )
    }

    /// Axis-aligned bounding box of the four mapped corners.
    pub fn map_rect(&self, rect: &Rect) -> Rect {
        let corners = rect.corners().map(|c| self.map_point(c));
        Rect::bounding(&corners)
    }
}
