//! Sticker overlay elements.
//!
//! A sticker wraps a host-resolved raster resource. On add, its scale is
//! chosen so the longest native side displays at [`FIXED_BASE_SIZE`] view
//! units, decoupling apparent size from native resolution; the derived
//! `scaled_fixed_size` tracks `fixed_base_size * scale` thereafter.

use std::collections::HashMap;
use std::rc::Rc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::geom::{Point, Rect, rotate_point};
use crate::overlay::ElementId;

/// Longest displayed side of a freshly added sticker, in view units.
pub const FIXED_BASE_SIZE: f32 = 150.0;

/// Side length of the corner scale handles, also the per-axis hit range.
pub const STICKER_CORNER_SIZE: f32 = 30.0;

/// Center offset padding for the sticker rotate handle.
pub const STICKER_ROTATE_PADDING: f32 = 80.0;

/// Scale bounds enforced by the corner-scale gesture.
pub const MIN_STICKER_SCALE: f32 = 0.1;
pub const MAX_STICKER_SCALE: f32 = 5.0;

/// Host-side identifier of a sticker resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StickerId(pub u32);

/// A movable, rotatable, scalable sticker annotation in view space.
#[derive(Debug, Clone, PartialEq)]
pub struct StickerElement {
    pub id: ElementId,
    pub resource: StickerId,
    pub position: Point,
    scale: f32,
    /// Rotation about `position`, degrees.
    pub rotation: f32,
    pub alpha: u8,
    /// Native resource dimensions measured at add time.
    pub original_width: f32,
    pub original_height: f32,
    pub fixed_base_size: f32,
    /// Derived: `fixed_base_size * scale`, maintained by [`set_scale`].
    ///
    /// [`set_scale`]: StickerElement::set_scale
    scaled_fixed_size: f32,
}

impl StickerElement {
    /// New sticker scaled so its longest native side shows at
    /// `fixed_base_size` view units.
    pub fn new(
        id: ElementId,
        resource: StickerId,
        position: Point,
        original_width: f32,
        original_height: f32,
    ) -> Self {
        let mut element = Self {
            id,
            resource,
            position,
            scale: 1.0,
            rotation: 0.0,
            alpha: 255,
            original_width,
            original_height,
            fixed_base_size: FIXED_BASE_SIZE,
            scaled_fixed_size: FIXED_BASE_SIZE,
        };
        let longest = original_width.max(original_height).max(1.0);
        element.set_scale(FIXED_BASE_SIZE / longest);
        element
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn scaled_fixed_size(&self) -> f32 {
        self.scaled_fixed_size
    }

    /// Sets the scale and recomputes the derived fixed size.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.scaled_fixed_size = self.fixed_base_size * scale;
    }

    /// Displayed size in view units.
    pub fn scaled_size(&self) -> (f32, f32) {
        (
            self.original_width * self.scale,
            self.original_height * self.scale,
        )
    }

    /// Axis-aligned bounds in the un-rotated frame, centered on `position`.
    pub fn bounds(&self) -> Rect {
        let (w, h) = self.scaled_size();
        Rect::centered(self.position, w, h)
    }

    /// Axis-aligned bounding box of the rotated corner points; used for
    /// body hit-testing.
    pub fn rotated_bounds(&self) -> Rect {
        Rect::bounding(&self.rotated_corners())
    }

    pub fn rotated_corners(&self) -> [Point; 4] {
        self.bounds()
            .corners()
            .map(|c| rotate_point(c, self.position, self.rotation))
    }

    /// Rotate handle center: offset from `position` along rotation + 90°
    /// by half the larger displayed extent plus the handle padding.
    pub fn rotate_handle_position(&self) -> Point {
        let (w, h) = self.scaled_size();
        let handle_distance = w.max(h) / 2.0 + STICKER_ROTATE_PADDING;
        let radians = (self.rotation + 90.0).to_radians();
        Point::new(
            self.position.x + radians.cos() * handle_distance,
            self.position.y + radians.sin() * handle_distance,
        )
    }

    /// True when `p` lies within the per-axis corner hit range of any
    /// rotated corner.
    pub fn hit_corner(&self, p: Point) -> bool {
        self.rotated_corners().iter().any(|c| {
            (p.x - c.x).abs() <= STICKER_CORNER_SIZE && (p.y - c.y).abs() <= STICKER_CORNER_SIZE
        })
    }
}

/// Synchronous source of sticker pixel buffers.
///
/// Resolution happens at add time (to measure native dimensions) and again
/// at composite time; a resource that disappears in between is skipped
/// during compositing rather than failing the whole composite. Bitmaps
/// come back reference-counted so a resolver shared with the host does
/// not hold internal borrows across a composite.
pub trait StickerResolver {
    fn resolve(&self, id: StickerId) -> Option<Rc<RgbaImage>>;
}

/// In-memory resolver; the host registers decoded bitmaps up front.
#[derive(Default)]
pub struct MemoryStickerResolver {
    resources: HashMap<StickerId, Rc<RgbaImage>>,
}

impl MemoryStickerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: StickerId, bitmap: RgbaImage) {
        self.resources.insert(id, Rc::new(bitmap));
    }

    pub fn remove(&mut self, id: StickerId) -> Option<Rc<RgbaImage>> {
        self.resources.remove(&id)
    }
}

impl StickerResolver for MemoryStickerResolver {
    fn resolve(&self, id: StickerId) -> Option<Rc<RgbaImage>> {
        self.resources.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::distance;

    fn sticker(w: f32, h: f32) -> StickerElement {
        StickerElement::new(
            ElementId(1),
            StickerId(7),
            Point::new(500.0, 400.0),
            w,
            h,
        )
    }

    #[test]
    fn test_add_normalizes_longest_side() {
        let s = sticker(300.0, 100.0);
        assert!((s.scale() - 0.5).abs() < 1e-6);
        let (w, h) = s.scaled_size();
        assert!((w - 150.0).abs() < 1e-3);
        assert!((h - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_uniform_size_across_native_resolutions() {
        let a = sticker(300.0, 100.0);
        let b = sticker(64.0, 64.0);
        let max_a = a.scaled_size().0.max(a.scaled_size().1);
        let max_b = b.scaled_size().0.max(b.scaled_size().1);
        assert!((max_a - max_b).abs() < 1e-3);
        assert!((max_a - FIXED_BASE_SIZE).abs() < 1e-3);
    }

    #[test]
    fn test_scaled_fixed_size_tracks_scale() {
        let mut s = sticker(300.0, 100.0);
        // Add-time scale is 0.5, so the derived size is 75.
        assert!((s.scaled_fixed_size() - 75.0).abs() < 1e-3);

        s.set_scale(0.5);
        assert!((s.scaled_fixed_size() - s.fixed_base_size * 0.5).abs() < 1e-3);

        s.set_scale(2.0);
        assert!((s.scaled_fixed_size() - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_bounds_centered_on_position() {
        let s = sticker(200.0, 100.0);
        let bounds = s.bounds();
        assert_eq!(bounds.center(), s.position);
        assert!((bounds.width() - 150.0).abs() < 1e-3);
        assert!((bounds.height() - 75.0).abs() < 1e-3);
    }

    #[test]
    fn test_rotated_bounds_grow_under_rotation() {
        let mut s = sticker(300.0, 100.0);
        let axis_aligned = s.rotated_bounds();
        s.rotation = 45.0;
        let rotated = s.rotated_bounds();
        assert!(rotated.height() > axis_aligned.height());
    }

    #[test]
    fn test_corner_tracks_rotation() {
        let mut s = sticker(300.0, 100.0);
        let before = s.rotated_corners()[0];
        s.rotation = 90.0;
        let after = s.rotated_corners()[0];
        let expected = rotate_point(before, s.position, 90.0);
        assert!((after.x - expected.x).abs() < 1e-3);
        assert!((after.y - expected.y).abs() < 1e-3);
    }

    #[test]
    fn test_rotate_handle_distance() {
        let s = sticker(300.0, 100.0);
        let handle = s.rotate_handle_position();
        let expected = 150.0 / 2.0 + STICKER_ROTATE_PADDING;
        assert!((distance(s.position, handle) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_hit_corner_uses_per_axis_range() {
        let s = sticker(200.0, 200.0);
        let corner = s.rotated_corners()[0];
        assert!(s.hit_corner(Point::new(corner.x + 25.0, corner.y - 25.0)));
        assert!(!s.hit_corner(Point::new(corner.x + 40.0, corner.y)));
        assert!(!s.hit_corner(s.position));
    }

    #[test]
    fn test_zero_size_resource_does_not_divide_by_zero() {
        let s = sticker(0.0, 0.0);
        assert!(s.scale().is_finite());
        assert!(s.scaled_fixed_size().is_finite());
    }
}
