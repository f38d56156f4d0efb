//! Abstract 2D drawing surface and selection/crop chrome.
//!
//! Compositors and chrome drawing are written against the [`Surface`]
//! trait; [`raster::RasterCanvas`] is the deterministic software
//! implementation used for preview, bake and export. A host with its own
//! accelerated canvas can implement `Surface` instead.

pub mod font;
pub mod raster;

use image::RgbaImage;

use crate::color::ColorMatrix;
use crate::crop::CropState;
use crate::geom::{Point, Rect};
use crate::overlay::sticker::{StickerElement, STICKER_CORNER_SIZE};
use crate::overlay::text::TextElement;
use crate::overlay::HANDLE_RADIUS;
use crate::render::font::{FontProvider, LineRaster};

/// RGBA color, straight (non-premultiplied) alpha.
pub type Color = [u8; 4];

const WHITE: Color = [255, 255, 255, 255];
const CYAN: Color = [0, 255, 255, 255];
const BLUE: Color = [0, 0, 255, 255];
const RED: Color = [255, 0, 0, 255];

/// Compositing parameters for bitmap draws.
#[derive(Debug, Clone, Default)]
pub struct Paint {
    /// Extra alpha applied on top of source alpha; 255 is opaque.
    pub alpha: Option<u8>,
    /// Per-pixel color transform applied while drawing.
    pub color_matrix: Option<ColorMatrix>,
}

impl Paint {
    pub fn with_alpha(alpha: u8) -> Self {
        Self {
            alpha: Some(alpha),
            ..Self::default()
        }
    }
}

/// Outline style for rects and lines.
#[derive(Debug, Clone, Copy)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    /// `(on, off)` dash lengths; `None` is a solid stroke.
    pub dash: Option<(f32, f32)>,
}

/// A 2D canvas with a save/restore transform stack.
///
/// Geometry arguments are in the current local coordinate frame; the
/// implementation maps them through the accumulated transform.
pub trait Surface {
    fn size(&self) -> (u32, u32);

    fn save(&mut self);
    fn restore(&mut self);

    fn translate(&mut self, dx: f32, dy: f32);
    fn rotate(&mut self, degrees: f32, px: f32, py: f32);
    fn scale(&mut self, sx: f32, sy: f32, px: f32, py: f32);

    /// Draws `bitmap` with its top-left corner at `(x, y)`.
    fn draw_bitmap(&mut self, bitmap: &RgbaImage, x: f32, y: f32, paint: &Paint);

    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);
    fn stroke_line(&mut self, a: Point, b: Point, stroke: Stroke);

    /// Blits a text coverage strip with its baseline origin at `origin`.
    fn draw_line_raster(&mut self, raster: &LineRaster, origin: Point, color: Color);
}

/// Renders a text element's glyphs (no chrome) onto `surface`.
///
/// Canvas transform order matches the hit-test model: rotate about the
/// element position, then scale about it, then draw wrapped lines
/// left-aligned from the vertically centered first baseline.
pub fn draw_text_element(
    surface: &mut dyn Surface,
    element: &TextElement,
    fonts: &dyn FontProvider,
) {
    let lines = element.wrapped_lines(fonts);
    let size = element.effective_size();
    let line_height = fonts.line_height(element.font, size);
    let start_y = element.first_baseline_y(lines.len(), line_height);
    let start_x = element.line_start_x();
    let color = [
        element.color[0],
        element.color[1],
        element.color[2],
        element.alpha,
    ];

    surface.save();
    surface.rotate(element.rotation, element.position.x, element.position.y);
    for (i, line) in lines.iter().enumerate() {
        let raster = fonts.raster_line(element.font, size, line);
        surface.draw_line_raster(
            &raster,
            Point::new(start_x, start_y + i as f32 * line_height),
            color,
        );
    }
    surface.restore();
}

/// Renders a sticker's pixels (no chrome) onto `surface`.
///
/// `bitmap` is the resolved resource; if its pixel size differs from the
/// dimensions measured at add time, a corrective scale keeps the drawn
/// size equal to the measured one.
pub fn draw_sticker_element(
    surface: &mut dyn Surface,
    element: &StickerElement,
    bitmap: &RgbaImage,
) {
    surface.save();
    surface.translate(element.position.x, element.position.y);
    surface.rotate(element.rotation, 0.0, 0.0);
    surface.scale(element.scale(), element.scale(), 0.0, 0.0);

    let paint = Paint::with_alpha(element.alpha);
    let (bw, bh) = (bitmap.width() as f32, bitmap.height() as f32);
    if bw != element.original_width || bh != element.original_height {
        let sx = element.original_width / bw.max(1.0);
        let sy = element.original_height / bh.max(1.0);
        surface.save();
        surface.scale(sx, sy, 0.0, 0.0);
        surface.draw_bitmap(bitmap, -bw / 2.0, -bh / 2.0, &paint);
        surface.restore();
    } else {
        surface.draw_bitmap(bitmap, -bw / 2.0, -bh / 2.0, &paint);
    }

    surface.restore();
}

/// Selection chrome for a text element: backdrop tint, dashed border and
/// corner handles in the rotated frame, then the rotate handle and its
/// connector in view space.
pub fn draw_text_chrome(
    surface: &mut dyn Surface,
    element: &TextElement,
    fonts: &dyn FontProvider,
) {
    let bounds = element.bounds(fonts);

    surface.save();
    surface.rotate(element.rotation, element.position.x, element.position.y);

    surface.fill_rect(bounds, [0, 0, 0, 50]);
    surface.stroke_rect(
        bounds,
        Stroke {
            color: WHITE,
            width: 2.0,
            dash: Some((5.0, 5.0)),
        },
    );
    for corner in bounds.corners() {
        surface.fill_circle(corner, HANDLE_RADIUS, CYAN);
    }
    surface.restore();

    let handle = element.rotate_handle_position(fonts);
    surface.stroke_line(
        element.position,
        handle,
        Stroke {
            color: CYAN,
            width: 2.0,
            dash: None,
        },
    );
    surface.fill_circle(handle, HANDLE_RADIUS, CYAN);
}

/// Selection chrome for a sticker: dashed box and corner squares in the
/// element's local rotated frame, rotate handle along local +Y.
pub fn draw_sticker_chrome(surface: &mut dyn Surface, element: &StickerElement) {
    let (w, h) = element.scaled_size();
    let local = Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0);

    surface.save();
    surface.translate(element.position.x, element.position.y);
    surface.rotate(element.rotation, 0.0, 0.0);

    surface.stroke_rect(
        local,
        Stroke {
            color: WHITE,
            width: 2.0,
            dash: Some((10.0, 10.0)),
        },
    );

    let c = STICKER_CORNER_SIZE;
    surface.fill_rect(
        Rect::new(local.left, local.top, local.left + c, local.top + c),
        BLUE,
    );
    surface.fill_rect(
        Rect::new(local.right - c, local.top, local.right, local.top + c),
        BLUE,
    );
    surface.fill_rect(
        Rect::new(local.right - c, local.bottom - c, local.right, local.bottom),
        BLUE,
    );
    surface.fill_rect(
        Rect::new(local.left, local.bottom - c, local.left + c, local.bottom),
        BLUE,
    );

    // The canvas already carries the rotation, so the handle sits along
    // the local +Y axis.
    let handle_distance = w.max(h) / 2.0 + crate::overlay::sticker::STICKER_ROTATE_PADDING;
    let handle = Point::new(0.0, handle_distance);
    surface.stroke_line(
        Point::new(0.0, 0.0),
        handle,
        Stroke {
            color: WHITE,
            width: 2.0,
            dash: None,
        },
    );
    surface.fill_circle(handle, c / 2.0, RED);

    surface.restore();
}

/// Crop overlay: half-transparent shade outside the frame, dashed border
/// and white corner markers.
pub fn draw_crop_overlay(surface: &mut dyn Surface, crop: &CropState, view_w: f32, view_h: f32) {
    let rect = crop.rect;
    let shade = [0, 0, 0, 128];

    // Shade the four regions around the frame instead of punching a hole.
    surface.fill_rect(Rect::new(0.0, 0.0, view_w, rect.top), shade);
    surface.fill_rect(Rect::new(0.0, rect.bottom, view_w, view_h), shade);
    surface.fill_rect(Rect::new(0.0, rect.top, rect.left, rect.bottom), shade);
    surface.fill_rect(Rect::new(rect.right, rect.top, view_w, rect.bottom), shade);

    surface.stroke_rect(
        rect,
        Stroke {
            color: WHITE,
            width: 2.0,
            dash: Some((10.0, 5.0)),
        },
    );

    let corner = 20.0;
    for p in rect.corners() {
        surface.fill_rect(
            Rect::new(
                p.x - corner / 2.0,
                p.y - corner / 2.0,
                p.x + corner / 2.0,
                p.y + corner / 2.0,
            ),
            WHITE,
        );
    }
}
