//! Deterministic software implementation of [`Surface`].
//!
//! All primitives go through one inverse-mapping core: the shape's local
//! bounding box is mapped to a device bounding box, every covered device
//! pixel center is mapped back into the local frame, and a predicate or
//! bilinear sampler decides its color. This keeps rotated and scaled
//! frames exact without per-primitive special cases.

use image::RgbaImage;

use crate::color::ColorMatrix;
use crate::geom::{Point, Rect};
use crate::render::font::LineRaster;
use crate::render::{Color, Paint, Stroke, Surface};
use crate::transform::AffineTransform;

pub struct RasterCanvas {
    image: RgbaImage,
    transform: AffineTransform,
    stack: Vec<AffineTransform>,
}

impl RasterCanvas {
    /// Transparent canvas of the given pixel size.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width, height))
    }

    /// Canvas drawing over an existing buffer.
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image,
            transform: AffineTransform::identity(),
            stack: Vec::new(),
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Composes an arbitrary local transform, as the scale/rotate/translate
    /// ops do. Used to draw through the editor's view transform.
    pub fn concat(&mut self, transform: &AffineTransform) {
        self.transform.pre_concat(transform);
    }

    /// Source-over blend of a straight-alpha color onto one pixel.
    fn blend_pixel(&mut self, x: u32, y: u32, color: Color) {
        if color[3] == 0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x, y);
        let sa = color[3] as f32 / 255.0;
        let da = dst.0[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            dst.0 = [0, 0, 0, 0];
            return;
        }
        for i in 0..3 {
            let s = color[i] as f32;
            let d = dst.0[i] as f32;
            let v = (s * sa + d * da * (1.0 - sa)) / out_a;
            dst.0[i] = v.round().clamp(0.0, 255.0) as u8;
        }
        dst.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Device-space pixel range covered by a local-space rectangle.
    fn device_span(&self, local: Rect) -> Option<(u32, u32, u32, u32)> {
        let device = self.transform.map_rect(&local);
        let x0 = device.left.floor().max(0.0) as i64;
        let y0 = device.top.floor().max(0.0) as i64;
        let x1 = (device.right.ceil() as i64).min(self.image.width() as i64);
        let y1 = (device.bottom.ceil() as i64).min(self.image.height() as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    /// Inverse-mapping fill: covers every device pixel whose center maps
    /// into the local frame where `inside` holds.
    fn fill_local(&mut self, local: Rect, color: Color, inside: impl Fn(Point) -> bool) {
        let Some((x0, y0, x1, y1)) = self.device_span(local) else {
            return;
        };
        let Some(inverse) = self.transform.invert() else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let p = inverse.map_point(Point::new(x as f32 + 0.5, y as f32 + 0.5));
                if inside(p) {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    /// Inverse-mapping blit of a `src_w` x `src_h` source placed with its
    /// top-left corner at `origin` in the local frame. `sample` receives
    /// source coordinates and returns a straight-alpha color.
    fn blit(
        &mut self,
        origin: Point,
        src_w: u32,
        src_h: u32,
        sample: impl Fn(f32, f32) -> Color,
    ) {
        if src_w == 0 || src_h == 0 {
            return;
        }
        let local = Rect::new(
            origin.x,
            origin.y,
            origin.x + src_w as f32,
            origin.y + src_h as f32,
        );
        let Some((x0, y0, x1, y1)) = self.device_span(local) else {
            return;
        };
        let Some(inverse) = self.transform.invert() else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let p = inverse.map_point(Point::new(x as f32 + 0.5, y as f32 + 0.5));
                let sx = p.x - origin.x;
                let sy = p.y - origin.y;
                if sx >= 0.0 && sx < src_w as f32 && sy >= 0.0 && sy < src_h as f32 {
                    self.blend_pixel(x, y, sample(sx, sy));
                }
            }
        }
    }

    fn segment(&mut self, a: Point, b: Point, stroke: Stroke) {
        let half = (stroke.width / 2.0).max(0.5);
        let local = Rect::new(
            a.x.min(b.x) - half,
            a.y.min(b.y) - half,
            a.x.max(b.x) + half,
            a.y.max(b.y) + half,
        );
        self.fill_local(local, stroke.color, |p| {
            distance_to_segment(p, a, b) <= half
        });
    }
}

/// Bilinear RGBA sample at a fractional source position, clamped at the
/// image border.
fn bilinear(image: &RgbaImage, sx: f32, sy: f32) -> Color {
    let w = image.width();
    let h = image.height();
    let fx = (sx - 0.5).max(0.0);
    let fy = (sy - 0.5).max(0.0);
    let x0 = (fx.floor() as u32).min(w - 1);
    let y0 = (fy.floor() as u32).min(h - 1);
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let tx = fx - fx.floor();
    let ty = fy - fy.floor();

    let p00 = image.get_pixel(x0, y0).0;
    let p10 = image.get_pixel(x1, y0).0;
    let p01 = image.get_pixel(x0, y1).0;
    let p11 = image.get_pixel(x1, y1).0;

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = p00[i] as f32 * (1.0 - tx) + p10[i] as f32 * tx;
        let bottom = p01[i] as f32 * (1.0 - tx) + p11[i] as f32 * tx;
        out[i] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq <= f32::EPSILON {
        return crate::geom::distance(p, a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    crate::geom::distance(p, Point::new(a.x + t * abx, a.y + t * aby))
}

fn apply_paint(color: Color, matrix: Option<&ColorMatrix>, alpha: Option<u8>) -> Color {
    let mut c = match matrix {
        Some(m) => m.apply(color),
        None => color,
    };
    if let Some(a) = alpha {
        c[3] = ((c[3] as u16 * a as u16) / 255) as u8;
    }
    c
}

impl Surface for RasterCanvas {
    fn size(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform.pre_concat(&AffineTransform::translation(dx, dy));
    }

    fn rotate(&mut self, degrees: f32, px: f32, py: f32) {
        self.transform
            .pre_concat(&AffineTransform::rotation_about(degrees, px, py));
    }

    fn scale(&mut self, sx: f32, sy: f32, px: f32, py: f32) {
        self.transform
            .pre_concat(&AffineTransform::scale_about(sx, sy, px, py));
    }

    fn draw_bitmap(&mut self, bitmap: &RgbaImage, x: f32, y: f32, paint: &Paint) {
        if bitmap.width() == 0 || bitmap.height() == 0 {
            return;
        }
        let matrix = paint.color_matrix;
        let alpha = paint.alpha;
        self.blit(
            Point::new(x, y),
            bitmap.width(),
            bitmap.height(),
            move |sx, sy| apply_paint(bilinear(bitmap, sx, sy), matrix.as_ref(), alpha),
        );
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_local(rect, color, move |p| {
            p.x >= rect.left && p.x < rect.right && p.y >= rect.top && p.y < rect.bottom
        });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        let corners = rect.corners();
        for i in 0..4 {
            self.stroke_line(corners[i], corners[(i + 1) % 4], stroke);
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        let local = Rect::centered(center, radius * 2.0, radius * 2.0);
        self.fill_local(local, color, move |p| {
            crate::geom::distance(p, center) <= radius
        });
    }

    fn stroke_line(&mut self, a: Point, b: Point, stroke: Stroke) {
        match stroke.dash {
            None => self.segment(a, b, stroke),
            Some((on, off)) if on > 0.0 && off > 0.0 => {
                let total = crate::geom::distance(a, b);
                if total <= f32::EPSILON {
                    return;
                }
                let dir = Point::new((b.x - a.x) / total, (b.y - a.y) / total);
                let mut t = 0.0;
                while t < total {
                    let end = (t + on).min(total);
                    self.segment(
                        Point::new(a.x + dir.x * t, a.y + dir.y * t),
                        Point::new(a.x + dir.x * end, a.y + dir.y * end),
                        Stroke { dash: None, ..stroke },
                    );
                    t += on + off;
                }
            }
            Some(_) => self.segment(a, b, stroke),
        }
    }

    fn draw_line_raster(&mut self, raster: &LineRaster, origin: Point, color: Color) {
        if raster.width == 0 || raster.height == 0 {
            return;
        }
        let w = raster.width;
        let coverage = &raster.coverage;
        self.blit(
            Point::new(origin.x + raster.left, origin.y + raster.top),
            raster.width,
            raster.height,
            move |sx, sy| {
                // Nearest-neighbor coverage lookup; glyph strips are drawn
                // at their rasterized size in the local frame.
                let cx = (sx as u32).min(w - 1);
                let cy = sy as u32;
                let cov = coverage[(cy * w + cx) as usize] as u16;
                [
                    color[0],
                    color[1],
                    color[2],
                    ((color[3] as u16 * cov) / 255) as u8,
                ]
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, color: Color) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba(color))
    }

    #[test]
    fn test_fill_rect_covers_interior() {
        let mut canvas = RasterCanvas::new(20, 20);
        canvas.fill_rect(Rect::new(5.0, 5.0, 15.0, 15.0), [255, 0, 0, 255]);
        let img = canvas.into_image();
        assert_eq!(img.get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(2, 2).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_draw_bitmap_identity_placement() {
        let mut canvas = RasterCanvas::new(10, 10);
        let src = solid(4, 4, [0, 255, 0, 255]);
        canvas.draw_bitmap(&src, 3.0, 3.0, &Paint::default());
        let img = canvas.into_image();
        assert_eq!(img.get_pixel(4, 4).0, [0, 255, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(img.get_pixel(8, 8).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_draw_bitmap_translated_canvas() {
        let mut canvas = RasterCanvas::new(10, 10);
        canvas.translate(5.0, 0.0);
        let src = solid(3, 3, [0, 0, 255, 255]);
        canvas.draw_bitmap(&src, 0.0, 0.0, &Paint::default());
        let img = canvas.into_image();
        assert_eq!(img.get_pixel(6, 1).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(1, 1).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_save_restore_round_trip() {
        let mut canvas = RasterCanvas::new(10, 10);
        canvas.save();
        canvas.translate(100.0, 100.0);
        canvas.restore();
        let src = solid(2, 2, [9, 9, 9, 255]);
        canvas.draw_bitmap(&src, 0.0, 0.0, &Paint::default());
        assert_eq!(canvas.image().get_pixel(0, 0).0, [9, 9, 9, 255]);
    }

    #[test]
    fn test_rotation_quarter_turn_moves_pixels() {
        // Rotate 90° about the canvas center: a patch left of center lands
        // above it (screen coordinates, y down).
        let mut canvas = RasterCanvas::new(21, 21);
        canvas.rotate(90.0, 10.5, 10.5);
        let src = solid(2, 2, [250, 0, 0, 255]);
        canvas.draw_bitmap(&src, 2.0, 9.5, &Paint::default());
        let img = canvas.into_image();
        // Local (3, 10.5) maps to device (10.5, 3).
        assert_eq!(img.get_pixel(10, 3).0[0], 250);
        assert_eq!(img.get_pixel(3, 10).0[3], 0);
    }

    #[test]
    fn test_paint_alpha_blends() {
        let mut canvas = RasterCanvas::from_image(solid(4, 4, [0, 0, 0, 255]));
        let src = solid(4, 4, [255, 255, 255, 255]);
        canvas.draw_bitmap(&src, 0.0, 0.0, &Paint::with_alpha(128));
        let px = canvas.image().get_pixel(2, 2).0;
        assert!((px[0] as i32 - 128).abs() <= 2, "got {:?}", px);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_paint_color_matrix_applies() {
        let mut canvas = RasterCanvas::new(4, 4);
        let src = solid(4, 4, [100, 100, 100, 255]);
        let paint = Paint {
            color_matrix: Some(crate::color::brightness_contrast_matrix(50, 0)),
            alpha: None,
        };
        canvas.draw_bitmap(&src, 0.0, 0.0, &paint);
        assert_eq!(canvas.image().get_pixel(1, 1).0, [150, 150, 150, 255]);
    }

    #[test]
    fn test_fill_circle_radius() {
        let mut canvas = RasterCanvas::new(21, 21);
        canvas.fill_circle(Point::new(10.5, 10.5), 5.0, [0, 255, 0, 255]);
        let img = canvas.into_image();
        assert_eq!(img.get_pixel(10, 10).0, [0, 255, 0, 255]);
        assert_eq!(img.get_pixel(10, 2).0[3], 0);
    }

    #[test]
    fn test_dashed_line_has_gaps() {
        let mut canvas = RasterCanvas::new(40, 5);
        canvas.stroke_line(
            Point::new(0.0, 2.5),
            Point::new(40.0, 2.5),
            Stroke {
                color: [255, 255, 255, 255],
                width: 1.0,
                dash: Some((4.0, 6.0)),
            },
        );
        let img = canvas.into_image();
        let lit: Vec<bool> = (0..40).map(|x| img.get_pixel(x, 2).0[3] > 0).collect();
        assert!(lit.iter().any(|&v| v));
        assert!(lit.iter().any(|&v| !v));
    }

    #[test]
    fn test_scaled_draw_doubles_extent() {
        let mut canvas = RasterCanvas::new(20, 20);
        canvas.scale(2.0, 2.0, 0.0, 0.0);
        let src = solid(4, 4, [7, 7, 7, 255]);
        canvas.draw_bitmap(&src, 0.0, 0.0, &Paint::default());
        let img = canvas.into_image();
        assert_eq!(img.get_pixel(6, 6).0[3], 255);
        assert_eq!(img.get_pixel(10, 10).0[3], 0);
    }
}
