//! Geometry primitives shared by the transform, crop and overlay models.
//!
//! All coordinates are `f32` in either *view space* (the widget surface the
//! gestures arrive in) or *image space* (canonical bitmap pixels); the types
//! themselves are space-agnostic.

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle stored as its four edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle from center point and full extents.
    pub fn centered(center: Point, width: f32, height: f32) -> Self {
        Self {
            left: center.x - width / 2.0,
            top: center.y - height / 2.0,
            right: center.x + width / 2.0,
            bottom: center.y + height / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    /// Shift the rectangle by a delta without changing its size.
    pub fn offset(&mut self, dx: f32, dy: f32) {
        self.left += dx;
        self.right += dx;
        self.top += dy;
        self.bottom += dy;
    }

    /// Corner points in clockwise order starting at top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right, self.top),
            Point::new(self.right, self.bottom),
            Point::new(self.left, self.bottom),
        ]
    }

    /// Smallest axis-aligned rectangle containing all of `points`.
    pub fn bounding(points: &[Point]) -> Self {
        let mut left = f32::INFINITY;
        let mut top = f32::INFINITY;
        let mut right = f32::NEG_INFINITY;
        let mut bottom = f32::NEG_INFINITY;
        for p in points {
            left = left.min(p.x);
            top = top.min(p.y);
            right = right.max(p.x);
            bottom = bottom.max(p.y);
        }
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Rotate `point` around `center` by `angle_degrees`.
pub fn rotate_point(point: Point, center: Point, angle_degrees: f32) -> Point {
    let radians = angle_degrees.to_radians();
    let cos = radians.cos();
    let sin = radians.sin();

    let x = point.x - center.x;
    let y = point.y - center.y;

    Point::new(
        x * cos - y * sin + center.x,
        x * sin + y * cos + center.y,
    )
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f32 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Angle of the ray from `center` to `point`, in degrees (atan2 convention).
pub fn angle_deg(center: Point, point: Point) -> f32 {
    (point.y - center.y).atan2(point.x - center.x).to_degrees()
}
