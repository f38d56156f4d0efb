//! View-space crop rectangle model.
//!
//! The crop frame lives entirely in view coordinates while crop mode is
//! active; it is only projected into image space at confirm time (see the
//! editor's crop commit). The frame supports:
//!
//! - free-form or pinned aspect ratio (width/height),
//! - dragging, clamped inside the view by shifting (never shrinking),
//! - corner resize with the opposite corner anchored,
//! - pinch scaling about the gesture focus.

use serde::{Deserialize, Serialize};

use crate::geom::{Point, Rect};

/// Per-axis distance within which a pointer grabs a crop corner.
pub const RESIZE_THRESHOLD: f32 = 20.0;

/// Minimum crop frame extent along either axis, in view units.
pub const MIN_CROP_SIZE: f32 = 50.0;

/// Fraction of the shorter view dimension used for the initial frame.
const INIT_FRACTION: f32 = 0.8;

/// Target aspect ratio for the crop frame, as width/height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum CropRatio {
    /// No pinned ratio; drag and pinch may change width and height freely.
    #[default]
    Free,
    /// Pinned width/height ratio, e.g. `1.0` for square, `4.0 / 3.0`.
    Fixed(f32),
}

impl CropRatio {
    pub fn value(&self) -> Option<f32> {
        match self {
            CropRatio::Free => None,
            CropRatio::Fixed(r) => Some(*r),
        }
    }
}

/// One of the four grabbable frame corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// The live crop frame while crop mode is active.
#[derive(Debug, Clone, PartialEq)]
pub struct CropState {
    pub rect: Rect,
    pub ratio: CropRatio,
    view_w: f32,
    view_h: f32,
}

impl CropState {
    /// Centered frame sized to 80% of the shorter view dimension, shrunk
    /// further when a pinned ratio would not fit.
    pub fn init(view_w: f32, view_h: f32, ratio: CropRatio) -> Self {
        let rect = match ratio.value() {
            Some(r) if r >= 1.0 => {
                // Wider than tall: width is the dominant dimension.
                let size = (view_w * INIT_FRACTION).min(view_h * INIT_FRACTION / r);
                Rect::new(
                    (view_w - size) / 2.0,
                    (view_h - size / r) / 2.0,
                    (view_w + size) / 2.0,
                    (view_h + size / r) / 2.0,
                )
            }
            Some(r) => {
                // Taller than wide: height dominates.
                let size = (view_w * INIT_FRACTION * r).min(view_h * INIT_FRACTION);
                Rect::new(
                    (view_w - size * r) / 2.0,
                    (view_h - size) / 2.0,
                    (view_w + size * r) / 2.0,
                    (view_h + size) / 2.0,
                )
            }
            None => {
                let size = view_w.min(view_h) * INIT_FRACTION;
                Rect::new(
                    (view_w - size) / 2.0,
                    (view_h - size) / 2.0,
                    (view_w + size) / 2.0,
                    (view_h + size) / 2.0,
                )
            }
        };
        Self {
            rect,
            ratio,
            view_w,
            view_h,
        }
    }

    /// Replaces the ratio and re-centers the frame for it.
    pub fn set_ratio(&mut self, ratio: CropRatio) {
        *self = Self::init(self.view_w, self.view_h, ratio);
    }

    /// Corner under `p`, if any; each axis is tested independently against
    /// [`RESIZE_THRESHOLD`].
    pub fn hit_corner(&self, p: Point) -> Option<CropCorner> {
        let near = |a: f32, b: f32| (a - b).abs() < RESIZE_THRESHOLD;
        if near(p.x, self.rect.left) && near(p.y, self.rect.top) {
            Some(CropCorner::TopLeft)
        } else if near(p.x, self.rect.right) && near(p.y, self.rect.top) {
            Some(CropCorner::TopRight)
        } else if near(p.x, self.rect.left) && near(p.y, self.rect.bottom) {
            Some(CropCorner::BottomLeft)
        } else if near(p.x, self.rect.right) && near(p.y, self.rect.bottom) {
            Some(CropCorner::BottomRight)
        } else {
            None
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        self.rect.contains(p)
    }

    /// Drags the whole frame, then clamps it back inside the view.
    pub fn drag_by(&mut self, dx: f32, dy: f32) {
        self.rect.offset(dx, dy);
        self.constrain();
    }

    /// Moves `corner` by the pointer delta with the opposite corner
    /// anchored. Enforces the minimum size and, with a pinned ratio,
    /// recomputes the non-dominant dimension and repositions so the anchor
    /// corner stays fixed.
    pub fn resize(&mut self, corner: CropCorner, dx: f32, dy: f32) {
        let mut left = self.rect.left;
        let mut top = self.rect.top;
        let mut right = self.rect.right;
        let mut bottom = self.rect.bottom;

        match corner {
            CropCorner::TopLeft => {
                left += dx;
                top += dy;
            }
            CropCorner::TopRight => {
                right += dx;
                top += dy;
            }
            CropCorner::BottomLeft => {
                left += dx;
                bottom += dy;
            }
            CropCorner::BottomRight => {
                right += dx;
                bottom += dy;
            }
        }

        let mut width = (right - left).max(MIN_CROP_SIZE);
        let mut height = (bottom - top).max(MIN_CROP_SIZE);

        if let Some(r) = self.ratio.value() {
            if r >= 1.0 {
                height = width / r;
            } else {
                width = height * r;
            }
            width = width.max(MIN_CROP_SIZE);
            height = height.max(MIN_CROP_SIZE);

            match corner {
                CropCorner::TopLeft => {
                    right = left + width;
                    bottom = top + height;
                }
                CropCorner::TopRight => {
                    left = right - width;
                    bottom = top + height;
                }
                CropCorner::BottomLeft => {
                    right = left + width;
                    top = bottom - height;
                }
                CropCorner::BottomRight => {
                    left = right - width;
                    top = bottom - height;
                }
            }
        } else {
            // Re-apply the minimum from the anchored corner outward.
            match corner {
                CropCorner::TopLeft => {
                    left = right - width;
                    top = bottom - height;
                }
                CropCorner::TopRight => {
                    right = left + width;
                    top = bottom - height;
                }
                CropCorner::BottomLeft => {
                    left = right - width;
                    bottom = top + height;
                }
                CropCorner::BottomRight => {
                    right = left + width;
                    bottom = top + height;
                }
            }
        }

        self.rect = Rect::new(left, top, right, bottom);
        self.constrain();
    }

    /// Scales the frame by `factor` about `focus`, preserving the focus
    /// point's relative offset inside the frame. A result smaller than the
    /// minimum size is rejected outright.
    pub fn pinch(&mut self, focus: Point, factor: f32) {
        let width = self.rect.width();
        let height = self.rect.height();

        let new_width = width * factor;
        let new_height = match self.ratio.value() {
            Some(r) => new_width / r,
            None => height * factor,
        };

        if new_width < MIN_CROP_SIZE || new_height < MIN_CROP_SIZE {
            return;
        }

        let center = self.rect.center();
        let new_cx = focus.x - (focus.x - center.x) * (new_width / width);
        let new_cy = focus.y - (focus.y - center.y) * (new_height / height);

        self.rect = Rect::centered(Point::new(new_cx, new_cy), new_width, new_height);
        self.constrain();
    }

    /// Shifts the frame back inside the view bounds without resizing it.
    pub fn constrain(&mut self) {
        if self.rect.left < 0.0 {
            self.rect.offset(-self.rect.left, 0.0);
        }
        if self.rect.right > self.view_w {
            self.rect.offset(self.view_w - self.rect.right, 0.0);
        }
        if self.rect.top < 0.0 {
            self.rect.offset(0.0, -self.rect.top);
        }
        if self.rect.bottom > self.view_h {
            self.rect.offset(0.0, self.view_h - self.rect.bottom);
        }
    }
}
