//! Text overlay elements: content, placement, word wrap and derived bounds.
//!
//! Bounds are never stored; they are recomputed from the wrapped line count
//! and font metrics on every query, so content or font edits can never
//! leave a stale box behind.

use serde::{Deserialize, Serialize};

use crate::geom::{distance, Point, Rect, rotate_point};
use crate::overlay::{ElementId, ResizeCorner, HANDLE_RADIUS, ROTATE_THRESHOLD};
use crate::render::font::FontProvider;

/// Default font size for new text elements.
pub const DEFAULT_TEXT_SIZE: f32 = 60.0;

/// Font size bounds enforced by corner resizing.
pub const MIN_TEXT_SIZE: f32 = 20.0;
pub const MAX_TEXT_SIZE: f32 = 120.0;

/// Default wrap width for new text elements, in view units.
pub const DEFAULT_MAX_WIDTH: f32 = 400.0;

/// Pinch scale bounds for text elements.
pub const MIN_TEXT_SCALE: f32 = 0.5;
pub const MAX_TEXT_SCALE: f32 = 3.0;

/// Selectable font family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontId {
    #[default]
    SimSun,
    SimHei,
    MicrosoftYaHei,
    KaiTi,
    DengXian,
}

/// A movable, rotatable, scalable text annotation in view space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub id: ElementId,
    pub text: String,
    pub position: Point,
    /// Rotation about `position`, degrees.
    pub rotation: f32,
    pub scale: f32,
    pub color: [u8; 3],
    pub size: f32,
    pub font: FontId,
    /// Wrap width at scale 1.0, in view units.
    pub max_width: f32,
    pub alpha: u8,
}

impl TextElement {
    pub fn new(id: ElementId, text: impl Into<String>, position: Point) -> Self {
        Self {
            id,
            text: text.into(),
            position,
            rotation: 0.0,
            scale: 1.0,
            color: [255, 255, 255],
            size: DEFAULT_TEXT_SIZE,
            font: FontId::default(),
            max_width: DEFAULT_MAX_WIDTH,
            alpha: 255,
        }
    }

    /// Effective wrap width after element scaling.
    pub fn line_width(&self) -> f32 {
        self.max_width * self.scale
    }

    /// Effective font size after element scaling.
    pub fn effective_size(&self) -> f32 {
        self.size * self.scale
    }

    pub fn wrapped_lines(&self, fonts: &dyn FontProvider) -> Vec<String> {
        wrap_text(
            &self.text,
            self.line_width(),
            self.font,
            self.effective_size(),
            fonts,
        )
    }

    /// Axis-aligned bounds in the element's un-rotated frame.
    ///
    /// The box is the wrap width wide and `lines * line_height` tall,
    /// centered on `position` and nudged up by 25% of the line height and
    /// left by 4% of the wrap width so the chrome hugs the glyphs.
    pub fn bounds(&self, fonts: &dyn FontProvider) -> Rect {
        let line_width = self.line_width();
        let size = self.effective_size();
        let line_height = fonts.line_height(self.font, size);
        let text_height = line_height * self.wrapped_lines(fonts).len() as f32;

        let vertical_offset = line_height * 0.25;
        let horizontal_offset = line_width * 0.04;

        Rect::new(
            self.position.x - line_width / 2.0 - horizontal_offset,
            self.position.y - text_height / 2.0 - vertical_offset,
            self.position.x + line_width / 2.0 - horizontal_offset,
            self.position.y + text_height / 2.0 - vertical_offset,
        )
    }

    /// Rotate handle center: offset from `position` along rotation + 90°
    /// by half the larger bounds extent plus the handle padding.
    pub fn rotate_handle_position(&self, fonts: &dyn FontProvider) -> Point {
        let bounds = self.bounds(fonts);
        let handle_distance = bounds.width().max(bounds.height()) / 2.0 + ROTATE_THRESHOLD;
        let radians = (self.rotation + 90.0).to_radians();
        Point::new(
            self.position.x + radians.cos() * handle_distance,
            self.position.y + radians.sin() * handle_distance,
        )
    }

    /// Corner positions of the selection box, rotated into view space.
    pub fn rotated_corners(&self, fonts: &dyn FontProvider) -> [Point; 4] {
        let bounds = self.bounds(fonts);
        bounds
            .corners()
            .map(|c| rotate_point(c, self.position, self.rotation))
    }

    /// Which resize corner, if any, `point` presses. Corners are tested
    /// on the axis-aligned selection box, within the handle radius.
    pub fn hit_corner(&self, point: Point, fonts: &dyn FontProvider) -> Option<ResizeCorner> {
        let corners = self.bounds(fonts).corners();
        const ORDER: [ResizeCorner; 4] = [
            ResizeCorner::TopLeft,
            ResizeCorner::TopRight,
            ResizeCorner::BottomRight,
            ResizeCorner::BottomLeft,
        ];
        corners
            .iter()
            .zip(ORDER)
            .find(|(corner, _)| distance(point, **corner) <= HANDLE_RADIUS)
            .map(|(_, which)| which)
    }

    /// Corner-resize by a uniform factor: scales the box and the font size
    /// together, with the font size clamped to its working range.
    pub fn resize_by(&mut self, factor: f32) {
        if factor <= 0.0 || !factor.is_finite() {
            return;
        }
        self.scale *= factor;
        self.size = (self.size * factor).clamp(MIN_TEXT_SIZE, MAX_TEXT_SIZE);
    }

    /// Baseline Y of the first wrapped line so the block is vertically
    /// centered on `position`.
    pub fn first_baseline_y(&self, line_count: usize, line_height: f32) -> f32 {
        self.position.y - (line_count.saturating_sub(1)) as f32 * line_height / 2.0
    }

    /// Left edge all wrapped lines are aligned to.
    pub fn line_start_x(&self) -> f32 {
        self.position.x - self.line_width() / 2.0
    }
}

/// Greedy word wrap.
///
/// Paragraphs split on `'\n'`; within a paragraph, lines break on spaces
/// only. A single word wider than `max_width` is kept whole on its own
/// line, never broken mid-word.
pub fn wrap_text(
    text: &str,
    max_width: f32,
    font: FontId,
    size: f32,
    fonts: &dyn FontProvider,
) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut words = paragraph.split(' ');
        let mut current = words.next().unwrap_or("").to_owned();

        for word in words {
            let candidate = format!("{current} {word}");
            if fonts.measure(font, size, &candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(current);
                current = word.to_owned();
            }
        }
        lines.push(current);
    }

    lines
}
