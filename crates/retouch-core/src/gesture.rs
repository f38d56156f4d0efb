//! Pointer and pinch gesture handling.
//!
//! Gestures are fed in as primitive events (`pointer_down`, `pointer_move`,
//! `pointer_up`, and the pinch triple) and interpreted against the active
//! tool. A gesture resolves its target once, on the down or pinch-begin
//! event, and sticks with it for the rest of the gesture; moving off an
//! element mid-drag does not retarget.

use tracing::debug;

use crate::crop::CropCorner;
use crate::editor::{Editor, EditorEvent};
use crate::geom::{angle_deg, distance, Point};
use crate::overlay::sticker::{MAX_STICKER_SCALE, MIN_STICKER_SCALE};
use crate::overlay::text::{MAX_TEXT_SCALE, MIN_TEXT_SCALE};
use crate::overlay::{ElementId, ROTATE_THRESHOLD};
use crate::transform::AffineTransform;

/// Movement below this (view px) between down and up counts as a tap on
/// the bare image.
pub const IMAGE_TAP_THRESHOLD: f32 = 3.0;
/// Tap tolerance for text elements; a tap on a selected element activates
/// its editing dialog.
pub const TEXT_TAP_THRESHOLD: f32 = 5.0;

/// Which editing tool currently claims gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    #[default]
    View,
    Crop,
    Text,
    Sticker,
}

/// Active gesture, resolved at the initiating event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    /// One-finger pan of the image (and of overlays whose tool is
    /// inactive).
    Panning { last: Point, start: Point },
    /// Two-finger zoom of the image transform.
    Pinching,
    CropDragging { last: Point },
    CropResizing { corner: CropCorner, last: Point },
    TextDragging { id: ElementId, last: Point, start: Point },
    TextRotating { id: ElementId, last_angle: f32 },
    TextResizing { id: ElementId, last_distance: f32 },
    /// Two-finger scale of the selected text element.
    TextPinching { id: ElementId },
    StickerDragging { id: ElementId, last: Point },
    StickerRotating { id: ElementId, last_angle: f32 },
    StickerScaling {
        id: ElementId,
        initial_scale: f32,
        initial_distance: f32,
    },
}

impl Editor {
    /// Resolves which gesture a touch at `point` begins, given the active
    /// tool. Selection changes happen here: pressing a different element
    /// selects it, pressing empty space deselects.
    pub fn pointer_down(&mut self, point: Point) {
        self.gesture = match self.tool {
            ToolMode::Crop => self.crop_gesture_at(point),
            ToolMode::Text => self.text_gesture_at(point),
            ToolMode::Sticker => self.sticker_gesture_at(point),
            ToolMode::View => GestureState::Panning {
                last: point,
                start: point,
            },
        };
        debug!(gesture = ?self.gesture, "pointer down");
    }

    fn crop_gesture_at(&self, point: Point) -> GestureState {
        let Some(crop) = &self.crop else {
            return GestureState::Idle;
        };
        if let Some(corner) = crop.hit_corner(point) {
            GestureState::CropResizing {
                corner,
                last: point,
            }
        } else if crop.contains(point) {
            GestureState::CropDragging { last: point }
        } else {
            GestureState::Idle
        }
    }

    fn text_gesture_at(&mut self, point: Point) -> GestureState {
        // Chrome handles of the selected element take precedence over
        // element bodies.
        if let Some(selected) = self.selected_text() {
            let id = selected.id;
            let center = selected.position;
            let handle = selected.rotate_handle_position(self.fonts.as_ref());
            if distance(point, handle) <= ROTATE_THRESHOLD {
                return GestureState::TextRotating {
                    id,
                    last_angle: angle_deg(center, point),
                };
            }
            if selected.hit_corner(point, self.fonts.as_ref()).is_some() {
                return GestureState::TextResizing {
                    id,
                    last_distance: distance(center, point),
                };
            }
        }
        match self.find_text_at(point) {
            Some(id) => {
                self.select_text(Some(id));
                GestureState::TextDragging {
                    id,
                    last: point,
                    start: point,
                }
            }
            None => {
                self.select_text(None);
                GestureState::Idle
            }
        }
    }

    fn sticker_gesture_at(&mut self, point: Point) -> GestureState {
        if let Some(selected) = self.selected_sticker() {
            let id = selected.id;
            let center = selected.position;
            let handle = selected.rotate_handle_position();
            if distance(point, handle) <= ROTATE_THRESHOLD {
                return GestureState::StickerRotating {
                    id,
                    last_angle: angle_deg(center, point),
                };
            }
            if selected.hit_corner(point) {
                return GestureState::StickerScaling {
                    id,
                    initial_scale: selected.scale(),
                    initial_distance: distance(center, point),
                };
            }
        }
        match self.find_sticker_at(point) {
            Some(id) => {
                if self.selected_sticker != Some(id) {
                    self.selected_sticker = Some(id);
                    self.push_event(EditorEvent::StickerSelected(id));
                }
                GestureState::StickerDragging { id, last: point }
            }
            None => {
                self.selected_sticker = None;
                GestureState::Idle
            }
        }
    }

    /// Topmost text element whose body contains `point`. Body hit testing
    /// is against the axis-aligned bounds; only chrome handles rotate.
    fn find_text_at(&self, point: Point) -> Option<ElementId> {
        self.texts
            .iter()
            .rev()
            .find(|t| t.bounds(self.fonts.as_ref()).contains(point))
            .map(|t| t.id)
    }

    fn find_sticker_at(&self, point: Point) -> Option<ElementId> {
        self.stickers
            .iter()
            .rev()
            .find(|s| s.rotated_bounds().contains(point))
            .map(|s| s.id)
    }

    pub fn pointer_move(&mut self, point: Point) {
        match self.gesture {
            GestureState::Idle | GestureState::Pinching | GestureState::TextPinching { .. } => {}
            GestureState::Panning { last, start } => {
                let (dx, dy) = (point.x - last.x, point.y - last.y);
                self.transform.post_translate(dx, dy);
                self.offset_overlays(dx, dy);
                self.gesture = GestureState::Panning { last: point, start };
            }
            GestureState::CropDragging { last } => {
                if let Some(crop) = &mut self.crop {
                    crop.drag_by(point.x - last.x, point.y - last.y);
                }
                self.gesture = GestureState::CropDragging { last: point };
            }
            GestureState::CropResizing { corner, last } => {
                if let Some(crop) = &mut self.crop {
                    crop.resize(corner, point.x - last.x, point.y - last.y);
                }
                self.gesture = GestureState::CropResizing {
                    corner,
                    last: point,
                };
            }
            GestureState::TextDragging { id, last, start } => {
                if let Some(element) = self.selected_text_mut() {
                    element.position.x += point.x - last.x;
                    element.position.y += point.y - last.y;
                }
                self.gesture = GestureState::TextDragging {
                    id,
                    last: point,
                    start,
                };
            }
            GestureState::TextRotating { id, last_angle } => {
                let mut angle = last_angle;
                if let Some(element) = self.selected_text_mut() {
                    angle = angle_deg(element.position, point);
                    element.rotation += angle - last_angle;
                }
                self.gesture = GestureState::TextRotating {
                    id,
                    last_angle: angle,
                };
            }
            GestureState::TextResizing { id, last_distance } => {
                let mut dist = last_distance;
                if let Some(element) = self.selected_text_mut() {
                    dist = distance(element.position, point);
                    if last_distance > 0.0 {
                        element.resize_by(dist / last_distance);
                    }
                }
                self.gesture = GestureState::TextResizing {
                    id,
                    last_distance: dist,
                };
            }
            GestureState::StickerDragging { id, last } => {
                if let Some(element) = self.selected_sticker_mut() {
                    element.position.x += point.x - last.x;
                    element.position.y += point.y - last.y;
                }
                self.gesture = GestureState::StickerDragging { id, last: point };
            }
            GestureState::StickerRotating { id, last_angle } => {
                let mut angle = last_angle;
                if let Some(element) = self.selected_sticker_mut() {
                    angle = angle_deg(element.position, point);
                    element.rotation += angle - last_angle;
                }
                self.gesture = GestureState::StickerRotating {
                    id,
                    last_angle: angle,
                };
            }
            GestureState::StickerScaling {
                id,
                initial_scale,
                initial_distance,
            } => {
                if let Some(element) = self.selected_sticker_mut() {
                    if initial_distance > 0.0 {
                        let factor = distance(element.position, point) / initial_distance;
                        let scale =
                            (initial_scale * factor).clamp(MIN_STICKER_SCALE, MAX_STICKER_SCALE);
                        element.set_scale(scale);
                    }
                }
                self.gesture = GestureState::StickerScaling {
                    id,
                    initial_scale,
                    initial_distance,
                };
            }
        }
    }

    pub fn pointer_up(&mut self, point: Point) {
        match self.gesture {
            GestureState::Panning { start, .. } => {
                if distance(start, point) < IMAGE_TAP_THRESHOLD {
                    self.push_event(EditorEvent::Tapped);
                }
            }
            GestureState::TextDragging { id, start, .. } => {
                if distance(start, point) < TEXT_TAP_THRESHOLD {
                    self.push_event(EditorEvent::TextActivated(id));
                }
            }
            _ => {}
        }
        self.gesture = GestureState::Idle;
    }

    pub fn pointer_cancel(&mut self) {
        self.gesture = GestureState::Idle;
    }

    /// Begins a two-finger gesture centered on `focus`. In the text tool a
    /// pinch that starts over the selected element scales that element;
    /// every other pinch zooms the image. Crop-mode pinches are handled in
    /// `pinch_update` directly against the frame.
    pub fn pinch_begin(&mut self, focus: Point) {
        self.gesture = if self.tool == ToolMode::Text {
            match self.selected_text() {
                Some(element) if element.bounds(self.fonts.as_ref()).contains(focus) => {
                    GestureState::TextPinching { id: element.id }
                }
                _ => GestureState::Pinching,
            }
        } else {
            GestureState::Pinching
        };
        debug!(gesture = ?self.gesture, "pinch begin");
    }

    /// Applies an incremental pinch step. `factor` is the span ratio
    /// against the previous update.
    pub fn pinch_update(&mut self, focus: Point, factor: f32) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        match self.gesture {
            GestureState::TextPinching { .. } => {
                if let Some(element) = self.selected_text_mut() {
                    element.scale = (element.scale * factor).clamp(MIN_TEXT_SCALE, MAX_TEXT_SCALE);
                }
            }
            GestureState::Pinching => {
                if self.tool == ToolMode::Crop {
                    if let Some(crop) = &mut self.crop {
                        crop.pinch(focus, factor);
                    }
                } else {
                    self.zoom_by(focus, factor);
                }
            }
            _ => {}
        }
    }

    pub fn pinch_end(&mut self) {
        self.gesture = GestureState::Idle;
    }

    /// Zooms the image about `focus`, rejecting any step that would take
    /// the overall scale outside the configured range. Overlay elements
    /// are carried through the same projection so they stay glued to the
    /// image content.
    fn zoom_by(&mut self, focus: Point, factor: f32) {
        let mut candidate = self.transform;
        candidate.post_scale(factor, focus.x, focus.y);
        let scale = candidate.scale();
        if scale < self.min_scale || scale > self.max_scale {
            return;
        }
        self.transform = candidate;

        let (tx, ty) = (focus.x, focus.y);
        self.reproject_overlays(|p| {
            Point::new(
                (p.x - tx) * factor + tx,
                (p.y - ty) * factor + ty,
            )
        });
    }

    /// Translates overlay elements along with an image pan. Elements
    /// belonging to the active tool stay put so the user can position them
    /// against the moving image, matching the zoom re-projection rule.
    fn offset_overlays(&mut self, dx: f32, dy: f32) {
        self.reproject_overlays(|p| Point::new(p.x + dx, p.y + dy));
    }

    fn reproject_overlays(&mut self, project: impl Fn(Point) -> Point) {
        if self.tool != ToolMode::Text {
            for element in &mut self.texts {
                element.position = project(element.position);
            }
        }
        if self.tool != ToolMode::Sticker {
            for element in &mut self.stickers {
                element.position = project(element.position);
            }
        }
    }

    /// Directly sets the view transform. Exposed for hosts that restore a
    /// saved viewport.
    pub fn set_transform(&mut self, transform: AffineTransform) {
        self.transform = transform;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::sticker::StickerId;
    use crate::testutil::{gradient_image, test_editor};

    fn editor_with_image(view: f32) -> Editor {
        let mut editor = test_editor(view, view);
        editor.load_image(gradient_image(100, 100));
        editor
    }

    #[test]
    fn test_pan_translates_transform() {
        let mut editor = editor_with_image(1000.0);
        let (tx0, ty0) = editor.transform().translation_part();
        editor.pointer_down(Point::new(100.0, 100.0));
        editor.pointer_move(Point::new(130.0, 90.0));
        editor.pointer_up(Point::new(130.0, 90.0));
        let (tx, ty) = editor.transform().translation_part();
        assert!((tx - (tx0 + 30.0)).abs() < 1e-4);
        assert!((ty - (ty0 - 10.0)).abs() < 1e-4);
    }

    #[test]
    fn test_short_pan_is_a_tap() {
        let mut editor = editor_with_image(1000.0);
        editor.pointer_down(Point::new(100.0, 100.0));
        editor.pointer_move(Point::new(101.0, 100.0));
        editor.pointer_up(Point::new(101.0, 100.0));
        assert!(editor
            .take_events()
            .contains(&EditorEvent::Tapped));
    }

    #[test]
    fn test_long_pan_is_not_a_tap() {
        let mut editor = editor_with_image(1000.0);
        editor.pointer_down(Point::new(100.0, 100.0));
        editor.pointer_move(Point::new(150.0, 100.0));
        editor.pointer_up(Point::new(150.0, 100.0));
        assert!(!editor.take_events().contains(&EditorEvent::Tapped));
    }

    #[test]
    fn test_pan_carries_overlays_in_view_mode() {
        let mut editor = editor_with_image(1000.0);
        editor.enter_text_mode();
        let id = editor.add_text("hi");
        editor.exit_text_mode();
        let before = editor.text_elements()[0].position;

        editor.pointer_down(Point::new(200.0, 200.0));
        editor.pointer_move(Point::new(240.0, 215.0));
        editor.pointer_up(Point::new(240.0, 215.0));

        let after = editor.text_elements()[0].position;
        assert!((after.x - (before.x + 40.0)).abs() < 1e-4);
        assert!((after.y - (before.y + 15.0)).abs() < 1e-4);
        let _ = id;
    }

    #[test]
    fn test_zoom_rejected_outside_scale_range() {
        let mut editor = editor_with_image(1000.0);
        // fit_center scale is 10; clamp range above it so nothing moves.
        editor.set_scale_range(0.3, 2.0);
        let before = *editor.transform();
        editor.pinch_begin(Point::new(500.0, 500.0));
        editor.pinch_update(Point::new(500.0, 500.0), 1.5);
        editor.pinch_end();
        assert_eq!(*editor.transform(), before);
    }

    #[test]
    fn test_zoom_usable_when_fit_scale_exceeds_default_range() {
        // A 100x100 image in a 1000x1000 view loads at fit scale 10, far
        // above the default maximum; loading widens the range so pinching
        // out still works.
        let mut editor = editor_with_image(1000.0);
        assert!((editor.current_scale() - 10.0).abs() < 1e-4);

        editor.pinch_begin(Point::new(500.0, 500.0));
        editor.pinch_update(Point::new(500.0, 500.0), 0.9);
        editor.pinch_end();
        assert!((editor.current_scale() - 9.0).abs() < 1e-3);

        // The widened maximum is the fit scale itself; a step that would
        // land past it (9.0 * 1.2 = 10.8 > 10) is still rejected.
        editor.pinch_begin(Point::new(500.0, 500.0));
        editor.pinch_update(Point::new(500.0, 500.0), 1.2);
        editor.pinch_end();
        assert!((editor.current_scale() - 9.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_applies_within_range() {
        let mut editor = editor_with_image(1000.0);
        editor.set_scale_range(0.3, 50.0);
        let before = editor.current_scale();
        editor.pinch_begin(Point::new(500.0, 500.0));
        editor.pinch_update(Point::new(500.0, 500.0), 1.5);
        editor.pinch_end();
        assert!((editor.current_scale() - before * 1.5).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_reprojects_overlays_about_focus() {
        let mut editor = editor_with_image(1000.0);
        editor.set_scale_range(0.3, 50.0);
        editor.enter_text_mode();
        editor.add_text("hi");
        editor.exit_text_mode();
        // Element at view center (500, 500).
        editor.pinch_begin(Point::new(0.0, 0.0));
        editor.pinch_update(Point::new(0.0, 0.0), 2.0);
        editor.pinch_end();
        let pos = editor.text_elements()[0].position;
        assert!((pos.x - 1000.0).abs() < 1e-3);
        assert!((pos.y - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_active_tool_elements_do_not_follow_pan() {
        let mut editor = editor_with_image(1000.0);
        editor.enter_sticker_mode();
        editor.add_sticker(StickerId(1)).unwrap();
        // Deselect so the pointer drag becomes a pan rejection in sticker
        // mode; switch to view for texts but keep sticker tool.
        let before = editor.sticker_elements()[0].position;
        editor.exit_sticker_mode();
        editor.enter_text_mode();
        editor.add_text("t");
        let text_before = editor.text_elements()[0].position;

        // Text tool active: pan via pinch-zoom of the image moves
        // stickers but not texts.
        editor.set_scale_range(0.3, 50.0);
        editor.pinch_begin(Point::new(0.0, 0.0));
        editor.pinch_update(Point::new(0.0, 0.0), 2.0);
        editor.pinch_end();

        assert_eq!(editor.text_elements()[0].position, text_before);
        let sticker_after = editor.sticker_elements()[0].position;
        assert!((sticker_after.x - before.x * 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_crop_drag_and_resize_dispatch() {
        let mut editor = editor_with_image(1000.0);
        editor.enter_crop_mode();
        let rect = editor.crop_state().unwrap().rect;
        let center = rect.center();

        editor.pointer_down(center);
        assert!(matches!(
            editor.gesture_state(),
            GestureState::CropDragging { .. }
        ));
        editor.pointer_move(Point::new(center.x + 10.0, center.y));
        assert!((editor.crop_state().unwrap().rect.left - (rect.left + 10.0)).abs() < 1e-4);
        editor.pointer_up(Point::new(center.x + 10.0, center.y));

        let rect = editor.crop_state().unwrap().rect;
        editor.pointer_down(Point::new(rect.left + 5.0, rect.top + 5.0));
        assert!(matches!(
            editor.gesture_state(),
            GestureState::CropResizing {
                corner: CropCorner::TopLeft,
                ..
            }
        ));
        editor.pointer_cancel();
    }

    #[test]
    fn test_crop_gesture_outside_frame_is_idle() {
        let mut editor = editor_with_image(1000.0);
        editor.enter_crop_mode();
        editor.pointer_down(Point::new(1.0, 1.0));
        assert_eq!(*editor.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn test_text_tap_activates_selected_element() {
        let mut editor = editor_with_image(1000.0);
        editor.enter_text_mode();
        let id = editor.add_text("hello");
        editor.take_events();
        let pos = editor.selected_text().unwrap().position;

        editor.pointer_down(pos);
        editor.pointer_up(Point::new(pos.x + 1.0, pos.y));
        assert!(editor
            .take_events()
            .contains(&EditorEvent::TextActivated(id)));
    }

    #[test]
    fn test_text_drag_moves_element_without_activation() {
        let mut editor = editor_with_image(1000.0);
        editor.enter_text_mode();
        editor.add_text("hello");
        editor.take_events();
        let pos = editor.selected_text().unwrap().position;

        editor.pointer_down(pos);
        editor.pointer_move(Point::new(pos.x + 50.0, pos.y + 20.0));
        editor.pointer_up(Point::new(pos.x + 50.0, pos.y + 20.0));

        let moved = editor.selected_text().unwrap().position;
        assert!((moved.x - (pos.x + 50.0)).abs() < 1e-4);
        assert!((moved.y - (pos.y + 20.0)).abs() < 1e-4);
        assert!(!editor
            .take_events()
            .iter()
            .any(|e| matches!(e, EditorEvent::TextActivated(_))));
    }

    #[test]
    fn test_press_outside_text_deselects() {
        let mut editor = editor_with_image(1000.0);
        editor.enter_text_mode();
        editor.add_text("hello");
        editor.take_events();
        editor.pointer_down(Point::new(5.0, 5.0));
        assert_eq!(editor.selected_text_id(), None);
        assert!(editor
            .take_events()
            .contains(&EditorEvent::TextDeselected));
    }

    #[test]
    fn test_text_rotate_handle_starts_rotation() {
        let mut editor = editor_with_image(1000.0);
        editor.enter_text_mode();
        editor.add_text("hello");
        let handle = editor
            .selected_text()
            .unwrap()
            .rotate_handle_position(editor.fonts.as_ref());
        editor.pointer_down(handle);
        assert!(matches!(
            editor.gesture_state(),
            GestureState::TextRotating { .. }
        ));
        // Sweep the pointer a quarter turn around the center.
        let center = editor.selected_text().unwrap().position;
        let radius = distance(center, handle);
        editor.pointer_move(Point::new(center.x + radius, center.y));
        let rotation = editor.selected_text().unwrap().rotation;
        // Handle starts at +90 deg (below center); moving to 0 deg swings
        // rotation by -90.
        assert!((rotation - (-90.0)).abs() < 1.0);
        editor.pointer_up(Point::new(center.x + radius, center.y));
    }

    #[test]
    fn test_text_corner_resize_scales_with_distance() {
        let mut editor = editor_with_image(1000.0);
        editor.enter_text_mode();
        editor.add_text("hello");
        let element = editor.selected_text().unwrap();
        let center = element.position;
        let corner = element.bounds(editor.fonts.as_ref()).corners()[3];

        editor.pointer_down(corner);
        assert!(matches!(
            editor.gesture_state(),
            GestureState::TextResizing { .. }
        ));
        // Doubling the distance from center doubles the scale (clamped).
        let far = Point::new(
            center.x + (corner.x - center.x) * 2.0,
            center.y + (corner.y - center.y) * 2.0,
        );
        editor.pointer_move(far);
        let scale = editor.selected_text().unwrap().scale;
        assert!((scale - 2.0).abs() < 1e-3);
        editor.pointer_up(far);
    }

    #[test]
    fn test_text_pinch_scales_selected_element() {
        let mut editor = editor_with_image(1000.0);
        editor.enter_text_mode();
        editor.add_text("hello");
        let pos = editor.selected_text().unwrap().position;

        editor.pinch_begin(pos);
        assert!(matches!(
            editor.gesture_state(),
            GestureState::TextPinching { .. }
        ));
        editor.pinch_update(pos, 1.5);
        assert!((editor.selected_text().unwrap().scale - 1.5).abs() < 1e-5);
        // Clamped at the upper bound.
        editor.pinch_update(pos, 100.0);
        assert!((editor.selected_text().unwrap().scale - MAX_TEXT_SCALE).abs() < 1e-5);
        editor.pinch_end();
    }

    #[test]
    fn test_text_pinch_off_element_zooms_image() {
        let mut editor = editor_with_image(1000.0);
        editor.set_scale_range(0.3, 50.0);
        editor.enter_text_mode();
        editor.add_text("hello");
        editor.pinch_begin(Point::new(5.0, 5.0));
        assert_eq!(*editor.gesture_state(), GestureState::Pinching);
    }

    #[test]
    fn test_sticker_drag_and_select() {
        let mut editor = editor_with_image(1000.0);
        editor.enter_sticker_mode();
        let id = editor.add_sticker(StickerId(1)).unwrap();
        editor.take_events();
        // Deselect, then press the body again to reselect.
        editor.pointer_down(Point::new(5.0, 5.0));
        assert_eq!(editor.selected_sticker_id(), None);
        editor.pointer_up(Point::new(5.0, 5.0));

        let pos = editor.sticker_elements()[0].position;
        editor.pointer_down(pos);
        assert_eq!(editor.selected_sticker_id(), Some(id));
        assert!(editor
            .take_events()
            .contains(&EditorEvent::StickerSelected(id)));
        editor.pointer_move(Point::new(pos.x + 25.0, pos.y));
        assert!(
            (editor.sticker_elements()[0].position.x - (pos.x + 25.0)).abs() < 1e-4
        );
        editor.pointer_up(Point::new(pos.x + 25.0, pos.y));
    }

    #[test]
    fn test_sticker_corner_scales_from_initial_distance() {
        let mut editor = editor_with_image(1000.0);
        editor.enter_sticker_mode();
        editor.add_sticker(StickerId(1)).unwrap();
        let element = editor.selected_sticker().unwrap();
        let center = element.position;
        let corner = element.rotated_corners()[3];
        let start_scale = element.scale();

        editor.pointer_down(corner);
        assert!(matches!(
            editor.gesture_state(),
            GestureState::StickerScaling { .. }
        ));
        let far = Point::new(
            center.x + (corner.x - center.x) * 3.0,
            center.y + (corner.y - center.y) * 3.0,
        );
        editor.pointer_move(far);
        let scale = editor.selected_sticker().unwrap().scale();
        assert!((scale - start_scale * 3.0).abs() < 1e-3);
        editor.pointer_up(far);
    }

    #[test]
    fn test_sticker_rotate_handle_starts_rotation() {
        let mut editor = editor_with_image(1000.0);
        editor.enter_sticker_mode();
        editor.add_sticker(StickerId(1)).unwrap();
        let handle = editor.selected_sticker().unwrap().rotate_handle_position();
        editor.pointer_down(handle);
        assert!(matches!(
            editor.gesture_state(),
            GestureState::StickerRotating { .. }
        ));
        editor.pointer_cancel();
        assert_eq!(*editor.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn test_crop_pinch_resizes_frame() {
        let mut editor = editor_with_image(1000.0);
        editor.enter_crop_mode();
        let before = editor.crop_state().unwrap().rect;
        let center = before.center();
        editor.pinch_begin(center);
        editor.pinch_update(center, 0.9);
        editor.pinch_end();
        let after = editor.crop_state().unwrap().rect;
        assert!(after.width() < before.width());
    }

    #[test]
    fn test_bad_pinch_factor_ignored() {
        let mut editor = editor_with_image(1000.0);
        editor.set_scale_range(0.0, 1000.0);
        let before = *editor.transform();
        editor.pinch_begin(Point::new(500.0, 500.0));
        editor.pinch_update(Point::new(500.0, 500.0), 0.0);
        editor.pinch_update(Point::new(500.0, 500.0), f32::NAN);
        editor.pinch_end();
        assert_eq!(*editor.transform(), before);
    }
}
