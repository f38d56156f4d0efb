//! The editor aggregate: owns all mutable editing state and exposes the
//! operations the host shell drives.
//!
//! # Bitmap tiers
//!
//! Two pixel buffers are held per loaded image. The *canonical* bitmap is
//! ground truth: assigned on load and replaced only by commit operations
//! (crop confirm, overlay confirm, rotate/flip). The *display* bitmap is
//! derived from it by the color pipeline and is what the preview
//! compositor draws. Effect recomputation always sources canonical so
//! brightness/contrast/filter never compound.
//!
//! # Deferred display swap
//!
//! Effect recomputation writes its result into a single pending slot; a
//! newer recomputation replaces an older queued one. [`Editor::tick`]
//! applies the newest pending bitmap, preserving the transform across the
//! swap. Commit operations swap synchronously instead.

use image::{imageops, RgbaImage};
use tracing::{debug, warn};

use crate::composite;
use crate::crop::{CropRatio, CropState};
use crate::geom::Point;
use crate::gesture::{GestureState, ToolMode};
use crate::overlay::sticker::{StickerElement, StickerId, StickerResolver};
use crate::overlay::text::{FontId, TextElement};
use crate::overlay::ElementId;
use crate::render::font::FontProvider;
use crate::transform::AffineTransform;
use crate::{EditError, EffectParams, Filter};

/// Default pinch-zoom scale range for the image transform.
pub const DEFAULT_MIN_SCALE: f32 = 0.3;
pub const DEFAULT_MAX_SCALE: f32 = 2.0;

/// Fire-and-forget notifications for the host, drained via
/// [`Editor::take_events`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum EditorEvent {
    TextSelected(ElementId),
    TextDeselected,
    /// A tap on an already-selected text element; hosts open the edit
    /// dialog on this.
    TextActivated(ElementId),
    StickerAdded(ElementId),
    StickerSelected(ElementId),
    /// A tap on the bare image outside any element.
    Tapped,
}

pub struct Editor {
    pub(crate) view_w: f32,
    pub(crate) view_h: f32,

    pub(crate) transform: AffineTransform,
    pub(crate) min_scale: f32,
    pub(crate) max_scale: f32,

    pub(crate) canonical: Option<RgbaImage>,
    pub(crate) display: Option<RgbaImage>,
    pending_display: Option<RgbaImage>,

    pub(crate) effects: EffectParams,

    pub(crate) tool: ToolMode,
    pub(crate) crop: Option<CropState>,
    crop_ratio: CropRatio,

    pub(crate) texts: Vec<TextElement>,
    pub(crate) selected_text: Option<ElementId>,
    pub(crate) stickers: Vec<StickerElement>,
    pub(crate) selected_sticker: Option<ElementId>,

    pub(crate) gesture: GestureState,
    events: Vec<EditorEvent>,

    pub(crate) fonts: Box<dyn FontProvider>,
    pub(crate) resolver: Box<dyn StickerResolver>,

    next_id: u64,
}

impl Editor {
    pub fn new(
        view_w: f32,
        view_h: f32,
        fonts: Box<dyn FontProvider>,
        resolver: Box<dyn StickerResolver>,
    ) -> Self {
        Self {
            view_w,
            view_h,
            transform: AffineTransform::identity(),
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            canonical: None,
            display: None,
            pending_display: None,
            effects: EffectParams::default(),
            tool: ToolMode::View,
            crop: None,
            crop_ratio: CropRatio::Free,
            texts: Vec::new(),
            selected_text: None,
            stickers: Vec::new(),
            selected_sticker: None,
            gesture: GestureState::Idle,
            events: Vec::new(),
            fonts,
            resolver,
            next_id: 1,
        }
    }

    pub fn view_size(&self) -> (f32, f32) {
        (self.view_w, self.view_h)
    }

    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    /// Current image scale, rotation-aware.
    pub fn current_scale(&self) -> f32 {
        self.transform.scale()
    }

    pub fn set_scale_range(&mut self, min_scale: f32, max_scale: f32) {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn gesture_state(&self) -> &GestureState {
        &self.gesture
    }

    fn alloc_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn push_event(&mut self, event: EditorEvent) {
        self.events.push(event);
    }

    /// Drains queued host notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- image load and bitmaps ----

    /// Resets the transform to fit-center and widens the scale range to
    /// include the fit scale, which falls outside the configured range
    /// for images much smaller or larger than the view. Without the
    /// widening every subsequent pinch step would start from an
    /// out-of-range scale and be rejected.
    fn fit_view(&mut self, img_w: f32, img_h: f32) {
        self.transform = AffineTransform::fit_center(img_w, img_h, self.view_w, self.view_h);
        let fit = self.transform.scale();
        self.min_scale = self.min_scale.min(fit);
        self.max_scale = self.max_scale.max(fit);
    }

    /// Loads a new image, resetting transform, effects, crop and overlays.
    /// The scale range returns to the defaults, widened if the fit scale
    /// lands outside them.
    pub fn load_image(&mut self, image: RgbaImage) {
        self.min_scale = DEFAULT_MIN_SCALE;
        self.max_scale = DEFAULT_MAX_SCALE;
        self.fit_view(image.width() as f32, image.height() as f32);
        self.display = Some(image.clone());
        self.canonical = Some(image);
        self.pending_display = None;
        self.effects = EffectParams::default();
        self.tool = ToolMode::View;
        self.crop = None;
        self.texts.clear();
        self.stickers.clear();
        self.selected_text = None;
        self.selected_sticker = None;
        self.gesture = GestureState::Idle;
    }

    pub fn has_image(&self) -> bool {
        self.canonical.is_some()
    }

    /// The currently displayed (effect-composited) bitmap.
    pub fn display_bitmap(&self) -> Option<&RgbaImage> {
        self.display.as_ref()
    }

    pub fn canonical_bitmap(&self) -> Option<&RgbaImage> {
        self.canonical.as_ref()
    }

    /// Applies the newest pending display bitmap, if any. The transform is
    /// untouched, so pan/zoom survives the swap.
    pub fn tick(&mut self) {
        if let Some(image) = self.pending_display.take() {
            self.display = Some(image);
        }
    }

    pub(crate) fn has_pending_display(&self) -> bool {
        self.pending_display.is_some()
    }

    // ---- color effects ----

    pub fn brightness(&self) -> i32 {
        self.effects.brightness
    }

    pub fn contrast(&self) -> i32 {
        self.effects.contrast
    }

    pub fn filter(&self) -> Filter {
        self.effects.filter
    }

    pub fn effect_params(&self) -> EffectParams {
        self.effects
    }

    pub fn set_brightness(&mut self, brightness: i32) {
        self.effects.brightness = brightness;
        self.schedule_effects();
    }

    pub fn set_contrast(&mut self, contrast: i32) {
        self.effects.contrast = contrast;
        self.schedule_effects();
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.effects.filter = filter;
        self.schedule_effects();
    }

    /// Recomputes the display bitmap from canonical and queues it for the
    /// next [`tick`]. A queued result that was never applied is replaced.
    ///
    /// [`tick`]: Editor::tick
    fn schedule_effects(&mut self) {
        let Some(canonical) = &self.canonical else {
            return;
        };
        debug!(
            brightness = self.effects.brightness,
            contrast = self.effects.contrast,
            filter = ?self.effects.filter,
            "recomputing display bitmap"
        );
        self.pending_display = Some(composite::recompute_display(canonical, &self.effects));
    }

    /// Recomputes and swaps the display synchronously; used by commits.
    fn refresh_display_now(&mut self) {
        if let Some(canonical) = &self.canonical {
            self.display = Some(composite::recompute_display(canonical, &self.effects));
            self.pending_display = None;
        }
    }

    // ---- crop ----

    pub fn enter_crop_mode(&mut self) {
        self.crop = Some(CropState::init(self.view_w, self.view_h, self.crop_ratio));
        self.tool = ToolMode::Crop;
    }

    pub fn exit_crop_mode(&mut self) {
        self.crop = None;
        if self.tool == ToolMode::Crop {
            self.tool = ToolMode::View;
        }
    }

    pub fn crop_state(&self) -> Option<&CropState> {
        self.crop.as_ref()
    }

    /// Remembers the ratio and re-centers the live frame if crop mode is
    /// active.
    pub fn set_crop_ratio(&mut self, ratio: CropRatio) {
        self.crop_ratio = ratio;
        if let Some(crop) = &mut self.crop {
            crop.set_ratio(ratio);
        }
    }

    /// Commits the crop: maps the view-space frame into canonical pixel
    /// space through the inverse transform, replaces canonical with the
    /// cropped region, recenters the view on it and re-applies effects.
    /// Returns the cropped dimensions. Crop mode is exited on every path;
    /// failure leaves the canonical bitmap untouched.
    pub fn confirm_crop(&mut self) -> Result<(u32, u32), EditError> {
        let result = self.perform_crop();
        self.exit_crop_mode();
        result
    }

    fn perform_crop(&mut self) -> Result<(u32, u32), EditError> {
        let crop = self.crop.as_ref().ok_or(EditError::NotInCropMode)?;
        let canonical = self.canonical.as_ref().ok_or(EditError::NoImage)?;
        let inverse = self
            .transform
            .invert()
            .ok_or(EditError::NonInvertibleTransform)?;

        let top_left = inverse.map_point(Point::new(crop.rect.left, crop.rect.top));
        let bottom_right = inverse.map_point(Point::new(crop.rect.right, crop.rect.bottom));

        let left = (top_left.x as i64).max(0);
        let top = (top_left.y as i64).max(0);
        let right = (bottom_right.x as i64).min(canonical.width() as i64);
        let bottom = (bottom_right.y as i64).min(canonical.height() as i64);

        let width = right - left;
        let height = bottom - top;
        if width <= 0 || height <= 0 {
            return Err(EditError::DegenerateCrop);
        }
        let (width, height) = (width as u32, height as u32);

        let cropped =
            imageops::crop_imm(canonical, left as u32, top as u32, width, height).to_image();
        debug!(width, height, "crop committed");

        self.canonical = Some(cropped);
        self.fit_view(width as f32, height as f32);
        self.refresh_display_now();
        Ok((width, height))
    }

    // ---- text elements ----

    pub fn enter_text_mode(&mut self) {
        self.tool = ToolMode::Text;
    }

    pub fn exit_text_mode(&mut self) {
        if self.tool == ToolMode::Text {
            self.tool = ToolMode::View;
        }
        self.select_text(None);
    }

    /// Adds a text element at the view center and selects it.
    pub fn add_text(&mut self, text: impl Into<String>) -> ElementId {
        let center = Point::new(self.view_w / 2.0, self.view_h / 2.0);
        self.add_text_at(text, center)
    }

    pub fn add_text_at(&mut self, text: impl Into<String>, position: Point) -> ElementId {
        let id = self.alloc_id();
        self.texts.push(TextElement::new(id, text, position));
        self.select_text(Some(id));
        id
    }

    pub fn text_elements(&self) -> &[TextElement] {
        &self.texts
    }

    pub fn selected_text_id(&self) -> Option<ElementId> {
        self.selected_text
    }

    pub fn selected_text(&self) -> Option<&TextElement> {
        let id = self.selected_text?;
        self.texts.iter().find(|t| t.id == id)
    }

    pub(crate) fn selected_text_mut(&mut self) -> Option<&mut TextElement> {
        let id = self.selected_text?;
        self.texts.iter_mut().find(|t| t.id == id)
    }

    /// Changes the selection, emitting selection events on transitions.
    pub fn select_text(&mut self, id: Option<ElementId>) {
        if self.selected_text == id {
            return;
        }
        self.selected_text = id;
        match id {
            Some(id) => self.push_event(EditorEvent::TextSelected(id)),
            None => self.push_event(EditorEvent::TextDeselected),
        }
    }

    pub fn remove_selected_text(&mut self) {
        if let Some(id) = self.selected_text {
            self.texts.retain(|t| t.id != id);
            self.selected_text = None;
            self.push_event(EditorEvent::TextDeselected);
        }
    }

    pub fn update_selected_text_content(&mut self, text: impl Into<String>) {
        if let Some(element) = self.selected_text_mut() {
            element.text = text.into();
        }
    }

    pub fn update_selected_text_font(&mut self, font: FontId) {
        if let Some(element) = self.selected_text_mut() {
            element.font = font;
        }
    }

    pub fn update_selected_text_size(&mut self, size: f32) {
        if let Some(element) = self.selected_text_mut() {
            element.size = size;
        }
    }

    pub fn update_selected_text_color(&mut self, color: [u8; 3]) {
        if let Some(element) = self.selected_text_mut() {
            element.color = color;
        }
    }

    pub fn update_selected_text_alpha(&mut self, alpha: u8) {
        if let Some(element) = self.selected_text_mut() {
            element.alpha = alpha;
        }
    }

    /// Bakes every text element into the canonical bitmap, re-applies the
    /// active effects and clears the list. An empty list is a no-op.
    pub fn confirm_texts(&mut self) -> Result<(), EditError> {
        if self.texts.is_empty() {
            self.select_text(None);
            return Ok(());
        }
        let canonical = self.canonical.as_ref().ok_or(EditError::NoImage)?;

        let baked = composite::bake_texts(
            canonical,
            &self.texts,
            self.view_w,
            self.view_h,
            self.fonts.as_ref(),
        );
        debug!(count = self.texts.len(), "text elements baked");

        self.canonical = Some(baked);
        self.texts.clear();
        self.select_text(None);
        self.refresh_display_now();
        Ok(())
    }

    // ---- sticker elements ----

    pub fn enter_sticker_mode(&mut self) {
        self.tool = ToolMode::Sticker;
    }

    pub fn exit_sticker_mode(&mut self) {
        if self.tool == ToolMode::Sticker {
            self.tool = ToolMode::View;
        }
        self.selected_sticker = None;
    }

    /// Adds a sticker at the view center, sized so its longest side shows
    /// at the fixed base size, and selects it. Fails if the resource
    /// cannot be resolved.
    pub fn add_sticker(&mut self, resource: StickerId) -> Result<ElementId, EditError> {
        let bitmap = self
            .resolver
            .resolve(resource)
            .ok_or(EditError::MissingResource(resource))?;
        let (width, height) = (bitmap.width() as f32, bitmap.height() as f32);

        let id = self.alloc_id();
        let center = Point::new(self.view_w / 2.0, self.view_h / 2.0);
        self.stickers
            .push(StickerElement::new(id, resource, center, width, height));
        self.selected_sticker = Some(id);
        self.push_event(EditorEvent::StickerAdded(id));
        Ok(id)
    }

    pub fn sticker_elements(&self) -> &[StickerElement] {
        &self.stickers
    }

    pub fn selected_sticker_id(&self) -> Option<ElementId> {
        self.selected_sticker
    }

    pub fn selected_sticker(&self) -> Option<&StickerElement> {
        let id = self.selected_sticker?;
        self.stickers.iter().find(|s| s.id == id)
    }

    pub(crate) fn selected_sticker_mut(&mut self) -> Option<&mut StickerElement> {
        let id = self.selected_sticker?;
        self.stickers.iter_mut().find(|s| s.id == id)
    }

    pub fn remove_selected_sticker(&mut self) {
        if let Some(id) = self.selected_sticker {
            self.stickers.retain(|s| s.id != id);
            self.selected_sticker = None;
        }
    }

    /// Bakes every sticker into the canonical bitmap, re-applies effects
    /// and clears the list. Stickers whose resource no longer resolves are
    /// skipped. An empty list only clears the selection.
    pub fn confirm_stickers(&mut self) -> Result<(), EditError> {
        if self.stickers.is_empty() {
            self.selected_sticker = None;
            return Ok(());
        }
        let canonical = self.canonical.as_ref().ok_or(EditError::NoImage)?;

        let (baked, skipped) = composite::bake_stickers(
            canonical,
            &self.stickers,
            self.view_w,
            self.view_h,
            self.resolver.as_ref(),
        );
        if skipped > 0 {
            warn!(skipped, "stickers skipped during bake: resource missing");
        }
        debug!(count = self.stickers.len() - skipped, "stickers baked");

        self.canonical = Some(baked);
        self.stickers.clear();
        self.selected_sticker = None;
        self.refresh_display_now();
        Ok(())
    }

    // ---- lossless rotate / flip ----

    /// Rotates the canonical bitmap 90° clockwise and recenters the view.
    pub fn rotate_clockwise(&mut self) -> Result<(), EditError> {
        self.commit_pixels(|img| imageops::rotate90(img))
    }

    /// Rotates the canonical bitmap 90° counter-clockwise.
    pub fn rotate_counter_clockwise(&mut self) -> Result<(), EditError> {
        self.commit_pixels(|img| imageops::rotate270(img))
    }

    pub fn rotate_180(&mut self) -> Result<(), EditError> {
        self.commit_pixels(|img| imageops::rotate180(img))
    }

    pub fn flip_horizontal(&mut self) -> Result<(), EditError> {
        self.commit_pixels(|img| imageops::flip_horizontal(img))
    }

    pub fn flip_vertical(&mut self) -> Result<(), EditError> {
        self.commit_pixels(|img| imageops::flip_vertical(img))
    }

    /// Shared commit path for the lossless pixel-buffer operations:
    /// replace canonical, reset the transform to fit-center, re-apply
    /// effects.
    fn commit_pixels(
        &mut self,
        op: impl FnOnce(&RgbaImage) -> RgbaImage,
    ) -> Result<(), EditError> {
        let canonical = self.canonical.as_ref().ok_or(EditError::NoImage)?;
        let rotated = op(canonical);
        debug!(
            width = rotated.width(),
            height = rotated.height(),
            "pixel-buffer commit"
        );
        self.fit_view(rotated.width() as f32, rotated.height() as f32);
        self.canonical = Some(rotated);
        self.refresh_display_now();
        Ok(())
    }

    // ---- compositors ----

    /// View-resolution composite of the display bitmap, un-baked overlays
    /// and active chrome.
    pub fn preview(&self) -> Result<RgbaImage, EditError> {
        composite::render_preview(self)
    }

    /// Full-resolution export: canonical with effects baked in plus any
    /// still-pending overlay elements projected into image space.
    pub fn export(&self) -> Result<RgbaImage, EditError> {
        composite::render_export(self)
    }
}
