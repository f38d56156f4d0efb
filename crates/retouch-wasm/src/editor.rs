//! Editor WASM bindings.
//!
//! `JsEditor` wraps the core editor and exposes its operations to
//! TypeScript. Fonts and sticker bitmaps are registered through shared
//! handles so the host can add resources after construction; gesture
//! events are forwarded as plain coordinates and rendered frames come
//! back as [`JsFrame`] buffers.

use std::cell::RefCell;
use std::rc::Rc;

use image::RgbaImage;
use wasm_bindgen::prelude::*;

use retouch_core::render::font::{FontProvider, LineRaster};
use retouch_core::{
    AbGlyphFonts, Editor, FontId, MemoryStickerResolver, Point, StickerId, StickerResolver,
};

use crate::types::{crop_ratio_from_f32, filter_from_u8, font_from_u8, image_from_rgba, JsFrame};

/// Font registry shared between the editor and the host-facing wrapper.
struct SharedFonts(Rc<RefCell<AbGlyphFonts>>);

impl FontProvider for SharedFonts {
    fn measure(&self, font: FontId, size: f32, text: &str) -> f32 {
        self.0.borrow().measure(font, size, text)
    }

    fn ascent(&self, font: FontId, size: f32) -> f32 {
        self.0.borrow().ascent(font, size)
    }

    fn descent(&self, font: FontId, size: f32) -> f32 {
        self.0.borrow().descent(font, size)
    }

    fn raster_line(&self, font: FontId, size: f32, text: &str) -> LineRaster {
        self.0.borrow().raster_line(font, size, text)
    }
}

/// Sticker registry shared the same way.
struct SharedStickers(Rc<RefCell<MemoryStickerResolver>>);

impl StickerResolver for SharedStickers {
    fn resolve(&self, id: StickerId) -> Option<Rc<RgbaImage>> {
        self.0.borrow().resolve(id)
    }
}

/// The editor wrapper for JavaScript.
///
/// One instance owns the full editing session: the loaded image, the view
/// transform, effects, overlays and the gesture state machine.
#[wasm_bindgen]
pub struct JsEditor {
    inner: Editor,
    fonts: Rc<RefCell<AbGlyphFonts>>,
    stickers: Rc<RefCell<MemoryStickerResolver>>,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create an editor for a view surface of the given size, in CSS
    /// pixels.
    #[wasm_bindgen(constructor)]
    pub fn new(view_width: f32, view_height: f32) -> JsEditor {
        let fonts = Rc::new(RefCell::new(AbGlyphFonts::new()));
        let stickers = Rc::new(RefCell::new(MemoryStickerResolver::new()));
        let inner = Editor::new(
            view_width,
            view_height,
            Box::new(SharedFonts(Rc::clone(&fonts))),
            Box::new(SharedStickers(Rc::clone(&stickers))),
        );
        JsEditor {
            inner,
            fonts,
            stickers,
        }
    }

    /// Register a font face (TTF/OTF bytes) for a font slot.
    ///
    /// The first registered face also serves as the fallback for slots
    /// without one.
    pub fn register_font(&mut self, font: u8, bytes: Vec<u8>) -> Result<(), JsValue> {
        self.fonts
            .borrow_mut()
            .register_bytes(font_from_u8(font), bytes)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Register a sticker bitmap (RGBA bytes) under a resource id.
    pub fn register_sticker(
        &mut self,
        resource: u32,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<(), JsValue> {
        let bitmap =
            image_from_rgba(width, height, pixels).map_err(|e| JsValue::from_str(&e))?;
        self.stickers.borrow_mut().insert(StickerId(resource), bitmap);
        Ok(())
    }

    /// Load an image (RGBA bytes), resetting the whole session state.
    pub fn load_image(&mut self, width: u32, height: u32, pixels: Vec<u8>) -> Result<(), JsValue> {
        let image = image_from_rgba(width, height, pixels).map_err(|e| JsValue::from_str(&e))?;
        self.inner.load_image(image);
        Ok(())
    }

    // ---- effects ----

    /// Set brightness (-100 to 100) and queue a display recompute.
    pub fn set_brightness(&mut self, value: i32) {
        self.inner.set_brightness(value);
    }

    /// Set contrast (-50 to 150) and queue a display recompute.
    pub fn set_contrast(&mut self, value: i32) {
        self.inner.set_contrast(value);
    }

    /// Set the canned filter (see `filter_from_u8` docs for values).
    pub fn set_filter(&mut self, value: u8) {
        self.inner.set_filter(filter_from_u8(value));
    }

    /// Apply the newest queued display recompute, if any. Call once per
    /// animation frame before `preview`.
    pub fn tick(&mut self) {
        self.inner.tick();
    }

    // ---- gestures ----

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.inner.pointer_down(Point::new(x, y));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.inner.pointer_move(Point::new(x, y));
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.inner.pointer_up(Point::new(x, y));
    }

    pub fn pointer_cancel(&mut self) {
        self.inner.pointer_cancel();
    }

    pub fn pinch_begin(&mut self, focus_x: f32, focus_y: f32) {
        self.inner.pinch_begin(Point::new(focus_x, focus_y));
    }

    /// `factor` is the span ratio against the previous pinch update.
    pub fn pinch_update(&mut self, focus_x: f32, focus_y: f32, factor: f32) {
        self.inner.pinch_update(Point::new(focus_x, focus_y), factor);
    }

    pub fn pinch_end(&mut self) {
        self.inner.pinch_end();
    }

    /// Set the allowed pinch-zoom scale range for the image transform.
    pub fn set_scale_range(&mut self, min_scale: f32, max_scale: f32) {
        self.inner.set_scale_range(min_scale, max_scale);
    }

    // ---- crop ----

    pub fn enter_crop_mode(&mut self) {
        self.inner.enter_crop_mode();
    }

    pub fn exit_crop_mode(&mut self) {
        self.inner.exit_crop_mode();
    }

    /// Set the crop aspect ratio as width/height; zero or negative selects
    /// the free ratio. Re-centers the frame while crop mode is active.
    pub fn set_crop_ratio(&mut self, ratio: f32) {
        self.inner.set_crop_ratio(crop_ratio_from_f32(ratio));
    }

    /// Commit the crop. Returns `[width, height]` of the cropped image.
    pub fn confirm_crop(&mut self) -> Result<Vec<u32>, JsValue> {
        let (width, height) = self
            .inner
            .confirm_crop()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(vec![width, height])
    }

    // ---- text elements ----

    pub fn enter_text_mode(&mut self) {
        self.inner.enter_text_mode();
    }

    pub fn exit_text_mode(&mut self) {
        self.inner.exit_text_mode();
    }

    /// Add a text element at the view center; returns its element id.
    pub fn add_text(&mut self, text: &str) -> u64 {
        self.inner.add_text(text).0
    }

    pub fn remove_selected_text(&mut self) {
        self.inner.remove_selected_text();
    }

    pub fn set_text_content(&mut self, text: &str) {
        self.inner.update_selected_text_content(text);
    }

    /// Set the selected text's font slot (see `font_from_u8` docs).
    pub fn set_text_font(&mut self, font: u8) {
        self.inner.update_selected_text_font(font_from_u8(font));
    }

    pub fn set_text_size(&mut self, size: f32) {
        self.inner.update_selected_text_size(size);
    }

    pub fn set_text_color(&mut self, r: u8, g: u8, b: u8) {
        self.inner.update_selected_text_color([r, g, b]);
    }

    pub fn set_text_alpha(&mut self, alpha: u8) {
        self.inner.update_selected_text_alpha(alpha);
    }

    /// Bake all text elements into the image.
    pub fn confirm_texts(&mut self) -> Result<(), JsValue> {
        self.inner
            .confirm_texts()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    // ---- sticker elements ----

    pub fn enter_sticker_mode(&mut self) {
        self.inner.enter_sticker_mode();
    }

    pub fn exit_sticker_mode(&mut self) {
        self.inner.exit_sticker_mode();
    }

    /// Add a sticker by registered resource id; returns its element id.
    pub fn add_sticker(&mut self, resource: u32) -> Result<u64, JsValue> {
        self.inner
            .add_sticker(StickerId(resource))
            .map(|id| id.0)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn remove_selected_sticker(&mut self) {
        self.inner.remove_selected_sticker();
    }

    /// Bake all stickers into the image.
    pub fn confirm_stickers(&mut self) -> Result<(), JsValue> {
        self.inner
            .confirm_stickers()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    // ---- lossless rotate / flip ----

    pub fn rotate_clockwise(&mut self) -> Result<(), JsValue> {
        self.inner
            .rotate_clockwise()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn rotate_counter_clockwise(&mut self) -> Result<(), JsValue> {
        self.inner
            .rotate_counter_clockwise()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn rotate_180(&mut self) -> Result<(), JsValue> {
        self.inner
            .rotate_180()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn flip_horizontal(&mut self) -> Result<(), JsValue> {
        self.inner
            .flip_horizontal()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn flip_vertical(&mut self) -> Result<(), JsValue> {
        self.inner
            .flip_vertical()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    // ---- output ----

    /// Render the view-resolution preview frame.
    pub fn preview(&self) -> Result<JsFrame, JsValue> {
        self.inner
            .preview()
            .map(JsFrame::from_image)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Render the full-resolution export frame.
    pub fn export(&self) -> Result<JsFrame, JsValue> {
        self.inner
            .export()
            .map(JsFrame::from_image)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Drain queued editor events (selection changes, taps, activations)
    /// as an array of tagged objects.
    pub fn take_events(&mut self) -> Result<JsValue, JsValue> {
        let events = self.inner.take_events();
        serde_wasm_bindgen::to_value(&events).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Note: Functions returning `Result<T, JsValue>` only construct a
/// `JsValue` on their error path, so success paths are testable on native
/// targets; error paths live in the wasm-only tests below.
#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_editor() -> JsEditor {
        let mut editor = JsEditor::new(100.0, 100.0);
        editor
            .load_image(100, 100, vec![128u8; 100 * 100 * 4])
            .unwrap();
        editor
    }

    #[test]
    fn test_load_and_preview() {
        let mut editor = loaded_editor();
        editor.tick();
        let frame = editor.preview().unwrap();
        assert_eq!(frame.width(), 100);
        assert_eq!(frame.height(), 100);
    }

    #[test]
    fn test_crop_round_trip() {
        let mut editor = loaded_editor();
        editor.enter_crop_mode();
        let dims = editor.confirm_crop().unwrap();
        // Init frame covers the centered 80% square.
        assert_eq!(dims, vec![80, 80]);
    }

    #[test]
    fn test_registered_sticker_resolves() {
        let mut editor = loaded_editor();
        editor
            .register_sticker(7, 10, 10, vec![255u8; 400])
            .unwrap();
        editor.enter_sticker_mode();
        assert!(editor.add_sticker(7).is_ok());
    }

    #[test]
    fn test_effects_pipeline_over_boundary() {
        let mut editor = loaded_editor();
        editor.set_brightness(50);
        editor.tick();
        let frame = editor.preview().unwrap();
        // brightness 50 scales 128 by 1.5.
        assert_eq!(frame.pixels()[0], 192);
    }

    #[test]
    fn test_pan_gesture_over_boundary() {
        let mut editor = loaded_editor();
        editor.pointer_down(50.0, 50.0);
        editor.pointer_move(60.0, 50.0);
        editor.pointer_up(60.0, 50.0);
        editor.tick();
        let frame = editor.preview().unwrap();
        // Image shifted right: the exposed left column is transparent.
        assert_eq!(frame.pixels()[3], 0);
    }
}

/// WASM-specific tests for error paths, which materialize `JsValue`s.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn test_load_rejects_bad_buffer() {
        let mut editor = JsEditor::new(100.0, 100.0);
        assert!(editor.load_image(100, 100, vec![0u8; 7]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_preview_without_image_errors() {
        let editor = JsEditor::new(100.0, 100.0);
        assert!(editor.preview().is_err());
    }

    #[wasm_bindgen_test]
    fn test_unregistered_sticker_errors() {
        let mut editor = JsEditor::new(100.0, 100.0);
        editor
            .load_image(10, 10, vec![0u8; 400])
            .unwrap();
        editor.enter_sticker_mode();
        assert!(editor.add_sticker(99).is_err());
    }
}
