//! Compositing pipelines: display recomputation, overlay baking, and the
//! preview/export renders.
//!
//! Overlay elements live in view coordinates; baking and export project
//! them into image space with the view-to-image size ratio so a committed
//! or exported element lands exactly where the preview showed it.

use image::RgbaImage;
use tracing::warn;

use crate::color::{apply_color_matrix, effect_matrix};
use crate::editor::Editor;
use crate::geom::Point;
use crate::overlay::sticker::{StickerElement, StickerResolver};
use crate::overlay::text::TextElement;
use crate::render::font::FontProvider;
use crate::render::raster::RasterCanvas;
use crate::render::{
    draw_crop_overlay, draw_sticker_chrome, draw_sticker_element, draw_text_chrome,
    draw_text_element, Paint, Surface,
};
use crate::{EditError, EffectParams};

/// Applies the effect pipeline to the canonical bitmap. Identity
/// parameters shortcut to a plain copy inside the matrix apply.
pub(crate) fn recompute_display(canonical: &RgbaImage, effects: &EffectParams) -> RgbaImage {
    let matrix = effect_matrix(effects.brightness, effects.contrast, effects.filter);
    apply_color_matrix(canonical, &matrix)
}

/// Per-axis view-to-image position ratios. Positions scale on their own
/// axis; sizes and wrap widths follow the horizontal ratio `sx`.
struct Projection {
    sx: f32,
    sy: f32,
}

impl Projection {
    fn new(image: &RgbaImage, view_w: f32, view_h: f32) -> Self {
        Self {
            sx: image.width() as f32 / view_w,
            sy: image.height() as f32 / view_h,
        }
    }

    fn text(&self, element: &TextElement) -> TextElement {
        let mut projected = element.clone();
        projected.position = Point::new(element.position.x * self.sx, element.position.y * self.sy);
        projected.scale = element.scale * self.sx;
        projected
    }

    fn sticker(&self, element: &StickerElement) -> StickerElement {
        let mut projected = element.clone();
        projected.position = Point::new(element.position.x * self.sx, element.position.y * self.sy);
        projected.set_scale(element.scale() * self.sx);
        projected
    }
}

/// Renders every text element into a copy of `canonical` at image-space
/// positions and sizes.
pub(crate) fn bake_texts(
    canonical: &RgbaImage,
    texts: &[TextElement],
    view_w: f32,
    view_h: f32,
    fonts: &dyn FontProvider,
) -> RgbaImage {
    let projection = Projection::new(canonical, view_w, view_h);
    let mut canvas = RasterCanvas::from_image(canonical.clone());
    for element in texts {
        draw_text_element(&mut canvas, &projection.text(element), fonts);
    }
    canvas.into_image()
}

/// Renders every resolvable sticker into a copy of `canonical`. Returns
/// the baked bitmap and how many stickers were skipped for a missing
/// resource.
pub(crate) fn bake_stickers(
    canonical: &RgbaImage,
    stickers: &[StickerElement],
    view_w: f32,
    view_h: f32,
    resolver: &dyn StickerResolver,
) -> (RgbaImage, usize) {
    let projection = Projection::new(canonical, view_w, view_h);
    let mut canvas = RasterCanvas::from_image(canonical.clone());
    let mut skipped = 0;
    for element in stickers {
        match resolver.resolve(element.resource) {
            Some(bitmap) => {
                draw_sticker_element(&mut canvas, &projection.sticker(element), &bitmap)
            }
            None => {
                warn!(resource = ?element.resource, "sticker resource missing, skipping");
                skipped += 1;
            }
        }
    }
    (canvas.into_image(), skipped)
}

/// View-resolution frame: the display bitmap drawn through the view
/// transform, then overlays, selection chrome and the crop frame.
pub(crate) fn render_preview(editor: &Editor) -> Result<RgbaImage, EditError> {
    let display = editor.display.as_ref().ok_or(EditError::NoImage)?;
    let (view_w, view_h) = (editor.view_w, editor.view_h);
    let mut canvas = RasterCanvas::new(view_w as u32, view_h as u32);

    canvas.save();
    canvas.concat(&editor.transform);
    canvas.draw_bitmap(display, 0.0, 0.0, &Paint::default());
    canvas.restore();

    for element in &editor.texts {
        draw_text_element(&mut canvas, element, editor.fonts.as_ref());
    }
    if let Some(selected) = editor.selected_text() {
        draw_text_chrome(&mut canvas, selected, editor.fonts.as_ref());
    }

    for element in &editor.stickers {
        match editor.resolver.resolve(element.resource) {
            Some(bitmap) => draw_sticker_element(&mut canvas, element, &bitmap),
            None => warn!(resource = ?element.resource, "sticker resource missing, skipping"),
        }
    }
    if let Some(selected) = editor.selected_sticker() {
        draw_sticker_chrome(&mut canvas, selected);
    }

    if let Some(crop) = &editor.crop {
        draw_crop_overlay(&mut canvas, crop, view_w, view_h);
    }

    Ok(canvas.into_image())
}

/// Full-resolution frame: canonical with effects baked in plus any still
/// unconfirmed overlays projected into image space. No chrome, no crop
/// frame.
pub(crate) fn render_export(editor: &Editor) -> Result<RgbaImage, EditError> {
    let canonical = editor.canonical.as_ref().ok_or(EditError::NoImage)?;
    let base = recompute_display(canonical, &editor.effects);

    let with_texts = if editor.texts.is_empty() {
        base
    } else {
        bake_texts(
            &base,
            &editor.texts,
            editor.view_w,
            editor.view_h,
            editor.fonts.as_ref(),
        )
    };
    if editor.stickers.is_empty() {
        return Ok(with_texts);
    }
    let (with_stickers, skipped) = bake_stickers(
        &with_texts,
        &editor.stickers,
        editor.view_w,
        editor.view_h,
        editor.resolver.as_ref(),
    );
    if skipped > 0 {
        warn!(skipped, "stickers skipped during export");
    }
    Ok(with_stickers)
}
