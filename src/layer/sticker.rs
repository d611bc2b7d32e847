//! Placed stickers and the selection decoration.

use std::f32::consts::SQRT_2;

use resvg::tiny_skia::{
    FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, StrokeDash, Transform,
};
use tracing::{debug, warn};

use super::{Layer, RenderContext};
use crate::compositor::RenderMode;
use crate::filter::blur::blur_premultiplied;
use crate::session::PlacedSticker;
use crate::surface::{image_to_pixmap, rgba};

/// Gap between the sticker edge and its selection outline.
const OUTLINE_GAP: f32 = 8.0;
const OUTLINE_WIDTH: f32 = 3.0;
const OUTLINE_DASH: [f32; 2] = [8.0, 4.0];
const HANDLE_SIZE: f32 = 8.0;
/// Half of a 15px canvas shadow blur.
const GLOW_SIGMA: f32 = 7.5;

fn highlight() -> resvg::tiny_skia::Color {
    // #FF69B4
    rgba(0xFF, 0x69, 0xB4, 1.0)
}

/// Draws every sticker in list order, so later stickers sit on top.
pub struct StickerLayer<'a> {
    pub stickers: &'a [PlacedSticker],
    /// Id of the sticker to decorate. Only used in preview mode.
    pub selected: Option<&'a str>,
}

impl Layer for StickerLayer<'_> {
    fn name(&self) -> &'static str {
        "stickers"
    }

    fn draw(&self, ctx: &mut RenderContext<'_>) {
        let base = ctx.mode.sticker_size(ctx.config);

        for sticker in self.stickers {
            if !sticker.x.is_finite() || !sticker.y.is_finite() {
                warn!(id = %sticker.id, "sticker position is not finite, skipping");
                ctx.stats.stickers_skipped += 1;
                continue;
            }
            let Some(image) = ctx.load_image("sticker", &sticker.src) else {
                ctx.stats.stickers_skipped += 1;
                continue;
            };
            let Some(pixmap) = image_to_pixmap(&image) else {
                ctx.stats.stickers_skipped += 1;
                continue;
            };

            let placement = sticker_transform(sticker);
            let image_transform = placement
                .pre_translate(-base / 2.0, -base / 2.0)
                .pre_scale(base / pixmap.width() as f32, base / pixmap.height() as f32);
            let paint = PixmapPaint {
                quality: FilterQuality::Bilinear,
                ..PixmapPaint::default()
            };
            ctx.canvas
                .draw_pixmap(0, 0, pixmap.as_ref(), &paint, image_transform, None);
            ctx.stats.stickers_drawn += 1;

            let is_selected = self.selected == Some(sticker.id.as_str());
            if is_selected && ctx.mode == RenderMode::Preview {
                debug!(id = %sticker.id, "decorating selected sticker");
                draw_selection(&mut ctx.canvas, sticker, base);
            }
        }
    }
}

/// Maps sticker-local coordinates (origin at the sticker centre) to the canvas.
fn sticker_transform(sticker: &PlacedSticker) -> Transform {
    let scale = sticker.effective_scale();
    Transform::from_translate(sticker.x, sticker.y)
        .pre_concat(Transform::from_rotate(rotation_degrees(sticker)))
        .pre_scale(scale, scale)
}

fn rotation_degrees(sticker: &PlacedSticker) -> f32 {
    if sticker.rotation.is_finite() {
        sticker.rotation
    } else {
        0.0
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Dashed outline with a soft glow plus four corner handles.
fn draw_selection(canvas: &mut Pixmap, sticker: &PlacedSticker, base: f32) {
    let half = base / 2.0 + OUTLINE_GAP;
    let Some(rect) = Rect::from_xywh(-half, -half, half * 2.0, half * 2.0) else {
        return;
    };
    let outline = PathBuilder::from_rect(rect);

    let mut paint = Paint::default();
    paint.set_color(highlight());
    paint.anti_alias = true;

    let stroke = Stroke {
        width: OUTLINE_WIDTH,
        dash: StrokeDash::new(OUTLINE_DASH.to_vec(), 0.0),
        ..Stroke::default()
    };

    // Glow: the same stroke, blurred on a scratch surface around the sticker.
    let scale = sticker.effective_scale();
    let reach = (half + OUTLINE_WIDTH) * scale * SQRT_2 + 3.0 * GLOW_SIGMA;
    let side = (reach * 2.0).ceil() as u32 + 2;
    if let Some(mut glow) = Pixmap::new(side, side) {
        let centre = side as f32 / 2.0;
        let local = Transform::from_translate(centre, centre)
            .pre_concat(Transform::from_rotate(rotation_degrees(sticker)))
            .pre_scale(scale, scale);
        glow.stroke_path(&outline, &paint, &stroke, local, None);
        blur_premultiplied(glow.data_mut(), side, side, GLOW_SIGMA);

        canvas.draw_pixmap(
            0,
            0,
            glow.as_ref(),
            &PixmapPaint::default(),
            Transform::from_translate(sticker.x - centre, sticker.y - centre),
            None,
        );
    } else {
        debug!(side, "glow surface too large, drawing outline only");
    }

    let placement = sticker_transform(sticker);
    canvas.stroke_path(&outline, &paint, &stroke, placement, None);

    for (cx, cy) in [(-half, -half), (half, -half), (-half, half), (half, half)] {
        let Some(handle) = Rect::from_xywh(
            cx - HANDLE_SIZE / 2.0,
            cy - HANDLE_SIZE / 2.0,
            HANDLE_SIZE,
            HANDLE_SIZE,
        ) else {
            continue;
        };
        canvas.fill_rect(handle, &paint, placement, None);
    }
}
