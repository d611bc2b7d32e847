//! Color washes drawn over the slot with a non-normal blend mode.

use resvg::tiny_skia::{BlendMode, Color, Paint, Rect, Transform};

use super::{FilterSettings, FilterStage, SlotArena};
use crate::surface::rgba;

/// Horizontal offset of each VHS channel wash.
const VHS_SHIFT: f32 = 2.0;

/// Fills the slot rectangle, shifted by `dx`, with a solid color.
fn wash(arena: &mut SlotArena, color: Color, blend_mode: BlendMode, dx: f32) {
    let area = &arena.area;
    let Some(rect) = Rect::from_xywh(area.x + dx, area.y, area.width, area.height) else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(color);
    paint.blend_mode = blend_mode;
    paint.anti_alias = false;

    arena
        .pixmap
        .fill_rect(rect, &paint, Transform::identity(), None);
}

/// Desaturates by blending black with the saturation mode: the result keeps
/// the photo's luminosity and hue but takes black's zero saturation.
#[derive(Debug, Clone, Copy)]
pub struct BlackAndWhite;

impl FilterStage for BlackAndWhite {
    fn name(&self) -> &'static str {
        "black-and-white"
    }

    fn is_active(&self, settings: &FilterSettings) -> bool {
        settings.black_and_white
    }

    fn apply(&self, arena: &mut SlotArena, _settings: &FilterSettings) {
        wash(arena, Color::BLACK, BlendMode::Saturation, 0.0);
    }
}

/// Warm sepia-ish overlay.
#[derive(Debug, Clone, Copy)]
pub struct Vintage;

impl FilterStage for Vintage {
    fn name(&self) -> &'static str {
        "vintage"
    }

    fn is_active(&self, settings: &FilterSettings) -> bool {
        settings.vintage
    }

    fn apply(&self, arena: &mut SlotArena, _settings: &FilterSettings) {
        wash(arena, rgba(255, 200, 150, 0.3), BlendMode::Overlay, 0.0);
    }
}

/// Chromatic fringe: a magenta wash shifted right and a green wash shifted
/// left, both screen-blended.
#[derive(Debug, Clone, Copy)]
pub struct Vhs;

impl FilterStage for Vhs {
    fn name(&self) -> &'static str {
        "vhs"
    }

    fn is_active(&self, settings: &FilterSettings) -> bool {
        settings.vhs
    }

    fn apply(&self, arena: &mut SlotArena, _settings: &FilterSettings) {
        wash(arena, rgba(255, 0, 100, 0.1), BlendMode::Screen, VHS_SHIFT);
        wash(arena, rgba(0, 255, 100, 0.1), BlendMode::Screen, -VHS_SHIFT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::{gradient, mean_luma, render_slot};
    use image::{Rgba, RgbaImage};

    fn with(f: impl FnOnce(&mut FilterSettings)) -> FilterSettings {
        let mut settings = FilterSettings::default();
        f(&mut settings);
        settings
    }

    #[test]
    fn black_and_white_removes_chroma() {
        let source = RgbaImage::from_pixel(12, 12, Rgba([200, 30, 90, 255]));
        let out = render_slot(&source, &with(|s| s.black_and_white = true));

        for p in out.pixels() {
            let spread = p[0].max(p[1]).max(p[2]) - p[0].min(p[1]).min(p[2]);
            assert!(spread <= 2, "pixel {p:?} still has color");
        }
    }

    #[test]
    fn black_and_white_preserves_brightness_order() {
        let source = gradient(32, 8);
        let out = render_slot(&source, &with(|s| s.black_and_white = true));
        let left = out.get_pixel(2, 4)[0];
        let right = out.get_pixel(29, 4)[0];
        assert!(right > left, "expected left {left} < right {right}");
    }

    #[test]
    fn vintage_warms_grey() {
        let source = RgbaImage::from_pixel(8, 8, Rgba([128, 128, 128, 255]));
        let out = render_slot(&source, &with(|s| s.vintage = true));
        let p = out.get_pixel(4, 4);
        assert!(p[0] > p[2], "red {} should exceed blue {}", p[0], p[2]);
    }

    #[test]
    fn vhs_brightens_with_screen() {
        let source = gradient(16, 16);
        let out = render_slot(&source, &with(|s| s.vhs = true));
        assert!(mean_luma(&out) > mean_luma(&source));
    }

    #[test]
    fn vhs_fringe_is_asymmetric_at_edges() {
        let source = RgbaImage::from_pixel(16, 8, Rgba([0, 0, 0, 255]));
        let out = render_slot(&source, &with(|s| s.vhs = true));
        // Green is shifted left and magenta right, so each edge sees one wash.
        let left = out.get_pixel(0, 4);
        let right = out.get_pixel(15, 4);
        assert!(left[1] > left[0], "left edge {left:?}");
        assert!(right[0] > right[1], "right edge {right:?}");
    }
}
