//! Per-pixel tone adjustments: brightness/contrast, saturation, pixelation.

use palette::{Hsl, IntoColor, Srgb};
use resvg::tiny_skia::{ColorU8, PremultipliedColorU8};

use super::{FilterSettings, FilterStage, SlotArena};

/// Contrast is kept below the `(1 + c) / (1 - c)` singularity at 200.
const MAX_CONTRAST: f32 = 199.0;
const MAX_SATURATION: f32 = 300.0;

// ============================================================================
// Brightness / Contrast
// ============================================================================

/// Additive brightness followed by contrast scaling around mid-grey.
#[derive(Debug, Clone, Copy)]
pub struct BrightnessContrast;

impl FilterStage for BrightnessContrast {
    fn name(&self) -> &'static str {
        "brightness-contrast"
    }

    fn is_active(&self, settings: &FilterSettings) -> bool {
        settings.brightness != 100.0 || settings.contrast != 100.0
    }

    fn apply(&self, arena: &mut SlotArena, settings: &FilterSettings) {
        let offset = brightness_offset(settings.brightness);
        let factor = contrast_factor(settings.contrast);

        map_pixels(arena, |c| {
            ColorU8::from_rgba(
                adjust_channel(c.red(), offset, factor),
                adjust_channel(c.green(), offset, factor),
                adjust_channel(c.blue(), offset, factor),
                c.alpha(),
            )
        });
    }
}

/// Maps the percent scale to a raw channel offset: 100 → 0, 200 → +255.
pub fn brightness_offset(brightness: f32) -> f32 {
    let brightness = if brightness.is_finite() { brightness } else { 100.0 };
    (brightness - 100.0) * 2.55
}

/// Contrast multiplier `(1 + c) / (1 - c)` with `c = (contrast - 100) / 100`.
///
/// Contrast is clamped to `[0, 199]`, so the factor is finite and never
/// negative. Exactly 100 yields 1.
pub fn contrast_factor(contrast: f32) -> f32 {
    let contrast = if contrast.is_finite() {
        contrast.clamp(0.0, MAX_CONTRAST)
    } else {
        100.0
    };
    let c = (contrast - 100.0) / 100.0;
    (1.0 + c) / (1.0 - c)
}

/// Applies brightness then contrast to one channel, clamping after each step.
pub fn adjust_channel(value: u8, offset: f32, factor: f32) -> u8 {
    let brightened = (value as f32 + offset).round().clamp(0.0, 255.0);
    (factor * (brightened - 128.0) + 128.0)
        .round()
        .clamp(0.0, 255.0) as u8
}

// ============================================================================
// Saturation
// ============================================================================

/// Scales HSL saturation by `saturation / 100`.
#[derive(Debug, Clone, Copy)]
pub struct Saturation;

impl FilterStage for Saturation {
    fn name(&self) -> &'static str {
        "saturation"
    }

    fn is_active(&self, settings: &FilterSettings) -> bool {
        settings.saturation.is_finite() && settings.saturation != 100.0
    }

    fn apply(&self, arena: &mut SlotArena, settings: &FilterSettings) {
        let ratio = settings.saturation.clamp(0.0, MAX_SATURATION) / 100.0;

        map_pixels(arena, |c| {
            let rgb = Srgb::new(
                c.red() as f32 / 255.0,
                c.green() as f32 / 255.0,
                c.blue() as f32 / 255.0,
            );
            let mut hsl: Hsl = rgb.into_color();
            hsl.saturation = (hsl.saturation * ratio).clamp(0.0, 1.0);
            let out: Srgb = hsl.into_color();

            ColorU8::from_rgba(
                (out.red * 255.0).round().clamp(0.0, 255.0) as u8,
                (out.green * 255.0).round().clamp(0.0, 255.0) as u8,
                (out.blue * 255.0).round().clamp(0.0, 255.0) as u8,
                c.alpha(),
            )
        });
    }
}

// ============================================================================
// Pixelate
// ============================================================================

/// Replaces square blocks, aligned to the slot's top-left corner, with their
/// average color.
#[derive(Debug, Clone, Copy)]
pub struct Pixelate;

impl FilterStage for Pixelate {
    fn name(&self) -> &'static str {
        "pixelate"
    }

    fn is_active(&self, settings: &FilterSettings) -> bool {
        settings.pixelate.is_finite() && settings.pixelate.round() >= 2.0
    }

    fn apply(&self, arena: &mut SlotArena, settings: &FilterSettings) {
        let block = settings.pixelate.round() as i64;
        let width = arena.pixmap.width() as i64;
        let height = arena.pixmap.height() as i64;
        let ox = arena.area.x.floor() as i64;
        let oy = arena.area.y.floor() as i64;
        let pixels = arena.pixmap.pixels_mut();

        let start_x = block_start(ox, block);
        let start_y = block_start(oy, block);

        let mut by = start_y;
        while by < height {
            let mut bx = start_x;
            while bx < width {
                let x0 = bx.max(0);
                let y0 = by.max(0);
                let x1 = (bx + block).min(width);
                let y1 = (by + block).min(height);
                if x1 > x0 && y1 > y0 {
                    average_block(pixels, width, (x0, y0), (x1, y1));
                }
                bx += block;
            }
            by += block;
        }
    }
}

/// First block boundary at or before 0 that is aligned to `origin`.
fn block_start(origin: i64, block: i64) -> i64 {
    let phase = origin.rem_euclid(block);
    if phase == 0 { 0 } else { phase - block }
}

fn average_block(
    pixels: &mut [PremultipliedColorU8],
    width: i64,
    (x0, y0): (i64, i64),
    (x1, y1): (i64, i64),
) {
    let mut acc = [0u64; 4];
    let mut count = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            let p = pixels[(y * width + x) as usize];
            acc[0] += p.red() as u64;
            acc[1] += p.green() as u64;
            acc[2] += p.blue() as u64;
            acc[3] += p.alpha() as u64;
            count += 1;
        }
    }

    let avg = |v: u64| ((v + count / 2) / count) as u8;
    let alpha = avg(acc[3]);
    let Some(color) = PremultipliedColorU8::from_rgba(
        avg(acc[0]).min(alpha),
        avg(acc[1]).min(alpha),
        avg(acc[2]).min(alpha),
        alpha,
    ) else {
        return;
    };

    for y in y0..y1 {
        for x in x0..x1 {
            pixels[(y * width + x) as usize] = color;
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Runs `f` over every pixel in straight alpha.
fn map_pixels(arena: &mut SlotArena, f: impl Fn(ColorU8) -> ColorU8) {
    for pixel in arena.pixmap.pixels_mut() {
        if pixel.alpha() == 0 {
            continue;
        }
        *pixel = f(pixel.demultiply()).premultiply();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::{gradient, max_channel_diff, mean_luma, render_slot};
    use image::{Rgba, RgbaImage};

    #[test]
    fn contrast_100_is_exact_identity() {
        assert_eq!(contrast_factor(100.0), 1.0);
        for v in 0..=255u8 {
            assert_eq!(adjust_channel(v, 0.0, 1.0), v);
        }
    }

    #[test]
    fn contrast_near_singularity_stays_finite() {
        for contrast in [199.0, 200.0, 250.0, f32::INFINITY, f32::NAN] {
            let factor = contrast_factor(contrast);
            assert!(factor.is_finite(), "contrast {contrast} gave {factor}");
            assert!(factor >= 0.0);
        }
        assert_eq!(contrast_factor(-40.0), 0.0);
    }

    #[test]
    fn overflow_is_clamped() {
        let offset = brightness_offset(150.0);
        let factor = contrast_factor(150.0);
        assert_eq!(adjust_channel(250, offset, factor), 255);
        assert_eq!(adjust_channel(5, brightness_offset(50.0), factor), 0);
    }

    #[test]
    fn brightness_offset_matches_percent_scale() {
        assert_eq!(brightness_offset(100.0), 0.0);
        assert!((brightness_offset(200.0) - 255.0).abs() < 0.001);
        assert_eq!(brightness_offset(f32::NAN), 0.0);
    }

    #[test]
    fn higher_contrast_spreads_values_from_mid_grey() {
        let factor = contrast_factor(130.0);
        assert!(adjust_channel(200, 0.0, factor) > 200);
        assert!(adjust_channel(60, 0.0, factor) < 60);
    }

    #[test]
    fn dimming_lowers_luma() {
        let source = gradient(16, 16);
        let dim = render_slot(
            &source,
            &FilterSettings {
                brightness: 60.0,
                ..FilterSettings::default()
            },
        );
        assert!(mean_luma(&dim) < mean_luma(&source));
    }

    #[test]
    fn zero_saturation_produces_grey() {
        let source = RgbaImage::from_pixel(8, 8, Rgba([220, 40, 40, 255]));
        let out = render_slot(
            &source,
            &FilterSettings {
                saturation: 0.0,
                ..FilterSettings::default()
            },
        );
        let p = out.get_pixel(4, 4);
        assert!(p[0].abs_diff(p[1]) <= 1 && p[1].abs_diff(p[2]) <= 1, "{p:?}");
    }

    #[test]
    fn pixelate_flattens_blocks() {
        let source = gradient(16, 16);
        let out = render_slot(
            &source,
            &FilterSettings {
                pixelate: 4.0,
                ..FilterSettings::default()
            },
        );
        assert_eq!(out.get_pixel(0, 0), out.get_pixel(3, 3));
        assert_eq!(out.get_pixel(4, 0), out.get_pixel(7, 2));
        assert!(max_channel_diff(&out, &source) > 0);
    }
}
