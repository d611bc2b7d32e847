//! Per-photo filter engine.
//!
//! A photo is composited into its slot in three phases:
//!
//! 1. The canvas region under the slot is copied into an owned [`SlotArena`].
//! 2. The source image is drawn into the arena (mirrored if requested) and the
//!    active [`FilterStage`]s run over it in a fixed order.
//! 3. The arena is committed back to the canvas through the slot's
//!    rounded-rectangle clip mask.
//!
//! Stages never touch the shared canvas, so slots are independent until commit.
//!
//! # Stage Order
//!
//! ```text
//! draw (+ mirror)
//!   → black & white   (saturation blend)
//!   → brightness / contrast
//!   → saturation
//!   → vintage         (overlay blend)
//!   → vhs             (screen blend, ±2 offset)
//!   → blur            (gaussian over the arena)
//!   → pixelate
//! ```

pub mod adjust;
pub mod blend;
pub mod blur;
pub mod preset;

pub use adjust::{BrightnessContrast, Pixelate, Saturation};
pub use blend::{BlackAndWhite, Vhs, Vintage};
pub use blur::Blur;
pub use preset::{FilterPreset, PresetSelector};

use image::RgbaImage;
use resvg::tiny_skia::{FilterQuality, IntRect, Pixmap, PixmapPaint, Transform};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::FrameArea;
use crate::surface::{clip_mask, image_to_pixmap, rounded_rect_path};

// ============================================================================
// FilterSettings
// ============================================================================

/// Session-wide photo adjustments.
///
/// Numeric ranges are enforced by the editing UI; the engine clamps wherever
/// a value would make the arithmetic unsafe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSettings {
    pub mirror: bool,
    pub black_and_white: bool,
    pub vintage: bool,
    pub vhs: bool,
    /// Carried for the editor; not rendered.
    pub fisheye: bool,
    /// Percent, 100 = unchanged.
    pub brightness: f32,
    /// Percent, 100 = unchanged.
    pub contrast: f32,
    /// Gaussian sigma in pixels.
    pub blur: f32,
    /// Block size in pixels, 0 = off.
    pub pixelate: f32,
    /// Carried for the editor; not rendered.
    pub beauty: f32,
    /// Percent, 100 = unchanged.
    pub saturation: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            mirror: false,
            black_and_white: false,
            vintage: false,
            vhs: false,
            fisheye: false,
            brightness: 100.0,
            contrast: 100.0,
            blur: 0.0,
            pixelate: 0.0,
            beauty: 0.0,
            saturation: 100.0,
        }
    }
}

impl FilterSettings {
    /// Returns true when no stage would change the drawn photo.
    pub fn is_identity(&self) -> bool {
        !self.mirror && FilterEngine::active_stages(self).next().is_none()
    }
}

// ============================================================================
// SlotArena
// ============================================================================

/// Owned pixel buffer for one slot.
///
/// `area` is the slot rectangle in arena-local coordinates; `origin` is the
/// arena's top-left corner on the canvas.
pub struct SlotArena {
    pub pixmap: Pixmap,
    pub area: FrameArea,
    pub origin: (i32, i32),
}

impl SlotArena {
    /// Copies the canvas region under `area` into a new arena.
    ///
    /// Returns `None` when the area does not intersect the canvas.
    pub fn capture(canvas: &Pixmap, area: &FrameArea) -> Option<Self> {
        let (x, y, w, h) = area.pixel_bounds();
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w as i32).min(canvas.width() as i32);
        let y1 = (y + h as i32).min(canvas.height() as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let rect = IntRect::from_xywh(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32)?;
        let pixmap = canvas.clone_rect(rect)?;
        let local = FrameArea::new(
            area.x - x0 as f32,
            area.y - y0 as f32,
            area.width,
            area.height,
            area.corner_radius,
        );
        Some(Self {
            pixmap,
            area: local,
            origin: (x0, y0),
        })
    }

    /// Draws `source` stretched over the slot, optionally flipped horizontally
    /// about the slot's vertical centre line.
    pub fn draw_source(&mut self, source: &Pixmap, mirror: bool) {
        let sx = self.area.width / source.width() as f32;
        let sy = self.area.height / source.height() as f32;
        let transform = if mirror {
            Transform::from_row(-sx, 0.0, 0.0, sy, self.area.right(), self.area.y)
        } else {
            Transform::from_row(sx, 0.0, 0.0, sy, self.area.x, self.area.y)
        };

        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    }

    /// Writes the arena back onto the canvas, clipped to the rounded slot.
    pub fn commit(self, canvas: &mut Pixmap) {
        let (ox, oy) = self.origin;
        let Some(path) = rounded_rect_path(
            self.area.x + ox as f32,
            self.area.y + oy as f32,
            self.area.width,
            self.area.height,
            self.area.corner_radius,
        ) else {
            return;
        };
        let Some(mask) = clip_mask(canvas.width(), canvas.height(), &path, Transform::identity())
        else {
            return;
        };

        canvas.draw_pixmap(
            ox,
            oy,
            self.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            Some(&mask),
        );
    }
}

// ============================================================================
// FilterStage
// ============================================================================

/// One step of the per-photo pipeline.
///
/// Stages read and write only the arena they are given.
pub trait FilterStage: Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Returns true if the stage would change pixels under these settings.
    fn is_active(&self, settings: &FilterSettings) -> bool;

    /// Applies the stage to the arena.
    fn apply(&self, arena: &mut SlotArena, settings: &FilterSettings);
}

/// Stages in application order.
pub static STAGES: [&dyn FilterStage; 7] = [
    &BlackAndWhite,
    &BrightnessContrast,
    &Saturation,
    &Vintage,
    &Vhs,
    &Blur,
    &Pixelate,
];

// ============================================================================
// FilterEngine
// ============================================================================

/// Draws filtered photos into frame slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine;

impl FilterEngine {
    /// Returns the stages that will run for `settings`, in order.
    pub fn active_stages(
        settings: &FilterSettings,
    ) -> impl Iterator<Item = &'static dyn FilterStage> + '_ {
        STAGES.iter().copied().filter(|s| s.is_active(settings))
    }

    /// Runs the pipeline for one photo on an arena that already holds the
    /// canvas region under the slot.
    pub fn process(arena: &mut SlotArena, source: &Pixmap, settings: &FilterSettings) {
        arena.draw_source(source, settings.mirror);
        for stage in Self::active_stages(settings) {
            debug!(stage = stage.name(), "applying filter stage");
            stage.apply(arena, settings);
        }
    }

    /// Composites `source` into `area` on the canvas.
    ///
    /// Returns false when nothing was drawn (empty image or off-canvas area).
    pub fn apply(
        canvas: &mut Pixmap,
        source: &RgbaImage,
        area: &FrameArea,
        settings: &FilterSettings,
    ) -> bool {
        let Some(source) = image_to_pixmap(source) else {
            return false;
        };
        let Some(mut arena) = SlotArena::capture(canvas, area) else {
            return false;
        };

        Self::process(&mut arena, &source, settings);
        arena.commit(canvas);
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::surface::{new_canvas, pixmap_to_rgba_image};
    use image::Rgba;
    use resvg::tiny_skia::Color;

    /// A horizontal gradient with a distinct green ramp down the rows.
    pub(crate) fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                90,
                255,
            ])
        })
    }

    pub(crate) fn render_slot(source: &RgbaImage, settings: &FilterSettings) -> RgbaImage {
        let (w, h) = source.dimensions();
        let mut canvas = new_canvas(w + 20, h + 20, Color::WHITE).unwrap();
        let area = FrameArea::new(10.0, 10.0, w as f32, h as f32, 0.0);
        assert!(FilterEngine::apply(&mut canvas, source, &area, settings));
        image::imageops::crop_imm(&pixmap_to_rgba_image(&canvas), 10, 10, w, h).to_image()
    }

    pub(crate) fn max_channel_diff(a: &RgbaImage, b: &RgbaImage) -> u8 {
        a.pixels()
            .zip(b.pixels())
            .flat_map(|(p, q)| (0..4).map(move |c| p[c].abs_diff(q[c])))
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn mean_luma(img: &RgbaImage) -> f64 {
        let sum: f64 = img
            .pixels()
            .map(|p| 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64)
            .sum();
        sum / (img.width() * img.height()) as f64
    }

    #[test]
    fn default_settings_are_identity() {
        let source = gradient(32, 24);
        let settings = FilterSettings::default();
        assert!(settings.is_identity());

        let out = render_slot(&source, &settings);
        assert!(max_channel_diff(&out, &source) <= 2);
    }

    #[test]
    fn mirror_is_a_horizontal_flip() {
        let source = gradient(16, 8);
        let mirrored = render_slot(
            &source,
            &FilterSettings {
                mirror: true,
                ..FilterSettings::default()
            },
        );

        let flipped = image::imageops::flip_horizontal(&source);
        assert!(max_channel_diff(&mirrored, &flipped) <= 2);
        assert_eq!(source.get_pixel(3, 2), flipped.get_pixel(16 - 1 - 3, 2));
    }

    #[test]
    fn mirroring_twice_restores_the_source() {
        let source = gradient(16, 8);
        let settings = FilterSettings {
            mirror: true,
            ..FilterSettings::default()
        };
        let twice = render_slot(&render_slot(&source, &settings), &settings);
        assert!(max_channel_diff(&twice, &source) <= 3);
    }

    #[test]
    fn brightness_is_monotonic_in_mean_luma() {
        let source = gradient(24, 24);
        let mut previous = mean_luma(&render_slot(&source, &FilterSettings::default()));

        for brightness in [110.0, 120.0, 135.0, 150.0, 200.0] {
            let settings = FilterSettings {
                brightness,
                ..FilterSettings::default()
            };
            let luma = mean_luma(&render_slot(&source, &settings));
            assert!(
                luma + 1e-9 >= previous,
                "brightness {brightness} lowered luma {previous} -> {luma}"
            );
            previous = luma;
        }
    }

    #[test]
    fn rounded_corners_keep_background() {
        let source = RgbaImage::from_pixel(40, 40, Rgba([0, 0, 0, 255]));
        let mut canvas = new_canvas(60, 60, Color::WHITE).unwrap();
        let area = FrameArea::new(10.0, 10.0, 40.0, 40.0, 8.0);
        FilterEngine::apply(&mut canvas, &source, &area, &FilterSettings::default());

        let out = pixmap_to_rgba_image(&canvas);
        assert_eq!(out.get_pixel(10, 10).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(30, 30).0, [0, 0, 0, 255]);
        assert_eq!(out.get_pixel(5, 30).0, [255, 255, 255, 255]);
    }

    #[test]
    fn off_canvas_area_draws_nothing() {
        let source = gradient(4, 4);
        let mut canvas = new_canvas(10, 10, Color::WHITE).unwrap();
        let area = FrameArea::new(50.0, 50.0, 4.0, 4.0, 0.0);
        assert!(!FilterEngine::apply(
            &mut canvas,
            &source,
            &area,
            &FilterSettings::default()
        ));
    }

    #[test]
    fn active_stages_follow_pipeline_order() {
        let settings = FilterSettings {
            blur: 2.0,
            vintage: true,
            black_and_white: true,
            ..FilterSettings::default()
        };
        let names: Vec<_> = FilterEngine::active_stages(&settings)
            .map(|s| s.name())
            .collect();
        assert_eq!(names, ["black-and-white", "vintage", "blur"]);
    }

    #[test]
    fn settings_json_uses_camel_case_and_defaults() {
        let settings: FilterSettings =
            serde_json::from_str(r#"{ "blackAndWhite": true }"#).unwrap();
        assert!(settings.black_and_white);
        assert_eq!(settings.brightness, 100.0);
    }
}
