//! Layers drawn by the compositor.
//!
//! A render pass paints a fixed stack of layers, bottom to top, onto one
//! shared canvas:
//!
//! 1. [`PhotoLayer`]: captured photos, filtered, each clipped to its slot
//! 2. [`StickerLayer`]: placed stickers and the selection decoration
//! 3. [`FrameLayer`]: the template overlay or the procedural frame
//!
//! The background fill happens when the canvas is created.
//!
//! # Architecture
//!
//! Each layer implements [`Layer`] and receives a [`RenderContext`] holding the
//! canvas, the render mode, the configuration and an [`ImageLoader`]. A layer
//! never fails: anything it cannot draw is logged, counted in
//! [`RenderStats`], and skipped.

pub mod frame;
pub mod photo;
pub mod sticker;
pub mod svg;

pub use frame::{FrameLayer, FrameSource};
pub use photo::PhotoLayer;
pub use sticker::StickerLayer;
pub use svg::SvgSource;

use std::sync::Arc;

use image::RgbaImage;
use resvg::tiny_skia::Pixmap;
use serde::Serialize;
use tracing::warn;

use crate::compositor::RenderMode;
use crate::config::CompositorConfig;
use crate::loader::{ImageLoader, abbreviate};

// ============================================================================
// Render Context
// ============================================================================

/// State shared by the layers of one render pass.
pub struct RenderContext<'a> {
    /// The canvas being painted.
    pub canvas: Pixmap,

    pub mode: RenderMode,

    pub config: &'a CompositorConfig,

    /// What was drawn and what was skipped so far.
    pub stats: RenderStats,

    loader: &'a dyn ImageLoader,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        canvas: Pixmap,
        mode: RenderMode,
        config: &'a CompositorConfig,
        loader: &'a dyn ImageLoader,
    ) -> Self {
        Self {
            canvas,
            mode,
            config,
            stats: RenderStats::default(),
            loader,
        }
    }

    /// Loads an image, logging and swallowing the failure.
    ///
    /// `what` names the consumer in the log line ("photo", "sticker", ...).
    pub fn load_image(&self, what: &'static str, reference: &str) -> Option<Arc<RgbaImage>> {
        match self.loader.load(reference) {
            Ok(image) if image.width() > 0 && image.height() > 0 => Some(image),
            Ok(_) => {
                warn!(what, reference = %abbreviate(reference), "image is empty, skipping");
                None
            }
            Err(err) => {
                warn!(what, reference = %abbreviate(reference), error = %err, "image unavailable, skipping");
                None
            }
        }
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }
}

// ============================================================================
// Render Stats
// ============================================================================

/// Per-pass counters reported alongside the rendered canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderStats {
    pub photos_drawn: usize,
    pub photos_skipped: usize,
    pub stickers_drawn: usize,
    pub stickers_skipped: usize,
    /// Set once the frame layer has run.
    pub frame: Option<FrameSource>,
}

// ============================================================================
// Layer Trait
// ============================================================================

/// One level of the canvas stack.
pub trait Layer {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Paints this layer onto `ctx.canvas`.
    fn draw(&self, ctx: &mut RenderContext<'_>);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{PhotoboothError, PhotoboothResult};
    use crate::loader::ImageCache;
    use crate::surface::new_canvas;
    use resvg::tiny_skia::Color;

    /// Loader that fails for every reference.
    pub(crate) struct NoImages;

    impl ImageLoader for NoImages {
        fn load(&self, reference: &str) -> PhotoboothResult<Arc<RgbaImage>> {
            Err(PhotoboothError::asset(reference.to_string()))
        }
    }

    pub(crate) fn context<'a>(
        width: u32,
        height: u32,
        mode: RenderMode,
        config: &'a CompositorConfig,
        loader: &'a dyn ImageLoader,
    ) -> RenderContext<'a> {
        RenderContext::new(
            new_canvas(width, height, Color::WHITE).unwrap(),
            mode,
            config,
            loader,
        )
    }

    #[test]
    fn load_failures_become_none() {
        let config = CompositorConfig::default();
        let ctx = context(4, 4, RenderMode::Preview, &config, &NoImages);
        assert!(ctx.load_image("photo", "/missing.png").is_none());
    }

    #[test]
    fn empty_images_are_rejected() {
        let config = CompositorConfig::default();
        let mut cache = ImageCache::new();
        cache.insert("empty", Arc::new(RgbaImage::new(0, 0)));
        cache.insert("dot", Arc::new(RgbaImage::new(1, 1)));

        let ctx = context(4, 4, RenderMode::Export, &config, &cache);
        assert!(ctx.load_image("sticker", "empty").is_none());
        assert!(ctx.load_image("sticker", "dot").is_some());
        assert_eq!(ctx.canvas_size(), (4, 4));
    }
}
