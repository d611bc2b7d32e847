//! Composition of a full canvas from a session snapshot.
//!
//! [`Compositor::render`] is one synchronous pass: background, photos,
//! stickers, frame. All image references go through an [`ImageLoader`], so
//! the same pass runs against files on disk, an in-memory cache filled by the
//! [`scheduler`](crate::scheduler), or anything else.
//!
//! # Example
//!
//! ```
//! use photobooth_compositor::{
//!     catalog, CompositeRequest, Compositor, ImageCache, PhotoSession, RenderMode,
//! };
//!
//! let template = catalog::template_by_id("korean-strip-3").unwrap();
//! let session = PhotoSession::new(template, 0);
//!
//! let request = CompositeRequest::from_session(&session, RenderMode::Export);
//! let rendered = Compositor::default().render(&request, &ImageCache::new()).unwrap();
//!
//! assert_eq!((rendered.image.width(), rendered.image.height()), (800, 1200));
//! assert_eq!(rendered.mime, "image/png");
//! ```

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::catalog::Template;
use crate::config::CompositorConfig;
use crate::error::PhotoboothResult;
use crate::filter::FilterSettings;
use crate::geometry::{FrameArea, resolve_frame_areas_padded};
use crate::layer::{FrameLayer, Layer, PhotoLayer, RenderContext, RenderStats, StickerLayer};
use crate::loader::ImageLoader;
use crate::session::{CapturedPhoto, PhotoSession, PlacedSticker};
use crate::surface::{
    encode_jpeg, encode_png, new_canvas, parse_hex_color, pixmap_to_rgba_image, to_data_url,
};

// ============================================================================
// RenderMode
// ============================================================================

/// Live editing preview or final export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    #[default]
    Preview,
    Export,
}

impl RenderMode {
    /// Sticker edge length at scale 1.
    pub fn sticker_size(self, config: &CompositorConfig) -> f32 {
        match self {
            Self::Preview => config.preview_sticker_size,
            Self::Export => config.export_sticker_size,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Preview => "image/jpeg",
            Self::Export => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Preview => "jpg",
            Self::Export => "png",
        }
    }
}

// ============================================================================
// CompositeRequest
// ============================================================================

/// Everything one render pass reads. Owned so it can cross task boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeRequest {
    pub template: Template,
    pub photos: Vec<CapturedPhoto>,
    pub stickers: Vec<PlacedSticker>,
    pub filters: FilterSettings,
    pub background: String,
    pub mode: RenderMode,
    /// Sticker to decorate in preview mode.
    pub selected_sticker: Option<String>,
}

impl CompositeRequest {
    pub fn from_session(session: &PhotoSession, mode: RenderMode) -> Self {
        Self {
            template: session.template.clone(),
            photos: session.photos.clone(),
            stickers: session.placed_stickers.clone(),
            filters: session.filter_settings.clone(),
            background: session.background_color.clone(),
            mode,
            selected_sticker: None,
        }
    }

    pub fn with_selection(mut self, selected: Option<&str>) -> Self {
        self.selected_sticker = selected.map(str::to_string);
        self
    }

    pub fn with_stickers(mut self, stickers: &[PlacedSticker]) -> Self {
        self.stickers = stickers.to_vec();
        self
    }

    /// Every image reference the pass may load, deduplicated, in draw order.
    pub fn references(&self) -> Vec<String> {
        let slots = self.template.slots;
        let photos = self.photos.iter().take(slots).map(|p| p.image_data.as_str());
        let stickers = self.stickers.iter().map(|s| s.src.as_str());
        let overlay = self.template.overlay_image();

        let mut out: Vec<String> = Vec::new();
        for reference in photos.chain(stickers).chain(overlay) {
            if !out.iter().any(|r| r == reference) {
                out.push(reference.to_string());
            }
        }
        out
    }
}

// ============================================================================
// RenderedCanvas
// ============================================================================

#[derive(Debug, Clone)]
pub struct RenderedCanvas {
    pub image: RgbaImage,
    /// `image` encoded as `mime`.
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub stats: RenderStats,
}

impl RenderedCanvas {
    pub fn data_url(&self) -> String {
        to_data_url(self.mime, &self.bytes)
    }
}

// ============================================================================
// Compositor
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Compositor {
    pub config: CompositorConfig,
}

impl Compositor {
    pub fn new(config: CompositorConfig) -> Self {
        Self { config }
    }

    /// Slot rectangles and canvas size for `template`.
    ///
    /// Uses the template's stored geometry when it is consistent, otherwise
    /// resolves it from the layout with the configured padding.
    pub fn geometry(&self, template: &Template) -> (u32, u32, Vec<FrameArea>) {
        let height = template.layout.canvas_height();
        let width = self.config.canvas_width;

        let stored_ok = template.canvas_width == width
            && template.canvas_height == height
            && template.frame_areas.len() == template.slots;
        if stored_ok {
            return (width, height, template.frame_areas.clone());
        }

        debug!(template = %template.id, "resolving frame areas from layout");
        let areas = resolve_frame_areas_padded(
            &template.layout,
            template.slots,
            width,
            height,
            self.config.padding,
        );
        (width, height, areas)
    }

    /// Runs one full pass and encodes the result for the request's mode.
    #[instrument(skip_all, fields(template = %request.template.id, mode = ?request.mode))]
    pub fn render(
        &self,
        request: &CompositeRequest,
        loader: &dyn ImageLoader,
    ) -> PhotoboothResult<RenderedCanvas> {
        let background = parse_hex_color(&request.background)?;
        let (width, height, areas) = self.geometry(&request.template);
        let canvas = new_canvas(width, height, background)?;

        let mut ctx = RenderContext::new(canvas, request.mode, &self.config, loader);
        let layers: [&dyn Layer; 3] = [
            &PhotoLayer {
                photos: &request.photos,
                areas: &areas,
                filters: &request.filters,
            },
            &StickerLayer {
                stickers: &request.stickers,
                selected: request.selected_sticker.as_deref(),
            },
            &FrameLayer {
                overlay: request.template.overlay_image(),
                name: &request.template.name,
            },
        ];
        for layer in layers {
            debug!(layer = layer.name(), "drawing layer");
            layer.draw(&mut ctx);
        }

        let stats = ctx.stats;
        let image = pixmap_to_rgba_image(&ctx.canvas);
        let bytes = match request.mode {
            RenderMode::Preview => encode_jpeg(&image, self.config.jpeg_quality)?,
            RenderMode::Export => encode_png(&image)?,
        };
        info!(
            photos = stats.photos_drawn,
            stickers = stats.stickers_drawn,
            bytes = bytes.len(),
            "canvas rendered"
        );

        Ok(RenderedCanvas {
            image,
            bytes,
            mime: request.mode.mime(),
            stats,
        })
    }
}
