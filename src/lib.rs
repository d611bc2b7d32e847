//! photobooth-compositor: canvas compositing for a photo booth
//!
//! This crate turns a photo session (a template, captured photos, placed
//! stickers, filter settings and a background colour) into a finished image.
//! It also provides the sticker editing state machine with undo/redo that
//! drives the live preview.
//!
//! # Example
//!
//! ```
//! use photobooth_compositor::{
//!     catalog, CapturedPhoto, CompositeRequest, Compositor, FilterPreset, ImageCache,
//!     PhotoSession, PresetSelector, RenderMode, StickerEditor,
//! };
//!
//! let template = catalog::template_by_id("korean-strip-3").unwrap();
//! let mut session = PhotoSession::new(template, 1_700_000_000_000);
//! session.photos.push(CapturedPhoto::new("p1", "data:image/png;base64,", 1));
//!
//! // One-click look
//! let mut presets = PresetSelector::default();
//! presets.select(FilterPreset::Vintage, &mut session.filter_settings);
//!
//! // Stickers are edited through the editor, then copied back
//! let mut editor = StickerEditor::from_session(&session, &Default::default());
//! editor.add_sticker(catalog::sticker_by_id("cute-1").unwrap(), 800, 1200);
//! session.placed_stickers = editor.stickers().to_vec();
//!
//! let request = CompositeRequest::from_session(&session, RenderMode::Preview)
//!     .with_selection(editor.selected());
//! let rendered = Compositor::default().render(&request, &ImageCache::new()).unwrap();
//! assert_eq!(rendered.mime, "image/jpeg");
//! ```
//!
//! # Asynchronous rendering
//!
//! [`RenderScheduler`] decodes images on the tokio blocking pool with a
//! per-image timeout and only publishes the newest pass. See the
//! [`scheduler`] module.

pub mod catalog;
mod compositor;
mod config;
mod error;
pub mod filter;
pub mod geometry;
mod history;
mod interaction;
pub mod layer;
mod loader;
pub mod scheduler;
mod session;
pub mod surface;

pub use compositor::{CompositeRequest, Compositor, RenderMode, RenderedCanvas};
pub use config::CompositorConfig;
pub use error::{PhotoboothError, PhotoboothResult};
pub use filter::{FilterEngine, FilterPreset, FilterSettings, PresetSelector};
pub use geometry::{FrameArea, Layout};
pub use history::History;
pub use interaction::{
    InteractionMode, MAX_STICKER_SCALE, MIN_STICKER_SCALE, Point, StickerEditor,
    display_to_canvas, hit_test,
};
pub use layer::{FrameSource, RenderStats, SvgSource};
pub use loader::{AssetLoader, ImageCache, ImageLoader, decode_data_url};
pub use scheduler::{Published, RenderOutcome, RenderScheduler};
pub use session::{CapturedPhoto, PhotoSession, PlacedSticker};
