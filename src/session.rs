//! Editing session state and its JSON form.
//!
//! A [`PhotoSession`] is everything needed to reproduce a final image: the
//! chosen template, the captured photos, the placed stickers, the filter
//! settings and the background color. It round-trips through camelCase JSON
//! so the host application can persist it however it likes.
//!
//! # Example
//!
//! ```
//! use photobooth_compositor::{PhotoSession, catalog};
//!
//! let template = catalog::template_by_id("korean-strip-3").unwrap();
//! let session = PhotoSession::new(template, 1_700_000_000_000);
//!
//! let json = session.to_json().unwrap();
//! let restored = PhotoSession::from_json(&json).unwrap();
//! assert_eq!(restored, session);
//! ```

use resvg::tiny_skia::Color;
use serde::{Deserialize, Serialize};

use crate::catalog::{DEFAULT_BACKGROUND, Template};
use crate::error::PhotoboothResult;
use crate::filter::FilterSettings;
use crate::surface::parse_hex_color;

// ============================================================================
// CapturedPhoto
// ============================================================================

/// One webcam capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedPhoto {
    pub id: String,

    /// Image reference, normally a `data:` URL.
    #[serde(rename = "dataUrl")]
    pub image_data: String,

    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl CapturedPhoto {
    pub fn new(id: impl Into<String>, image_data: impl Into<String>, timestamp: u64) -> Self {
        Self {
            id: id.into(),
            image_data: image_data.into(),
            timestamp,
        }
    }
}

// ============================================================================
// PlacedSticker
// ============================================================================

/// Smallest sticker scale the editor and renderer accept.
pub const MIN_STICKER_SCALE: f32 = 0.3;
/// Largest sticker scale the editor and renderer accept.
pub const MAX_STICKER_SCALE: f32 = 5.0;

fn default_scale() -> f32 {
    1.0
}

/// A catalog sticker positioned on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedSticker {
    pub id: String,
    pub sticker_id: String,
    pub src: String,
    /// Centre, in canvas units.
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Degrees, clockwise.
    #[serde(default)]
    pub rotation: f32,
}

impl PlacedSticker {
    /// Scale used for drawing and hit-testing.
    ///
    /// Non-positive and non-finite values count as 1; anything else is
    /// clamped to the slider range, so restored sessions cannot request
    /// arbitrarily large stickers.
    pub fn effective_scale(&self) -> f32 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale.clamp(MIN_STICKER_SCALE, MAX_STICKER_SCALE)
        } else {
            1.0
        }
    }
}

// ============================================================================
// PhotoSession
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSession {
    pub template: Template,
    #[serde(default)]
    pub photos: Vec<CapturedPhoto>,
    #[serde(default)]
    pub placed_stickers: Vec<PlacedSticker>,
    #[serde(default)]
    pub filter_settings: FilterSettings,
    #[serde(default = "default_background")]
    pub background_color: String,
    pub timestamp: u64,
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

impl PhotoSession {
    /// An empty session on `template` with default filters and background.
    pub fn new(template: Template, timestamp: u64) -> Self {
        Self {
            template,
            photos: Vec::new(),
            placed_stickers: Vec::new(),
            filter_settings: FilterSettings::default(),
            background_color: default_background(),
            timestamp,
        }
    }

    pub fn to_json(&self) -> PhotoboothResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a session and re-derives template geometry if it is missing.
    pub fn from_json(json: &str) -> PhotoboothResult<Self> {
        let mut session: Self = serde_json::from_str(json)?;
        if session.template.normalize() {
            tracing::debug!(template = %session.template.id, "re-derived template geometry");
        }
        Ok(session)
    }

    pub fn background(&self) -> PhotoboothResult<Color> {
        parse_hex_color(&self.background_color)
    }

    /// Download name: `photobooth-{template-name-slug}-{timestamp}.png`.
    pub fn export_file_name(&self) -> String {
        let slug = self
            .template
            .name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();
        format!("photobooth-{slug}-{}.png", self.timestamp)
    }
}
