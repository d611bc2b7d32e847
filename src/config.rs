//! Tunable constants for layout, sticker handling, and output encoding.
//!
//! [`CompositorConfig`] serializes to camelCase JSON so a host application can
//! ship overrides next to its asset bundle:
//!
//! ```
//! use photobooth_compositor::CompositorConfig;
//!
//! let config = CompositorConfig::from_json(r#"{ "jpegQuality": 70 }"#).unwrap();
//! assert_eq!(config.jpeg_quality, 70);
//! assert_eq!(config.padding, 40.0);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PhotoboothResult;

/// Compositor settings. Missing JSON fields take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompositorConfig {
    /// Outer padding and inter-slot gap, in canvas units.
    pub padding: f32,

    /// Fixed logical canvas width shared by every layout.
    pub canvas_width: u32,

    /// Sticker base size while editing.
    pub preview_sticker_size: f32,

    /// Sticker base size in the exported image.
    pub export_sticker_size: f32,

    /// Hit-test radius for a sticker at scale 1.
    pub hit_radius: f32,

    /// Opacity of the template overlay image.
    pub overlay_opacity: f32,

    /// JPEG quality (1-100) for preview output.
    pub jpeg_quality: u8,

    /// Upper bound on a single image decode, in milliseconds.
    pub decode_timeout_ms: u64,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            padding: 40.0,
            canvas_width: 800,
            preview_sticker_size: 60.0,
            export_sticker_size: 80.0,
            hit_radius: 60.0,
            overlay_opacity: 0.95,
            jpeg_quality: 85,
            decode_timeout_ms: 5_000,
        }
    }
}

impl CompositorConfig {
    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms)
    }

    pub fn to_json(&self) -> PhotoboothResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> PhotoboothResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = CompositorConfig::from_json("{}").unwrap();
        assert_eq!(config, CompositorConfig::default());
    }

    #[test]
    fn json_uses_camel_case() {
        let json = CompositorConfig::default().to_json().unwrap();
        assert!(json.contains("\"previewStickerSize\""));
        assert!(json.contains("\"decodeTimeoutMs\""));
    }

    #[test]
    fn decode_timeout_converts_millis() {
        let config = CompositorConfig {
            decode_timeout_ms: 250,
            ..CompositorConfig::default()
        };
        assert_eq!(config.decode_timeout(), Duration::from_millis(250));
    }
}
