//! Image reference resolution and decoding.
//!
//! Photos, stickers and template overlays are all named by a string
//! reference. An [`ImageLoader`] turns a reference into pixels. Supported
//! reference forms:
//!
//! - `data:` URLs, base64 or plain (`data:image/png;base64,...`)
//! - inline SVG markup (`<svg ...>`)
//! - `emoji:` references, rendered through Twemoji with the `twemoji` feature
//! - asset paths such as `/stickers/cute/heart.png`, resolved against an
//!   asset root; `.svg` files are rasterized
//!
//! [`AssetLoader`] decodes on demand. [`ImageCache`] holds already-decoded
//! images and is what the compositor reads from during a scheduled render.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use percent_encoding::percent_decode_str;

use crate::error::{PhotoboothError, PhotoboothResult};
use crate::layer::svg::{SvgSource, looks_like_svg, render_source, render_svg};

/// Pixel size of the larger side when rasterizing vector images.
pub const SVG_RASTER_SIZE: u32 = 256;

/// Resolves an image reference to decoded pixels.
pub trait ImageLoader: Send + Sync {
    fn load(&self, reference: &str) -> PhotoboothResult<Arc<RgbaImage>>;
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes raster or SVG bytes.
pub fn decode_image_bytes(bytes: &[u8]) -> PhotoboothResult<RgbaImage> {
    if looks_like_svg(bytes) {
        let markup = std::str::from_utf8(bytes)
            .map_err(|e| PhotoboothError::decode(format!("svg is not utf-8: {e}")))?;
        return render_svg(markup, SVG_RASTER_SIZE);
    }
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Extracts the payload of a `data:` URL.
pub fn decode_data_url(url: &str) -> PhotoboothResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| PhotoboothError::decode("not a data url"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| PhotoboothError::decode("data url has no payload"))?;

    if header.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD
            .decode(compact)
            .map_err(|e| PhotoboothError::decode(format!("data url base64: {e}")))
    } else {
        Ok(percent_decode_str(payload).collect())
    }
}

// ============================================================================
// AssetLoader
// ============================================================================

/// Loads references from memory or from files under an asset root.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    root: PathBuf,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps an asset path onto the root. Leading slashes are treated as
    /// root-relative; `..` is rejected.
    pub fn resolve_path(&self, reference: &str) -> PhotoboothResult<PathBuf> {
        let relative = Path::new(reference.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(PhotoboothError::asset(format!(
                "asset path escapes root: {reference}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl ImageLoader for AssetLoader {
    fn load(&self, reference: &str) -> PhotoboothResult<Arc<RgbaImage>> {
        if reference.starts_with("data:") {
            let bytes = decode_data_url(reference)?;
            return decode_image_bytes(&bytes).map(Arc::new);
        }
        if let Some(source) = SvgSource::parse(reference) {
            return render_source(&source, SVG_RASTER_SIZE).map(Arc::new);
        }

        let path = self.resolve_path(reference)?;
        let bytes = std::fs::read(&path).map_err(|e| {
            PhotoboothError::asset(format!("read {}: {e}", path.display()))
        })?;
        decode_image_bytes(&bytes).map(Arc::new)
    }
}

// ============================================================================
// ImageCache
// ============================================================================

/// Decoded images keyed by reference.
///
/// Lookups never decode; a reference that was not inserted is an error.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    images: HashMap<String, Arc<RgbaImage>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, image: Arc<RgbaImage>) {
        self.images.insert(reference.into(), image);
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.images.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageLoader for ImageCache {
    fn load(&self, reference: &str) -> PhotoboothResult<Arc<RgbaImage>> {
        self.images.get(reference).cloned().ok_or_else(|| {
            PhotoboothError::asset(format!("image not loaded: {}", abbreviate(reference)))
        })
    }
}

/// Shortens long references (data URLs, inline SVG) for log and error text.
pub fn abbreviate(reference: &str) -> String {
    const MAX: usize = 48;
    match reference.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &reference[..idx]),
        None => reference.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{encode_png, to_data_url};
    use image::Rgba;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "photobooth-loader-{name}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(dir.join("stickers")).unwrap();
        dir
    }

    #[test]
    fn loads_png_data_urls() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 255]));
        let url = to_data_url("image/png", &encode_png(&img).unwrap());

        let loaded = AssetLoader::new(".").load(&url).unwrap();
        assert_eq!(*loaded, img);
    }

    #[test]
    fn plain_data_urls_are_percent_decoded() {
        let url = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='4' height='4'/%3E";
        let bytes = decode_data_url(url).unwrap();
        assert!(bytes.starts_with(b"<svg"));
        assert!(bytes.ends_with(b"/>"));
    }

    #[test]
    fn stray_percent_signs_are_kept() {
        let bytes = decode_data_url("data:text/plain,100%25 off%2").unwrap();
        assert_eq!(bytes, b"100% off%2");
    }

    #[test]
    fn malformed_data_urls_are_rejected() {
        assert!(decode_data_url("data:image/png;base64").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
        assert!(decode_data_url("image/png,abc").is_err());
    }

    #[test]
    fn inline_svg_is_rasterized() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="blue"/></svg>"#;
        let img = AssetLoader::new(".").load(svg).unwrap();
        assert_eq!(img.dimensions(), (SVG_RASTER_SIZE, SVG_RASTER_SIZE));
        assert_eq!(img.get_pixel(5, 5).0, [0, 0, 255, 255]);
    }

    #[test]
    fn reads_assets_relative_to_root() {
        let root = temp_root("fs");
        let img = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        std::fs::write(root.join("stickers/dot.png"), encode_png(&img).unwrap()).unwrap();

        let loader = AssetLoader::new(&root);
        assert_eq!(*loader.load("/stickers/dot.png").unwrap(), img);
        assert!(matches!(
            loader.load("/stickers/missing.png"),
            Err(PhotoboothError::Asset(_))
        ));
    }

    #[test]
    fn parent_components_are_rejected() {
        let loader = AssetLoader::new("/srv/assets");
        assert!(loader.resolve_path("../etc/passwd").is_err());
        assert_eq!(
            loader.resolve_path("/templates/a.png").unwrap(),
            PathBuf::from("/srv/assets/templates/a.png")
        );
    }

    #[test]
    fn cache_misses_are_errors() {
        let mut cache = ImageCache::new();
        cache.insert("a", Arc::new(RgbaImage::new(1, 1)));
        assert!(cache.load("a").is_ok());
        assert!(cache.load("b").is_err());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn abbreviate_keeps_short_references() {
        assert_eq!(abbreviate("/a.png"), "/a.png");
        let long = "x".repeat(100);
        assert_eq!(abbreviate(&long).chars().count(), 49);
    }
}
