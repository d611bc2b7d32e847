//! SVG rasterization through resvg/usvg.
//!
//! Used for vector stickers (inline markup, `.svg` assets, Twemoji) and for
//! the export caption, which is laid out as an SVG `<text>` element so that
//! font selection and shaping come from usvg.

use std::sync::{Arc, OnceLock};

use image::RgbaImage;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree, fontdb};

use crate::error::{PhotoboothError, PhotoboothResult};
use crate::surface::pixmap_to_rgba_image;

/// Prefix marking an emoji image reference, e.g. `emoji:🦆`.
pub const EMOJI_PREFIX: &str = "emoji:";

// ============================================================================
// SvgSource
// ============================================================================

/// Where a vector image comes from.
///
/// ```
/// use photobooth_compositor::SvgSource;
///
/// let raw = SvgSource::parse("<svg xmlns='http://www.w3.org/2000/svg'/>").unwrap();
/// assert!(raw.is_raw());
///
/// let emoji = SvgSource::parse("emoji:💖").unwrap();
/// assert!(emoji.is_emoji());
///
/// assert!(SvgSource::parse("/stickers/cute/heart.png").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvgSource {
    /// Inline SVG markup.
    Raw(String),

    /// An emoji resolved through Twemoji at render time.
    ///
    /// Resolves to nothing unless the `twemoji` feature is enabled.
    Emoji(String),
}

impl SvgSource {
    pub fn from_svg(svg: impl Into<String>) -> Self {
        Self::Raw(svg.into())
    }

    /// Returns `None` if Twemoji has no asset for `emoji`.
    #[cfg(feature = "twemoji")]
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        use twemoji_assets::svg::SvgTwemojiAsset;

        SvgTwemojiAsset::from_emoji(emoji)?;
        Some(Self::Emoji(emoji.to_string()))
    }

    /// Classifies an image reference as inline markup or an emoji.
    ///
    /// Returns `None` for anything else (paths, data URLs).
    pub fn parse(reference: &str) -> Option<Self> {
        let trimmed = reference.trim_start();
        if let Some(emoji) = trimmed.strip_prefix(EMOJI_PREFIX) {
            return Some(Self::Emoji(emoji.trim().to_string()));
        }
        if looks_like_svg(trimmed.as_bytes()) {
            return Some(Self::Raw(reference.to_string()));
        }
        None
    }

    /// Resolves this source to SVG markup.
    pub fn resolve(&self) -> Option<&str> {
        match self {
            Self::Raw(svg) => Some(svg.as_str()),
            #[cfg(feature = "twemoji")]
            Self::Emoji(emoji) => {
                use twemoji_assets::svg::SvgTwemojiAsset;
                let asset = SvgTwemojiAsset::from_emoji(emoji)?;
                Some(asset.as_ref())
            }
            #[cfg(not(feature = "twemoji"))]
            Self::Emoji(_) => None,
        }
    }

    pub fn is_emoji(&self) -> bool {
        matches!(self, Self::Emoji(_))
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

/// Returns true if `bytes` start like an SVG or XML document.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let head = &bytes[start..];
    head.starts_with(b"<svg") || head.starts_with(b"<?xml")
}

// ============================================================================
// Fonts
// ============================================================================

/// System font database, loaded on first use and shared.
fn font_database() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded system fonts");
            Arc::new(db)
        })
        .clone()
}

/// Returns true if any system font is available for SVG text.
pub fn has_fonts() -> bool {
    font_database().len() > 0
}

fn parse_tree(svg_data: &str) -> PhotoboothResult<Tree> {
    let opts = Options {
        fontdb: font_database(),
        ..Options::default()
    };
    Tree::from_str(svg_data, &opts).map_err(|e| PhotoboothError::decode(format!("svg: {e}")))
}

// ============================================================================
// Rendering
// ============================================================================

/// Renders SVG markup to an image whose larger side is `size` pixels,
/// preserving aspect ratio.
pub fn render_svg(svg_data: &str, size: u32) -> PhotoboothResult<RgbaImage> {
    let tree = parse_tree(svg_data)?;

    let svg_size = tree.size();
    let scale = size as f32 / svg_size.width().max(svg_size.height());
    let width = (svg_size.width() * scale).ceil() as u32;
    let height = (svg_size.height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        PhotoboothError::decode(format!("svg rasterizes to empty {width}x{height} image"))
    })?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Renders an [`SvgSource`] at `size`, see [`render_svg`].
pub fn render_source(source: &SvgSource, size: u32) -> PhotoboothResult<RgbaImage> {
    let svg_data = source
        .resolve()
        .ok_or_else(|| PhotoboothError::asset(format!("unresolvable svg source {source:?}")))?;
    render_svg(svg_data, size)
}

/// Draws an SVG document 1:1 over `canvas`, source-over.
pub fn draw_svg_over(svg_data: &str, canvas: &mut Pixmap) -> PhotoboothResult<()> {
    let tree = parse_tree(svg_data)?;
    resvg::render(&tree, Transform::identity(), &mut canvas.as_mut());
    Ok(())
}

/// Escapes text for use inside an XML element or attribute.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CIRCLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50"><circle cx="25" cy="25" r="20" fill="#ff0000"/></svg>"##;

    #[test]
    fn render_fits_larger_side() {
        let img = render_svg(CIRCLE_SVG, 40).unwrap();
        assert_eq!(img.dimensions(), (40, 20));

        let centre = img.get_pixel(10, 10);
        assert_eq!(centre[0], 255);
        assert_eq!(centre[3], 255);
    }

    #[test]
    fn invalid_markup_is_a_decode_error() {
        let err = render_svg("<svg", 10).unwrap_err();
        assert!(matches!(err, PhotoboothError::Decode(_)));
    }

    #[test]
    fn draw_over_keeps_uncovered_pixels() {
        let mut canvas = Pixmap::new(100, 50).unwrap();
        canvas.fill(resvg::tiny_skia::Color::WHITE);
        draw_svg_over(CIRCLE_SVG, &mut canvas).unwrap();

        let img = pixmap_to_rgba_image(&canvas);
        assert_eq!(img.get_pixel(25, 25).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(90, 40).0, [255, 255, 255, 255]);
    }

    #[test]
    fn sniffs_svg_documents() {
        assert!(looks_like_svg(b"  <svg width='1'/>"));
        assert!(looks_like_svg(b"<?xml version='1.0'?><svg/>"));
        assert!(!looks_like_svg(b"\x89PNG"));
        assert!(!looks_like_svg(b""));
    }

    #[test]
    fn parse_classifies_references() {
        assert_eq!(
            SvgSource::parse("emoji: 🦆 "),
            Some(SvgSource::Emoji("🦆".to_string()))
        );
        assert!(SvgSource::parse(CIRCLE_SVG).unwrap().is_raw());
        assert_eq!(SvgSource::parse("data:image/png;base64,AAAA"), None);
    }

    #[test]
    fn raw_source_resolves_to_itself() {
        let source = SvgSource::from_svg("<svg></svg>");
        assert_eq!(source.resolve(), Some("<svg></svg>"));
    }

    #[cfg(not(feature = "twemoji"))]
    #[test]
    fn emoji_is_unresolvable_without_twemoji() {
        let source = SvgSource::Emoji("🦆".to_string());
        assert!(render_source(&source, 32).is_err());
    }

    #[cfg(feature = "twemoji")]
    #[test]
    fn emoji_renders_with_twemoji() {
        let source = SvgSource::from_emoji("🦆").unwrap();
        let img = render_source(&source, 32).unwrap();
        assert_eq!(img.width().max(img.height()), 32);
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_xml("Tom & <Jerry>"), "Tom &amp; &lt;Jerry&gt;");
    }
}
