//! Pixel surface utilities.
//!
//! The compositor draws onto a [`Pixmap`] (premultiplied RGBA) from the
//! tiny-skia rasterizer bundled with resvg. Decoded assets and final output use
//! straight-alpha [`RgbaImage`]s; this module converts between the two, builds
//! clip paths, and encodes the finished canvas.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, Rgba, RgbaImage};
use palette::Srgb;
use resvg::tiny_skia::{
    Color, ColorU8, FillRule, IntSize, Mask, Path, PathBuilder, Pixmap, Transform,
};

use crate::error::{PhotoboothError, PhotoboothResult};

/// Bezier handle length for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

// ============================================================================
// Colors
// ============================================================================

/// Parses a `#rrggbb` or `#rgb` color string.
pub fn parse_hex_color(value: &str) -> PhotoboothResult<Color> {
    let rgb: Srgb<u8> = value
        .trim()
        .parse()
        .map_err(|e| PhotoboothError::invalid_color(format!("{value:?}: {e}")))?;
    Ok(Color::from_rgba8(rgb.red, rgb.green, rgb.blue, 255))
}

/// Builds a color from 8-bit channels and a float alpha, as in CSS `rgba()`.
pub fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Color {
    Color::from_rgba8(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

// ============================================================================
// Surfaces
// ============================================================================

/// Creates a canvas filled with a solid color.
pub fn new_canvas(width: u32, height: u32, background: Color) -> PhotoboothResult<Pixmap> {
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        PhotoboothError::invalid_canvas(format!("cannot allocate {width}x{height} canvas"))
    })?;
    pixmap.fill(background);
    Ok(pixmap)
}

/// Converts a straight-alpha image into a premultiplied pixmap.
///
/// Returns `None` for zero-sized images.
pub fn image_to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())?;
    let mut data = Vec::with_capacity(image.as_raw().len());
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let premul = ColorU8::from_rgba(r, g, b, a).premultiply();
        data.extend_from_slice(&[premul.red(), premul.green(), premul.blue(), premul.alpha()]);
    }
    Pixmap::from_vec(data, size)
}

/// Converts a premultiplied pixmap into a straight-alpha image.
pub fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

// ============================================================================
// Paths
// ============================================================================

/// Builds a rectangle path with circular corners.
///
/// The radius is limited to half the shorter side.
pub fn rounded_rect_path(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Option<Path> {
    let r = radius.max(0.0).min(width / 2.0).min(height / 2.0);
    let mut pb = PathBuilder::new();
    if r <= 0.0 {
        pb.push_rect(resvg::tiny_skia::Rect::from_xywh(x, y, width, height)?);
        return pb.finish();
    }

    let k = r * KAPPA;
    let (right, bottom) = (x + width, y + height);
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.cubic_to(right - r + k, y, right, y + r - k, right, y + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.cubic_to(x + r - k, bottom, x, bottom - r + k, x, bottom - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    pb.close();
    pb.finish()
}

/// Rasterizes `path` into an anti-aliased clip mask of the given size.
pub fn clip_mask(width: u32, height: u32, path: &Path, transform: Transform) -> Option<Mask> {
    let mut mask = Mask::new(width, height)?;
    mask.fill_path(path, FillRule::Winding, true, transform);
    Some(mask)
}

// ============================================================================
// Encoding
// ============================================================================

/// Encodes an image as PNG.
pub fn encode_png(image: &RgbaImage) -> PhotoboothResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_with_encoder(PngEncoder::new(&mut buf))
        .map_err(|e| PhotoboothError::encode(format!("png: {e}")))?;
    Ok(buf.into_inner())
}

/// Encodes an image as JPEG, discarding alpha.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> PhotoboothResult<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)))
        .map_err(|e| PhotoboothError::encode(format!("jpeg: {e}")))?;
    Ok(buf.into_inner())
}

/// Wraps encoded bytes in a base64 `data:` URL.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
