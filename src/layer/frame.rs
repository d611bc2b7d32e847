//! Topmost decoration: the template overlay image, or a procedural frame
//! when the template has no usable image.

use resvg::tiny_skia::{
    FilterQuality, Paint, PathBuilder, PixmapPaint, Rect, Stroke, StrokeDash, Transform,
};
use serde::Serialize;
use tracing::{debug, warn};

use super::svg::{draw_svg_over, escape_xml};
use super::{Layer, RenderContext};
use crate::compositor::RenderMode;
use crate::surface::{image_to_pixmap, rgba};

const BORDER_INSET: f32 = 10.0;
const BORDER_WIDTH: f32 = 8.0;
const BORDER_DASH: [f32; 2] = [20.0, 10.0];
const CORNER_SIZE: f32 = 40.0;
/// Distance from the bottom edge to the caption baseline.
const CAPTION_BASELINE: f32 = 20.0;

/// Which frame ended up on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameSource {
    Overlay,
    Procedural,
}

pub struct FrameLayer<'a> {
    /// Template overlay image reference.
    pub overlay: Option<&'a str>,
    /// Template name, captioned on procedural frames in export mode.
    pub name: &'a str,
}

impl Layer for FrameLayer<'_> {
    fn name(&self) -> &'static str {
        "frame"
    }

    fn draw(&self, ctx: &mut RenderContext<'_>) {
        if let Some(reference) = self.overlay {
            if self.draw_overlay(ctx, reference) {
                ctx.stats.frame = Some(FrameSource::Overlay);
                return;
            }
            warn!("template overlay unavailable, using procedural frame");
        }

        draw_procedural(ctx);
        if ctx.mode == RenderMode::Export {
            draw_caption(ctx, self.name);
        }
        ctx.stats.frame = Some(FrameSource::Procedural);
    }
}

impl FrameLayer<'_> {
    /// Stretches the overlay over the whole canvas.
    fn draw_overlay(&self, ctx: &mut RenderContext<'_>, reference: &str) -> bool {
        let Some(image) = ctx.load_image("overlay", reference) else {
            return false;
        };
        let Some(pixmap) = image_to_pixmap(&image) else {
            return false;
        };

        let (width, height) = ctx.canvas_size();
        let transform = Transform::from_scale(
            width as f32 / pixmap.width() as f32,
            height as f32 / pixmap.height() as f32,
        );
        let paint = PixmapPaint {
            opacity: ctx.config.overlay_opacity.clamp(0.0, 1.0),
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        ctx.canvas
            .draw_pixmap(0, 0, pixmap.as_ref(), &paint, transform, None);
        true
    }
}

/// Dashed pink border and four corner triangles.
fn draw_procedural(ctx: &mut RenderContext<'_>) {
    let (width, height) = ctx.canvas_size();
    let (w, h) = (width as f32, height as f32);

    let mut paint = Paint::default();
    paint.anti_alias = true;

    if let Some(rect) = Rect::from_xywh(
        BORDER_INSET,
        BORDER_INSET,
        w - 2.0 * BORDER_INSET,
        h - 2.0 * BORDER_INSET,
    ) {
        paint.set_color(rgba(0xFF, 0x69, 0xB4, 1.0));
        let stroke = Stroke {
            width: BORDER_WIDTH,
            dash: StrokeDash::new(BORDER_DASH.to_vec(), 0.0),
            ..Stroke::default()
        };
        ctx.canvas.stroke_path(
            &PathBuilder::from_rect(rect),
            &paint,
            &stroke,
            Transform::identity(),
            None,
        );
    }

    paint.set_color(rgba(0xFF, 0xB6, 0xC1, 1.0));
    let corners = [
        ((0.0, 0.0), (CORNER_SIZE, 0.0), (0.0, CORNER_SIZE)),
        ((w, 0.0), (w - CORNER_SIZE, 0.0), (w, CORNER_SIZE)),
        ((0.0, h), (CORNER_SIZE, h), (0.0, h - CORNER_SIZE)),
        ((w, h), (w - CORNER_SIZE, h), (w, h - CORNER_SIZE)),
    ];
    for (a, b, c) in corners {
        let mut pb = PathBuilder::new();
        pb.move_to(a.0, a.1);
        pb.line_to(b.0, b.1);
        pb.line_to(c.0, c.1);
        pb.close();
        if let Some(path) = pb.finish() {
            ctx.canvas.fill_path(
                &path,
                &paint,
                resvg::tiny_skia::FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }
}

/// Builds the caption document: `✨ {name} ✨`, bold 16px sans-serif,
/// centred, baseline 20 units above the bottom edge.
pub fn caption_svg(name: &str, width: u32, height: u32) -> String {
    format!(
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"##,
            r##"<text x="{x}" y="{y}" text-anchor="middle" font-family="sans-serif" "##,
            r##"font-weight="bold" font-size="16" fill="#FF69B4">✨ {name} ✨</text></svg>"##
        ),
        w = width,
        h = height,
        x = width as f32 / 2.0,
        y = height as f32 - CAPTION_BASELINE,
        name = escape_xml(name),
    )
}

fn draw_caption(ctx: &mut RenderContext<'_>, name: &str) {
    let (width, height) = ctx.canvas_size();
    let svg = caption_svg(name, width, height);
    match draw_svg_over(&svg, &mut ctx.canvas) {
        Ok(()) => debug!(name, "caption drawn"),
        Err(err) => warn!(error = %err, "caption could not be drawn"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompositorConfig;
    use crate::layer::tests::{NoImages, context};
    use crate::loader::ImageCache;
    use crate::surface::pixmap_to_rgba_image;
    use image::{Rgba, RgbaImage};
    use std::sync::Arc;

    #[test]
    fn overlay_is_stretched_at_reduced_opacity() {
        let config = CompositorConfig::default();
        let mut cache = ImageCache::new();
        cache.insert("frame", Arc::new(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]))));

        let mut ctx = context(40, 60, RenderMode::Preview, &config, &cache);
        FrameLayer {
            overlay: Some("frame"),
            name: "Test",
        }
        .draw(&mut ctx);

        assert_eq!(ctx.stats.frame, Some(FrameSource::Overlay));
        let out = pixmap_to_rgba_image(&ctx.canvas);
        // 5% of the white background shows through.
        let p = out.get_pixel(20, 30);
        assert!((10..=16).contains(&p[0]), "{p:?}");
        assert_eq!(p[3], 255);
    }

    #[test]
    fn missing_overlay_falls_back_to_procedural() {
        let config = CompositorConfig::default();
        let mut ctx = context(200, 300, RenderMode::Preview, &config, &NoImages);
        FrameLayer {
            overlay: Some("/templates/missing.png"),
            name: "Test",
        }
        .draw(&mut ctx);

        assert_eq!(ctx.stats.frame, Some(FrameSource::Procedural));
        let out = pixmap_to_rgba_image(&ctx.canvas);
        // Corner triangle.
        assert_eq!(out.get_pixel(3, 3).0, [0xFF, 0xB6, 0xC1, 255]);
        // First dash of the border starts at the inset corner.
        let border = out.get_pixel(20, 10);
        assert_eq!(border.0, [0xFF, 0x69, 0xB4, 255]);
        // Interior untouched.
        assert_eq!(out.get_pixel(100, 150).0, [255, 255, 255, 255]);
    }

    #[test]
    fn caption_escapes_template_name() {
        let svg = caption_svg("Tom & <Jerry>", 800, 1200);
        assert!(svg.contains("✨ Tom &amp; &lt;Jerry&gt; ✨"));
        assert!(svg.contains(r#"x="400""#));
        assert!(svg.contains(r#"y="1180""#));
    }

    #[test]
    fn caption_document_parses() {
        let mut canvas = resvg::tiny_skia::Pixmap::new(100, 60).unwrap();
        assert!(draw_svg_over(&caption_svg("Pink Dream", 100, 60), &mut canvas).is_ok());
    }
}
