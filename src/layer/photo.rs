//! Captured photos, one per slot.

use tracing::{debug, warn};

use super::{Layer, RenderContext};
use crate::filter::{FilterEngine, FilterSettings};
use crate::geometry::FrameArea;
use crate::session::CapturedPhoto;

/// Draws photos into slots in capture order.
///
/// Photo `i` goes into slot `i`. Extra photos are ignored and slots without a
/// photo keep the background.
pub struct PhotoLayer<'a> {
    pub photos: &'a [CapturedPhoto],
    pub areas: &'a [FrameArea],
    pub filters: &'a FilterSettings,
}

impl Layer for PhotoLayer<'_> {
    fn name(&self) -> &'static str {
        "photos"
    }

    fn draw(&self, ctx: &mut RenderContext<'_>) {
        if self.photos.len() > self.areas.len() {
            debug!(
                photos = self.photos.len(),
                slots = self.areas.len(),
                "more photos than slots"
            );
        }

        for (slot, (photo, area)) in self.photos.iter().zip(self.areas).enumerate() {
            let Some(image) = ctx.load_image("photo", &photo.image_data) else {
                ctx.stats.photos_skipped += 1;
                continue;
            };

            if FilterEngine::apply(&mut ctx.canvas, &image, area, self.filters) {
                debug!(slot, id = %photo.id, "photo drawn");
                ctx.stats.photos_drawn += 1;
            } else {
                warn!(slot, id = %photo.id, "slot lies outside the canvas");
                ctx.stats.photos_skipped += 1;
            }
        }
    }
}
