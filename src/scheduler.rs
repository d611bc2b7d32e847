//! Asynchronous render passes with last-writer-wins publication.
//!
//! Every call to [`RenderScheduler::render`] takes a new generation number.
//! Images the pass needs are decoded on the blocking pool, each under the
//! configured decode timeout; anything that fails or times out is left out and
//! the compositor skips it. A finished pass is published only if no newer pass
//! has started since, so a slow pass can never overwrite a newer canvas.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::{self, JoinSet};
use tokio::time;
use tracing::{debug, instrument, warn};

use crate::compositor::{CompositeRequest, Compositor, RenderedCanvas};
use crate::error::{PhotoboothError, PhotoboothResult};
use crate::loader::{ImageCache, ImageLoader, abbreviate};

/// Result of one scheduled pass.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    /// The pass finished and is now the latest published canvas.
    Rendered {
        generation: u64,
        canvas: Arc<RenderedCanvas>,
    },
    /// A newer pass started before this one finished; its result was dropped.
    Superseded { generation: u64 },
}

impl RenderOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Rendered { generation, .. } | Self::Superseded { generation } => *generation,
        }
    }

    pub fn canvas(&self) -> Option<&Arc<RenderedCanvas>> {
        match self {
            Self::Rendered { canvas, .. } => Some(canvas),
            Self::Superseded { .. } => None,
        }
    }
}

/// Most recently published canvas and the generation that produced it.
#[derive(Debug, Clone)]
pub struct Published {
    pub generation: u64,
    pub canvas: Arc<RenderedCanvas>,
}

pub struct RenderScheduler {
    compositor: Arc<Compositor>,
    loader: Arc<dyn ImageLoader>,
    generation: AtomicU64,
    published: watch::Sender<Option<Published>>,
}

impl RenderScheduler {
    pub fn new(compositor: Compositor, loader: Arc<dyn ImageLoader>) -> Self {
        let (published, _) = watch::channel(None);
        Self {
            compositor: Arc::new(compositor),
            loader,
            generation: AtomicU64::new(0),
            published,
        }
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Generation of the most recently started pass.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn latest(&self) -> Option<Published> {
        self.published.borrow().clone()
    }

    /// Receiver that sees every published canvas.
    pub fn subscribe(&self) -> watch::Receiver<Option<Published>> {
        self.published.subscribe()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    /// Runs a pass for `request`.
    ///
    /// Errors only for failures that affect the whole pass (bad background
    /// colour, encoding, a panicked task). Missing images are not errors.
    #[instrument(skip_all, fields(template = %request.template.id, generation = tracing::field::Empty))]
    pub async fn render(&self, request: CompositeRequest) -> PhotoboothResult<RenderOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::Span::current().record("generation", generation);

        let cache = self.preload(request.references()).await;
        if !self.is_current(generation) {
            warn!(generation, "render superseded before compositing");
            return Ok(RenderOutcome::Superseded { generation });
        }

        let compositor = Arc::clone(&self.compositor);
        let rendered = task::spawn_blocking(move || compositor.render(&request, &cache))
            .await
            .map_err(|e| PhotoboothError::task(e.to_string()))??;
        let canvas = Arc::new(rendered);

        let published = self.published.send_if_modified(|slot| {
            let newer_published = slot.as_ref().is_some_and(|p| p.generation > generation);
            if newer_published || !self.is_current(generation) {
                return false;
            }
            *slot = Some(Published {
                generation,
                canvas: Arc::clone(&canvas),
            });
            true
        });

        if published {
            debug!(generation, "render published");
            Ok(RenderOutcome::Rendered { generation, canvas })
        } else {
            warn!(generation, "render superseded, result discarded");
            Ok(RenderOutcome::Superseded { generation })
        }
    }

    /// Decodes `references` concurrently into a cache. Failures and timeouts
    /// are logged and left out.
    async fn preload(&self, references: Vec<String>) -> ImageCache {
        let timeout = self.compositor.config.decode_timeout();
        let mut set = JoinSet::new();

        for reference in references {
            let loader = Arc::clone(&self.loader);
            set.spawn(async move {
                let key = reference.clone();
                let decode = task::spawn_blocking(move || loader.load(&key));
                (reference, time::timeout(timeout, decode).await)
            });
        }

        let mut cache = ImageCache::new();
        while let Some(joined) = set.join_next().await {
            let Ok((reference, result)) = joined else {
                warn!("preload task failed");
                continue;
            };
            match result {
                Ok(Ok(Ok(image))) => cache.insert(reference, image),
                Ok(Ok(Err(err))) => {
                    warn!(reference = %abbreviate(&reference), error = %err, "image unavailable");
                }
                Ok(Err(err)) => {
                    warn!(reference = %abbreviate(&reference), error = %err, "decode task failed");
                }
                Err(_) => {
                    warn!(
                        reference = %abbreviate(&reference),
                        timeout_ms = timeout.as_millis() as u64,
                        "image decode timed out"
                    );
                }
            }
        }
        debug!(loaded = cache.len(), "preload finished");
        cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::template_by_id;
    use crate::compositor::RenderMode;
    use crate::config::CompositorConfig;
    use crate::session::{CapturedPhoto, PhotoSession};
    use image::{Rgba, RgbaImage};
    use std::time::Duration;

    /// Solid images; references starting with `slow:` block for a while first.
    struct SlowLoader {
        delay: Duration,
    }

    impl ImageLoader for SlowLoader {
        fn load(&self, reference: &str) -> PhotoboothResult<Arc<RgbaImage>> {
            if reference.starts_with("slow:") {
                std::thread::sleep(self.delay);
            }
            if reference.starts_with("missing:") {
                return Err(PhotoboothError::asset(reference.to_string()));
            }
            Ok(Arc::new(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]))))
        }
    }

    fn scheduler(timeout_ms: u64, delay_ms: u64) -> RenderScheduler {
        let config = CompositorConfig {
            decode_timeout_ms: timeout_ms,
            ..CompositorConfig::default()
        };
        RenderScheduler::new(
            Compositor::new(config),
            Arc::new(SlowLoader {
                delay: Duration::from_millis(delay_ms),
            }),
        )
    }

    fn request(photo: &str) -> CompositeRequest {
        let mut session = PhotoSession::new(template_by_id("korean-strip-3").unwrap(), 1);
        session.photos.push(CapturedPhoto::new("p", photo, 1));
        CompositeRequest::from_session(&session, RenderMode::Preview)
    }

    #[tokio::test]
    async fn publishes_single_render() {
        let sched = scheduler(5_000, 0);
        let outcome = sched.render(request("fast:1")).await.unwrap();

        assert_eq!(outcome.generation(), 1);
        let canvas = outcome.canvas().expect("rendered");
        assert_eq!(canvas.stats.photos_drawn, 1);

        let latest = sched.latest().expect("published");
        assert_eq!(latest.generation, 1);
    }

    #[tokio::test]
    async fn stale_render_does_not_overwrite_newer() {
        let sched = scheduler(5_000, 200);
        let (old, new) = tokio::join!(sched.render(request("slow:1")), async {
            time::sleep(Duration::from_millis(20)).await;
            sched.render(request("fast:2")).await
        });

        let old = old.unwrap();
        let new = new.unwrap();
        assert!(matches!(old, RenderOutcome::Superseded { generation: 1 }));
        assert!(matches!(new, RenderOutcome::Rendered { generation: 2, .. }));
        assert_eq!(sched.latest().unwrap().generation, 2);
    }

    #[tokio::test]
    async fn timed_out_images_are_skipped() {
        let sched = scheduler(20, 300);
        let outcome = sched.render(request("slow:photo")).await.unwrap();
        let canvas = outcome.canvas().expect("rendered");
        assert_eq!(canvas.stats.photos_drawn, 0);
        assert_eq!(canvas.stats.photos_skipped, 1);
    }

    #[tokio::test]
    async fn failed_images_are_skipped() {
        let sched = scheduler(5_000, 0);
        let outcome = sched.render(request("missing:photo")).await.unwrap();
        assert_eq!(outcome.canvas().unwrap().stats.photos_skipped, 1);
    }

    #[tokio::test]
    async fn subscribers_see_published_canvas() {
        let sched = scheduler(5_000, 0);
        let mut rx = sched.subscribe();
        sched.render(request("fast:1")).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().generation, 1);
    }
}
