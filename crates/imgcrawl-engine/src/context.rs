//! State shared by every call of one crawl run.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use imgcrawl_core::{CrawlError, CrawlResult, Location, Page, PageFetcher, Platform};
use imgcrawl_transform::{TransformGate, TransformOutcome, TransformPipeline};

use crate::progress::CrawlEvent;
use crate::visited::VisitedSet;

/// Per-run crawl state and the steps every strategy shares.
///
/// Strategies only decide how `admit`, `fetch_page` and the image and link
/// halves of a page are scheduled. The dedup sets live here and are
/// dropped with the context at the end of the run.
pub struct CrawlContext {
    max_depth: u32,
    diagnostics: bool,
    visited: VisitedSet,
    gate: TransformGate,
    pipeline: Arc<TransformPipeline>,
    fetcher: Arc<dyn PageFetcher>,
    platform: Arc<dyn Platform>,
    cancel: CancellationToken,
    events: broadcast::Sender<CrawlEvent>,
}

impl CrawlContext {
    pub fn new(
        max_depth: u32,
        diagnostics: bool,
        pipeline: Arc<TransformPipeline>,
        fetcher: Arc<dyn PageFetcher>,
        platform: Arc<dyn Platform>,
        cancel: CancellationToken,
        events: broadcast::Sender<CrawlEvent>,
    ) -> Self {
        Self {
            max_depth,
            diagnostics,
            visited: VisitedSet::new(),
            gate: TransformGate::new(),
            pipeline,
            fetcher,
            platform,
            cancel,
            events,
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn gate(&self) -> &TransformGate {
        &self.gate
    }

    /// Fail with [`CrawlError::Cancelled`] once cancellation is requested.
    pub fn check_cancelled(&self) -> CrawlResult<()> {
        if self.cancel.is_cancelled() {
            Err(CrawlError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Entry check of every crawl call.
    ///
    /// Returns `Ok(true)` when this call owns `location` and should fetch
    /// it, `Ok(false)` when the page is too deep or already claimed.
    pub fn admit(&self, location: &Location, depth: u32) -> CrawlResult<bool> {
        self.check_cancelled()?;

        if self.diagnostics {
            debug!(">> depth {depth} [{location}]");
        }

        if depth > self.max_depth {
            if self.diagnostics {
                debug!(%location, depth, "exceeded max depth");
            }
            return Ok(false);
        }

        if !self.visited.insert(location.clone()) {
            if self.diagnostics {
                debug!(%location, "already visited");
            }
            return Ok(false);
        }

        self.emit(CrawlEvent::PageVisited {
            location: location.clone(),
            depth,
        });
        Ok(true)
    }

    /// Fetch a claimed page. Failures are logged and yield `None`.
    pub fn fetch_page(&self, location: &Location) -> Option<Arc<dyn Page>> {
        match self.fetcher.fetch(location) {
            Ok(page) => Some(page),
            Err(err) => {
                warn!(%location, error = %err, "failed to fetch page");
                self.unit_failed(location.clone(), err.to_string());
                None
            }
        }
    }

    /// Process one batch of images sequentially.
    ///
    /// Cancellation is checked once, before the first image.
    pub fn process_images<'a>(
        &self,
        images: impl IntoIterator<Item = &'a Location>,
    ) -> CrawlResult<u64> {
        self.check_cancelled()?;
        Ok(images
            .into_iter()
            .map(|location| self.process_image(location))
            .sum())
    }

    /// Download one image and run the pipeline over it.
    ///
    /// Returns the number of artifacts this call stored. Keys already
    /// claimed through the gate contribute nothing.
    pub fn process_image(&self, location: &Location) -> u64 {
        let image = match self.platform.download(location) {
            Ok(image) => image,
            Err(err) => {
                warn!(%location, error = %err, "failed to download image");
                self.unit_failed(location.clone(), err.to_string());
                return 0;
            }
        };

        self.pipeline
            .run(&image, &self.gate, self.platform.as_ref())
            .into_iter()
            .map(|outcome| match outcome {
                TransformOutcome::Stored(stored) => {
                    self.emit(CrawlEvent::ImageStored { stored });
                    1
                }
                TransformOutcome::Skipped(_) => 0,
                TransformOutcome::Failed { key, error } => {
                    warn!(%key, %error, "transform failed");
                    self.unit_failed(key.source, error.to_string());
                    0
                }
            })
            .sum()
    }

    /// Broadcast an event. Sends without subscribers are dropped.
    pub fn emit(&self, event: CrawlEvent) {
        let _ = self.events.send(event);
    }

    fn unit_failed(&self, location: Location, message: String) {
        self.emit(CrawlEvent::UnitFailed { location, message });
    }
}
