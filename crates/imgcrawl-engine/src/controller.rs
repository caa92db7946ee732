//! Crawl controller: configuration, events, cancellation and runs.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use imgcrawl_core::{
    CrawlError, CrawlOptions, CrawlResult, PageFetcher, Platform, StrategyKind,
};
use imgcrawl_transform::TransformPipeline;

use crate::context::CrawlContext;
use crate::progress::{CrawlEvent, CrawlReport};
use crate::strategy::{CrawlStrategy, build_strategy};

/// Runs crawls with one configured strategy.
///
/// Each [`run`](Self::run) starts with an empty visited set and transform
/// gate; nothing carries over between runs except what the platform
/// itself keeps.
pub struct ImageCrawler {
    options: CrawlOptions,
    fetcher: Arc<dyn PageFetcher>,
    platform: Arc<dyn Platform>,
    pipeline: Arc<TransformPipeline>,
    strategy: Box<dyn CrawlStrategy>,
    events: broadcast::Sender<CrawlEvent>,
    cancel: CancellationToken,
}

impl ImageCrawler {
    pub fn builder() -> ImageCrawlerBuilder {
        ImageCrawlerBuilder::default()
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn pipeline(&self) -> &TransformPipeline {
        &self.pipeline
    }

    /// Subscribe to progress events of subsequent runs.
    pub fn subscribe(&self) -> broadcast::Receiver<CrawlEvent> {
        self.events.subscribe()
    }

    /// Handle that cancels in-flight and future runs of this crawler.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            token: self.cancel.clone(),
        }
    }

    /// Crawl from the configured root.
    ///
    /// The root is normalized by the fetcher first, so a link back to it
    /// is recognized as already visited.
    ///
    /// Returns [`CrawlError::Cancelled`] if cancellation was requested
    /// before or during the run.
    pub fn run(&self) -> CrawlResult<CrawlReport> {
        let start = Instant::now();
        let root = self.fetcher.normalize(&self.options.root);
        let strategy = self.strategy.kind();

        let ctx = Arc::new(CrawlContext::new(
            self.options.max_depth,
            self.options.diagnostics,
            Arc::clone(&self.pipeline),
            Arc::clone(&self.fetcher),
            Arc::clone(&self.platform),
            self.cancel.clone(),
            self.events.clone(),
        ));

        info!(%root, %strategy, max_depth = self.options.max_depth, "starting crawl");
        ctx.emit(CrawlEvent::Started {
            root: root.clone(),
            strategy,
        });

        match self.strategy.crawl(Arc::clone(&ctx), root.clone()) {
            Ok(images) => {
                let report = CrawlReport {
                    strategy,
                    root,
                    images_processed: images,
                    pages_visited: ctx.visited().len(),
                    transforms_claimed: ctx.gate().len(),
                    elapsed: start.elapsed(),
                };
                info!(
                    images,
                    pages = report.pages_visited,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "crawl completed"
                );
                ctx.emit(CrawlEvent::Completed { images });
                Ok(report)
            }
            Err(CrawlError::Cancelled) => {
                debug!(pages = ctx.visited().len(), "crawl cancelled");
                ctx.emit(CrawlEvent::Cancelled);
                Err(CrawlError::Cancelled)
            }
            Err(err) => Err(err),
        }
    }
}

impl fmt::Debug for ImageCrawler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageCrawler")
            .field("options", &self.options)
            .field("strategy", &self.strategy.kind())
            .field("pipeline", &self.pipeline.names())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Raises the cancellation flag of one crawler.
///
/// Cancellation is sticky: once raised, every later run of the same
/// crawler returns [`CrawlError::Cancelled`] immediately.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Builder for [`ImageCrawler`].
#[derive(Default)]
pub struct ImageCrawlerBuilder {
    options: Option<CrawlOptions>,
    fetcher: Option<Arc<dyn PageFetcher>>,
    platform: Option<Arc<dyn Platform>>,
    pipeline: Option<TransformPipeline>,
}

impl ImageCrawlerBuilder {
    pub fn options(mut self, options: CrawlOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn platform(mut self, platform: Arc<dyn Platform>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Transforms applied to every image. Defaults to identity only.
    pub fn pipeline(mut self, pipeline: TransformPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Validate the configuration and create the strategy's worker pool.
    pub fn build(self) -> CrawlResult<ImageCrawler> {
        let options = self
            .options
            .ok_or_else(|| CrawlError::invalid_config("crawl options are required"))?;
        if options.root.is_empty() {
            return Err(CrawlError::invalid_config("root location cannot be empty"));
        }
        if options.event_capacity == 0 {
            return Err(CrawlError::invalid_config("event capacity must be at least 1"));
        }
        let fetcher = self
            .fetcher
            .ok_or_else(|| CrawlError::invalid_config("no page fetcher bound"))?;
        let platform = self
            .platform
            .ok_or_else(|| CrawlError::invalid_config("no platform storage bound"))?;
        let pipeline = self.pipeline.unwrap_or_else(TransformPipeline::identity);
        if pipeline.is_empty() {
            return Err(CrawlError::invalid_config(
                "at least one transform must be configured",
            ));
        }

        let strategy = build_strategy(options.strategy, options.threads)?;
        let (events, _) = broadcast::channel(options.event_capacity);

        Ok(ImageCrawler {
            options,
            fetcher,
            platform,
            pipeline: Arc::new(pipeline),
            strategy,
            events,
            cancel: CancellationToken::new(),
        })
    }
}
