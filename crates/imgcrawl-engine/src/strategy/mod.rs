//! Interchangeable schedulers for the crawl algorithm.
//!
//! Every strategy runs the same steps from [`CrawlContext`]: admit the
//! location, fetch the page, then count the page's images and the pages
//! behind its links. They differ only in how those two halves run:
//!
//! - [`SequentialStrategy`]: plain recursion on the calling thread
//! - [`ForkJoinStrategy`]: `rayon::join` on a work-stealing pool
//! - [`FuturePipelineStrategy`]: continuations on a tokio runtime

mod fork_join;
mod future_pipeline;
mod sequential;

use std::sync::Arc;

use imgcrawl_core::{CrawlResult, Location, StrategyKind};

use crate::context::CrawlContext;

pub use fork_join::ForkJoinStrategy;
pub use future_pipeline::FuturePipelineStrategy;
pub use sequential::SequentialStrategy;

/// A scheduler for the crawl algorithm.
pub trait CrawlStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Crawl from `root` at depth 0 and return the number of artifacts
    /// produced. The only error that escapes is cancellation.
    fn crawl(&self, ctx: Arc<CrawlContext>, root: Location) -> CrawlResult<u64>;
}

/// Create the strategy for `kind`.
///
/// `threads` sizes the worker pool of pooled strategies; 0 keeps the
/// pool's default.
pub fn build_strategy(kind: StrategyKind, threads: usize) -> CrawlResult<Box<dyn CrawlStrategy>> {
    Ok(match kind {
        StrategyKind::Sequential => Box::new(SequentialStrategy),
        StrategyKind::ForkJoin => Box::new(ForkJoinStrategy::new(threads)?),
        StrategyKind::FuturePipeline => Box::new(FuturePipelineStrategy::new(threads)?),
    })
}
