use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use tokio::runtime::{Builder, Runtime};
use tracing::warn;

use imgcrawl_core::{CrawlError, CrawlResult, Location, Page, StrategyKind};

use super::CrawlStrategy;
use crate::context::CrawlContext;

type CountFuture = BoxFuture<'static, CrawlResult<u64>>;
type PageFuture = BoxFuture<'static, Option<Arc<dyn Page>>>;

/// Chained continuations on a multi-threaded tokio runtime.
///
/// A page fetch becomes a shared handle. The image count and the link
/// counts are continuations on that handle, and the link counts are
/// reduced pairwise. Only the outermost call blocks, waiting for the
/// whole chain to settle.
pub struct FuturePipelineStrategy {
    runtime: Runtime,
}

impl FuturePipelineStrategy {
    pub fn new(threads: usize) -> CrawlResult<Self> {
        let mut builder = Builder::new_multi_thread();
        if threads > 0 {
            builder.worker_threads(threads);
        }
        let runtime = builder
            .thread_name("imgcrawl-pipeline")
            .build()
            .map_err(|err| CrawlError::Runtime {
                message: format!("failed to build pipeline runtime: {err}"),
            })?;
        Ok(Self { runtime })
    }
}

impl CrawlStrategy for FuturePipelineStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FuturePipeline
    }

    fn crawl(&self, ctx: Arc<CrawlContext>, root: Location) -> CrawlResult<u64> {
        self.runtime.block_on(crawl_page(ctx, root, 0))
    }
}

fn crawl_page(ctx: Arc<CrawlContext>, location: Location, depth: u32) -> CountFuture {
    chain(ctx, location, depth).boxed()
}

async fn chain(ctx: Arc<CrawlContext>, location: Location, depth: u32) -> CrawlResult<u64> {
    if !ctx.admit(&location, depth)? {
        return Ok(0);
    }

    let page = fetch(Arc::clone(&ctx), location).shared();

    let on_page = page
        .clone()
        .then({
            let ctx = Arc::clone(&ctx);
            move |page| count_images(ctx, page)
        })
        .boxed();
    let on_links = page
        .then(move |page| count_links(ctx, page, depth + 1))
        .boxed();

    combine(on_page, on_links).await
}

fn fetch(ctx: Arc<CrawlContext>, location: Location) -> PageFuture {
    tokio::task::spawn_blocking(move || ctx.fetch_page(&location))
        .map(|joined| match joined {
            Ok(page) => page,
            Err(err) => {
                warn!(error = %err, "page fetch task failed");
                None
            }
        })
        .boxed()
}

fn count_images(ctx: Arc<CrawlContext>, page: Option<Arc<dyn Page>>) -> CountFuture {
    let Some(page) = page else {
        return future::ready(Ok(0)).boxed();
    };
    tokio::task::spawn_blocking(move || ctx.process_images(&page.images()))
        .map(|joined| match joined {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "image batch task failed");
                Ok(0)
            }
        })
        .boxed()
}

fn count_links(ctx: Arc<CrawlContext>, page: Option<Arc<dyn Page>>, depth: u32) -> CountFuture {
    let Some(page) = page else {
        return future::ready(Ok(0)).boxed();
    };
    let pending = page
        .links()
        .into_iter()
        .map(|link| spawn_link(Arc::clone(&ctx), link, depth))
        .collect();
    reduce_pairwise(pending)
}

fn spawn_link(ctx: Arc<CrawlContext>, link: Location, depth: u32) -> CountFuture {
    let handle = tokio::spawn(crawl_page(ctx, link.clone(), depth));
    handle
        .map(move |joined| match joined {
            Ok(result) => result,
            Err(err) => {
                warn!(location = %link, error = %err, "link crawl task failed");
                Ok(0)
            }
        })
        .boxed()
}

/// Sum two counts once both settle.
///
/// An error on one side is reported only after the other side has
/// finished too, so no spawned task outlives the crawl call.
fn combine(left: CountFuture, right: CountFuture) -> CountFuture {
    future::join(left, right)
        .map(|(left, right)| -> CrawlResult<u64> { Ok(left? + right?) })
        .boxed()
}

/// Combine neighbours round by round into a balanced tree of joins.
fn reduce_pairwise(mut pending: Vec<CountFuture>) -> CountFuture {
    while pending.len() > 1 {
        let mut round = Vec::with_capacity(pending.len().div_ceil(2));
        let mut futures = pending.into_iter();
        while let Some(left) = futures.next() {
            round.push(match futures.next() {
                Some(right) => combine(left, right),
                None => left,
            });
        }
        pending = round;
    }
    pending
        .pop()
        .unwrap_or_else(|| future::ready(Ok(0)).boxed())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::task::Poll;

    use super::*;

    fn ready(count: u64) -> CountFuture {
        future::ready(Ok(count)).boxed()
    }

    #[test]
    fn test_reduce_pairwise_sums() {
        let pending = (1..=7).map(ready).collect();
        assert_eq!(futures::executor::block_on(reduce_pairwise(pending)).unwrap(), 28);
        assert_eq!(futures::executor::block_on(reduce_pairwise(Vec::new())).unwrap(), 0);
    }

    #[test]
    fn test_combine_propagates_cancel() {
        let cancelled = future::ready(Err(CrawlError::Cancelled)).boxed();
        let result = futures::executor::block_on(combine(ready(3), cancelled));
        assert!(result.unwrap_err().is_cancelled());
    }

    #[test]
    fn test_combine_waits_for_both_sides_on_error() {
        let settled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&settled);
        let mut polled = false;
        let slow: CountFuture = future::poll_fn(move |cx| {
            if polled {
                flag.store(true, Ordering::SeqCst);
                Poll::Ready(Ok(1))
            } else {
                polled = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        })
        .boxed();
        let cancelled = future::ready(Err(CrawlError::Cancelled)).boxed();

        let result = futures::executor::block_on(combine(cancelled, slow));
        assert!(result.unwrap_err().is_cancelled());
        assert!(settled.load(Ordering::SeqCst));
    }
}
