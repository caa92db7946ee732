use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use imgcrawl_core::{
    CrawlError, CrawlResult, Location, SplitView, SplittableSequence, StrategyKind,
};

use super::CrawlStrategy;
use crate::context::CrawlContext;

/// Recursive fork-join on a dedicated work-stealing pool.
///
/// Each page forks its image batch against its links; the links are split
/// in halves until single links remain. A worker blocked in `join` keeps
/// executing stolen work, so deep recursion never starves the pool.
pub struct ForkJoinStrategy {
    pool: ThreadPool,
}

impl ForkJoinStrategy {
    pub fn new(threads: usize) -> CrawlResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("imgcrawl-fork-join-{index}"))
            .build()
            .map_err(|err| CrawlError::Runtime {
                message: format!("failed to build fork-join pool: {err}"),
            })?;
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl CrawlStrategy for ForkJoinStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ForkJoin
    }

    fn crawl(&self, ctx: Arc<CrawlContext>, root: Location) -> CrawlResult<u64> {
        self.pool.install(|| crawl_page(&ctx, &root, 0))
    }
}

fn crawl_page(ctx: &CrawlContext, location: &Location, depth: u32) -> CrawlResult<u64> {
    if !ctx.admit(location, depth)? {
        return Ok(0);
    }
    let Some(page) = ctx.fetch_page(location) else {
        return Ok(0);
    };

    let images = page.images();
    let links = page.links();
    let (on_page, on_links) = rayon::join(
        || process_batch(ctx, &images),
        || crawl_links(ctx, links.split_view(), depth + 1),
    );
    Ok(on_page? + on_links?)
}

fn process_batch(ctx: &CrawlContext, images: &SplittableSequence<Location>) -> CrawlResult<u64> {
    ctx.check_cancelled()?;
    Ok(images
        .par_iter()
        .map(|location| ctx.process_image(location))
        .sum())
}

fn crawl_links(ctx: &CrawlContext, mut links: SplitView<'_, Location>, depth: u32) -> CrawlResult<u64> {
    match links.split() {
        Some(rest) => {
            let (front, back) = rayon::join(
                || crawl_links(ctx, links, depth),
                || crawl_links(ctx, rest, depth),
            );
            Ok(front? + back?)
        }
        None => links.try_fold(0, |total, link| {
            crawl_page(ctx, link, depth).map(|count| total + count)
        }),
    }
}
