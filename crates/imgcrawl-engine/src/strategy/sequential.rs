use std::sync::Arc;

use imgcrawl_core::{CrawlResult, Location, StrategyKind};

use super::CrawlStrategy;
use crate::context::CrawlContext;

/// Single-threaded recursion. Images of a page are processed before its
/// links are followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialStrategy;

impl CrawlStrategy for SequentialStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Sequential
    }

    fn crawl(&self, ctx: Arc<CrawlContext>, root: Location) -> CrawlResult<u64> {
        crawl_page(&ctx, &root, 0)
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
    let mut total = ctx.process_images(&images)?;

    let links = page.links();
    for link in &links {
        total += crawl_page(ctx, link, depth + 1)?;
    }
    Ok(total)
}
