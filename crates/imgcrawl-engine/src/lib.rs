//! Crawl engine for imgcrawl.
//!
//! This crate runs the crawl algorithm over a [`PageFetcher`] and a
//! [`Platform`], counting the artifacts the transform pipeline produces.
//!
//! # Overview
//!
//! - **Three strategies** sharing one algorithm: sequential, fork-join
//!   (rayon) and future-pipeline (tokio + futures)
//! - **Page dedup** via a concurrent [`VisitedSet`]
//! - **Progress events** via broadcast channels
//! - **Cancellation** observed at the top of every crawl call and image batch
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use imgcrawl_core::{CrawlOptions, StrategyKind};
//! use imgcrawl_engine::ImageCrawler;
//! use imgcrawl_site::{MemoryPlatform, SiteGraph};
//!
//! let site = Arc::new(SiteGraph::from_json_file("site.json").unwrap());
//! let platform = Arc::new(MemoryPlatform::new(Arc::clone(&site), "downloaded-images"));
//!
//! let options = CrawlOptions::builder()
//!     .root("http://site/index.html")
//!     .strategy(StrategyKind::ForkJoin)
//!     .build()
//!     .unwrap();
//!
//! let crawler = ImageCrawler::builder()
//!     .options(options)
//!     .fetcher(site)
//!     .platform(platform)
//!     .build()
//!     .unwrap();
//!
//! let report = crawler.run().unwrap();
//! println!("{} images", report.images_processed);
//! ```
//!
//! [`PageFetcher`]: imgcrawl_core::PageFetcher
//! [`Platform`]: imgcrawl_core::Platform

mod context;
mod controller;
mod progress;
mod strategy;
mod visited;

pub use context::CrawlContext;
pub use controller::{CancelHandle, ImageCrawler, ImageCrawlerBuilder};
pub use progress::{CrawlEvent, CrawlReport};
pub use strategy::{
    CrawlStrategy, ForkJoinStrategy, FuturePipelineStrategy, SequentialStrategy, build_strategy,
};
pub use visited::VisitedSet;

// Re-export core types for convenience
pub use imgcrawl_core::{CrawlError, CrawlOptions, CrawlResult, Location, StrategyKind};
