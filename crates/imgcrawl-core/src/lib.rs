//! Core types and traits for imgcrawl.
//!
//! This crate provides the value types shared by every other imgcrawl crate:
//! locations and cache keys, in-memory images, the collaborator traits the
//! crawl engine consumes (page fetching and platform storage), crawl options,
//! and the [`SplittableSequence`] container used to feed divide-and-conquer
//! parallelism.

mod config;
mod error;
mod image;
mod location;
mod page;
mod sequence;

pub use config::{CrawlOptions, CrawlOptionsBuilder, StrategyKind};
pub use error::{
    CrawlError, CrawlResult, DownloadError, FetchError, ImageError, SequenceError, StoreError,
    TransformError,
};
pub use image::{ContentHash, Image, StoredRef};
pub use location::{CacheKey, Location};
pub use page::{Page, PageFetcher, Platform};
pub use sequence::{Cursor, SplitView, SplittableSequence, DEFAULT_CAPACITY};
