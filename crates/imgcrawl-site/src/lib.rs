//! In-memory site and storage platform for imgcrawl.
//!
//! [`SiteGraph`] is a [`PageFetcher`](imgcrawl_core::PageFetcher) over a fixed
//! graph of pages, loadable from a JSON manifest. [`MemoryPlatform`] is a
//! [`Platform`](imgcrawl_core::Platform) that synthesizes images from the
//! manifest and keeps stored artifacts in memory.
//!
//! Both count what they are asked to do, which is how the crawl engine's
//! at-most-once guarantees are checked.
//!
//! # Manifest format
//!
//! ```json
//! {
//!   "pages": {
//!     "http://site/index.html": {
//!       "links": ["http://site/a.html"],
//!       "images": ["http://site/cat.png"]
//!     },
//!     "http://site/a.html": { "links": ["http://site/index.html"] }
//!   },
//!   "images": {
//!     "http://site/cat.png": { "width": 4, "height": 4, "fill": [200, 120, 40, 255] }
//!   }
//! }
//! ```

mod error;
mod graph;
mod manifest;
mod normalize;
mod platform;

pub use error::SiteError;
pub use graph::{FetchHook, SiteGraph, SiteGraphBuilder, SitePage};
pub use manifest::{ImageSpec, PageSpec, SiteManifest};
pub use normalize::normalize;
pub use platform::MemoryPlatform;
