//! Collaborator traits consumed by the crawl engine.
//!
//! Parsing pages, fetching bytes and laying out storage are the platform's
//! business. The engine only sees these traits.

use std::path::Path;
use std::sync::Arc;

use crate::error::{DownloadError, FetchError, StoreError};
use crate::image::{Image, StoredRef};
use crate::location::{CacheKey, Location};
use crate::sequence::SplittableSequence;

/// A fetched page.
///
/// Both sequences are materialized on demand by the fetcher and consumed
/// read-only by the engine.
pub trait Page: Send + Sync {
    /// Location this page was fetched from.
    fn location(&self) -> &Location;

    /// Hyperlinks on the page, normalized.
    fn links(&self) -> SplittableSequence<Location>;

    /// Image sources on the page, normalized.
    fn images(&self) -> SplittableSequence<Location>;
}

/// Fetches pages by location.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, location: &Location) -> Result<Arc<dyn Page>, FetchError>;

    /// Canonical form of `location`, matching the form of the links this
    /// fetcher hands out. The crawl root passes through here before it is
    /// claimed.
    fn normalize(&self, location: &Location) -> Location {
        location.clone()
    }
}

/// Platform storage for downloaded and transformed images.
///
/// Implementations must be safe to call concurrently for different keys.
pub trait Platform: Send + Sync {
    /// Obtain the image at `location`.
    ///
    /// Idempotent: an image already resident in storage is returned without
    /// being fetched again.
    fn download(&self, location: &Location) -> Result<Image, DownloadError>;

    /// Store a transformed image under `key`.
    fn store(&self, image: &Image, key: &CacheKey) -> Result<StoredRef, StoreError>;

    /// Root directory for stored artifacts.
    fn cache_dir(&self) -> &Path;
}
