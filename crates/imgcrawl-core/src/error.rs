//! Error types for crawling operations.
//!
//! Per-unit failures ([`FetchError`], [`DownloadError`], [`TransformError`])
//! are logged and swallowed where they occur. [`CrawlError`] is what crosses
//! recursive crawl calls and the public API.

use thiserror::Error;

use crate::location::{CacheKey, Location};

/// Result type returned by every recursive crawl call.
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Errors that end a crawl run or prevent it from starting.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Cancellation was requested. This is a control signal, not a failure.
    #[error("Crawl cancelled")]
    Cancelled,

    /// Invalid setup detected before any crawl work started.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A worker pool or runtime could not be created or failed.
    #[error("Runtime error: {message}")]
    Runtime { message: String },
}

impl CrawlError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Check if this is the cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Errors from the page fetcher collaborator.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// No page exists at the location.
    #[error("Page not found: {location}")]
    NotFound { location: Location },

    /// The page exists but could not be read.
    #[error("Failed to fetch {location}: {message}")]
    Unreadable { location: Location, message: String },
}

/// Errors raised when constructing an [`Image`](crate::Image).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// Pixel buffer length does not match `width * height * 4`.
    #[error("Expected {expected} bytes of RGBA pixels, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Width or height is zero.
    #[error("Image has zero area ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// Errors from the platform's download operation.
#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    /// No image exists at the location.
    #[error("Image not found: {location}")]
    NotFound { location: Location },

    /// The downloaded payload is not a valid image.
    #[error("Invalid image at {location}: {source}")]
    InvalidImage {
        location: Location,
        #[source]
        source: ImageError,
    },
}

/// Errors from the platform's store operation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The artifact could not be stored.
    #[error("Failed to store {key}: {message}")]
    Rejected { key: CacheKey, message: String },
}

/// Errors from applying a transform to an image.
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    /// The transform function itself failed.
    #[error("Transform '{name}' failed on {source_location}: {message}")]
    Failed {
        name: String,
        source_location: Location,
        message: String,
    },

    /// The transformed image could not be stored.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from bounds-checked [`SplittableSequence`](crate::SplittableSequence) access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// Index past the end of the sequence.
    #[error("Index {index} out of range for sequence of length {len}")]
    OutOfBounds { index: usize, len: usize },

    /// Cursor removal without a preceding `advance`.
    #[error("No element to remove")]
    NothingToRemove,
}
