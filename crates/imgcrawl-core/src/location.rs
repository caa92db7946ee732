//! Page and image locations, and transform cache keys.

use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Normalized address of a page or image.
///
/// Normalization is the fetcher's job; equality here is exact-string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(CompactString);

impl Location {
    /// Create a location from an already-normalized string.
    pub fn new(location: impl AsRef<str>) -> Self {
        Self(CompactString::new(location.as_ref()))
    }

    /// Get the location as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Check if the location is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last path segment, used as a file name for stored artifacts.
    ///
    /// Falls back to the whole location with path separators replaced when
    /// there is no usable segment.
    pub fn file_name(&self) -> String {
        let trimmed = self.as_str().trim_end_matches('/');
        match trimmed.rsplit_once('/') {
            Some((_, name)) if !name.is_empty() => name.to_string(),
            _ => trimmed.replace(['/', ':'], "_"),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Self(CompactString::from(value))
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Identifies one transformed artifact: `(source location, transform name)`.
///
/// Two descriptors with the same name produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Location of the source image.
    pub source: Location,
    /// Name of the transform applied.
    pub transform: CompactString,
}

impl CacheKey {
    /// Create a new cache key.
    pub fn new(source: impl Into<Location>, transform: impl AsRef<str>) -> Self {
        Self {
            source: source.into(),
            transform: CompactString::new(transform.as_ref()),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.transform, self.source)
    }
}
