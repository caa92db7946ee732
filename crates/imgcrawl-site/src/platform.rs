//! In-memory storage platform.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use tracing::debug;

use imgcrawl_core::{
    CacheKey, ContentHash, DownloadError, Image, Location, Platform, StoreError, StoredRef,
};

use crate::graph::SiteGraph;

/// Platform that downloads images from a [`SiteGraph`] and stores
/// transformed artifacts in memory.
///
/// Downloads are idempotent: once an image is resident it is returned
/// without being rendered again. Concurrent first downloads of the same
/// location may both render it; only one copy stays resident.
#[derive(Debug)]
pub struct MemoryPlatform {
    site: Arc<SiteGraph>,
    cache_dir: PathBuf,
    resident: DashMap<Location, Image>,
    stored: DashMap<CacheKey, StoredRef>,
    rejected_transforms: HashSet<String>,
    downloads: AtomicUsize,
    store_calls: AtomicUsize,
}

impl MemoryPlatform {
    /// Create a platform serving images from `site`.
    pub fn new(site: Arc<SiteGraph>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            site,
            cache_dir: cache_dir.into(),
            resident: DashMap::new(),
            stored: DashMap::new(),
            rejected_transforms: HashSet::new(),
            downloads: AtomicUsize::new(0),
            store_calls: AtomicUsize::new(0),
        }
    }

    /// Refuse to store artifacts produced by `transform`.
    pub fn rejecting(mut self, transform: impl Into<String>) -> Self {
        self.rejected_transforms.insert(transform.into());
        self
    }

    /// Number of images actually rendered (resident hits excluded).
    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::Relaxed)
    }

    /// Number of store calls, successful or not.
    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::Relaxed)
    }

    /// Number of distinct artifacts stored.
    pub fn stored_count(&self) -> usize {
        self.stored.len()
    }

    /// Stored artifact for a key.
    pub fn stored(&self, key: &CacheKey) -> Option<StoredRef> {
        self.stored.get(key).map(|entry| entry.value().clone())
    }

    /// All stored keys, sorted by transform then source.
    pub fn stored_keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self.stored.iter().map(|e| e.key().clone()).collect();
        keys.sort_by(|a, b| (&a.transform, &a.source).cmp(&(&b.transform, &b.source)));
        keys
    }

    /// Total bytes stored.
    pub fn stored_bytes(&self) -> u64 {
        self.stored.iter().map(|e| e.value().bytes).sum()
    }
}

impl Platform for MemoryPlatform {
    fn download(&self, location: &Location) -> Result<Image, DownloadError> {
        if let Some(image) = self.resident.get(location) {
            return Ok(image.clone());
        }

        let spec = self.site.image(location).ok_or_else(|| DownloadError::NotFound {
            location: location.clone(),
        })?;
        let image = spec
            .render(location)
            .map_err(|source| DownloadError::InvalidImage {
                location: location.clone(),
                source,
            })?;
        self.downloads.fetch_add(1, Ordering::Relaxed);
        debug!(%location, bytes = image.byte_len(), "downloaded image");

        Ok(self
            .resident
            .entry(location.clone())
            .or_insert(image)
            .value()
            .clone())
    }

    fn store(&self, image: &Image, key: &CacheKey) -> Result<StoredRef, StoreError> {
        self.store_calls.fetch_add(1, Ordering::Relaxed);

        if self.rejected_transforms.contains(key.transform.as_str()) {
            return Err(StoreError::Rejected {
                key: key.clone(),
                message: "transform rejected by platform".to_string(),
            });
        }

        let stored = StoredRef {
            key: key.clone(),
            path: self
                .cache_dir
                .join(key.transform.as_str())
                .join(key.source.file_name()),
            hash: ContentHash::of(image.pixels()),
            bytes: image.byte_len(),
        };
        self.stored.insert(key.clone(), stored.clone());
        Ok(stored)
    }

    fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}
