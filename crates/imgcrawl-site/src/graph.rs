//! In-memory page graph.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use imgcrawl_core::{FetchError, Location, Page, PageFetcher, SplittableSequence};

use crate::error::SiteError;
use crate::manifest::{ImageSpec, PageSpec, SiteManifest};
use crate::normalize::normalize;

/// Callback run on every fetch, before the page is looked up.
pub type FetchHook = Arc<dyn Fn(&Location) + Send + Sync>;

/// A page in a [`SiteGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePage {
    location: Location,
    links: Vec<Location>,
    images: Vec<Location>,
}

impl Page for SitePage {
    fn location(&self) -> &Location {
        &self.location
    }

    fn links(&self) -> SplittableSequence<Location> {
        self.links.iter().cloned().collect()
    }

    fn images(&self) -> SplittableSequence<Location> {
        self.images.iter().cloned().collect()
    }
}

/// Fixed graph of pages and images, served by location.
pub struct SiteGraph {
    pages: HashMap<Location, Arc<SitePage>>,
    images: HashMap<Location, ImageSpec>,
    fetches: DashMap<Location, usize>,
    fetch_hook: Option<FetchHook>,
}

impl SiteGraph {
    /// Create a graph builder.
    pub fn builder() -> SiteGraphBuilder {
        SiteGraphBuilder::default()
    }

    /// Build a graph from a parsed manifest.
    pub fn from_manifest(manifest: SiteManifest) -> Self {
        let mut builder = Self::builder();
        for (location, spec) in manifest.pages {
            builder = builder.page(&location, spec.links, spec.images);
        }
        for (location, spec) in manifest.images {
            builder = builder.image(&location, spec);
        }
        builder.build()
    }

    /// Parse a JSON manifest.
    pub fn from_json_str(json: &str) -> Result<Self, SiteError> {
        let manifest: SiteManifest = serde_json::from_str(json)?;
        Ok(Self::from_manifest(manifest))
    }

    /// Load a JSON manifest from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SiteError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SiteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Run `hook` on every fetch.
    pub fn with_fetch_hook(mut self, hook: impl Fn(&Location) + Send + Sync + 'static) -> Self {
        self.fetch_hook = Some(Arc::new(hook));
        self
    }

    /// Image spec at a location, if the site has one.
    pub fn image(&self, location: &Location) -> Option<&ImageSpec> {
        self.images.get(location)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// How many times `location` has been fetched.
    pub fn fetch_count(&self, location: &str) -> usize {
        self.fetches
            .get(&normalize(location))
            .map(|count| *count)
            .unwrap_or(0)
    }

    /// Total fetch calls across all locations.
    pub fn total_fetches(&self) -> usize {
        self.fetches.iter().map(|entry| *entry.value()).sum()
    }

    /// Every location fetched at least once, sorted.
    pub fn fetched(&self) -> Vec<Location> {
        let mut fetched: Vec<Location> = self.fetches.iter().map(|e| e.key().clone()).collect();
        fetched.sort();
        fetched
    }

    /// Forget all recorded fetches.
    pub fn reset_counters(&self) {
        self.fetches.clear();
    }
}

impl PageFetcher for SiteGraph {
    fn fetch(&self, location: &Location) -> Result<Arc<dyn Page>, FetchError> {
        let location = normalize(location.as_str());
        *self.fetches.entry(location.clone()).or_insert(0) += 1;

        if let Some(hook) = &self.fetch_hook {
            hook(&location);
        }

        match self.pages.get(&location) {
            Some(page) => {
                debug!(%location, links = page.links.len(), images = page.images.len(), "fetched page");
                let page: Arc<dyn Page> = page.clone();
                Ok(page)
            }
            None => Err(FetchError::NotFound { location }),
        }
    }

    fn normalize(&self, location: &Location) -> Location {
        normalize(location.as_str())
    }
}

impl fmt::Debug for SiteGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteGraph")
            .field("pages", &self.pages.len())
            .field("images", &self.images.len())
            .field("fetches", &self.total_fetches())
            .finish_non_exhaustive()
    }
}

impl Default for SiteGraph {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`SiteGraph`]. All locations are normalized on the way in.
#[derive(Debug, Default)]
pub struct SiteGraphBuilder {
    pages: HashMap<Location, PageSpec>,
    images: HashMap<Location, ImageSpec>,
}

impl SiteGraphBuilder {
    /// Add a page with its links and image references.
    pub fn page<L, I>(mut self, location: &str, links: L, images: I) -> Self
    where
        L: IntoIterator,
        L::Item: AsRef<str>,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let spec = PageSpec {
            links: links.into_iter().map(|l| l.as_ref().to_string()).collect(),
            images: images.into_iter().map(|i| i.as_ref().to_string()).collect(),
        };
        self.pages.insert(normalize(location), spec);
        self
    }

    /// Add an image.
    pub fn image(mut self, location: &str, spec: ImageSpec) -> Self {
        self.images.insert(normalize(location), spec);
        self
    }

    /// Add a 1x1 image with a gray fill.
    pub fn pixel(self, location: &str) -> Self {
        self.image(location, ImageSpec::new(1, 1, [128, 128, 128, 255]))
    }

    pub fn build(self) -> SiteGraph {
        let pages = self
            .pages
            .into_iter()
            .map(|(location, spec)| {
                let page = SitePage {
                    links: spec.links.iter().map(|l| normalize(l)).collect(),
                    images: spec.images.iter().map(|i| normalize(i)).collect(),
                    location: location.clone(),
                };
                (location, Arc::new(page))
            })
            .collect();

        SiteGraph {
            pages,
            images: self.images,
            fetches: DashMap::new(),
            fetch_hook: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_links() -> [&'static str; 0] {
        []
    }

    #[test]
    fn test_fetch_counts_and_normalizes() {
        let site = SiteGraph::builder()
            .page("http://site/", ["http://site/a.html#frag"], no_links())
            .page("http://site/a.html", no_links(), ["http://site/x.png"])
            .build();

        let root = site.fetch(&Location::new("http://site/")).unwrap();
        assert_eq!(root.location().as_str(), "http://site");
        assert_eq!(root.links().as_slice(), &[Location::new("http://site/a.html")]);

        site.fetch(&Location::new("http://site/a.html")).unwrap();
        site.fetch(&Location::new("http://site/a.html")).unwrap();

        assert_eq!(site.fetch_count("http://site/a.html"), 2);
        assert_eq!(site.fetch_count("http://site"), 1);
        assert_eq!(site.total_fetches(), 3);
    }

    #[test]
    fn test_normalize_matches_link_form() {
        let site = SiteGraph::builder()
            .page("http://site/", ["http://site/a.html"], no_links())
            .page("http://site/a.html", ["http://site/#top"], no_links())
            .build();

        let back_link = site.fetch(&Location::new("http://site/a.html")).unwrap().links();
        let root = PageFetcher::normalize(&site, &Location::new("http://site/"));
        assert_eq!(back_link.as_slice(), &[root]);
    }

    #[test]
    fn test_fetch_missing_page() {
        let site = SiteGraph::default();
        let err = site.fetch(&Location::new("http://nowhere")).err().unwrap();
        assert!(matches!(err, FetchError::NotFound { .. }));
        assert_eq!(site.fetch_count("http://nowhere"), 1);
    }

    #[test]
    fn test_fetch_hook_runs() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let site = SiteGraph::builder()
            .page("a", no_links(), no_links())
            .build()
            .with_fetch_hook(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            });

        site.fetch(&Location::new("a")).unwrap();
        site.fetch(&Location::new("b")).err().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
