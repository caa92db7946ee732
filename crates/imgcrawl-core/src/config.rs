//! Crawl configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::location::Location;

/// Scheduling strategy used to run the crawl algorithm.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StrategyKind {
    /// Single-threaded recursion.
    #[default]
    Sequential,
    /// Sibling tasks on a work-stealing pool, joined synchronously.
    ForkJoin,
    /// Chained asynchronous continuations.
    FuturePipeline,
}

/// Options for one crawl run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CrawlOptions {
    /// Location the crawl starts from.
    pub root: Location,

    /// Deepest level crawled; the root is depth 0.
    #[builder(default = "3")]
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Directory transformed images are stored under.
    #[builder(default = "PathBuf::from(\"downloaded-images\")")]
    #[serde(default = "default_download_path")]
    pub download_path: PathBuf,

    /// Scheduling strategy.
    #[builder(default)]
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Emit per-call diagnostic traces.
    #[builder(default = "false")]
    #[serde(default)]
    pub diagnostics: bool,

    /// Worker threads for pooled strategies (0 = pool default).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Buffered progress events per subscriber.
    #[builder(default = "1024")]
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_max_depth() -> u32 {
    3
}

fn default_download_path() -> PathBuf {
    PathBuf::from("downloaded-images")
}

fn default_event_capacity() -> usize {
    1024
}

impl CrawlOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.is_empty() => {
                return Err("Root location cannot be empty".to_string());
            }
            None => return Err("Root location is required".to_string()),
            _ => {}
        }
        if self.event_capacity == Some(0) {
            return Err("Event capacity must be at least 1".to_string());
        }
        Ok(())
    }
}

impl CrawlOptions {
    /// Create a new options builder.
    pub fn builder() -> CrawlOptionsBuilder {
        CrawlOptionsBuilder::default()
    }

    /// Create default options for crawling from `root`.
    pub fn new(root: impl Into<Location>) -> Self {
        Self {
            root: root.into(),
            max_depth: default_max_depth(),
            download_path: default_download_path(),
            strategy: StrategyKind::default(),
            diagnostics: false,
            threads: 0,
            event_capacity: default_event_capacity(),
        }
    }
}
