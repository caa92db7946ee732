//! Crawl progress events and the final run report.

use std::time::Duration;

use serde::Serialize;

use imgcrawl_core::{Location, StoredRef, StrategyKind};

/// Progress event broadcast to subscribers during a run.
///
/// Events are sent from whichever worker finishes the unit they describe,
/// so subscribers see them in completion order, not discovery order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum CrawlEvent {
    Started {
        root: Location,
        strategy: StrategyKind,
    },
    /// A page was claimed and is about to be fetched.
    PageVisited { location: Location, depth: u32 },
    /// A transform won the gate and its output was stored.
    ImageStored { stored: StoredRef },
    /// A page fetch, image download or transform failed. The crawl goes on.
    UnitFailed { location: Location, message: String },
    Completed { images: u64 },
    Cancelled,
}

/// Summary of a finished crawl run.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub strategy: StrategyKind,
    pub root: Location,
    /// Artifacts produced, i.e. the crawl count.
    pub images_processed: u64,
    /// Distinct pages claimed, including ones whose fetch failed.
    pub pages_visited: usize,
    /// Distinct `(source, transform)` keys claimed.
    pub transforms_claimed: usize,
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Artifacts produced per second.
    pub fn images_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.images_processed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images_per_second() {
        let mut report = CrawlReport {
            strategy: StrategyKind::Sequential,
            root: Location::new("http://site"),
            images_processed: 10,
            pages_visited: 2,
            transforms_claimed: 10,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(report.images_per_second(), 5.0);

        report.elapsed = Duration::ZERO;
        assert_eq!(report.images_per_second(), 0.0);
    }
}
