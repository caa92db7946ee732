//! Page deduplication across concurrent crawl calls.

use dashmap::DashSet;
use imgcrawl_core::Location;

/// Tracks pages already claimed by a crawl call.
///
/// Claiming is an atomic insert: of any number of concurrent callers for
/// the same location, exactly one sees `true` and goes on to fetch it.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: DashSet<Location>,
}

impl VisitedSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            seen: DashSet::new(),
        }
    }

    /// Claim a location. Returns `true` if it had not been claimed before.
    pub fn insert(&self, location: Location) -> bool {
        self.seen.insert(location)
    }

    /// Check if a location has been claimed (without claiming it).
    pub fn contains(&self, location: &Location) -> bool {
        self.seen.contains(location)
    }

    /// Number of claimed locations.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_insert_once() {
        let visited = VisitedSet::new();
        let location = Location::new("http://site/a.html");

        assert!(!visited.contains(&location));
        assert!(visited.insert(location.clone()));
        assert!(!visited.insert(location.clone()));
        assert!(visited.contains(&location));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_concurrent_insert_single_winner() {
        let visited = VisitedSet::new();
        let winners: usize = (0..256)
            .into_par_iter()
            .map(|i| visited.insert(Location::new(format!("page-{}", i % 8))) as usize)
            .sum();

        assert_eq!(winners, 8);
        assert_eq!(visited.len(), 8);
    }
}
