//! At-most-once transform claims.

use dashmap::DashSet;
use imgcrawl_core::CacheKey;

/// Guards each `(source, transform name)` pair so only one caller computes it.
///
/// The first caller to claim a key wins and must transform and store the
/// image. Every other caller, concurrent or later, loses and contributes
/// nothing. A claim is never released during a run, even if the winner's
/// transform fails.
#[derive(Debug, Default)]
pub struct TransformGate {
    claimed: DashSet<CacheKey>,
}

impl TransformGate {
    /// Create an empty gate.
    pub fn new() -> Self {
        Self {
            claimed: DashSet::new(),
        }
    }

    /// Claim a key. Returns `true` only for the first caller.
    pub fn try_claim(&self, key: &CacheKey) -> bool {
        if self.claimed.contains(key) {
            return false;
        }
        self.claimed.insert(key.clone())
    }

    /// Check if a key has been claimed (without claiming it).
    pub fn is_claimed(&self, key: &CacheKey) -> bool {
        self.claimed.contains(key)
    }

    /// Number of keys claimed so far.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_claim_wins() {
        let gate = TransformGate::new();
        let key = CacheKey::new("http://site/a.png", "grayscale");

        assert!(gate.try_claim(&key));
        assert!(!gate.try_claim(&key));
        assert!(gate.is_claimed(&key));
        assert_eq!(gate.len(), 1);
    }

    #[test]
    fn test_keys_differ_by_transform() {
        let gate = TransformGate::new();

        assert!(gate.try_claim(&CacheKey::new("http://site/a.png", "grayscale")));
        assert!(gate.try_claim(&CacheKey::new("http://site/a.png", "tint")));
        assert!(gate.try_claim(&CacheKey::new("http://site/b.png", "tint")));
        assert_eq!(gate.len(), 3);
    }
}
