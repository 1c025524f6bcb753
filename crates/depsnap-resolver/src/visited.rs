//! Visited-key tracking for the closure traversal.

use std::collections::HashSet;

/// Keys already expanded during one traversal, so that cycles terminate and
/// each package is queried at most once.
#[derive(Debug, Default)]
pub struct VisitedSet {
    visited: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as visited. Returns `false` if it already was.
    pub fn visit(&mut self, key: &str) -> bool {
        self.visited.insert(key.to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.visited.contains(key)
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visited_tracking() {
        let mut set = VisitedSet::new();
        assert!(set.is_empty());
        assert!(set.visit("app@1.0.0"));
        assert!(!set.visit("app@1.0.0"));
        assert!(set.contains("app@1.0.0"));
        assert!(!set.contains("app"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn root_key_and_bare_name_are_distinct() {
        let mut set = VisitedSet::new();
        assert!(set.visit("app@1.0.0"));
        assert!(set.visit("app"));
        assert_eq!(set.len(), 2);
    }
}
