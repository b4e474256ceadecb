//! Duplicate product suppression
//!
//! The store lists the same product under several categories and on several
//! listing pages. The `(barcode, article)` pair identifies one SKU; once a
//! pair has been emitted, later sightings are dropped silently.

use std::collections::HashSet;

/// Run-lifetime seen-set over `(barcode, article)` pairs
///
/// Constructed by the caller and handed to a product walker, so its
/// lifetime is explicit and tests never leak state into each other.
/// The set only grows; there is no eviction within a run.
#[derive(Debug, Default)]
pub struct DedupFilter {
    seen: HashSet<(String, String)>,
}

impl DedupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the pair was already seen; records it otherwise.
    ///
    /// Pairs with an empty component never count as duplicates - two
    /// products that both failed barcode extraction are not the same SKU.
    pub fn check_and_insert(&mut self, barcode: &str, article: &str) -> bool {
        if barcode.is_empty() || article.is_empty() {
            return false;
        }

        !self
            .seen
            .insert((barcode.to_string(), article.to_string()))
    }

    /// Number of distinct pairs recorded so far
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

    #[test]
    fn test_first_sighting_passes() {
        let mut filter = DedupFilter::new();
        assert!(!filter.check_and_insert("4601234", "A-1"));
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_second_sighting_is_duplicate() {
        let mut filter = DedupFilter::new();
        filter.check_and_insert("4601234", "A-1");
        assert!(filter.check_and_insert("4601234", "A-1"));
        // Idempotent: asking again changes nothing
        assert!(filter.check_and_insert("4601234", "A-1"));
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_differing_pairs_both_pass() {
        let mut filter = DedupFilter::new();
        assert!(!filter.check_and_insert("4601234", "A-1"));
        assert!(!filter.check_and_insert("4601234", "A-2"));
        assert!(!filter.check_and_insert("4609999", "A-1"));
        assert_eq!(filter.len(), 3);
    }

    #[test]
    fn test_empty_components_never_dedup() {
        let mut filter = DedupFilter::new();
        assert!(!filter.check_and_insert("", "A-1"));
        assert!(!filter.check_and_insert("", "A-1"));
        assert!(!filter.check_and_insert("4601234", ""));
        assert!(!filter.check_and_insert("4601234", ""));
        assert!(filter.is_empty());
    }
}
