//! Duplicate sample id detection.
//!
//! Counts every id across the whole configuration before anything is
//! generated, so each specification learns whether its id is shared.

use samplegen_core::{SampleId, SampleSpec};
use std::collections::HashMap;

/// Occurrence counts of sample ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateIds {
    counts: HashMap<SampleId, usize>,
}

impl DuplicateIds {
    /// Counts the ids of `specs`.
    ///
    /// # Examples
    ///
    /// ```
    /// use samplegen_codegen::duplicates::DuplicateIds;
    /// use samplegen_core::SampleConfig;
    ///
    /// let config = SampleConfig::from_yaml_str("samples: [{id: a}, {id: b}, {id: a}]")?;
    /// let dups = DuplicateIds::resolve(config.samples());
    /// assert_eq!(dups.flags(config.samples()), vec![true, false, true]);
    /// # Ok::<(), samplegen_core::Error>(())
    /// ```
    #[must_use]
    pub fn resolve(specs: &[SampleSpec]) -> Self {
        let mut counts = HashMap::with_capacity(specs.len());
        for spec in specs {
            *counts.entry(spec.id().clone()).or_insert(0) += 1;
        }

        let shared = counts.values().filter(|&&n| n > 1).count();
        if shared > 0 {
            tracing::debug!(shared_ids = shared, "sample ids with duplicates");
        }

        Self { counts }
    }

    /// How many specifications carry `id`.
    #[must_use]
    pub fn count(&self, id: &SampleId) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// True iff `id` occurs more than once.
    #[must_use]
    pub fn has_duplicates(&self, id: &SampleId) -> bool {
        self.count(id) > 1
    }

    /// One flag per spec, in order.
    #[must_use]
    pub fn flags(&self, specs: &[SampleSpec]) -> Vec<bool> {
        specs.iter().map(|s| self.has_duplicates(s.id())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn specs(ids: &[&str]) -> Vec<SampleSpec> {
        ids.iter()
            .map(|id| SampleSpec::new(SampleId::new(*id), Map::new()))
            .collect()
    }

    #[test]
    fn test_all_unique() {
        let specs = specs(&["a", "b", "c"]);
        let dups = DuplicateIds::resolve(&specs);
        assert_eq!(dups.flags(&specs), vec![false, false, false]);
    }

    #[test]
    fn test_shared_ids_all_flagged() {
        let specs = specs(&["a", "b", "a", "c", "a"]);
        let dups = DuplicateIds::resolve(&specs);
        assert_eq!(dups.count(&SampleId::new("a")), 3);
        assert_eq!(dups.flags(&specs), vec![true, false, true, false, true]);
    }

    #[test]
    fn test_numeric_and_string_ids_share_a_count() {
        let config = samplegen_core::SampleConfig::from_yaml_str("samples: [{id: 7}, {id: \"7\"}]").unwrap();
        let dups = DuplicateIds::resolve(config.samples());
        assert_eq!(dups.flags(config.samples()), vec![true, true]);
    }

    #[test]
    fn test_empty() {
        let dups = DuplicateIds::resolve(&[]);
        assert!(!dups.has_duplicates(&SampleId::new("a")));
        assert_eq!(dups.count(&SampleId::new("a")), 0);
    }

    #[test]
    fn test_ids_compared_exactly() {
        let specs = specs(&["Get", "get", "get "]);
        let dups = DuplicateIds::resolve(&specs);
        assert_eq!(dups.flags(&specs), vec![false, false, false]);
    }
}
