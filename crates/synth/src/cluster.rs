//! Length-banded greedy clustering of indicator strings.
//!
//! Each string joins the first existing cluster in its length band whose
//! representative key is similar enough, otherwise it seeds a new cluster
//! keyed by itself. Order of encounter determines grouping; the maps are
//! insertion-ordered so the pass is reproducible.

use indexmap::IndexMap;
use strsim::normalized_levenshtein;
use yarsmith_core::config::SynthConfig;

/// Three ordinal bands by character length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthCategory {
    Short,
    Medium,
    Long,
}

impl LengthCategory {
    pub const ALL: [LengthCategory; 3] = [
        LengthCategory::Short,
        LengthCategory::Medium,
        LengthCategory::Long,
    ];

    pub fn of(s: &str, config: &SynthConfig) -> Self {
        let len = s.chars().count();
        if len <= config.small_string_max_len {
            LengthCategory::Short
        } else if len <= config.medium_string_max_len {
            LengthCategory::Medium
        } else {
            LengthCategory::Long
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LengthCategory::Short => "short",
            LengthCategory::Medium => "medium",
            LengthCategory::Long => "long",
        }
    }
}

/// All clusters of one synthesis pass, banded by length category. Members
/// may repeat: each occurrence across the corpus counts toward the
/// cluster's size.
#[derive(Debug, Default)]
pub struct Clusters {
    short: IndexMap<String, Vec<String>>,
    medium: IndexMap<String, Vec<String>>,
    long: IndexMap<String, Vec<String>>,
}

impl Clusters {
    pub fn new() -> Self {
        Self::default()
    }

    fn band(&self, category: LengthCategory) -> &IndexMap<String, Vec<String>> {
        match category {
            LengthCategory::Short => &self.short,
            LengthCategory::Medium => &self.medium,
            LengthCategory::Long => &self.long,
        }
    }

    fn band_mut(&mut self, category: LengthCategory) -> &mut IndexMap<String, Vec<String>> {
        match category {
            LengthCategory::Short => &mut self.short,
            LengthCategory::Medium => &mut self.medium,
            LengthCategory::Long => &mut self.long,
        }
    }

    /// Add one string occurrence: greedy first-match against existing
    /// representatives (similarity `>=` threshold joins), else a new
    /// cluster keyed by the string itself.
    pub fn add(&mut self, string: &str, config: &SynthConfig) -> LengthCategory {
        let category = LengthCategory::of(string, config);
        let band = self.band_mut(category);

        let matched = band
            .keys()
            .find(|key| normalized_levenshtein(string, key) >= config.similarity_threshold)
            .cloned();

        match matched.and_then(|key| band.get_mut(&key)) {
            Some(members) => members.push(string.to_string()),
            None => {
                band.insert(string.to_string(), vec![string.to_string()]);
            }
        }
        category
    }

    /// Representative keys of clusters that have reached `min_size`, in
    /// band and insertion order.
    pub fn ripe(&self, min_size: usize) -> Vec<(LengthCategory, String)> {
        let mut out = Vec::new();
        for category in LengthCategory::ALL {
            for (key, members) in self.band(category) {
                if members.len() >= min_size {
                    out.push((category, key.clone()));
                }
            }
        }
        out
    }

    pub fn members(&self, category: LengthCategory, key: &str) -> Option<&[String]> {
        self.band(category).get(key).map(|v| v.as_slice())
    }

    /// Empty a cluster while keeping its representative key, so later
    /// files can contribute to the next generation of the same cluster.
    pub fn reset(&mut self, category: LengthCategory, key: &str) {
        if let Some(members) = self.band_mut(category).get_mut(key) {
            members.clear();
        }
    }

    /// Debug dump of every cluster, mirroring the pass-end statistics log.
    pub fn log_statistics(&self) {
        for category in LengthCategory::ALL {
            for (key, members) in self.band(category) {
                tracing::debug!(
                    category = category.label(),
                    key = %key,
                    size = members.len(),
                    "cluster"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(threshold: f64) -> SynthConfig {
        SynthConfig {
            similarity_threshold: threshold,
            min_cluster_size: 10,
            small_string_max_len: 20,
            medium_string_max_len: 100,
            max_regexes_per_rule: 10,
            min_regex_length: 20,
            max_regex_length: 150,
            max_nested_quantifiers: 3,
            max_advanced_constructs: 2,
            max_escaped_characters: 10,
            max_classes_alternation: 20,
            author_name: "test".into(),
        }
    }

    #[test]
    fn bands_are_assigned_by_length() {
        let cfg = config(0.7);
        assert_eq!(LengthCategory::of("short", &cfg), LengthCategory::Short);
        assert_eq!(LengthCategory::of(&"m".repeat(21), &cfg), LengthCategory::Medium);
        assert_eq!(LengthCategory::of(&"l".repeat(101), &cfg), LengthCategory::Long);
    }

    #[test]
    fn similar_strings_share_a_cluster() {
        let cfg = config(0.7);
        let mut clusters = Clusters::new();
        clusters.add("\"download_payload_v1\"", &cfg);
        clusters.add("\"download_payload_v2\"", &cfg);

        let members = clusters
            .members(LengthCategory::Medium, "\"download_payload_v1\"")
            .unwrap();
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn similarity_exactly_at_threshold_joins() {
        // "abcd" vs "abcX": distance 1 over max length 4 = 0.75.
        let cfg = config(0.75);
        let mut clusters = Clusters::new();
        clusters.add("abcd", &cfg);
        clusters.add("abcX", &cfg);
        assert_eq!(
            clusters.members(LengthCategory::Short, "abcd").unwrap().len(),
            2
        );
    }

    #[test]
    fn similarity_below_threshold_starts_new_cluster() {
        // distance 2 over max length 4 = 0.5, below 0.75.
        let cfg = config(0.75);
        let mut clusters = Clusters::new();
        clusters.add("abcd", &cfg);
        clusters.add("abXX", &cfg);
        assert_eq!(
            clusters.members(LengthCategory::Short, "abcd").unwrap().len(),
            1
        );
        assert!(clusters.members(LengthCategory::Short, "abXX").is_some());
    }

    #[test]
    fn greedy_first_match_prefers_earlier_cluster() {
        let cfg = config(0.5);
        let mut clusters = Clusters::new();
        clusters.add("aaaa", &cfg);
        clusters.add("bbbb", &cfg);
        // Similar to both representatives; must join the first.
        clusters.add("aabb", &cfg);
        assert_eq!(
            clusters.members(LengthCategory::Short, "aaaa").unwrap().len(),
            2
        );
        assert_eq!(
            clusters.members(LengthCategory::Short, "bbbb").unwrap().len(),
            1
        );
    }

    #[test]
    fn reset_keeps_key_for_next_generation() {
        let cfg = config(0.7);
        let mut clusters = Clusters::new();
        clusters.add("\"persistent_marker_string\"", &cfg);
        clusters.reset(LengthCategory::Medium, "\"persistent_marker_string\"");
        assert_eq!(
            clusters
                .members(LengthCategory::Medium, "\"persistent_marker_string\"")
                .unwrap()
                .len(),
            0
        );
        // The next occurrence goes back into the same cluster.
        clusters.add("\"persistent_marker_string\"", &cfg);
        assert_eq!(
            clusters
                .members(LengthCategory::Medium, "\"persistent_marker_string\"")
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn ripe_reports_clusters_at_minimum_size() {
        let mut cfg = config(0.99);
        cfg.min_cluster_size = 3;
        let mut clusters = Clusters::new();
        for _ in 0..3 {
            clusters.add("\"repeated_indicator_value\"", &cfg);
        }
        clusters.add("\"unrelated_other_string!!\"", &cfg);

        let ripe = clusters.ripe(cfg.min_cluster_size);
        assert_eq!(ripe.len(), 1);
        assert_eq!(ripe[0].1, "\"repeated_indicator_value\"");
    }
}
