//! Bundle views: one parsed resource, and the locale-merged result.

use crate::properties::ParseWarning;
use std::collections::HashMap;
use std::time::SystemTime;

/// Freshness stamp recorded for one resource in a fallback chain.
///
/// An absent resource is a legitimate state, not an error; recording it
/// explicitly lets a later *appearance* of the file register as a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStamp {
    /// The resource does not exist
    Absent,
    /// The resource exists and reported a modification time
    Modified(SystemTime),
    /// The resource exists but its resolver tracks no modification time,
    /// so change detection is unavailable for it
    Unstamped,
}

/// Parsed contents of exactly one basename+locale resource.
#[derive(Debug, Clone)]
pub struct RawBundle {
    resource: String,
    entries: Vec<(String, String)>,
    stamp: SourceStamp,
    warnings: Vec<ParseWarning>,
}

impl RawBundle {
    /// Wrap a parsed resource.
    pub fn new(
        resource: String,
        entries: Vec<(String, String)>,
        stamp: SourceStamp,
        warnings: Vec<ParseWarning>,
    ) -> Self {
        Self {
            resource,
            entries,
            stamp,
            warnings,
        }
    }

    /// The bundle for a resource that does not exist.
    pub fn absent(resource: String) -> Self {
        Self {
            resource,
            entries: Vec::new(),
            stamp: SourceStamp::Absent,
            warnings: Vec::new(),
        }
    }

    /// The resource name this bundle was parsed from.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Key/value pairs in source order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// The freshness stamp recorded at load time.
    pub fn stamp(&self) -> SourceStamp {
        self.stamp
    }

    /// Warnings recorded for skipped malformed lines.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// Whether the underlying resource was absent.
    pub fn is_absent(&self) -> bool {
        self.stamp == SourceStamp::Absent
    }
}

#[derive(Debug, Clone)]
struct MergedValue {
    pattern: String,
    precedence: usize,
}

/// The effective key→pattern view for a (basename, locale) pair.
///
/// Built by overlaying the fallback chain's raw bundles least specific
/// first, so a more specific locale's key overrides a less specific one.
/// Keys missing everywhere in the chain are simply absent.
#[derive(Debug, Default)]
pub struct MergedBundle {
    entries: HashMap<String, MergedValue>,
}

impl MergedBundle {
    /// Merge raw bundles ordered most specific first (fallback chain
    /// order).
    pub fn merge(raws: &[RawBundle]) -> Self {
        let mut entries = HashMap::new();
        // Walk least specific first so later inserts win. Within a single
        // source the pairs are already in order, giving last-wins there
        // too.
        for (precedence, raw) in raws.iter().enumerate().rev() {
            for (key, pattern) in raw.entries() {
                entries.insert(
                    key.clone(),
                    MergedValue {
                        pattern: pattern.clone(),
                        precedence,
                    },
                );
            }
        }
        Self { entries }
    }

    /// The pattern stored under the given code, if any.
    pub fn pattern(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(|value| value.pattern.as_str())
    }

    /// The pattern plus the fallback-chain position it came from
    /// (0 = the most specific locale in the chain).
    pub fn pattern_with_precedence(&self, code: &str) -> Option<(&str, usize)> {
        self.entries
            .get(code)
            .map(|value| (value.pattern.as_str(), value.precedence))
    }

    /// Number of distinct keys in the merged view.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the merged view holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(resource: &str, pairs: &[(&str, &str)]) -> RawBundle {
        RawBundle::new(
            resource.to_string(),
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            SourceStamp::Unstamped,
            Vec::new(),
        )
    }

    #[test]
    fn more_specific_locales_override_less_specific_ones() {
        let merged = MergedBundle::merge(&[
            raw("bundle_pt_BR.properties", &[("shared", "specific")]),
            raw("bundle_pt.properties", &[("shared", "language"), ("only_pt", "pt")]),
            raw("bundle.properties", &[("shared", "root"), ("only_root", "root")]),
        ]);

        assert_eq!(merged.pattern("shared"), Some("specific"));
        assert_eq!(merged.pattern("only_pt"), Some("pt"));
        assert_eq!(merged.pattern("only_root"), Some("root"));
        assert_eq!(merged.pattern("missing"), None);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn precedence_reports_the_contributing_chain_position() {
        let merged = MergedBundle::merge(&[
            raw("bundle_pt_BR.properties", &[("shared", "specific")]),
            raw("bundle.properties", &[("shared", "root"), ("only_root", "root")]),
        ]);

        assert_eq!(merged.pattern_with_precedence("shared"), Some(("specific", 0)));
        assert_eq!(merged.pattern_with_precedence("only_root"), Some(("root", 1)));
    }

    #[test]
    fn repeated_keys_within_one_source_keep_the_last_value() {
        let merged = MergedBundle::merge(&[raw(
            "bundle.properties",
            &[("key", "first"), ("key", "second")],
        )]);
        assert_eq!(merged.pattern("key"), Some("second"));
    }

    #[test]
    fn absent_bundles_contribute_nothing() {
        let merged = MergedBundle::merge(&[
            RawBundle::absent("bundle_fr.properties".to_string()),
            raw("bundle.properties", &[("key", "root")]),
        ]);
        assert_eq!(merged.pattern("key"), Some("root"));
        assert_eq!(merged.len(), 1);
    }
}
