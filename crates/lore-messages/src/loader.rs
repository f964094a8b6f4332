//! Loading of single basename+locale resources.

use crate::bundle::{RawBundle, SourceStamp};
use crate::locale::Locale;
use crate::properties;
use encoding_rs::Encoding;
use lore_resources::ResourceResolver;
use std::sync::Arc;
use tracing::{debug, warn};

/// File extension for bundle resources
const EXTENSION: &str = ".properties";

/// Loads and re-stats bundle resources through a [`ResourceResolver`].
///
/// Absence is an expected outcome here, not an error: a locale legitimately
/// has no file, and the absent state is recorded so a later appearance of
/// the file registers as a change. Read failures are absorbed the same way
/// and logged; the cache's TTL machinery re-attempts after expiry.
pub struct BundleLoader {
    resolver: Arc<dyn ResourceResolver>,
    charset: &'static Encoding,
}

impl std::fmt::Debug for BundleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleLoader")
            .field("charset", &self.charset.name())
            .finish()
    }
}

impl BundleLoader {
    /// Create a loader reading through the given resolver.
    pub fn new(resolver: Arc<dyn ResourceResolver>, charset: &'static Encoding) -> Self {
        Self { resolver, charset }
    }

    /// Change the charset used to decode bundle bytes.
    pub fn set_charset(&mut self, charset: &'static Encoding) {
        self.charset = charset;
    }

    /// The resource name for a basename and locale candidate, e.g.
    /// `bundle_pt_BR.properties` or `bundle.properties` for the root.
    pub fn resource_name(basename: &str, locale: &Locale) -> String {
        format!("{}{}{}", basename, locale.suffix(), EXTENSION)
    }

    /// Load the resource for one basename+locale candidate.
    pub fn load(&self, basename: &str, locale: &Locale) -> RawBundle {
        let name = Self::resource_name(basename, locale);
        match self.resolver.open(&name) {
            Ok(resource) => {
                let stamp = match resource.last_modified {
                    Some(time) => SourceStamp::Modified(time),
                    None => SourceStamp::Unstamped,
                };
                let parsed = properties::parse(&resource.bytes, self.charset);
                for warning in &parsed.warnings {
                    warn!(
                        "Skipped malformed line {} in {}: {}",
                        warning.line, name, warning.reason
                    );
                }
                debug!("Loaded {} entries from {}", parsed.entries.len(), name);
                RawBundle::new(name, parsed.entries, stamp, parsed.warnings)
            }
            Err(err) if err.is_not_found() => {
                debug!("No bundle resource {}", name);
                RawBundle::absent(name)
            }
            Err(err) => {
                warn!("Failed to read bundle resource {}: {}", name, err);
                RawBundle::absent(name)
            }
        }
    }

    /// Re-check a previously-loaded resource's stamp without reading it.
    pub fn stat(&self, resource: &str) -> SourceStamp {
        match self.resolver.stat(resource) {
            Ok(Some(time)) => SourceStamp::Modified(time),
            Ok(None) => SourceStamp::Unstamped,
            Err(err) if err.is_not_found() => SourceStamp::Absent,
            Err(err) => {
                debug!("Failed to stat bundle resource {}: {}", resource, err);
                SourceStamp::Absent
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;
    use lore_resources::InMemoryResolver;

    fn loader_with(resolver: InMemoryResolver) -> BundleLoader {
        BundleLoader::new(Arc::new(resolver), UTF_8)
    }

    #[test]
    fn builds_suffixed_resource_names() {
        assert_eq!(
            BundleLoader::resource_name("bundle", &Locale::with_country("pt", "BR")),
            "bundle_pt_BR.properties"
        );
        assert_eq!(
            BundleLoader::resource_name("bundle", &Locale::ROOT),
            "bundle.properties"
        );
    }

    #[test]
    fn loads_and_parses_an_existing_resource() {
        let resolver = InMemoryResolver::new();
        resolver.insert("bundle_en.properties", "greeting=Hello");
        let loader = loader_with(resolver);

        let raw = loader.load("bundle", &Locale::new("en"));
        assert!(!raw.is_absent());
        assert_eq!(raw.entries(), &[("greeting".to_string(), "Hello".to_string())]);
        assert!(matches!(raw.stamp(), SourceStamp::Modified(_)));
    }

    #[test]
    fn a_missing_resource_loads_as_absent() {
        let loader = loader_with(InMemoryResolver::new());
        let raw = loader.load("bundle", &Locale::new("fr"));
        assert!(raw.is_absent());
        assert!(raw.entries().is_empty());
    }

    #[test]
    fn malformed_lines_are_recorded_not_fatal() {
        let resolver = InMemoryResolver::new();
        resolver.insert("bundle.properties", "ok=fine\nbroken=\\u12zz\nstill=here");
        let loader = loader_with(resolver);

        let raw = loader.load("bundle", &Locale::ROOT);
        assert_eq!(raw.entries().len(), 2);
        assert_eq!(raw.warnings().len(), 1);
    }

    #[test]
    fn stat_distinguishes_absent_from_unstamped() {
        let resolver = InMemoryResolver::new();
        resolver.insert_unstamped("bundle.properties", "key=value");
        let loader = loader_with(resolver);

        assert_eq!(loader.stat("bundle.properties"), SourceStamp::Unstamped);
        assert_eq!(loader.stat("bundle_fr.properties"), SourceStamp::Absent);
    }
}
