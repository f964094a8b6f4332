//! In-memory resource resolution.
//!
//! Serves resources from a process-local map. Useful for embedding bundles
//! directly in a binary and for deterministic tests, since modification
//! times are set explicitly rather than read from a filesystem.

use crate::resolver::{ResolveError, ResolveResult, ResolvedResource, ResourceResolver};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::SystemTime;

#[derive(Debug, Clone)]
struct StoredResource {
    bytes: Vec<u8>,
    last_modified: Option<SystemTime>,
}

/// Map-backed resolver with settable per-resource timestamps.
#[derive(Debug, Default)]
pub struct InMemoryResolver {
    entries: RwLock<HashMap<String, StoredResource>>,
}

impl InMemoryResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a resource, stamping it with the current time.
    pub fn insert(&self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.insert_with_stamp(name, bytes, SystemTime::now());
    }

    /// Insert or replace a resource with an explicit modification time.
    pub fn insert_with_stamp(
        &self,
        name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        last_modified: SystemTime,
    ) {
        self.entries.write().insert(
            name.into(),
            StoredResource {
                bytes: bytes.into(),
                last_modified: Some(last_modified),
            },
        );
    }

    /// Insert or replace a resource that reports no modification time.
    pub fn insert_unstamped(&self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.write().insert(
            name.into(),
            StoredResource {
                bytes: bytes.into(),
                last_modified: None,
            },
        );
    }

    /// Remove a resource, if present.
    pub fn remove(&self, name: &str) {
        self.entries.write().remove(name);
    }

    /// Number of stored resources.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the resolver holds no resources.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ResourceResolver for InMemoryResolver {
    fn open(&self, name: &str) -> ResolveResult<ResolvedResource> {
        let entries = self.entries.read();
        let stored = entries.get(name).ok_or_else(|| ResolveError::NotFound {
            name: name.to_string(),
        })?;
        Ok(ResolvedResource {
            bytes: stored.bytes.clone(),
            last_modified: stored.last_modified,
        })
    }

    fn stat(&self, name: &str) -> ResolveResult<Option<SystemTime>> {
        let entries = self.entries.read();
        let stored = entries.get(name).ok_or_else(|| ResolveError::NotFound {
            name: name.to_string(),
        })?;
        Ok(stored.last_modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn serves_inserted_resources() {
        let resolver = InMemoryResolver::new();
        resolver.insert("bundle.properties", "key=value");

        let resource = resolver.open("bundle.properties").unwrap();
        assert_eq!(resource.bytes, b"key=value");
        assert!(resource.last_modified.is_some());
    }

    #[test]
    fn missing_resources_are_not_found() {
        let resolver = InMemoryResolver::new();
        assert!(resolver.open("missing").unwrap_err().is_not_found());
        assert!(resolver.stat("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn replacing_a_resource_updates_its_stamp() {
        let resolver = InMemoryResolver::new();
        let first = SystemTime::UNIX_EPOCH + Duration::from_secs(1);
        let second = SystemTime::UNIX_EPOCH + Duration::from_secs(2);

        resolver.insert_with_stamp("bundle.properties", "key=a", first);
        assert_eq!(resolver.stat("bundle.properties").unwrap(), Some(first));

        resolver.insert_with_stamp("bundle.properties", "key=b", second);
        assert_eq!(resolver.stat("bundle.properties").unwrap(), Some(second));
        assert_eq!(resolver.open("bundle.properties").unwrap().bytes, b"key=b");
    }

    #[test]
    fn unstamped_resources_report_no_time() {
        let resolver = InMemoryResolver::new();
        resolver.insert_unstamped("bundle.properties", "key=value");
        assert_eq!(resolver.stat("bundle.properties").unwrap(), None);
    }

    #[test]
    fn removal_makes_a_resource_not_found() {
        let resolver = InMemoryResolver::new();
        resolver.insert("bundle.properties", "key=value");
        resolver.remove("bundle.properties");
        assert!(resolver.open("bundle.properties").unwrap_err().is_not_found());
    }
}
