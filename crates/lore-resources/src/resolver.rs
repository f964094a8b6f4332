//! The resource resolution abstraction.

use std::time::SystemTime;
use thiserror::Error;

/// Errors that can occur while resolving a resource
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The named resource does not exist
    #[error("Resource not found: {name}")]
    NotFound { name: String },

    /// The resource exists but could not be read
    #[error("Failed to read resource {name}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    /// Whether this error is plain resource absence, which callers usually
    /// absorb rather than propagate.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for resolver operations
pub type ResolveResult<T> = Result<T, ResolveError>;

/// A fully-read resource plus its freshness metadata
#[derive(Debug, Clone)]
pub struct ResolvedResource {
    /// The resource's raw bytes
    pub bytes: Vec<u8>,
    /// When the resource was last modified, if the backing store knows
    pub last_modified: Option<SystemTime>,
}

/// Resolves resource names to bytes and modification times.
///
/// Implementations must be cheap to call concurrently; the message cache
/// issues `stat` calls on every revalidation pass. Timeouts and retries are
/// the resolver's responsibility.
pub trait ResourceResolver: Send + Sync {
    /// Open the named resource and read it to completion.
    fn open(&self, name: &str) -> ResolveResult<ResolvedResource>;

    /// Report the resource's last-modified time without reading it.
    ///
    /// Returns `Ok(None)` when the resource exists but the backing store
    /// does not track modification times; change detection is unavailable
    /// for such resources.
    fn stat(&self, name: &str) -> ResolveResult<Option<SystemTime>>;
}
