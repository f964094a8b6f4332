//! Filesystem-backed resource resolution.

use crate::copy;
use crate::location;
use crate::resolver::{ResolveError, ResolveResult, ResolvedResource, ResourceResolver};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Resolves resource names against a base directory.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    /// Base directory for bundle resources
    base_dir: PathBuf,
}

impl FileSystemResolver {
    /// Create a new resolver rooted at the given directory.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Create a resolver from a configured location string.
    ///
    /// A `file:` prefix is recognized and stripped; bare paths are used
    /// as-is.
    pub fn from_location(location: &str) -> Self {
        Self::new(location::strip_file_prefix(location))
    }

    /// The base directory resources are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Join the resource name onto the base directory, rejecting names that
    /// would escape it.
    fn path_for(&self, name: &str) -> ResolveResult<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            warn!("Rejected resource name escaping the base directory: {}", name);
            return Err(ResolveError::NotFound {
                name: name.to_string(),
            });
        }
        Ok(self.base_dir.join(relative))
    }
}

impl ResourceResolver for FileSystemResolver {
    fn open(&self, name: &str) -> ResolveResult<ResolvedResource> {
        let path = self.path_for(name)?;
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("Resource does not exist: {:?}", path);
                return Err(ResolveError::NotFound {
                    name: name.to_string(),
                });
            }
            Err(err) => {
                return Err(ResolveError::Io {
                    name: name.to_string(),
                    source: err,
                })
            }
        };
        let last_modified = file.metadata().ok().and_then(|meta| meta.modified().ok());
        let bytes = copy::drain(file).map_err(|source| ResolveError::Io {
            name: name.to_string(),
            source,
        })?;
        debug!("Read {} bytes from {:?}", bytes.len(), path);
        Ok(ResolvedResource {
            bytes,
            last_modified,
        })
    }

    fn stat(&self, name: &str) -> ResolveResult<Option<SystemTime>> {
        let path = self.path_for(name)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.modified().ok()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(ResolveError::NotFound {
                name: name.to_string(),
            }),
            Err(err) => Err(ResolveError::Io {
                name: name.to_string(),
                source: err,
            }),
        }
    }
}
