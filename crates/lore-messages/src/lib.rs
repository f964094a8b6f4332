//! Reloadable, locale-aware message bundles.
//!
//! This crate maps a message *code* plus a target *locale* to a
//! human-readable string, backed by property-file bundles per locale. It
//! provides:
//!
//! - Flat `key=value` property parsing with comment, separator, and escape
//!   handling
//! - Locale fallback chains (`pt-BR` → `pt` → default → root)
//! - A concurrent cache that keeps merged bundles hot in memory and
//!   revalidates them against their sources after a configurable TTL,
//!   reloading only when a source actually changed
//! - Positional `{0}` message formatting
//! - A [`MessageSource`] facade tying it all together
//!
//! # Example
//!
//! ```rust
//! use lore_messages::{InMemoryResolver, Locale, MessageSource};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), lore_messages::MessageError> {
//! let resolver = Arc::new(InMemoryResolver::new());
//! resolver.insert("greetings_en.properties", "hello=Hello {0}!");
//! resolver.insert("greetings_pt_BR.properties", "hello=Olá {0}!");
//!
//! let mut source = MessageSource::new(resolver);
//! source.set_basename("greetings");
//! source.set_default_locale(Locale::new("en"));
//!
//! let text = source.get_message("hello", &["Ana"], &Locale::with_country("pt", "BR"))?;
//! assert_eq!(text, "Olá Ana!");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod bundle;
pub mod cache;
pub mod error;
pub mod format;
pub mod loader;
pub mod locale;
pub mod properties;
pub mod resolvable;
pub mod source;

pub use cache::{CacheStats, MessageCache};
pub use error::{MessageError, MessageResult};
pub use locale::{fallback_chain, Locale};
pub use resolvable::MessageResolvable;
pub use source::{BasenamePrecedence, MessageSource, MessageSourceConfig};

// Re-export the resolver abstraction so hosts don't need a direct
// lore-resources dependency for the common case.
pub use lore_resources::{FileSystemResolver, InMemoryResolver, ResolveError, ResourceResolver};
