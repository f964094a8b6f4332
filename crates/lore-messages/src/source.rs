//! The message source facade.

use crate::cache::{CacheStats, MessageCache};
use crate::error::{MessageError, MessageResult};
use crate::format;
use crate::loader::BundleLoader;
use crate::locale::Locale;
use crate::resolvable::MessageResolvable;
use encoding_rs::{Encoding, UTF_8};
use lore_resources::{FileSystemResolver, ResourceResolver};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// How multiple configured basenames rank against each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BasenamePrecedence {
    /// Basenames are searched outermost: the first basename able to
    /// resolve a code at any fallback level wins, even over a more
    /// specific locale in a later basename.
    #[default]
    FirstMatch,
    /// The fallback chain is searched outermost: a more specific locale in
    /// any basename beats a less specific locale in an earlier basename;
    /// ties go to the earlier basename.
    LocaleFirst,
}

/// Configuration for a [`MessageSource`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSourceConfig {
    /// Bundle families searched in order
    pub basenames: Vec<String>,
    /// Root of every fallback chain
    pub default_locale: Locale,
    /// TTL: negative caches forever, zero re-checks on every access
    pub cache_seconds: i64,
    /// Charset label for bundle bytes, e.g. `utf-8` or `iso-8859-1`
    pub charset: String,
    /// Ranking between multiple basenames
    pub precedence: BasenamePrecedence,
}

impl Default for MessageSourceConfig {
    fn default() -> Self {
        Self {
            basenames: Vec::new(),
            default_locale: Locale::ROOT,
            cache_seconds: -1,
            charset: "utf-8".to_string(),
            precedence: BasenamePrecedence::FirstMatch,
        }
    }
}

/// Resolves message codes to formatted, locale-appropriate strings.
///
/// Owns its configuration and cache; there is no ambient global registry.
/// Lookups walk the configured basenames and the locale fallback chain,
/// consult the cache (which loads and revalidates bundles as needed), and
/// run the winning pattern through the positional formatter.
#[derive(Debug)]
pub struct MessageSource {
    config: MessageSourceConfig,
    cache: MessageCache,
}

impl MessageSource {
    /// Create a source with default configuration reading through the
    /// given resolver.
    pub fn new(resolver: Arc<dyn ResourceResolver>) -> Self {
        Self::with_config(resolver, MessageSourceConfig::default())
    }

    /// Create a source with explicit configuration.
    pub fn with_config(resolver: Arc<dyn ResourceResolver>, config: MessageSourceConfig) -> Self {
        let charset = lookup_charset(&config.charset).unwrap_or_else(|| {
            warn!("Unknown charset label '{}', using utf-8", config.charset);
            UTF_8
        });
        let cache = MessageCache::new(BundleLoader::new(resolver, charset), config.cache_seconds);
        Self { config, cache }
    }

    /// Create a source reading bundles from a filesystem directory.
    pub fn from_directory<P: AsRef<Path>>(base_dir: P) -> Self {
        Self::new(Arc::new(FileSystemResolver::new(base_dir)))
    }

    /// Configure a single basename.
    pub fn set_basename(&mut self, basename: impl Into<String>) {
        self.set_basenames(vec![basename.into()]);
    }

    /// Configure one or more basenames, searched in order.
    pub fn set_basenames<I, S>(&mut self, basenames: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.basenames = basenames.into_iter().map(Into::into).collect();
        self.cache.clear();
    }

    /// Set the default locale terminating every fallback chain.
    pub fn set_default_locale(&mut self, locale: Locale) {
        if self.config.default_locale != locale {
            self.config.default_locale = locale;
            // Cached entries were merged against the old chain.
            self.cache.clear();
        }
    }

    /// Set the TTL. Negative caches forever, zero re-checks sources on
    /// every access.
    pub fn set_cache_seconds(&mut self, cache_seconds: i64) {
        self.config.cache_seconds = cache_seconds;
        self.cache.set_cache_seconds(cache_seconds);
    }

    /// Set the charset bundles are decoded with. Unknown labels are
    /// rejected with a warning and the previous charset is kept.
    pub fn set_charset(&mut self, label: &str) {
        match lookup_charset(label) {
            Some(charset) => {
                self.config.charset = label.to_string();
                self.cache.set_charset(charset);
                self.cache.clear();
            }
            None => warn!(
                "Unknown charset label '{}', keeping '{}'",
                label, self.config.charset
            ),
        }
    }

    /// Set how multiple basenames rank against each other.
    pub fn set_basename_precedence(&mut self, precedence: BasenamePrecedence) {
        self.config.precedence = precedence;
    }

    /// The configured basenames.
    pub fn basenames(&self) -> &[String] {
        &self.config.basenames
    }

    /// The configured default locale.
    pub fn default_locale(&self) -> &Locale {
        &self.config.default_locale
    }

    /// Resolve and format a message, failing when no code resolves.
    pub fn get_message(&self, code: &str, args: &[&str], locale: &Locale) -> MessageResult<String> {
        self.resolve_message(&[code], args, None, true, locale)
    }

    /// Resolve and format a message, falling back to the given default
    /// pattern. Never fails with [`MessageError::NoSuchMessage`]; the
    /// default is formatted with the same arguments.
    pub fn get_message_or_default(
        &self,
        code: &str,
        args: &[&str],
        default_message: &str,
        locale: &Locale,
    ) -> MessageResult<String> {
        self.resolve_message(&[code], args, Some(default_message), true, locale)
    }

    /// Resolve a [`MessageResolvable`]: its codes are tried in order and
    /// its default message (if any) is honored per its rendering flag.
    pub fn get_message_resolvable(
        &self,
        resolvable: &MessageResolvable,
        locale: &Locale,
    ) -> MessageResult<String> {
        let codes: Vec<&str> = resolvable.codes().iter().map(String::as_str).collect();
        let args: Vec<&str> = resolvable.args().iter().map(String::as_str).collect();
        self.resolve_message(
            &codes,
            &args,
            resolvable.default_message(),
            resolvable.should_render_default(),
            locale,
        )
    }

    /// Raw pattern lookup without formatting.
    pub fn resolve_pattern(&self, code: &str, locale: &Locale) -> Option<String> {
        match self.config.precedence {
            BasenamePrecedence::FirstMatch => {
                self.config.basenames.iter().find_map(|basename| {
                    self.cache
                        .resolve(basename, code, locale, &self.config.default_locale)
                })
            }
            BasenamePrecedence::LocaleFirst => {
                let mut best: Option<(String, usize)> = None;
                for basename in &self.config.basenames {
                    let found = self.cache.resolve_with_precedence(
                        basename,
                        code,
                        locale,
                        &self.config.default_locale,
                    );
                    if let Some((pattern, level)) = found {
                        // Strictly closer wins; ties keep the earlier
                        // basename.
                        if best.as_ref().map_or(true, |(_, current)| level < *current) {
                            best = Some((pattern, level));
                        }
                    }
                }
                best.map(|(pattern, _)| pattern)
            }
        }
    }

    /// Drop every cached bundle; the next lookup reloads from the
    /// resolver.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Cache counters snapshot.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn resolve_message(
        &self,
        codes: &[&str],
        args: &[&str],
        default_message: Option<&str>,
        render_default: bool,
        locale: &Locale,
    ) -> MessageResult<String> {
        for code in codes {
            if let Some(pattern) = self.resolve_pattern(code, locale) {
                return format::format(&pattern, args);
            }
        }

        if let Some(default_message) = default_message {
            debug!(
                "No message under codes {:?} for locale '{}', using the default message",
                codes, locale
            );
            return if render_default {
                format::format(default_message, args)
            } else {
                Ok(default_message.to_string())
            };
        }

        Err(MessageError::NoSuchMessage {
            codes: codes.iter().map(|code| code.to_string()).collect(),
            locale: locale.clone(),
        })
    }
}

fn lookup_charset(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.as_bytes())
}
