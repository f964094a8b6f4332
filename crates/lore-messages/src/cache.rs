//! The concurrent, reloadable message cache.
//!
//! Entries live in per-key slots inside a sharded map, so unrelated
//! basenames and locales never contend. Each slot's entry is replaced
//! wholesale through an atomic pointer swap; a reader holding an entry can
//! never observe a half-merged bundle. Per key, the lifecycle is
//!
//! `MISSING → LOADING → FRESH → STALE → LOADING → FRESH → …`
//!
//! The first request for a key loads it while concurrent requests for the
//! same key wait on that one in-flight load. Once the TTL elapses the entry
//! turns stale but stays servable: the one caller that wins the slot guard
//! re-stats the chain's sources and either re-stamps the entry (nothing
//! changed, no re-parse) or reloads it, while every other caller keeps
//! serving the stale entry without blocking.

use crate::bundle::MergedBundle;
use crate::loader::BundleLoader;
use crate::locale::{fallback_chain, Locale};
use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Point-in-time counters describing cache behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from a cached entry (fresh or stale-but-servable)
    pub hits: u64,
    /// Lookups that had to create an entry
    pub misses: u64,
    /// Full load-and-parse passes over a fallback chain
    pub reloads: u64,
    /// Revalidations that found no source change and skipped re-parsing
    pub revalidations: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    reloads: AtomicU64,
    revalidations: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            reloads: self.reloads.load(Ordering::Relaxed),
            revalidations: self.revalidations.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    basename: String,
    locale: Locale,
}

/// Stamp recorded for one source at load time, compared on revalidation.
#[derive(Debug, Clone)]
struct SourceState {
    resource: String,
    stamp: crate::bundle::SourceStamp,
}

/// The cached, locale-merged view for one (basename, locale) pair.
///
/// Owned exclusively by the cache and replaced wholesale on refresh; the
/// merged bundle is always the result of one complete, consistent load
/// across the whole fallback chain.
#[derive(Debug)]
struct CacheEntry {
    bundle: Arc<MergedBundle>,
    created_at: Instant,
    sources: Vec<SourceState>,
}

#[derive(Debug)]
struct CacheSlot {
    /// Current entry; `None` until the first load completes
    entry: ArcSwapOption<CacheEntry>,
    /// Single-flight guard for loads and revalidations of this key
    reload: Mutex<()>,
}

impl CacheSlot {
    fn new() -> Self {
        Self {
            entry: ArcSwapOption::empty(),
            reload: Mutex::new(()),
        }
    }
}

/// Concurrent store of merged bundles with TTL-based revalidation.
#[derive(Debug)]
pub struct MessageCache {
    loader: BundleLoader,
    cache_seconds: i64,
    slots: DashMap<CacheKey, Arc<CacheSlot>>,
    counters: Counters,
}

impl MessageCache {
    /// Create a cache reading through the given loader.
    ///
    /// `cache_seconds < 0` caches forever, `0` re-checks sources on every
    /// access, and a positive value is the TTL after which entries are
    /// revalidated against their sources.
    pub fn new(loader: BundleLoader, cache_seconds: i64) -> Self {
        Self {
            loader,
            cache_seconds,
            slots: DashMap::new(),
            counters: Counters::default(),
        }
    }

    /// Change the TTL; existing entries keep their creation stamps.
    pub fn set_cache_seconds(&mut self, cache_seconds: i64) {
        self.cache_seconds = cache_seconds;
    }

    /// Change the charset used to decode bundle bytes.
    pub fn set_charset(&mut self, charset: &'static encoding_rs::Encoding) {
        self.loader.set_charset(charset);
    }

    /// Resolve a code to its unformatted pattern.
    pub fn resolve(
        &self,
        basename: &str,
        code: &str,
        locale: &Locale,
        default_locale: &Locale,
    ) -> Option<String> {
        self.resolve_with_precedence(basename, code, locale, default_locale)
            .map(|(pattern, _)| pattern)
    }

    /// Resolve a code to its pattern plus the fallback-chain position that
    /// supplied it (0 = the most specific locale in the chain).
    pub fn resolve_with_precedence(
        &self,
        basename: &str,
        code: &str,
        locale: &Locale,
        default_locale: &Locale,
    ) -> Option<(String, usize)> {
        let entry = self.entry(basename, locale, default_locale);
        entry
            .bundle
            .pattern_with_precedence(code)
            .map(|(pattern, precedence)| (pattern.to_string(), precedence))
    }

    /// Drop the cached entry for one (basename, locale) pair.
    pub fn invalidate(&self, basename: &str, locale: &Locale) {
        let key = CacheKey {
            basename: basename.to_string(),
            locale: locale.clone(),
        };
        if self.slots.remove(&key).is_some() {
            debug!("Invalidated cached bundle '{}' for locale '{}'", basename, locale);
        }
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.slots.clear();
        debug!("Cleared message cache");
    }

    /// Number of cached (basename, locale) entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Counters snapshot.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Fetch the current entry for a key, loading or revalidating per the
    /// state machine.
    fn entry(&self, basename: &str, locale: &Locale, default_locale: &Locale) -> Arc<CacheEntry> {
        let key = CacheKey {
            basename: basename.to_string(),
            locale: locale.clone(),
        };
        // Clone the slot out so the shard lock is released before any I/O.
        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| Arc::new(CacheSlot::new()))
            .value()
            .clone();

        if let Some(current) = slot.entry.load_full() {
            if self.is_fresh(&current) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                return current;
            }
            // Stale. One caller revalidates; everyone else keeps serving
            // the stale entry without blocking.
            if let Some(_guard) = slot.reload.try_lock() {
                // Re-check under the guard; a concurrent caller may have
                // refreshed the entry between our staleness check and the
                // lock.
                match slot.entry.load_full() {
                    Some(current) if self.is_fresh(&current) => {
                        self.counters.hits.fetch_add(1, Ordering::Relaxed);
                        return current;
                    }
                    Some(current) => {
                        return self.revalidate(&slot, &current, basename, locale, default_locale);
                    }
                    None => {
                        // The entry was invalidated underneath us; fall
                        // through to a plain load while still holding the
                        // guard.
                        self.counters.misses.fetch_add(1, Ordering::Relaxed);
                        let fresh = self.load_entry(basename, locale, default_locale);
                        slot.entry.store(Some(Arc::clone(&fresh)));
                        return fresh;
                    }
                }
            }
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return current;
        }

        // Missing: first request loads, concurrent requests for the same
        // key wait here for that one load's result.
        let _guard = slot.reload.lock();
        if let Some(current) = slot.entry.load_full() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return current;
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        let fresh = self.load_entry(basename, locale, default_locale);
        slot.entry.store(Some(Arc::clone(&fresh)));
        fresh
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        match self.cache_seconds {
            seconds if seconds < 0 => true,
            0 => false,
            seconds => entry.created_at.elapsed() < Duration::from_secs(seconds as u64),
        }
    }

    /// Re-stat the chain's sources; reload only if something changed, else
    /// re-stamp the existing bundle without re-parsing.
    fn revalidate(
        &self,
        slot: &CacheSlot,
        current: &Arc<CacheEntry>,
        basename: &str,
        locale: &Locale,
        default_locale: &Locale,
    ) -> Arc<CacheEntry> {
        let changed = current
            .sources
            .iter()
            .any(|source| self.loader.stat(&source.resource) != source.stamp);

        let next = if changed {
            debug!(
                "Source change detected for bundle '{}' locale '{}', reloading",
                basename, locale
            );
            self.load_entry(basename, locale, default_locale)
        } else {
            self.counters.revalidations.fetch_add(1, Ordering::Relaxed);
            trace!(
                "No source change for bundle '{}' locale '{}', re-stamping",
                basename,
                locale
            );
            Arc::new(CacheEntry {
                bundle: Arc::clone(&current.bundle),
                created_at: Instant::now(),
                sources: current.sources.clone(),
            })
        };
        slot.entry.store(Some(Arc::clone(&next)));
        next
    }

    /// Load and merge the whole fallback chain for a key.
    fn load_entry(&self, basename: &str, locale: &Locale, default_locale: &Locale) -> Arc<CacheEntry> {
        let chain = fallback_chain(locale, default_locale);
        let raws: Vec<_> = chain
            .iter()
            .map(|candidate| self.loader.load(basename, candidate))
            .collect();
        let sources = raws
            .iter()
            .map(|raw| SourceState {
                resource: raw.resource().to_string(),
                stamp: raw.stamp(),
            })
            .collect();
        let bundle = Arc::new(MergedBundle::merge(&raws));
        self.counters.reloads.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Loaded bundle '{}' for locale '{}': {} keys across {} sources",
            basename,
            locale,
            bundle.len(),
            chain.len()
        );
        Arc::new(CacheEntry {
            bundle,
            created_at: Instant::now(),
            sources,
        })
    }
}
