//! Resolved-map cache: which type map serves a type pair.
//!
//! Each pair owns a once-cell, so the search for a pair runs at most once
//! and its outcome (including "no map") is kept for the lifetime of the
//! configuration. Searches for different pairs never wait on each other.
//!
//! Search order on a miss:
//!
//! 1. generic closure of the exact pair;
//! 2. hierarchy fallback: every (source ancestor, destination ancestor)
//!    combination except the exact pair, destination-major, taking an
//!    existing cache entry first and a generic closure second;
//! 3. nothing: "no map" is cached.
//!
//! A search never seals a map and never waits on another pair's search, so
//! a map can be published here before its plan exists. Sealing happens in
//! [`MapperConfiguration::resolve`] under the map's own lock.

use crate::config::MapperConfiguration;
use crate::generic::GenericClosureResolver;
use crate::hierarchy::type_inheritance;
use crate::pair::TypePair;
use crate::trace as query_trace;
use crate::type_map::TypeMap;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::trace;

type Slot = Arc<OnceLock<Option<Arc<TypeMap>>>>;

#[derive(Default)]
pub struct ResolvedMapCache {
    entries: DashMap<TypePair, Slot>,
    computed: AtomicU64,
}

impl ResolvedMapCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The map serving `pair`, searching on first use.
    pub fn resolve(&self, config: &MapperConfiguration, pair: TypePair) -> Option<Arc<TypeMap>> {
        let query_id = query_trace::enabled().then(query_trace::next_query_id);
        if let Some(query_id) = query_id {
            query_trace::resolve_start(query_id, pair);
        }

        let existing = self.entries.get(&pair).map(|slot| slot.value().clone());
        if let Some(found) = existing.as_ref().and_then(|slot| slot.get()) {
            if let Some(query_id) = query_id {
                query_trace::resolve_end(query_id, found.as_ref().map(|map| map.pair()), true);
            }
            return found.clone();
        }

        let slot = match existing {
            Some(slot) => slot,
            None => self.entries.entry(pair).or_default().clone(),
        };
        let mut cache_hit = true;
        let found = slot
            .get_or_init(|| {
                cache_hit = false;
                self.computed.fetch_add(1, Ordering::Relaxed);
                self.search(config, pair)
            })
            .clone();

        if let Some(query_id) = query_id {
            query_trace::resolve_end(query_id, found.as_ref().map(|map| map.pair()), cache_hit);
        }
        found
    }

    fn search(&self, config: &MapperConfiguration, pair: TypePair) -> Option<Arc<TypeMap>> {
        let types = config.types();
        let generic = GenericClosureResolver::new(config);
        if let Some(map) = generic.find_closed_generic(pair) {
            return Some(map);
        }

        let sources = type_inheritance(types, pair.source);
        for destination in type_inheritance(types, pair.destination) {
            for &source in &sources {
                let candidate = TypePair::new(source, destination);
                if candidate == pair {
                    continue;
                }
                if let Some(map) = self
                    .peek(candidate)
                    .or_else(|| generic.find_closed_generic(candidate))
                {
                    trace!(
                        pair = %pair.display(types),
                        map = %map.pair().display(types),
                        "resolved through type hierarchy"
                    );
                    return Some(map);
                }
            }
        }

        trace!(pair = %pair.display(types), "no type map");
        None
    }

    /// The cached map for `pair`, without searching or waiting.
    pub fn peek(&self, pair: TypePair) -> Option<Arc<TypeMap>> {
        self.entries
            .get(&pair)
            .and_then(|slot| slot.value().get().cloned())
            .flatten()
    }

    /// Whether a search result (found or not) is cached for `pair`.
    pub fn is_cached(&self, pair: TypePair) -> bool {
        self.entries
            .get(&pair)
            .is_some_and(|slot| slot.value().get().is_some())
    }

    /// Publish `map` for `pair`, replacing any earlier entry.
    pub fn insert(&self, pair: TypePair, map: Arc<TypeMap>) {
        self.entries
            .insert(pair, Arc::new(OnceLock::from(Some(map))));
    }

    /// Publish `map` for `pair` unless a map is already cached there.
    ///
    /// A cached "no map" result is replaced. Returns whether `map` was
    /// published.
    pub fn insert_if_absent(&self, pair: TypePair, map: Arc<TypeMap>) -> bool {
        let mut entry = self.entries.entry(pair).or_default();
        if matches!(entry.value().get(), Some(Some(_))) {
            return false;
        }
        *entry.value_mut() = Arc::new(OnceLock::from(Some(map)));
        true
    }

    /// Number of searches run so far.
    pub fn resolutions_computed(&self) -> u64 {
        self.computed.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/resolved_tests.rs"]
mod tests;
