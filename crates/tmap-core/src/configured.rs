//! Exact-match store of type maps declared in configuration.

use crate::pair::TypePair;
use crate::type_map::TypeMap;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct ConfiguredMapRegistry {
    maps: DashMap<TypePair, Arc<TypeMap>>,
}

impl ConfiguredMapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `map` under its own pair. A later registration for the same
    /// pair replaces the earlier one, which is returned.
    pub fn register(&self, map: Arc<TypeMap>) -> Option<Arc<TypeMap>> {
        self.maps.insert(map.pair(), map)
    }

    pub fn find(&self, pair: TypePair) -> Option<Arc<TypeMap>> {
        self.maps.get(&pair).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, pair: TypePair) -> bool {
        self.maps.contains_key(&pair)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
