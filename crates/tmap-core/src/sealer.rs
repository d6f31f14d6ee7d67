//! One-time finalization of a freshly built configuration.
//!
//! 1. Register every configured map; a map with a destination override is
//!    published under its own pair as the map for (source, override).
//! 2. Walk included-derived maps, nested includes too, and publish each under
//!    (derived source, walked map's destination), keeping any map already
//!    published there.
//! 3. Seal every configured map that is not an open-generic template.
//! 4. Seal runtime features against the finished configuration.
//!
//! Any failure aborts the build; there is no partially sealed configuration.

use crate::config::MapperConfiguration;
use crate::error::ConfigError;
use crate::pair::TypePair;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::type_map::TypeMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct Sealer<'a> {
    config: &'a MapperConfiguration,
}

impl<'a> Sealer<'a> {
    pub fn new(config: &'a MapperConfiguration) -> Self {
        Self { config }
    }

    pub fn seal(&self) -> Result<(), ConfigError> {
        let config = self.config;
        let types = config.types();
        let maps = config.configured_type_maps();

        for map in maps {
            config.configured_maps().register(map.clone());
        }

        // Later declarations of the same pair replace earlier ones.
        let winners: Vec<&Arc<TypeMap>> = maps
            .iter()
            .filter(|map| {
                config
                    .configured_maps()
                    .find(map.pair())
                    .is_some_and(|winner| Arc::ptr_eq(&winner, *map))
            })
            .collect();

        for map in winners.iter().filter(|map| map.destination_override().is_none()) {
            config.resolved_maps().insert(map.pair(), (*map).clone());
        }
        for map in winners.iter().filter(|map| map.destination_override().is_some()) {
            self.register_override(map);
        }

        for map in &winners {
            let mut guard = RecursionGuard::with_profile(RecursionProfile::DerivedMapWalk);
            if guard.enter(map.pair()).is_entered() {
                let result = self.register_derived(map, map, &mut guard);
                guard.leave(map.pair());
                result?;
            }
        }

        // Open-generic templates only serve as the source of closed maps.
        let mut sealed = 0usize;
        for map in maps {
            if !map.pair().contains_generic_parameters(types) {
                map.seal(config);
                sealed += 1;
            }
        }
        debug!(maps = sealed, "sealed configured type maps");

        for feature in config.features() {
            feature.seal(config).map_err(|error| ConfigError::Feature {
                feature: feature.name().to_string(),
                message: error.to_string(),
            })?;
        }

        debug!(
            resolved = config.resolved_maps().len(),
            types = types.len(),
            "configuration sealed"
        );
        Ok(())
    }

    fn register_override(&self, map: &Arc<TypeMap>) {
        let config = self.config;
        let types = config.types();
        let Some(destination) = map.destination_override() else {
            return;
        };
        let target = TypePair::new(map.source_type(), destination);
        match config.find_type_map(target) {
            Some(redirect) => {
                debug!(
                    pair = %map.pair().display(types),
                    redirect = %redirect.pair().display(types),
                    "redirecting type map to destination override"
                );
                config.resolved_maps().insert(map.pair(), redirect);
            }
            None => {
                debug!(
                    pair = %map.pair().display(types),
                    destination = %types.display(destination),
                    "destination override has no map; keeping declared map"
                );
                config.resolved_maps().insert(map.pair(), map.clone());
            }
        }
    }

    /// Every map reachable through `map`'s includes is published under
    /// `root`'s destination, not the destination of its direct includer.
    fn register_derived(
        &self,
        root: &Arc<TypeMap>,
        map: &Arc<TypeMap>,
        guard: &mut RecursionGuard<TypePair>,
    ) -> Result<(), ConfigError> {
        for &derived in map.included_derived() {
            match guard.enter(derived) {
                RecursionResult::Entered => {}
                RecursionResult::Cycle => continue,
                RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                    warn!(
                        pair = %derived.display(self.config.types()),
                        "included-derived walk exceeded its bounds"
                    );
                    continue;
                }
            }
            let result = self.register_one(root, map, derived, guard);
            guard.leave(derived);
            result?;
        }
        Ok(())
    }

    fn register_one(
        &self,
        root: &Arc<TypeMap>,
        map: &Arc<TypeMap>,
        derived: TypePair,
        guard: &mut RecursionGuard<TypePair>,
    ) -> Result<(), ConfigError> {
        let config = self.config;
        let types = config.types();
        let base = map.pair();

        let generic = base.contains_generic_parameters(types)
            || derived.contains_generic_parameters(types);
        if !generic
            && !(types.is_assignable(derived.source, base.source)
                && types.is_assignable(derived.destination, base.destination))
        {
            return Err(ConfigError::InvalidIncludedDerived {
                base: base.display(types),
                derived: derived.display(types),
            });
        }

        let derived_map = config
            .find_type_map(derived)
            .ok_or_else(|| ConfigError::MissingIncludedMap {
                owner: base.display(types),
                pair: derived.display(types),
            })?;
        if derived_map.pair() != derived {
            return Err(ConfigError::IncludedMapMismatch {
                requested: derived.display(types),
                resolved: derived_map.pair().display(types),
            });
        }

        let key = TypePair::new(derived.source, root.destination_type());
        if config
            .resolved_maps()
            .insert_if_absent(key, derived_map.clone())
        {
            debug!(
                key = %key.display(types),
                map = %derived.display(types),
                "registered included derived map"
            );
        }
        self.register_derived(root, &derived_map, guard)
    }
}

#[cfg(test)]
#[path = "../tests/sealer_tests.rs"]
mod tests;
