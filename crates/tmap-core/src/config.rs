//! The sealed mapper configuration and its builder.
//!
//! A [`MapperConfiguration`] owns everything resolution needs for its
//! lifetime: the type registry, the configured maps, the resolved-map cache,
//! the execution-plan cache and the ordered mapper strategies. It is built
//! once by [`ConfigurationBuilder::build`], which seals it before handing it
//! out, and is then shared across threads behind an `Arc`.
//!
//! # Entry points
//!
//! | Method                      | Seals | Caches                         |
//! |-----------------------------|-------|--------------------------------|
//! | [`find_type_map`]           | no    | resolved-map cache             |
//! | [`resolve_type_map`]        | yes   | resolved-map cache             |
//! | [`build_execution_plan`]    | yes   | resolved-map + execution-plan  |
//! | [`configured_type_maps`]    | n/a   | none (declaration order)       |
//!
//! [`find_type_map`]: MapperConfiguration::find_type_map
//! [`resolve_type_map`]: MapperConfiguration::resolve_type_map
//! [`build_execution_plan`]: MapperConfiguration::build_execution_plan
//! [`configured_type_maps`]: MapperConfiguration::configured_type_maps

use crate::configured::ConfiguredMapRegistry;
use crate::error::{BoxError, ConfigError};
use crate::mappers::{ObjectMapper, TypeConverter, TypeConverterMapper, builtin_mappers};
use crate::pair::{MapRequest, TypePair};
use crate::plan::{CompiledPlan, ExecutionPlanCache, PlanExpr, build_expression};
use crate::profile::{Profile, ProfileBuilder, TypeMapBuilder};
use crate::registry::TypeRegistry;
use crate::resolved::ResolvedMapCache;
use crate::sealer::Sealer;
use crate::settings::MapperSettings;
use crate::type_map::TypeMap;
use crate::types::TypeId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// A cross-cutting extension validated against the sealed configuration.
pub trait RuntimeFeature: Send + Sync {
    fn name(&self) -> &str;

    /// Called once, after every configured map is sealed.
    fn seal(&self, config: &MapperConfiguration) -> Result<(), BoxError>;
}

/// Counters over the configuration's caches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfigurationStats {
    pub configured_maps: usize,
    pub resolved_entries: usize,
    pub resolutions_computed: u64,
    pub plan_entries: usize,
    pub plans_compiled: u64,
    pub maps_sealed: u64,
}

pub struct MapperConfiguration {
    types: Arc<TypeRegistry>,
    settings: MapperSettings,
    default_profile: Arc<Profile>,
    type_maps: Vec<Arc<TypeMap>>,
    configured: ConfiguredMapRegistry,
    resolved: ResolvedMapCache,
    plans: ExecutionPlanCache,
    mappers: Vec<Arc<dyn ObjectMapper>>,
    features: Vec<Arc<dyn RuntimeFeature>>,
    maps_sealed: AtomicU64,
}

impl MapperConfiguration {
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn settings(&self) -> &MapperSettings {
        &self.settings
    }

    /// Profile used for pairs that no type map covers.
    pub fn default_profile(&self) -> &Arc<Profile> {
        &self.default_profile
    }

    /// Mapper strategies in the order they are tried.
    pub fn mappers(&self) -> &[Arc<dyn ObjectMapper>] {
        &self.mappers
    }

    pub fn features(&self) -> &[Arc<dyn RuntimeFeature>] {
        &self.features
    }

    /// Every declared type map, in declaration order.
    pub fn configured_type_maps(&self) -> &[Arc<TypeMap>] {
        &self.type_maps
    }

    pub fn configured_maps(&self) -> &ConfiguredMapRegistry {
        &self.configured
    }

    pub fn resolved_maps(&self) -> &ResolvedMapCache {
        &self.resolved
    }

    pub fn execution_plans(&self) -> &ExecutionPlanCache {
        &self.plans
    }

    /// The map serving `pair`, without sealing it.
    pub fn find_type_map(&self, pair: TypePair) -> Option<Arc<TypeMap>> {
        self.resolved.resolve(self, pair)
    }

    /// The map serving `pair`, sealed.
    pub fn resolve(&self, pair: TypePair) -> Option<Arc<TypeMap>> {
        let map = self.find_type_map(pair)?;
        map.seal(self);
        Some(map)
    }

    pub fn resolve_type_map(&self, source: TypeId, destination: TypeId) -> Option<Arc<TypeMap>> {
        self.resolve(TypePair::new(source, destination))
    }

    /// The compiled plan for `request`, built on first use.
    pub fn execution_plan(&self, request: &MapRequest) -> CompiledPlan {
        self.plans.get_or_build(self, request)
    }

    /// Compile the plan for a static pair ahead of the first mapping call.
    pub fn build_execution_plan(&self, source: TypeId, destination: TypeId) -> CompiledPlan {
        self.execution_plan(&MapRequest::new(TypePair::new(source, destination)))
    }

    /// The expression a plan for `request` is compiled from. Built fresh on
    /// every call; the plan cache is not touched.
    pub fn execution_plan_expression(&self, request: &MapRequest) -> PlanExpr {
        build_expression(self, request)
    }

    pub fn stats(&self) -> ConfigurationStats {
        ConfigurationStats {
            configured_maps: self.configured.len(),
            resolved_entries: self.resolved.len(),
            resolutions_computed: self.resolved.resolutions_computed(),
            plan_entries: self.plans.len(),
            plans_compiled: self.plans.compiled_count(),
            maps_sealed: self.maps_sealed.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_sealed(&self) {
        self.maps_sealed.fetch_add(1, Ordering::Relaxed);
    }
}

// =============================================================================
// ConfigurationBuilder
// =============================================================================

/// Collects profiles, converters, strategies and features, then builds and
/// seals a configuration.
pub struct ConfigurationBuilder {
    types: Arc<TypeRegistry>,
    settings: MapperSettings,
    profiles: Vec<ProfileBuilder>,
    converters: TypeConverterMapper,
    mappers: Vec<Arc<dyn ObjectMapper>>,
    features: Vec<Arc<dyn RuntimeFeature>>,
}

impl ConfigurationBuilder {
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self {
            types,
            settings: MapperSettings::default(),
            profiles: Vec::new(),
            converters: TypeConverterMapper::new(),
            mappers: Vec::new(),
            features: Vec::new(),
        }
    }

    pub fn settings(&mut self, settings: MapperSettings) -> &mut Self {
        self.settings = settings;
        self
    }

    pub fn add_profile(&mut self, profile: ProfileBuilder) -> &mut Self {
        self.profiles.push(profile);
        self
    }

    /// Use `converter` for the exact pair (source, destination) whenever no
    /// type map covers it.
    pub fn add_converter(
        &mut self,
        source: TypeId,
        destination: TypeId,
        converter: impl TypeConverter + 'static,
    ) -> &mut Self {
        self.converters
            .insert(TypePair::new(source, destination), Arc::new(converter));
        self
    }

    /// Add a strategy tried before converters and built-in strategies.
    pub fn add_mapper(&mut self, mapper: impl ObjectMapper + 'static) -> &mut Self {
        self.mappers.push(Arc::new(mapper));
        self
    }

    pub fn add_feature(&mut self, feature: impl RuntimeFeature + 'static) -> &mut Self {
        self.features.push(Arc::new(feature));
        self
    }

    pub fn build(self) -> Result<Arc<MapperConfiguration>, ConfigError> {
        let fallback = self.settings.null_policy();
        let default_profile = Arc::new(Profile::new("default", fallback));

        let mut declared: Vec<(Arc<Profile>, TypeMapBuilder)> = Vec::new();
        for profile in self.profiles {
            debug!(profile = %profile.name(), "adding profile");
            let (profile, maps) = profile.into_parts(fallback);
            declared.extend(maps.into_iter().map(|map| (profile.clone(), map)));
        }
        link_include_bases(&self.types, &mut declared)?;

        let type_maps: Vec<Arc<TypeMap>> = declared
            .into_iter()
            .map(|(profile, map)| Arc::new(map.build(profile)))
            .collect();

        let mut mappers = self.mappers;
        mappers.push(Arc::new(self.converters));
        mappers.extend(builtin_mappers());

        let config = Arc::new(MapperConfiguration {
            types: self.types,
            settings: self.settings,
            default_profile,
            type_maps,
            configured: ConfiguredMapRegistry::new(),
            resolved: ResolvedMapCache::new(),
            plans: ExecutionPlanCache::new(),
            mappers,
            features: self.features,
            maps_sealed: AtomicU64::new(0),
        });
        Sealer::new(&config).seal()?;
        Ok(config)
    }
}

/// Turn every `include_base` declaration into an `include` on the base map.
///
/// The last declaration of the base pair receives the include, matching
/// which declaration wins registration.
fn link_include_bases(
    types: &TypeRegistry,
    declared: &mut [(Arc<Profile>, TypeMapBuilder)],
) -> Result<(), ConfigError> {
    let mut links = Vec::new();
    for (_, map) in declared.iter() {
        for &base in map.include_bases() {
            let index = declared
                .iter()
                .rposition(|(_, candidate)| candidate.pair() == base)
                .ok_or_else(|| ConfigError::MissingIncludedMap {
                    owner: map.pair().display(types),
                    pair: base.display(types),
                })?;
            links.push((index, map.pair()));
        }
    }
    for (index, derived) in links {
        if let Some((_, base)) = declared.get_mut(index) {
            base.add_include(derived);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod tests;
