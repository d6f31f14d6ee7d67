//! Profiles: named groups of type maps sharing a null-handling policy.

use crate::pair::TypePair;
use crate::registry::TypeRegistry;
use crate::type_map::{MemberRule, MemberSource, TypeMap};
use crate::types::{Name, TypeId};
use crate::value::Value;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tmap_common::limits;

/// How null source values are materialized on the destination side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NullPolicy {
    pub allow_null_destination_values: bool,
    pub allow_null_collections: bool,
}

impl Default for NullPolicy {
    fn default() -> Self {
        Self {
            allow_null_destination_values: limits::DEFAULT_ALLOW_NULL_DESTINATION_VALUES,
            allow_null_collections: limits::DEFAULT_ALLOW_NULL_COLLECTIONS,
        }
    }
}

impl NullPolicy {
    /// What a null source maps to for a destination of type `destination`.
    pub fn null_substitute(self, types: &TypeRegistry, destination: TypeId) -> Value {
        if types.list_element(destination).is_some() && !self.allow_null_collections {
            return Value::List(Vec::new());
        }
        if self.allow_null_destination_values {
            return Value::Null;
        }
        Value::default_for(types, destination)
    }
}

/// The configuration unit owning a set of type maps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    name: Name,
    null_policy: NullPolicy,
}

impl Profile {
    pub fn new(name: impl Into<Name>, null_policy: NullPolicy) -> Self {
        Self {
            name: name.into(),
            null_policy,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn null_policy(&self) -> NullPolicy {
        self.null_policy
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Declares type maps for one profile.
///
/// ```ignore
/// let mut profile = ProfileBuilder::new("animals");
/// profile
///     .create_map(animal, animal_dto)
///     .include(dog, dog_dto);
/// profile.create_map(dog, dog_dto).map_from("Title", "Name");
/// ```
#[derive(Debug)]
pub struct ProfileBuilder {
    name: Name,
    null_policy: Option<NullPolicy>,
    maps: Vec<TypeMapBuilder>,
}

impl ProfileBuilder {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            null_policy: None,
            maps: Vec::new(),
        }
    }

    /// Override the configuration-wide null policy for this profile.
    pub fn null_policy(&mut self, policy: NullPolicy) -> &mut Self {
        self.null_policy = Some(policy);
        self
    }

    /// Declare a map for (source, destination). Declaring the same pair
    /// twice keeps both; the later one wins at registration.
    pub fn create_map(&mut self, source: TypeId, destination: TypeId) -> &mut TypeMapBuilder {
        let index = self.maps.len();
        self.maps
            .push(TypeMapBuilder::new(TypePair::new(source, destination)));
        &mut self.maps[index]
    }

    pub(crate) fn name(&self) -> &Name {
        &self.name
    }

    pub(crate) fn into_parts(self, fallback: NullPolicy) -> (Arc<Profile>, Vec<TypeMapBuilder>) {
        let policy = self.null_policy.unwrap_or(fallback);
        (Arc::new(Profile::new(self.name, policy)), self.maps)
    }
}

/// Declares one type map.
#[derive(Debug)]
pub struct TypeMapBuilder {
    pair: TypePair,
    rules: Vec<MemberRule>,
    destination_override: Option<TypeId>,
    includes: Vec<TypePair>,
    include_bases: Vec<TypePair>,
}

impl TypeMapBuilder {
    fn new(pair: TypePair) -> Self {
        Self {
            pair,
            rules: Vec::new(),
            destination_override: None,
            includes: Vec::new(),
            include_bases: Vec::new(),
        }
    }

    pub fn pair(&self) -> TypePair {
        self.pair
    }

    pub fn for_member(&mut self, destination: impl Into<Name>, source: MemberSource) -> &mut Self {
        self.rules.push(MemberRule::new(destination, source));
        self
    }

    /// Take `destination` from the source member `source`.
    pub fn map_from(&mut self, destination: impl Into<Name>, source: impl Into<Name>) -> &mut Self {
        self.for_member(destination, MemberSource::Member(source.into()))
    }

    pub fn constant(&mut self, destination: impl Into<Name>, value: impl Into<Value>) -> &mut Self {
        self.for_member(destination, MemberSource::Constant(value.into()))
    }

    pub fn ignore(&mut self, destination: impl Into<Name>) -> &mut Self {
        self.for_member(destination, MemberSource::Ignore)
    }

    /// Value used when the source of `destination` is null.
    ///
    /// Applies to the member's explicit rule, or to its by-name match when
    /// no rule was declared.
    pub fn null_substitute(
        &mut self,
        destination: impl Into<Name>,
        value: impl Into<Value>,
    ) -> &mut Self {
        let destination = destination.into();
        let value = value.into();
        match self
            .rules
            .iter_mut()
            .rev()
            .find(|rule| rule.destination == destination)
        {
            Some(rule) => rule.null_substitute = Some(value),
            None => {
                let mut rule =
                    MemberRule::new(destination.clone(), MemberSource::Member(destination));
                rule.null_substitute = Some(value);
                self.rules.push(rule);
            }
        }
        self
    }

    /// This map also serves (derived_source, derived_destination).
    pub fn include(&mut self, derived_source: TypeId, derived_destination: TypeId) -> &mut Self {
        self.includes
            .push(TypePair::new(derived_source, derived_destination));
        self
    }

    /// Register this map as an included derived map of the map for
    /// (base_source, base_destination).
    pub fn include_base(&mut self, base_source: TypeId, base_destination: TypeId) -> &mut Self {
        self.include_bases
            .push(TypePair::new(base_source, base_destination));
        self
    }

    /// Redirect this pair to the map for (source, destination_override).
    pub fn as_type(&mut self, destination_override: TypeId) -> &mut Self {
        self.destination_override = Some(destination_override);
        self
    }

    pub(crate) fn include_bases(&self) -> &[TypePair] {
        &self.include_bases
    }

    pub(crate) fn add_include(&mut self, derived: TypePair) {
        self.includes.push(derived);
    }

    pub(crate) fn build(self, profile: Arc<Profile>) -> TypeMap {
        let included: IndexSet<TypePair> = self.includes.into_iter().collect();
        TypeMap::new(
            self.pair,
            profile,
            self.rules,
            self.destination_override,
            included,
        )
    }
}
