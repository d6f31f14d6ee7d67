//! Type maps: the mapping definition for one type pair.
//!
//! A `TypeMap` is created by its profile at configuration time (or closed
//! from an open-generic template on demand) and shared by reference: several
//! pairs in the resolved-map cache may point at the same instance.
//!
//! Sealing builds the map's plan exactly once. The map may already be
//! visible in the resolved-map cache before it is sealed, which is what lets
//! recursive type graphs resolve; readers of the compiled plan go through
//! [`TypeMap::sealed_plan`], which seals under a lock scoped to this map.

use crate::config::MapperConfiguration;
use crate::pair::TypePair;
use crate::plan::{CompiledPlan, PlanBuilder, PlanExpr, compile};
use crate::profile::Profile;
use crate::registry::TypeRegistry;
use crate::types::{Name, TypeId};
use crate::value::Value;
use indexmap::IndexSet;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Where a destination member takes its value from.
#[derive(Clone, Debug, PartialEq)]
pub enum MemberSource {
    /// A source member, possibly with a different name.
    Member(Name),
    /// A fixed value, assigned without further mapping.
    Constant(Value),
    /// Leave the destination member untouched.
    Ignore,
}

/// Explicit configuration for one destination member.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberRule {
    pub destination: Name,
    pub source: MemberSource,
    /// Value assigned when the source member is null.
    pub null_substitute: Option<Value>,
}

impl MemberRule {
    pub fn new(destination: impl Into<Name>, source: MemberSource) -> Self {
        Self {
            destination: destination.into(),
            source,
            null_substitute: None,
        }
    }
}

/// The built plan of a sealed map.
pub struct SealedPlan {
    pub expression: PlanExpr,
    pub plan: CompiledPlan,
}

pub struct TypeMap {
    pair: TypePair,
    profile: Arc<Profile>,
    rules: Vec<MemberRule>,
    destination_override: Option<TypeId>,
    included_derived: IndexSet<TypePair>,
    closed_from: Option<TypePair>,
    sealed: OnceLock<SealedPlan>,
}

impl TypeMap {
    pub fn new(
        pair: TypePair,
        profile: Arc<Profile>,
        rules: Vec<MemberRule>,
        destination_override: Option<TypeId>,
        included_derived: IndexSet<TypePair>,
    ) -> Self {
        Self {
            pair,
            profile,
            rules,
            destination_override,
            included_derived,
            closed_from: None,
            sealed: OnceLock::new(),
        }
    }

    #[inline]
    pub fn pair(&self) -> TypePair {
        self.pair
    }

    #[inline]
    pub fn source_type(&self) -> TypeId {
        self.pair.source
    }

    #[inline]
    pub fn destination_type(&self) -> TypeId {
        self.pair.destination
    }

    pub fn profile(&self) -> &Arc<Profile> {
        &self.profile
    }

    pub fn member_rules(&self) -> &[MemberRule] {
        &self.rules
    }

    /// Explicit rule for a destination member; the last declaration wins.
    pub fn rule_for(&self, destination: &str) -> Option<&MemberRule> {
        self.rules
            .iter()
            .rev()
            .find(|rule| &*rule.destination == destination)
    }

    /// Redirect target for polymorphic dispatch, if any.
    pub fn destination_override(&self) -> Option<TypeId> {
        self.destination_override
    }

    /// Pairs this map was declared to also serve.
    pub fn included_derived(&self) -> &IndexSet<TypePair> {
        &self.included_derived
    }

    /// Maps with included derived pairs pick their plan from the runtime
    /// type, so they are never inlined into another map's plan.
    pub fn is_polymorphic(&self) -> bool {
        !self.included_derived.is_empty()
    }

    /// Pair of the open-generic template this map was closed from.
    pub fn closed_from(&self) -> Option<TypePair> {
        self.closed_from
    }

    /// Instantiate a closed map for `closed` from this template.
    ///
    /// The new map keeps the template's profile and member rules and
    /// inherits its included-derived pairs, closed over the same arguments
    /// where they are open.
    pub fn close(&self, types: &TypeRegistry, closed: TypePair) -> TypeMap {
        let included_derived = self
            .included_derived
            .iter()
            .map(|included| {
                if included.contains_generic_parameters(types) {
                    included
                        .close_generic_types(types, closed)
                        .unwrap_or(*included)
                } else {
                    *included
                }
            })
            .collect();
        debug!(
            template = %self.pair.display(types),
            closed = %closed.display(types),
            "closing generic type map"
        );
        TypeMap {
            pair: closed,
            profile: self.profile.clone(),
            rules: self.rules.clone(),
            destination_override: None,
            included_derived,
            closed_from: Some(self.pair),
            sealed: OnceLock::new(),
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.get().is_some()
    }

    /// The compiled plan, if sealing already happened.
    pub fn plan(&self) -> Option<&CompiledPlan> {
        self.sealed.get().map(|sealed| &sealed.plan)
    }

    /// The plan expression, if sealing already happened.
    pub fn expression(&self) -> Option<&PlanExpr> {
        self.sealed.get().map(|sealed| &sealed.expression)
    }

    /// Build the plan once. Later calls, including concurrent ones after the
    /// first completes, are no-ops.
    pub fn seal(&self, config: &MapperConfiguration) {
        self.sealed_state(config);
    }

    /// The compiled plan, sealing first if needed.
    pub fn sealed_plan(&self, config: &MapperConfiguration) -> &CompiledPlan {
        &self.sealed_state(config).plan
    }

    fn sealed_state(&self, config: &MapperConfiguration) -> &SealedPlan {
        self.sealed.get_or_init(|| {
            let expression = PlanBuilder::new(config).type_map_expression(self);
            let plan = compile(&expression);
            config.record_sealed();
            debug!(
                pair = %self.pair.display(config.types()),
                profile = %self.profile.name(),
                inline_depth = expression.inline_depth(),
                "sealed type map"
            );
            SealedPlan { expression, plan }
        })
    }
}

impl fmt::Debug for TypeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMap")
            .field("pair", &self.pair)
            .field("profile", &self.profile.name())
            .field("destination_override", &self.destination_override)
            .field("included_derived", &self.included_derived)
            .field("closed_from", &self.closed_from)
            .field("sealed", &self.is_sealed())
            .finish()
    }
}
