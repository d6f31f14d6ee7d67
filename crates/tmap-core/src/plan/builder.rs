//! Build plan expressions for type maps, members and strategy-mapped pairs.
//!
//! The builder owns the inline bound for one top-level compilation: nested
//! type maps are expanded in place until `max_execution_plan_depth` levels
//! are open, after which the member plan resolves its target at runtime.
//! Nothing here seals another map or reads another map's compiled plan, so
//! building never re-enters a map that is currently being sealed.

use super::expr::{AssignSource, ConstructExpr, ErrorContext, MemberAssign, PlanExpr};
use crate::config::MapperConfiguration;
use crate::pair::{MapRequest, MemberRef, TypePair};
use crate::profile::Profile;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::registry::TypeRegistry;
use crate::type_map::{MemberSource, TypeMap};
use crate::types::TypeId;
use crate::value::Value;
use std::sync::Arc;
use tracing::{debug, trace};

pub struct PlanBuilder<'a> {
    config: &'a MapperConfiguration,
    inline: DepthCounter,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(config: &'a MapperConfiguration) -> Self {
        let depth = config.settings().effective_plan_depth();
        Self {
            config,
            inline: DepthCounter::with_profile(RecursionProfile::PlanInlining(depth)),
        }
    }

    pub fn configuration(&self) -> &'a MapperConfiguration {
        self.config
    }

    pub fn types(&self) -> &'a TypeRegistry {
        self.config.types()
    }

    /// Current number of nested maps being inlined.
    pub fn inline_depth(&self) -> u32 {
        self.inline.depth()
    }

    /// The body of `map`: one assignment per mapped destination member.
    ///
    /// Destination members with an explicit rule follow it; the rest are
    /// matched by name against the source's members and skipped when there
    /// is no match.
    pub fn type_map_expression(&mut self, map: &TypeMap) -> PlanExpr {
        let types = self.types();
        let pair = map.pair();
        let mut members = Vec::new();

        for destination in types.members(pair.destination) {
            let rule = map.rule_for(&destination.name);
            let source_name = match rule.map(|rule| &rule.source) {
                Some(MemberSource::Ignore) => continue,
                Some(MemberSource::Constant(value)) => {
                    members.push(MemberAssign {
                        name: destination.name.clone(),
                        source: AssignSource::Constant(value.clone()),
                        plan: PlanExpr::Identity,
                    });
                    continue;
                }
                Some(MemberSource::Member(name)) => name.clone(),
                None => destination.name.clone(),
            };
            let Some(source_type) = types.member_type(pair.source, &source_name) else {
                if rule.is_some() {
                    debug!(
                        pair = %pair.display(types),
                        member = %destination.name,
                        source_member = %source_name,
                        "configured source member does not exist"
                    );
                }
                continue;
            };

            let member = MemberRef::new(pair, destination.name.clone());
            let null_substitute = rule.and_then(|rule| rule.null_substitute.clone());
            let plan = self.member_expression(
                source_type,
                destination.ty,
                Some(member),
                map.profile(),
                null_substitute,
            );
            members.push(MemberAssign {
                name: destination.name,
                source: AssignSource::Member(source_name),
                plan,
            });
        }

        PlanExpr::Construct(Arc::new(ConstructExpr {
            destination: pair.destination,
            members,
        }))
    }

    /// Plan for one member value, wrapped in the profile's null handling.
    pub fn member_expression(
        &mut self,
        source: TypeId,
        destination: TypeId,
        member: Option<MemberRef>,
        profile: &Profile,
        null_substitute: Option<Value>,
    ) -> PlanExpr {
        let inner = self.pair_expression(TypePair::new(source, destination), member);
        let substitute = null_substitute
            .unwrap_or_else(|| profile.null_policy().null_substitute(self.types(), destination));
        PlanExpr::NullGuard {
            inner: Box::new(inner),
            substitute,
        }
    }

    /// Plan for a nested pair: an inlined map body, a runtime-dispatched
    /// call, a strategy plan, or the deferred unresolvable failure.
    pub fn pair_expression(&mut self, pair: TypePair, member: Option<MemberRef>) -> PlanExpr {
        match self.config.find_type_map(pair) {
            Some(map) if !map.is_polymorphic() && map.destination_override().is_none() => {
                if self.inline.enter() {
                    trace!(
                        pair = %pair.display(self.types()),
                        depth = self.inline.depth(),
                        "inlining nested type map"
                    );
                    let expr = self.type_map_expression(&map);
                    self.inline.leave();
                    expr
                } else {
                    PlanExpr::RuntimeDispatch(MapRequest::new(pair).for_member(member))
                }
            }
            Some(_) => PlanExpr::RuntimeDispatch(MapRequest::new(pair).for_member(member)),
            None => self.strategy_expression(&MapRequest::new(pair).for_member(member)),
        }
    }

    /// Plan from the first mapper strategy matching the runtime pair.
    ///
    /// Strategy plans are wrapped so failures surface as execution errors
    /// attributed to the runtime pair and member. With no matching strategy
    /// the plan fails when it runs, not now.
    pub fn strategy_expression(&mut self, request: &MapRequest) -> PlanExpr {
        let config = self.config;
        let types = config.types();
        let context = ErrorContext::new(types, request.runtime, request.member.as_ref());
        let mappers = config.mappers();
        match mappers
            .iter()
            .find(|mapper| mapper.is_match(request.runtime, types))
        {
            Some(mapper) => {
                trace!(
                    pair = %request.runtime.display(types),
                    mapper = mapper.name(),
                    "mapper strategy matched"
                );
                let inner = mapper.build_expression(self, request);
                PlanExpr::Guarded {
                    inner: Box::new(inner),
                    context,
                }
            }
            None => {
                debug!(
                    pair = %request.runtime.display(types),
                    "no type map or mapper strategy; deferring failure to first use"
                );
                PlanExpr::Unresolvable(context)
            }
        }
    }
}
