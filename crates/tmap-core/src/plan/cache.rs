//! Execution-plan cache.
//!
//! One compiled plan per [`MapRequest`]. Each key owns its own once-cell,
//! so the build for a key runs at most once and concurrent callers for that
//! key wait for and share its result, while builds for other keys proceed
//! independently. The table is never evicted; it lives as long as the
//! configuration that owns it.

use super::builder::PlanBuilder;
use super::compile::{CompiledPlan, compile};
use super::expr::PlanExpr;
use crate::config::MapperConfiguration;
use crate::pair::MapRequest;
use crate::trace as query_trace;
use crate::value::Value;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

#[derive(Default)]
pub struct ExecutionPlanCache {
    entries: DashMap<MapRequest, Arc<OnceLock<CompiledPlan>>>,
    compiled: AtomicU64,
}

impl ExecutionPlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of plans built so far.
    pub fn compiled_count(&self) -> u64 {
        self.compiled.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, request: &MapRequest) -> bool {
        self.entries
            .get(request)
            .is_some_and(|cell| cell.value().get().is_some())
    }

    /// The plan for `request`, building it with `config` on first use.
    pub fn get_or_build(&self, config: &MapperConfiguration, request: &MapRequest) -> CompiledPlan {
        let trace_enabled = query_trace::enabled();
        let query_id = trace_enabled.then(query_trace::next_query_id);
        if let Some(query_id) = query_id {
            query_trace::plan_start(query_id, request);
        }

        let existing = self.entries.get(request).map(|cell| cell.value().clone());
        if let Some(plan) = existing.as_ref().and_then(|cell| cell.get()) {
            if let Some(query_id) = query_id {
                query_trace::plan_end(query_id, "cached", true);
            }
            return plan.clone();
        }

        // Shard lock is released before the build runs.
        let cell = match existing {
            Some(cell) => cell,
            None => self.entries.entry(request.clone()).or_default().clone(),
        };
        let mut built_kind = None;
        let plan = cell
            .get_or_init(|| {
                self.compiled.fetch_add(1, Ordering::Relaxed);
                let expression = build_expression(config, request);
                built_kind = Some(expression.unwrapped().kind());
                compile(&expression)
            })
            .clone();

        if let Some(query_id) = query_id {
            query_trace::plan_end(query_id, built_kind.unwrap_or("cached"), built_kind.is_none());
        }
        plan
    }
}

/// Assemble the expression for a cache miss.
///
/// 1. Resolve a type map for the runtime pair, then for the requested pair.
/// 2. A map serving exactly the requested pair is reused as is; any other
///    map is called through an adapter.
/// 3. Without a map, the first matching mapper strategy builds the plan, or
///    the plan defers an "unresolvable pair" failure to its first run.
/// 4. The whole plan is wrapped in the null handling of the triggering
///    member rule, or of the resolving profile for top-level requests.
pub(crate) fn build_expression(config: &MapperConfiguration, request: &MapRequest) -> PlanExpr {
    let types = config.types();
    let map = config
        .resolve(request.runtime)
        .or_else(|| config.resolve(request.requested));

    let (inner, profile) = match map {
        Some(map) => {
            let profile = map.profile().clone();
            let inner = if map.pair() == request.requested {
                PlanExpr::Delegate(map)
            } else {
                let destination = request.requested.destination;
                let materialize = types
                    .is_value_type(destination)
                    .then(|| Value::default_for(types, map.destination_type()));
                debug!(
                    requested = %request.requested.display(types),
                    map = %map.pair().display(types),
                    "adapting type map to requested pair"
                );
                PlanExpr::Adapter {
                    map,
                    destination,
                    materialize,
                }
            };
            (inner, profile)
        }
        None => {
            let inner = PlanBuilder::new(config).strategy_expression(request);
            (inner, config.default_profile().clone())
        }
    };

    let rule_substitute = request.member.as_ref().and_then(|member| {
        config
            .find_type_map(member.owner)
            .and_then(|owner| owner.rule_for(&member.member).cloned())
            .and_then(|rule| rule.null_substitute)
    });
    let substitute = rule_substitute.unwrap_or_else(|| {
        profile
            .null_policy()
            .null_substitute(types, request.requested.destination)
    });

    PlanExpr::NullGuard {
        inner: Box::new(inner),
        substitute,
    }
}
