//! Declarative plan description.
//!
//! Plans are described as a small tree of copy / convert / construct /
//! dispatch operations, then assembled once into a closure by
//! [`compile`](super::compile). Keeping the tree around on sealed maps makes
//! the shape of a plan (how deep it inlines, where it dispatches at runtime)
//! observable for diagnostics.

use crate::mappers::TypeConverter;
use crate::pair::{MapRequest, MemberRef, TypePair};
use crate::registry::TypeRegistry;
use crate::type_map::TypeMap;
use crate::types::{Name, PrimitiveKind, TypeId};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Names used to attribute failures to the pair and member being mapped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorContext {
    pub source_type: String,
    pub destination_type: String,
    pub member: Option<String>,
}

impl ErrorContext {
    pub fn new(types: &TypeRegistry, pair: TypePair, member: Option<&MemberRef>) -> Self {
        Self {
            source_type: types.display(pair.source),
            destination_type: types.display(pair.destination),
            member: member.map(|member| member.display(types)),
        }
    }
}

/// Where a member assignment reads its value.
#[derive(Clone, Debug)]
pub enum AssignSource {
    Member(Name),
    Constant(Value),
}

#[derive(Clone, Debug)]
pub struct MemberAssign {
    pub name: Name,
    pub source: AssignSource,
    pub plan: PlanExpr,
}

/// Body of a type map: create or reuse the destination, then assign members.
#[derive(Clone, Debug)]
pub struct ConstructExpr {
    pub destination: TypeId,
    pub members: Vec<MemberAssign>,
}

#[derive(Clone)]
pub enum PlanExpr {
    /// Copy the source unchanged.
    Identity,
    Convert { target: PrimitiveKind },
    /// Map every element of a list with `element`.
    Sequence { element: Box<PlanExpr> },
    Construct(Arc<ConstructExpr>),
    /// Reuse the precompiled plan of a map serving the requested pair.
    Delegate(Arc<TypeMap>),
    /// Call into a map serving a different pair than the one requested.
    ///
    /// `materialize` is the default destination used when the requested
    /// destination is a value type and no destination instance was given.
    /// The result must be assignable to `destination`, the requested type.
    Adapter {
        map: Arc<TypeMap>,
        destination: TypeId,
        materialize: Option<Value>,
    },
    /// Look the plan up when it runs instead of inlining it.
    RuntimeDispatch(MapRequest),
    Converter(Arc<dyn TypeConverter>),
    /// Translate any failure of `inner` into an attributed execution error.
    Guarded {
        inner: Box<PlanExpr>,
        context: ErrorContext,
    },
    /// Short-circuit a null source to `substitute`.
    NullGuard {
        inner: Box<PlanExpr>,
        substitute: Value,
    },
    /// Deferred failure for a pair nothing can map.
    Unresolvable(ErrorContext),
}

impl PlanExpr {
    /// Short label, used in traces.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Convert { .. } => "convert",
            Self::Sequence { .. } => "sequence",
            Self::Construct(_) => "construct",
            Self::Delegate(_) => "delegate",
            Self::Adapter { .. } => "adapter",
            Self::RuntimeDispatch(_) => "runtime_dispatch",
            Self::Converter(_) => "converter",
            Self::Guarded { .. } => "guarded",
            Self::NullGuard { .. } => "null_guard",
            Self::Unresolvable(_) => "unresolvable",
        }
    }

    /// The expression under any null guards and error wrappers.
    pub fn unwrapped(&self) -> &PlanExpr {
        match self {
            Self::Guarded { inner, .. } | Self::NullGuard { inner, .. } => inner.unwrapped(),
            other => other,
        }
    }

    /// Deepest chain of nested `Construct` nodes.
    ///
    /// A sealed map's own body counts as one level, so a map that inlines N
    /// nested maps reports `N + 1`.
    pub fn inline_depth(&self) -> u32 {
        match self {
            Self::Construct(construct) => {
                1 + construct
                    .members
                    .iter()
                    .map(|member| member.plan.inline_depth())
                    .max()
                    .unwrap_or(0)
            }
            Self::Sequence { element } => element.inline_depth(),
            Self::Guarded { inner, .. } | Self::NullGuard { inner, .. } => inner.inline_depth(),
            _ => 0,
        }
    }

    /// Number of runtime-dispatched calls anywhere in the tree.
    pub fn runtime_dispatch_count(&self) -> usize {
        match self {
            Self::RuntimeDispatch(_) => 1,
            Self::Construct(construct) => construct
                .members
                .iter()
                .map(|member| member.plan.runtime_dispatch_count())
                .sum(),
            Self::Sequence { element } => element.runtime_dispatch_count(),
            Self::Guarded { inner, .. } | Self::NullGuard { inner, .. } => {
                inner.runtime_dispatch_count()
            }
            _ => 0,
        }
    }
}

impl fmt::Debug for PlanExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Convert { target } => f.debug_struct("Convert").field("target", target).finish(),
            Self::Sequence { element } => {
                f.debug_struct("Sequence").field("element", element).finish()
            }
            Self::Construct(construct) => f.debug_tuple("Construct").field(construct).finish(),
            Self::Delegate(map) => f.debug_tuple("Delegate").field(&map.pair()).finish(),
            Self::Adapter {
                map,
                destination,
                materialize,
            } => f
                .debug_struct("Adapter")
                .field("map", &map.pair())
                .field("destination", destination)
                .field("materialize", materialize)
                .finish(),
            Self::RuntimeDispatch(request) => {
                f.debug_tuple("RuntimeDispatch").field(request).finish()
            }
            Self::Converter(_) => f.write_str("Converter(..)"),
            Self::Guarded { inner, context } => f
                .debug_struct("Guarded")
                .field("inner", inner)
                .field("context", context)
                .finish(),
            Self::NullGuard { inner, substitute } => f
                .debug_struct("NullGuard")
                .field("inner", inner)
                .field("substitute", substitute)
                .finish(),
            Self::Unresolvable(context) => f.debug_tuple("Unresolvable").field(context).finish(),
        }
    }
}
