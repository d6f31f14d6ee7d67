//! Assemble a [`PlanExpr`] into a callable plan.
//!
//! Compilation walks the expression once and nests closures; the resulting
//! [`CompiledPlan`] is immutable and shared by every request with an equal
//! key.

use super::expr::{AssignSource, ErrorContext, PlanExpr};
use crate::error::MappingError;
use crate::mapper::MappingContext;
use crate::mappers::convert_primitive;
use crate::types::Name;
use crate::value::{ObjectValue, Value};
use std::sync::Arc;

/// A compiled plan: (source, existing destination, context) -> destination.
pub type CompiledPlan = Arc<
    dyn Fn(&Value, Option<Value>, &mut MappingContext<'_>) -> Result<Value, MappingError>
        + Send
        + Sync,
>;

/// Box a closure as a plan; the bound pins the closure's signature.
fn make_plan<F>(f: F) -> CompiledPlan
where
    F: Fn(&Value, Option<Value>, &mut MappingContext<'_>) -> Result<Value, MappingError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

enum CompiledSource {
    Member(Name),
    Constant(Value),
}

pub fn compile(expr: &PlanExpr) -> CompiledPlan {
    match expr {
        PlanExpr::Identity => make_plan(|source, _, _| Ok(source.clone())),

        PlanExpr::Convert { target } => {
            let target = *target;
            make_plan(move |source, _, _| convert_primitive(source, target))
        }

        PlanExpr::Sequence { element } => {
            let element = compile(element);
            make_plan(move |source, _, ctx| match source {
                Value::Null => Ok(Value::Null),
                Value::List(items) => items
                    .iter()
                    .map(|item| element(item, None, ctx))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List),
                other => Err(MappingError::Unexpected {
                    expected: "List",
                    found: other.describe(),
                }),
            })
        }

        PlanExpr::Construct(construct) => {
            let destination = construct.destination;
            let members: Vec<(Name, CompiledSource, CompiledPlan)> = construct
                .members
                .iter()
                .map(|member| {
                    let source = match &member.source {
                        AssignSource::Member(name) => CompiledSource::Member(name.clone()),
                        AssignSource::Constant(value) => CompiledSource::Constant(value.clone()),
                    };
                    (member.name.clone(), source, compile(&member.plan))
                })
                .collect();
            make_plan(move |source, existing, ctx| {
                if !matches!(source, Value::Object(_) | Value::Null) {
                    return Err(MappingError::Unexpected {
                        expected: "Object",
                        found: source.describe(),
                    });
                }
                let mut object = match existing {
                    Some(Value::Object(object)) => object,
                    _ => ObjectValue::new(destination),
                };
                for (name, member_source, plan) in &members {
                    let value = match member_source {
                        CompiledSource::Member(source_name) => source.field(source_name),
                        CompiledSource::Constant(value) => value.clone(),
                    };
                    let current = object.take(name);
                    let mapped = plan(&value, current, ctx)?;
                    object.set(name.clone(), mapped);
                }
                Ok(Value::Object(object))
            })
        }

        PlanExpr::Delegate(map) => match map.plan() {
            Some(plan) => plan.clone(),
            None => {
                let map = map.clone();
                make_plan(move |source, destination, ctx| {
                    let plan = map.sealed_plan(ctx.configuration());
                    plan(source, destination, ctx)
                })
            }
        },

        PlanExpr::Adapter {
            map,
            destination: requested,
            materialize,
        } => {
            let map = map.clone();
            let requested = *requested;
            let materialize = materialize.clone();
            make_plan(move |source, destination, ctx| {
                let destination = destination.or_else(|| materialize.clone());
                let config = ctx.configuration();
                let plan = map.sealed_plan(config);
                let mapped = plan(source, destination, ctx)?;
                let types = config.types();
                match mapped.runtime_type() {
                    Some(found) if !types.is_assignable(found, requested) => {
                        Err(MappingError::NotAssignable {
                            found: types.display(found),
                            expected: types.display(requested),
                        })
                    }
                    _ => Ok(mapped),
                }
            })
        }

        PlanExpr::RuntimeDispatch(request) => {
            let request = request.clone();
            make_plan(move |source, destination, ctx| {
                ctx.map_dynamic(source, destination, &request)
            })
        }

        PlanExpr::Converter(converter) => {
            let converter = converter.clone();
            make_plan(move |source, destination, ctx| {
                converter
                    .convert(source, destination, ctx)
                    .map_err(MappingError::Custom)
            })
        }

        PlanExpr::Guarded { inner, context } => {
            let inner = compile(inner);
            let context = context.clone();
            make_plan(move |source, destination, ctx| {
                inner(source, destination, ctx).map_err(|cause| execution_error(&context, cause))
            })
        }

        PlanExpr::NullGuard { inner, substitute } => {
            let inner = compile(inner);
            let substitute = substitute.clone();
            make_plan(move |source, destination, ctx| {
                if source.is_null() {
                    Ok(substitute.clone())
                } else {
                    inner(source, destination, ctx)
                }
            })
        }

        PlanExpr::Unresolvable(context) => {
            let context = context.clone();
            make_plan(move |_, _, _| {
                Err(MappingError::UnresolvablePair {
                    source_type: context.source_type.clone(),
                    destination_type: context.destination_type.clone(),
                    member: context.member.clone(),
                })
            })
        }
    }
}

fn execution_error(context: &ErrorContext, cause: MappingError) -> MappingError {
    MappingError::Execution {
        source_type: context.source_type.clone(),
        destination_type: context.destination_type.clone(),
        member: context.member.clone(),
        cause: Box::new(cause),
    }
}
