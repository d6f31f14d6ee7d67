use super::{ObjectMapper, is_supported_conversion};
use crate::pair::{MapRequest, TypePair};
use crate::plan::{PlanBuilder, PlanExpr};
use crate::registry::TypeRegistry;
use crate::types::{PrimitiveKind, TypeId};

/// Copies values whose destination is already satisfied by the source:
/// a primitive mapped to itself or one of its bases, or anything mapped
/// to `Object`.
pub struct AssignableMapper;

impl ObjectMapper for AssignableMapper {
    fn name(&self) -> &str {
        "assignable"
    }

    fn is_match(&self, pair: TypePair, types: &TypeRegistry) -> bool {
        (types.primitive_kind(pair.source).is_some() || pair.destination == TypeId::OBJECT)
            && types.is_assignable(pair.source, pair.destination)
    }

    fn build_expression(&self, _builder: &mut PlanBuilder<'_>, _request: &MapRequest) -> PlanExpr {
        PlanExpr::Identity
    }
}

/// Formats any primitive as a string.
pub struct ToStringMapper;

impl ObjectMapper for ToStringMapper {
    fn name(&self) -> &str {
        "to_string"
    }

    fn is_match(&self, pair: TypePair, types: &TypeRegistry) -> bool {
        pair.destination == TypeId::STRING && types.primitive_kind(pair.source).is_some()
    }

    fn build_expression(&self, _builder: &mut PlanBuilder<'_>, _request: &MapRequest) -> PlanExpr {
        PlanExpr::Convert {
            target: PrimitiveKind::String,
        }
    }
}

/// Numeric widening and narrowing, `Bool -> Int`, and parsing strings.
pub struct PrimitiveConversionMapper;

impl ObjectMapper for PrimitiveConversionMapper {
    fn name(&self) -> &str {
        "primitive_conversion"
    }

    fn is_match(&self, pair: TypePair, types: &TypeRegistry) -> bool {
        match (
            types.primitive_kind(pair.source),
            types.primitive_kind(pair.destination),
        ) {
            (Some(source), Some(target)) => is_supported_conversion(source, target),
            _ => false,
        }
    }

    fn build_expression(&self, builder: &mut PlanBuilder<'_>, request: &MapRequest) -> PlanExpr {
        match builder.types().primitive_kind(request.runtime.destination) {
            Some(target) => PlanExpr::Convert { target },
            None => PlanExpr::Identity,
        }
    }
}
