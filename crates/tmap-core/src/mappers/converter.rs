use super::{ObjectMapper, TypeConverter};
use crate::pair::{MapRequest, TypePair};
use crate::plan::{ErrorContext, PlanBuilder, PlanExpr};
use crate::registry::TypeRegistry;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Runs user converters registered for an exact type pair.
#[derive(Default)]
pub struct TypeConverterMapper {
    converters: FxHashMap<TypePair, Arc<dyn TypeConverter>>,
}

impl TypeConverterMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `converter` for `pair`; a later registration replaces an
    /// earlier one.
    pub fn insert(&mut self, pair: TypePair, converter: Arc<dyn TypeConverter>) {
        self.converters.insert(pair, converter);
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl ObjectMapper for TypeConverterMapper {
    fn name(&self) -> &str {
        "type_converter"
    }

    fn is_match(&self, pair: TypePair, _types: &TypeRegistry) -> bool {
        self.converters.contains_key(&pair)
    }

    fn build_expression(&self, builder: &mut PlanBuilder<'_>, request: &MapRequest) -> PlanExpr {
        match self.converters.get(&request.runtime) {
            Some(converter) => PlanExpr::Converter(converter.clone()),
            None => PlanExpr::Unresolvable(ErrorContext::new(
                builder.types(),
                request.runtime,
                request.member.as_ref(),
            )),
        }
    }
}
