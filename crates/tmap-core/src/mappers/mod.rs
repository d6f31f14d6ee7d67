//! Mapper strategies: plans for pairs that have no type map.
//!
//! A strategy answers two questions: does it handle a (source, destination)
//! pair, and what plan expression maps it. Strategies are tried in a fixed
//! order and the first match wins:
//!
//! | Order | Strategy                    | Handles                               |
//! |-------|-----------------------------|---------------------------------------|
//! | 1     | user strategies             | whatever they match                   |
//! | 2     | [`TypeConverterMapper`]     | pairs with a registered converter     |
//! | 3     | [`AssignableMapper`]        | primitive or `Object` upcasts         |
//! | 4     | [`ToStringMapper`]          | any primitive to `String`             |
//! | 5     | [`PrimitiveConversionMapper`] | numeric, bool and parsing conversions |
//! | 6     | [`SequenceMapper`]          | list to list                          |

mod converter;
mod primitive;
mod sequence;

pub use converter::TypeConverterMapper;
pub use primitive::{AssignableMapper, PrimitiveConversionMapper, ToStringMapper};
pub use sequence::SequenceMapper;

use crate::error::{BoxError, MappingError};
use crate::mapper::MappingContext;
use crate::pair::{MapRequest, TypePair};
use crate::plan::{PlanBuilder, PlanExpr};
use crate::registry::TypeRegistry;
use crate::types::{Name, PrimitiveKind};
use crate::value::Value;
use std::sync::Arc;

/// A plan-producing strategy for type pairs without a type map.
pub trait ObjectMapper: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    fn is_match(&self, pair: TypePair, types: &TypeRegistry) -> bool;

    /// Expression mapping `request.runtime`. Only called after `is_match`
    /// returned true for that pair.
    fn build_expression(&self, builder: &mut PlanBuilder<'_>, request: &MapRequest) -> PlanExpr;
}

/// A user conversion for one exact type pair.
pub trait TypeConverter: Send + Sync {
    fn convert(
        &self,
        source: &Value,
        destination: Option<Value>,
        ctx: &mut MappingContext<'_>,
    ) -> Result<Value, BoxError>;
}

impl<F> TypeConverter for F
where
    F: Fn(&Value) -> Result<Value, BoxError> + Send + Sync,
{
    fn convert(
        &self,
        source: &Value,
        _destination: Option<Value>,
        _ctx: &mut MappingContext<'_>,
    ) -> Result<Value, BoxError> {
        self(source)
    }
}

/// Built-in strategies, in the order they are tried.
pub fn builtin_mappers() -> Vec<Arc<dyn ObjectMapper>> {
    let mappers: [Arc<dyn ObjectMapper>; 4] = [
        Arc::new(AssignableMapper),
        Arc::new(ToStringMapper),
        Arc::new(PrimitiveConversionMapper),
        Arc::new(SequenceMapper),
    ];
    mappers.into()
}

/// Convert a primitive value to `target`.
pub(crate) fn convert_primitive(value: &Value, target: PrimitiveKind) -> Result<Value, MappingError> {
    let converted = match (value, target) {
        (Value::Bool(_), PrimitiveKind::Bool)
        | (Value::Int(_), PrimitiveKind::Int)
        | (Value::Float(_), PrimitiveKind::Float)
        | (Value::Str(_), PrimitiveKind::String) => value.clone(),

        (Value::Bool(flag), PrimitiveKind::String) => Value::Str(Name::from(flag.to_string())),
        (Value::Int(number), PrimitiveKind::String) => Value::Str(Name::from(number.to_string())),
        (Value::Float(number), PrimitiveKind::String) => {
            Value::Str(Name::from(number.to_string()))
        }

        (Value::Int(number), PrimitiveKind::Float) => Value::Float(*number as f64),
        (Value::Float(number), PrimitiveKind::Int) => Value::Int(truncate(*number, target)?),
        (Value::Bool(flag), PrimitiveKind::Int) => Value::Int(i64::from(*flag)),

        (Value::Str(text), PrimitiveKind::Int) => {
            Value::Int(parse(text, target)?)
        }
        (Value::Str(text), PrimitiveKind::Float) => {
            Value::Float(parse(text, target)?)
        }
        (Value::Str(text), PrimitiveKind::Bool) => {
            Value::Bool(parse(text, target)?)
        }

        (other, _) => {
            return Err(MappingError::Unexpected {
                expected: target.name(),
                found: other.describe(),
            });
        }
    };
    Ok(converted)
}

fn parse<T: std::str::FromStr>(text: &str, target: PrimitiveKind) -> Result<T, MappingError> {
    text.trim().parse().map_err(|_| MappingError::Conversion {
        value: text.to_string(),
        target,
    })
}

/// `i64::MIN as f64` is exactly -2^63 and `i64::MAX as f64` rounds up to 2^63.
fn truncate(number: f64, target: PrimitiveKind) -> Result<i64, MappingError> {
    let whole = number.trunc();
    if whole.is_finite() && whole >= i64::MIN as f64 && whole < i64::MAX as f64 {
        Ok(whole as i64)
    } else {
        Err(MappingError::Conversion {
            value: number.to_string(),
            target,
        })
    }
}

/// Whether `convert_primitive` supports `source -> target`.
pub(crate) fn is_supported_conversion(source: PrimitiveKind, target: PrimitiveKind) -> bool {
    use PrimitiveKind::{Bool, Float, Int, String};
    matches!(
        (source, target),
        (Int, Float) | (Float, Int) | (Bool, Int) | (String, Int) | (String, Float) | (String, Bool)
    ) || source == target
        || target == String
}

#[cfg(test)]
#[path = "../../tests/mappers_tests.rs"]
mod tests;
