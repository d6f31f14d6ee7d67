//! Runtime values moved through compiled plans.

use crate::registry::TypeRegistry;
use crate::types::{Name, PrimitiveKind, TypeData, TypeId};
use indexmap::IndexMap;
use serde::Serialize;

/// A dynamically typed instance.
#[derive(Clone, Debug, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Name),
    List(Vec<Value>),
    Object(ObjectValue),
}

/// An instance of a nominal type with ordered fields.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObjectValue {
    #[serde(skip)]
    pub ty: TypeId,
    #[serde(flatten)]
    pub fields: IndexMap<Name, Value>,
}

impl ObjectValue {
    pub fn new(ty: TypeId) -> Self {
        Self {
            ty,
            fields: IndexMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<Name>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set(&mut self, name: Name, value: Value) {
        self.fields.insert(name, value);
    }

    /// Remove a field for in-place remapping; its slot keeps its position
    /// once set again.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.fields.get_mut(name).map(std::mem::take)
    }
}

impl Value {
    /// Start an object value of type `ty`.
    pub fn object(ty: TypeId) -> ObjectValue {
        ObjectValue::new(ty)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The type used for polymorphic dispatch.
    ///
    /// Lists and nulls carry no runtime type; callers fall back to the
    /// declared type.
    pub fn runtime_type(&self) -> Option<TypeId> {
        match self {
            Self::Null | Self::List(_) => None,
            Self::Bool(_) => Some(TypeId::BOOL),
            Self::Int(_) => Some(TypeId::INT),
            Self::Float(_) => Some(TypeId::FLOAT),
            Self::Str(_) => Some(TypeId::STRING),
            Self::Object(object) => Some(object.ty),
        }
    }

    /// Field of an object value; `Null` for missing fields and non-objects.
    pub fn field(&self, name: &str) -> Value {
        match self {
            Self::Object(object) => object.get(name).cloned().unwrap_or(Self::Null),
            _ => Self::Null,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short description of the value's shape for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::Str(_) => "String",
            Self::List(_) => "List",
            Self::Object(_) => "Object",
        }
    }

    /// The value a missing instance of `ty` defaults to.
    ///
    /// Value types materialize (`false`, `0`, `0.0`, `""`, a struct with
    /// defaulted fields), sequences become empty lists and reference types
    /// stay `Null`.
    pub fn default_for(types: &TypeRegistry, ty: TypeId) -> Value {
        if let Some(kind) = types.primitive_kind(ty) {
            return match kind {
                PrimitiveKind::Bool => Self::Bool(false),
                PrimitiveKind::Int => Self::Int(0),
                PrimitiveKind::Float => Self::Float(0.0),
                PrimitiveKind::String => Self::Str(Name::from("")),
            };
        }
        if matches!(types.get(ty), Some(TypeData::List(_))) {
            return Self::List(Vec::new());
        }
        if types.is_value_type(ty) {
            let mut object = ObjectValue::new(ty);
            for member in types.members(ty) {
                if types.is_value_type(member.ty) && member.ty != ty {
                    let value = Self::default_for(types, member.ty);
                    object.set(member.name, value);
                } else {
                    object.set(member.name, Self::Null);
                }
            }
            return Self::Object(object);
        }
        Self::Null
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(Name::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(Name::from(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<ObjectValue> for Value {
    fn from(object: ObjectValue) -> Self {
        Self::Object(object)
    }
}
