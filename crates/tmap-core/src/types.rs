//! Type descriptors for the mapping engine.
//!
//! The engine never inspects host-language types directly. Every declared
//! type is described by a [`TypeData`] stored in the
//! [`TypeRegistry`](crate::TypeRegistry) and referred to by a copyable
//! [`TypeId`] handle.
//!
//! | Variant | Interned | Example |
//! |---------|----------|---------|
//! | `Object` | fixed id | root of every class hierarchy |
//! | `Primitive` | fixed id | `Int`, `String` |
//! | `Nominal` | no (each definition is unique) | `class Dog : Animal` |
//! | `Param` | yes | `T0` inside `Box<T0>` |
//! | `List` | yes | `List<Int>` |
//! | `Application` | yes | `Box<Int>` |

use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Member and type names.
pub type Name = Arc<str>;

/// Handle to a registered type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Root of every class and struct hierarchy.
    pub const OBJECT: Self = Self(1);
    pub const BOOL: Self = Self(2);
    pub const INT: Self = Self(3);
    pub const FLOAT: Self = Self(4);
    pub const STRING: Self = Self(5);

    /// First id handed out for user definitions and interned structure.
    pub const FIRST_USER: u32 = 16;

    /// Check whether this id is one of the fixed built-in ids.
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_USER
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scalar kinds with built-in conversions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveKind {
    Bool,
    Int,
    Float,
    String,
}

impl PrimitiveKind {
    /// The fixed `TypeId` for this primitive.
    pub const fn type_id(self) -> TypeId {
        match self {
            Self::Bool => TypeId::BOOL,
            Self::Int => TypeId::INT,
            Self::Float => TypeId::FLOAT,
            Self::String => TypeId::STRING,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::String => "String",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of nominal definition.
///
/// | Kind | Base | Value type |
/// |------|------|------------|
/// | Class | explicit or `OBJECT` | no |
/// | Struct | `OBJECT` | yes |
/// | Interface | none | no |
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
}

/// A declared member of a nominal type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberInfo {
    pub name: Name,
    pub ty: TypeId,
}

impl MemberInfo {
    pub fn new(name: impl Into<Name>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A nominal definition: class, struct or interface.
///
/// A definition with a non-empty `type_params` list is an open generic
/// definition; its `base`, `interfaces` and `members` may refer to
/// `TypeData::Param` placeholders that are substituted when the definition is
/// applied to concrete arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDef {
    pub name: Name,
    pub kind: TypeKind,
    pub type_params: Vec<Name>,
    pub base: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub members: Vec<MemberInfo>,
}

impl TypeDef {
    fn new(name: impl Into<Name>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_params: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Start a class definition.
    pub fn class(name: impl Into<Name>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    /// Start a struct (value type) definition.
    pub fn structure(name: impl Into<Name>) -> Self {
        Self::new(name, TypeKind::Struct)
    }

    /// Start an interface definition.
    pub fn interface(name: impl Into<Name>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    /// Declare the type parameters of an open generic definition.
    pub fn generic<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Name>,
    {
        self.type_params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Set the base class. Interfaces use [`implements`](Self::implements) for extension.
    pub fn extends(mut self, base: TypeId) -> Self {
        self.base = Some(base);
        self
    }

    pub fn implements(mut self, interface: TypeId) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn member(mut self, name: impl Into<Name>, ty: TypeId) -> Self {
        self.members.push(MemberInfo::new(name, ty));
        self
    }

    /// Number of type parameters (zero for non-generic definitions).
    pub fn arity(&self) -> usize {
        self.type_params.len()
    }
}

/// Structural description of a registered type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeData {
    Object,
    Primitive(PrimitiveKind),
    Nominal(Arc<TypeDef>),
    /// Type parameter placeholder by position.
    Param(u32),
    /// Homogeneous sequence.
    List(TypeId),
    /// Closed (or partially closed) generic type.
    Application {
        definition: TypeId,
        args: SmallVec<[TypeId; 2]>,
    },
}

/// Key for interned structural types.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum StructuralKey {
    Param(u32),
    List(TypeId),
    Application(TypeId, SmallVec<[TypeId; 2]>),
}
