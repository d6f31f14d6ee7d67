//! Thread-safe type universe.
//!
//! `TypeRegistry` plays the role runtime reflection plays for the mapping
//! engine: it answers "what is the base of this type", "which interfaces does
//! it implement", "what are its members" and "close this generic definition
//! over these arguments".
//!
//! Nominal definitions get a fresh `TypeId` each time they are registered.
//! Structural types (lists, type parameters, generic applications) are
//! interned, so equal structure always yields the same `TypeId` and type
//! equality stays an integer comparison.

use crate::hierarchy::type_inheritance;
use crate::types::{
    MemberInfo, Name, PrimitiveKind, StructuralKey, TypeData, TypeDef, TypeId, TypeKind,
};
use dashmap::DashMap;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::trace;

/// Global counter for assigning unique instance IDs to `TypeRegistry` instances.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Storage for every type the engine can reason about.
///
/// Uses `DashMap` so definitions and interning can happen from any thread,
/// including lazily while plans are being built.
pub struct TypeRegistry {
    instance_id: u64,
    types: DashMap<TypeId, TypeData>,
    interned: DashMap<StructuralKey, TypeId>,
    next_id: AtomicU32,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry pre-populated with `OBJECT` and the primitives.
    pub fn new() -> Self {
        let instance_id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::SeqCst);
        trace!(instance_id, "TypeRegistry::new");
        let types = DashMap::new();
        types.insert(TypeId::OBJECT, TypeData::Object);
        for kind in [
            PrimitiveKind::Bool,
            PrimitiveKind::Int,
            PrimitiveKind::Float,
            PrimitiveKind::String,
        ] {
            types.insert(kind.type_id(), TypeData::Primitive(kind));
        }
        Self {
            instance_id,
            types,
            interned: DashMap::new(),
            next_id: AtomicU32::new(TypeId::FIRST_USER),
        }
    }

    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    /// Number of registered types, built-ins included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn allocate(&self) -> TypeId {
        TypeId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Register a nominal definition and return its `TypeId`.
    pub fn define(&self, def: TypeDef) -> TypeId {
        self.define_with(|_| def)
    }

    /// Register a nominal definition that needs to refer to itself.
    ///
    /// The closure receives the id the definition will be stored under, so a
    /// tree node can declare `children: List<Node>`. The definition is not
    /// visible to queries until the closure returns.
    pub fn define_with(&self, build: impl FnOnce(TypeId) -> TypeDef) -> TypeId {
        let id = self.allocate();
        let def = build(id);
        trace!(
            instance_id = self.instance_id,
            type_id = id.0,
            name = %def.name,
            kind = ?def.kind,
            arity = def.arity(),
            "TypeRegistry::define"
        );
        self.types.insert(id, TypeData::Nominal(Arc::new(def)));
        id
    }

    fn intern(&self, key: StructuralKey, data: impl FnOnce() -> TypeData) -> TypeId {
        if let Some(existing) = self.interned.get(&key) {
            return *existing;
        }
        *self.interned.entry(key).or_insert_with(|| {
            let id = self.allocate();
            self.types.insert(id, data());
            id
        })
    }

    /// The placeholder for the type parameter at `index`.
    pub fn param(&self, index: u32) -> TypeId {
        self.intern(StructuralKey::Param(index), || TypeData::Param(index))
    }

    /// A sequence of `element`.
    pub fn list(&self, element: TypeId) -> TypeId {
        self.intern(StructuralKey::List(element), || TypeData::List(element))
    }

    /// Close the generic `definition` over `args`.
    ///
    /// Returns `None` when `definition` is not an open generic definition or
    /// when the argument count does not match its arity.
    pub fn apply(&self, definition: TypeId, args: &[TypeId]) -> Option<TypeId> {
        let arity = self.definition(definition)?.arity();
        if arity == 0 || arity != args.len() || !self.is_generic_definition(definition) {
            return None;
        }
        let args: SmallVec<[TypeId; 2]> = args.iter().copied().collect();
        let data_args = args.clone();
        Some(self.intern(StructuralKey::Application(definition, args), move || {
            TypeData::Application {
                definition,
                args: data_args,
            }
        }))
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn get(&self, id: TypeId) -> Option<TypeData> {
        self.types.get(&id).map(|entry| entry.clone())
    }

    /// The nominal definition behind `id`, looking through applications.
    pub fn definition(&self, id: TypeId) -> Option<Arc<TypeDef>> {
        match self.get(id)? {
            TypeData::Nominal(def) => Some(def),
            TypeData::Application { definition, .. } => match self.get(definition)? {
                TypeData::Nominal(def) => Some(def),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn kind(&self, id: TypeId) -> Option<TypeKind> {
        self.definition(id).map(|def| def.kind)
    }

    pub fn primitive_kind(&self, id: TypeId) -> Option<PrimitiveKind> {
        match self.get(id)? {
            TypeData::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn list_element(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id)? {
            TypeData::List(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_interface(&self, id: TypeId) -> bool {
        self.kind(id) == Some(TypeKind::Interface)
    }

    /// Primitives and structs are value types: a missing destination of such
    /// a type is materialized as a default instead of staying null.
    pub fn is_value_type(&self, id: TypeId) -> bool {
        match self.get(id) {
            Some(TypeData::Primitive(_)) => true,
            Some(TypeData::Nominal(def)) => def.kind == TypeKind::Struct,
            Some(TypeData::Application { .. }) => self.kind(id) == Some(TypeKind::Struct),
            _ => false,
        }
    }

    /// An open generic definition (`Box<T>` itself, not `Box<Int>`).
    pub fn is_generic_definition(&self, id: TypeId) -> bool {
        matches!(self.get(id), Some(TypeData::Nominal(def)) if def.arity() > 0)
    }

    /// The generic definition `id` is built from.
    ///
    /// Applications reduce to their definition and open definitions reduce
    /// to themselves; everything else is not generic.
    pub fn generic_definition(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id)? {
            TypeData::Application { definition, .. } => Some(definition),
            TypeData::Nominal(def) if def.arity() > 0 => Some(id),
            _ => None,
        }
    }

    pub fn generic_args(&self, id: TypeId) -> SmallVec<[TypeId; 2]> {
        match self.get(id) {
            Some(TypeData::Application { args, .. }) => args,
            _ => SmallVec::new(),
        }
    }

    /// Whether `id` still mentions an unbound type parameter.
    pub fn contains_generic_parameters(&self, id: TypeId) -> bool {
        match self.get(id) {
            Some(TypeData::Param(_)) => true,
            Some(TypeData::Nominal(def)) => def.arity() > 0,
            Some(TypeData::List(element)) => self.contains_generic_parameters(element),
            Some(TypeData::Application { args, .. }) => args
                .iter()
                .any(|arg| self.contains_generic_parameters(*arg)),
            _ => false,
        }
    }

    /// Replace type parameter placeholders in `ty` with `args`.
    ///
    /// Placeholders without a matching argument are left in place.
    pub fn substitute(&self, ty: TypeId, args: &[TypeId]) -> TypeId {
        if args.is_empty() {
            return ty;
        }
        match self.get(ty) {
            Some(TypeData::Param(index)) => args.get(index as usize).copied().unwrap_or(ty),
            Some(TypeData::List(element)) => self.list(self.substitute(element, args)),
            Some(TypeData::Application {
                definition,
                args: inner,
            }) => {
                let closed: SmallVec<[TypeId; 2]> =
                    inner.iter().map(|arg| self.substitute(*arg, args)).collect();
                self.apply(definition, &closed).unwrap_or(ty)
            }
            _ => ty,
        }
    }

    /// The direct base type.
    ///
    /// Classes without an explicit base, structs, primitives and lists all
    /// derive from `OBJECT`. Interfaces, type parameters and `OBJECT` itself
    /// have no base.
    pub fn base_type(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id)? {
            TypeData::Object | TypeData::Param(_) => None,
            TypeData::Primitive(_) | TypeData::List(_) => Some(TypeId::OBJECT),
            TypeData::Nominal(def) => match def.kind {
                TypeKind::Interface => None,
                _ => Some(def.base.unwrap_or(TypeId::OBJECT)),
            },
            TypeData::Application { args, .. } => {
                let def = self.definition(id)?;
                match def.kind {
                    TypeKind::Interface => None,
                    _ => Some(
                        def.base
                            .map(|base| self.substitute(base, &args))
                            .unwrap_or(TypeId::OBJECT),
                    ),
                }
            }
        }
    }

    /// `id` followed by its base chain up to the root.
    ///
    /// A base chain that loops back on itself stops at the first repeat.
    pub fn ancestors(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = vec![id];
        let mut seen = FxHashSet::default();
        seen.insert(id);
        let mut current = self.base_type(id);
        while let Some(base) = current {
            if !seen.insert(base) {
                break;
            }
            chain.push(base);
            current = self.base_type(base);
        }
        chain
    }

    /// Interfaces declared directly on `id` (extended interfaces for an interface).
    pub fn direct_interfaces(&self, id: TypeId) -> Vec<TypeId> {
        let Some(def) = self.definition(id) else {
            return Vec::new();
        };
        let args = self.generic_args(id);
        def.interfaces
            .iter()
            .map(|iface| self.substitute(*iface, &args))
            .collect()
    }

    fn own_members(&self, id: TypeId) -> Vec<MemberInfo> {
        let Some(def) = self.definition(id) else {
            return Vec::new();
        };
        let args = self.generic_args(id);
        def.members
            .iter()
            .map(|member| MemberInfo {
                name: member.name.clone(),
                ty: self.substitute(member.ty, &args),
            })
            .collect()
    }

    /// All members visible on `id`: inherited members first, own members
    /// overriding inherited ones of the same name.
    pub fn members(&self, id: TypeId) -> Vec<MemberInfo> {
        let mut merged: IndexMap<Name, TypeId> = IndexMap::new();
        for ancestor in self.ancestors(id).into_iter().rev() {
            for member in self.own_members(ancestor) {
                merged.insert(member.name, member.ty);
            }
        }
        merged
            .into_iter()
            .map(|(name, ty)| MemberInfo { name, ty })
            .collect()
    }

    pub fn member_type(&self, id: TypeId, name: &str) -> Option<TypeId> {
        self.members(id)
            .into_iter()
            .find(|member| &*member.name == name)
            .map(|member| member.ty)
    }

    /// Whether a value of `source` can stand where `target` is expected.
    pub fn is_assignable(&self, source: TypeId, target: TypeId) -> bool {
        source == target
            || target == TypeId::OBJECT
            || type_inheritance(self, source).contains(&target)
    }

    /// Human-readable name, e.g. `Box<Int>` or `List<NodeDto>`.
    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            None => format!("<unknown {id}>"),
            Some(TypeData::Object) => "Object".to_string(),
            Some(TypeData::Primitive(kind)) => kind.name().to_string(),
            Some(TypeData::Param(index)) => format!("T{index}"),
            Some(TypeData::List(element)) => format!("List<{}>", self.display(element)),
            Some(TypeData::Nominal(def)) if def.arity() > 0 => {
                format!("{}<{}>", def.name, def.type_params.join(", "))
            }
            Some(TypeData::Nominal(def)) => def.name.to_string(),
            Some(TypeData::Application { definition, args }) => {
                let name = self
                    .definition(definition)
                    .map(|def| def.name.to_string())
                    .unwrap_or_else(|| definition.to_string());
                let args: Vec<String> = args.iter().map(|arg| self.display(*arg)).collect();
                format!("{}<{}>", name, args.join(", "))
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/registry_tests.rs"]
mod tests;
