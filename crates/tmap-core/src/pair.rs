//! Lookup keys: type pairs and map requests.

use crate::registry::TypeRegistry;
use crate::types::{Name, TypeId};
use std::fmt;

/// Ordered (source, destination) identity used as the key of every cache.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypePair {
    pub source: TypeId,
    pub destination: TypeId,
}

impl TypePair {
    pub const fn new(source: TypeId, destination: TypeId) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Both sides reduced to their generic definitions.
    ///
    /// A side that is not generic stays as it is. Returns `None` when
    /// neither side is generic, i.e. there is nothing to close.
    pub fn open_generic(self, types: &TypeRegistry) -> Option<TypePair> {
        let source = types.generic_definition(self.source);
        let destination = types.generic_definition(self.destination);
        if source.is_none() && destination.is_none() {
            return None;
        }
        Some(TypePair::new(
            source.unwrap_or(self.source),
            destination.unwrap_or(self.destination),
        ))
    }

    /// Close the open-generic sides of `self` with the arguments of `closed`.
    ///
    /// A side of `closed` without generic arguments borrows the other side's
    /// arguments, so `Box<T> -> Wrapper<T>` closed against `Box<Int> -> Int`
    /// yields `Box<Int> -> Wrapper<Int>`. Returns `None` when an argument
    /// count does not fit a definition's arity.
    pub fn close_generic_types(self, types: &TypeRegistry, closed: TypePair) -> Option<TypePair> {
        let mut source_args = types.generic_args(closed.source);
        let mut destination_args = types.generic_args(closed.destination);
        if source_args.is_empty() {
            source_args = destination_args.clone();
        } else if destination_args.is_empty() {
            destination_args = source_args.clone();
        }
        let source = if types.is_generic_definition(self.source) {
            types.apply(self.source, &source_args)?
        } else {
            self.source
        };
        let destination = if types.is_generic_definition(self.destination) {
            types.apply(self.destination, &destination_args)?
        } else {
            self.destination
        };
        Some(TypePair::new(source, destination))
    }

    pub fn contains_generic_parameters(self, types: &TypeRegistry) -> bool {
        types.contains_generic_parameters(self.source)
            || types.contains_generic_parameters(self.destination)
    }

    pub fn display(self, types: &TypeRegistry) -> String {
        format!(
            "{} -> {}",
            types.display(self.source),
            types.display(self.destination)
        )
    }
}

impl fmt::Display for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// Identity of the member rule that triggered a nested request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberRef {
    /// Pair of the type map that owns the member.
    pub owner: TypePair,
    /// Destination member name.
    pub member: Name,
}

impl MemberRef {
    pub fn new(owner: TypePair, member: impl Into<Name>) -> Self {
        Self {
            owner,
            member: member.into(),
        }
    }

    pub fn display(&self, types: &TypeRegistry) -> String {
        format!("{}.{}", types.display(self.owner.destination), self.member)
    }
}

/// Key of one compiled plan.
///
/// `requested` holds the statically declared types at the call site and
/// `runtime` the actual types of the values, which differ for polymorphic
/// calls.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapRequest {
    pub requested: TypePair,
    pub runtime: TypePair,
    pub member: Option<MemberRef>,
}

impl MapRequest {
    /// A request whose runtime types equal its declared types.
    pub fn new(requested: TypePair) -> Self {
        Self {
            requested,
            runtime: requested,
            member: None,
        }
    }

    pub fn with_runtime(requested: TypePair, runtime: TypePair) -> Self {
        Self {
            requested,
            runtime,
            member: None,
        }
    }

    pub fn for_member(mut self, member: Option<MemberRef>) -> Self {
        self.member = member;
        self
    }
}
