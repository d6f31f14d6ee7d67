//! Type hierarchy walking for fallback resolution.
//!
//! When no map exists for an exact (source, destination) pair, the resolver
//! retries with ancestors of both sides. [`type_inheritance`] produces the
//! ordered candidate list for one side.

use crate::registry::TypeRegistry;
use crate::types::TypeId;
use indexmap::IndexSet;
use rustc_hash::FxHashSet;

/// Ordered candidate list for `ty`.
///
/// The type itself comes first, then each base type up to the root, then
/// every implemented interface exactly once. Interfaces declared by a base
/// type are moved to the tail as that base is visited, so interfaces closer
/// to `ty` are tried before interfaces inherited from far ancestors.
///
/// This only reads the registry; it never touches resolution caches.
pub fn type_inheritance(types: &TypeRegistry, ty: TypeId) -> Vec<TypeId> {
    let chain = types.ancestors(ty);
    let mut interfaces: IndexSet<TypeId> = IndexSet::new();
    for ancestor in &chain {
        for iface in interface_closure(types, *ancestor) {
            interfaces.shift_remove(&iface);
            interfaces.insert(iface);
        }
    }
    let mut result = chain;
    result.extend(interfaces.into_iter().filter(|iface| *iface != ty));
    result
}

/// Interfaces declared directly on `ty` followed by everything they extend.
fn interface_closure(types: &TypeRegistry, ty: TypeId) -> Vec<TypeId> {
    let mut out = Vec::new();
    let mut seen = FxHashSet::default();
    let mut stack: Vec<TypeId> = types.direct_interfaces(ty).into_iter().rev().collect();
    while let Some(iface) = stack.pop() {
        if !seen.insert(iface) {
            continue;
        }
        out.push(iface);
        for parent in types.direct_interfaces(iface).into_iter().rev() {
            stack.push(parent);
        }
    }
    out
}

#[cfg(test)]
#[path = "../tests/hierarchy_tests.rs"]
mod tests;
