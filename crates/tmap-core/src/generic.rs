//! Closing open-generic type maps for concrete pairs.
//!
//! A map declared over generic definitions (`Box<T> -> BoxDto<T>`) serves
//! every instantiation of them. Asking for `Box<Int> -> BoxDto<Int>` finds
//! the declared template and instantiates a closed map for exactly that
//! pair. The closed map is a new `TypeMap` with its own sealed state; it is
//! cached by the resolved-map cache under the requested pair.

use crate::config::MapperConfiguration;
use crate::pair::TypePair;
use crate::type_map::TypeMap;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::trace;

pub struct GenericClosureResolver<'a> {
    config: &'a MapperConfiguration,
}

impl<'a> GenericClosureResolver<'a> {
    pub fn new(config: &'a MapperConfiguration) -> Self {
        Self { config }
    }

    /// A closed map for `pair`, or `None` when no generic template covers it.
    ///
    /// User-declared templates are tried for (open source, destination),
    /// then (source, open destination), then (open source, open
    /// destination). Without a usable template, a map already cached for the
    /// open pair is reused: returned as is when it is not generic, closed
    /// against `pair`'s arguments otherwise. When the cached map's parameters
    /// cannot take `pair`'s arguments (an arity mismatch) the result is
    /// `None`: the unchanged map would still be open and could never build
    /// a plan for a closed pair, so the caller falls through to the
    /// hierarchy search instead.
    pub fn find_closed_generic(&self, pair: TypePair) -> Option<Arc<TypeMap>> {
        let types = self.config.types();
        let open = pair.open_generic(types)?;

        let mut candidates: SmallVec<[TypePair; 3]> = SmallVec::new();
        for candidate in [
            TypePair::new(open.source, pair.destination),
            TypePair::new(pair.source, open.destination),
            open,
        ] {
            if candidate != pair && !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }

        let configured = self.config.configured_maps();
        let template = candidates
            .iter()
            .find_map(|candidate| configured.find(*candidate));
        if let Some(template) = template
            && template.destination_override().is_none()
        {
            trace!(
                pair = %pair.display(types),
                template = %template.pair().display(types),
                "closing user generic map"
            );
            return Some(Arc::new(template.close(types, pair)));
        }

        let cached = self.config.resolved_maps().peek(open)?;
        if !cached.pair().contains_generic_parameters(types) {
            return Some(cached);
        }
        let closed = cached.pair().close_generic_types(types, pair)?;
        trace!(
            pair = %pair.display(types),
            cached = %cached.pair().display(types),
            closed = %closed.display(types),
            "closing cached generic map"
        );
        Some(Arc::new(cached.close(types, closed)))
    }
}

#[cfg(test)]
#[path = "../tests/generic_tests.rs"]
mod tests;
