//! Running compiled plans.

use crate::config::MapperConfiguration;
use crate::error::MappingError;
use crate::pair::{MapRequest, TypePair};
use crate::types::TypeId;
use crate::value::Value;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// State threaded through one mapping call.
///
/// Runtime-dispatched member plans look their plan up through the context,
/// and converters can stash values in `items` for later members.
pub struct MappingContext<'a> {
    config: &'a MapperConfiguration,
    items: FxHashMap<String, Value>,
}

impl<'a> MappingContext<'a> {
    pub fn new(config: &'a MapperConfiguration) -> Self {
        Self {
            config,
            items: FxHashMap::default(),
        }
    }

    pub fn configuration(&self) -> &'a MapperConfiguration {
        self.config
    }

    pub fn items(&self) -> &FxHashMap<String, Value> {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut FxHashMap<String, Value> {
        &mut self.items
    }

    /// Map `source` with the plan for its runtime types.
    ///
    /// The runtime pair comes from the values themselves; a side without a
    /// runtime type (null, lists, no destination) uses the declared type.
    pub fn map_dynamic(
        &mut self,
        source: &Value,
        destination: Option<Value>,
        request: &MapRequest,
    ) -> Result<Value, MappingError> {
        let runtime = TypePair::new(
            source.runtime_type().unwrap_or(request.requested.source),
            destination
                .as_ref()
                .and_then(Value::runtime_type)
                .unwrap_or(request.requested.destination),
        );
        let request =
            MapRequest::with_runtime(request.requested, runtime).for_member(request.member.clone());
        let plan = self.config.execution_plan(&request);
        plan(source, destination, self)
    }
}

/// Maps values with a sealed configuration.
#[derive(Clone)]
pub struct Mapper {
    config: Arc<MapperConfiguration>,
}

impl Mapper {
    pub fn new(config: Arc<MapperConfiguration>) -> Self {
        Self { config }
    }

    pub fn configuration(&self) -> &Arc<MapperConfiguration> {
        &self.config
    }

    /// Map `source` into a new instance of `destination_type`.
    pub fn map(
        &self,
        source: &Value,
        source_type: TypeId,
        destination_type: TypeId,
    ) -> Result<Value, MappingError> {
        self.run(source, None, TypePair::new(source_type, destination_type))
    }

    /// Map `source` onto an existing destination instance.
    pub fn map_into(
        &self,
        source: &Value,
        destination: Value,
        source_type: TypeId,
        destination_type: TypeId,
    ) -> Result<Value, MappingError> {
        self.run(
            source,
            Some(destination),
            TypePair::new(source_type, destination_type),
        )
    }

    fn run(
        &self,
        source: &Value,
        destination: Option<Value>,
        requested: TypePair,
    ) -> Result<Value, MappingError> {
        let mut ctx = MappingContext::new(&self.config);
        ctx.map_dynamic(source, destination, &MapRequest::new(requested))
    }
}

#[cfg(test)]
#[path = "../tests/mapper_tests.rs"]
mod tests;
