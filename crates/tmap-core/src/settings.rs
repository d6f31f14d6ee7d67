//! Configuration-wide settings.

use crate::error::ConfigError;
use crate::profile::NullPolicy;
use serde::{Deserialize, Serialize};
use tmap_common::limits;

/// Settings shared by every profile of a configuration.
///
/// ```json
/// { "maxExecutionPlanDepth": 2, "allowNullCollections": true }
/// ```
///
/// Missing keys take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapperSettings {
    /// How many nested type maps one compiled plan inlines before it
    /// dispatches at runtime instead.
    pub max_execution_plan_depth: u32,
    pub allow_null_destination_values: bool,
    pub allow_null_collections: bool,
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            max_execution_plan_depth: limits::DEFAULT_MAX_EXECUTION_PLAN_DEPTH,
            allow_null_destination_values: limits::DEFAULT_ALLOW_NULL_DESTINATION_VALUES,
            allow_null_collections: limits::DEFAULT_ALLOW_NULL_COLLECTIONS,
        }
    }
}

impl MapperSettings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The inline bound actually applied, capped at
    /// [`limits::MAX_EXECUTION_PLAN_DEPTH_CEILING`].
    pub fn effective_plan_depth(&self) -> u32 {
        self.max_execution_plan_depth
            .min(limits::MAX_EXECUTION_PLAN_DEPTH_CEILING)
    }

    /// Null policy for profiles that do not set their own.
    pub fn null_policy(&self) -> NullPolicy {
        NullPolicy {
            allow_null_destination_values: self.allow_null_destination_values,
            allow_null_collections: self.allow_null_collections,
        }
    }
}
