//! Errors raised while building a configuration or running a plan.

use crate::types::PrimitiveKind;
use thiserror::Error;

/// Boxed error returned by user converters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures raised when a compiled plan runs.
#[derive(Debug, Error)]
pub enum MappingError {
    /// No configured map, generic closure or strategy covers the pair.
    ///
    /// Deferred: the plan for such a pair compiles and fails on first use.
    #[error(
        "missing type map configuration or unsupported mapping: {source_type} -> {destination_type}{}",
        member_suffix(.member)
    )]
    UnresolvablePair {
        source_type: String,
        destination_type: String,
        member: Option<String>,
    },

    /// A fault raised inside a plan, attributed to the pair and member
    /// being mapped.
    #[error(
        "error mapping types {source_type} -> {destination_type}{}",
        member_suffix(.member)
    )]
    Execution {
        source_type: String,
        destination_type: String,
        member: Option<String>,
        #[source]
        cause: BoxError,
    },

    #[error("cannot convert {value} to {target}")]
    Conversion { value: String, target: PrimitiveKind },

    #[error("expected {expected} but found {found}")]
    Unexpected {
        expected: &'static str,
        found: &'static str,
    },

    /// A map serving a related pair produced a value the requested
    /// destination cannot hold.
    #[error("mapped value of type {found} is not assignable to {expected}")]
    NotAssignable { found: String, expected: String },

    /// A user converter failed.
    #[error("{0}")]
    Custom(BoxError),
}

fn member_suffix(member: &Option<String>) -> String {
    match member {
        Some(member) => format!(" (member {member})"),
        None => String::new(),
    }
}

impl MappingError {
    /// Walk `Execution` wrappers down to the innermost fault.
    pub fn root_cause(&self) -> &(dyn std::error::Error + 'static) {
        let mut current: &(dyn std::error::Error + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }
}

/// Failures that abort configuration construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An included-derived pair has no map to serve it.
    #[error("missing map for included pair {pair} (included by {owner})")]
    MissingIncludedMap { owner: String, pair: String },

    /// Resolving an included pair picked a map for a different pair, e.g. a
    /// different generic instantiation.
    #[error("included pair {requested} resolved to map {resolved}")]
    IncludedMapMismatch { requested: String, resolved: String },

    /// The included pair does not derive from the including map's pair.
    #[error("{derived} is not derived from {base}")]
    InvalidIncludedDerived { base: String, derived: String },

    #[error("feature {feature} failed to seal: {message}")]
    Feature { feature: String, message: String },

    #[error("invalid mapper settings: {0}")]
    Settings(#[from] serde_json::Error),
}
