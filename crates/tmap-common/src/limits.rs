//! Centralized limits and thresholds for the mapping engine.
//!
//! Resolution and plan compilation are in-process, CPU-bound and assumed to
//! terminate. The only bounds the engine enforces on recursion live here so
//! the values can be tuned in one place.
//!
//! # Categories
//!
//! - **Plan expansion**: how far nested type-map plans are inlined
//! - **Walk bounds**: limits for recursive walks over configuration data
//! - **Policy defaults**: default values for profile null handling

// =============================================================================
// Plan Expansion
// =============================================================================

/// Default number of nested type-map plans inlined into a single compiled
/// plan before falling back to a runtime-resolved call.
///
/// A member whose (source, destination) pair resolves to another type map is
/// expanded in place while the expansion depth stays below this bound. At the
/// bound, the member plan looks up the nested plan when it runs instead.
///
/// ```text
/// Node -> NodeDto            depth 0 (the map being sealed)
///   children: Node -> NodeDto  depth 1 (inlined when bound >= 1)
///     children: ...            runtime dispatch once the bound is reached
/// ```
pub const DEFAULT_MAX_EXECUTION_PLAN_DEPTH: u32 = 1;

/// Hard ceiling accepted for `max_execution_plan_depth` settings.
///
/// Inlining is exponential in the fan-out of a type graph, so settings above
/// this value are clamped.
pub const MAX_EXECUTION_PLAN_DEPTH_CEILING: u32 = 32;

// =============================================================================
// Walk Bounds
// =============================================================================

/// Maximum nesting while collecting "included derived" maps during sealing.
///
/// The walk also tracks visited pairs, so cycles terminate regardless; this
/// bound only protects the stack against pathologically long include chains.
pub const MAX_DERIVED_MAP_DEPTH: u32 = 256;

/// Maximum number of include edges visited during one derived-map walk.
pub const MAX_DERIVED_MAP_ITERATIONS: u32 = 100_000;

// =============================================================================
// Policy Defaults
// =============================================================================

/// Default for `allow_null_destination_values`.
pub const DEFAULT_ALLOW_NULL_DESTINATION_VALUES: bool = true;

/// Default for `allow_null_collections`.
pub const DEFAULT_ALLOW_NULL_COLLECTIONS: bool = false;
