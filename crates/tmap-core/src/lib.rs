//! Type-Pair Resolution and Execution-Plan Cache
//!
//! This crate decides which plan maps a value of one declared type onto
//! another, and builds each plan exactly once. It uses:
//!
//! - **Resolved-map cache**: per-pair memoized search over configured maps,
//!   generic closure and the type hierarchy
//! - **Sealer**: one-time registration of configured, overridden and
//!   included-derived maps, then plan building for each of them
//! - **Execution-plan cache**: per-request memoized plans assembled from a
//!   small expression tree into shared closures
//!
//! Key properties:
//! - The same pair always resolves to the same `TypeMap` instance
//! - Concurrent first use of a request compiles its plan once
//! - Self-referential type graphs inline up to a depth bound, then dispatch
//!   at runtime
//! - Pairs nothing can map fail on first use, not at configuration time
pub mod config;
pub mod configured;
pub mod error;
pub mod generic;
pub mod hierarchy;
pub mod mapper;
pub mod mappers;
pub mod pair;
pub mod plan;
pub mod profile;
pub mod recursion;
pub mod registry;
pub mod resolved;
pub mod sealer;
pub mod settings;
mod trace;
pub mod type_map;
pub mod types;
pub mod value;

pub use config::{ConfigurationBuilder, ConfigurationStats, MapperConfiguration, RuntimeFeature};
pub use error::{BoxError, ConfigError, MappingError};
pub use mapper::{Mapper, MappingContext};
pub use mappers::{ObjectMapper, TypeConverter};
pub use pair::{MapRequest, MemberRef, TypePair};
pub use plan::{CompiledPlan, PlanExpr};
pub use profile::{NullPolicy, Profile, ProfileBuilder, TypeMapBuilder};
pub use registry::TypeRegistry;
pub use settings::MapperSettings;
pub use type_map::{MemberRule, MemberSource, TypeMap};
pub use types::{MemberInfo, Name, PrimitiveKind, TypeDef, TypeId, TypeKind};
pub use value::{ObjectValue, Value};
