//! tmap: a type-pair mapping engine.
//!
//! Values of one declared type are mapped onto another by plans that are
//! resolved, sealed and compiled once per configuration, then shared across
//! threads. The engine lives in [`tmap_core`]; this crate re-exports it and
//! adds subscriber setup for its tracing events.
//!
//! ```ignore
//! let types = Arc::new(TypeRegistry::new());
//! let person = types.define(TypeDef::class("Person").member("Name", TypeId::STRING));
//! let person_dto = types.define(TypeDef::class("PersonDto").member("Name", TypeId::STRING));
//!
//! let mut profile = ProfileBuilder::new("people");
//! profile.create_map(person, person_dto);
//! let mut builder = ConfigurationBuilder::new(types);
//! builder.add_profile(profile);
//! let mapper = Mapper::new(builder.build()?);
//! let dto = mapper.map(&source, person, person_dto)?;
//! ```

pub mod tracing_config;

pub use tmap_common::limits;
pub use tmap_core::*;
