use super::*;
use crate::profile::NullPolicy;
use crate::types::TypeDef;
use crate::value::{ObjectValue, Value};
use tmap_common::limits;

#[test]
fn test_settings_defaults() {
    let settings = MapperSettings::default();
    assert_eq!(
        settings.max_execution_plan_depth,
        limits::DEFAULT_MAX_EXECUTION_PLAN_DEPTH
    );
    assert!(settings.allow_null_destination_values);
    assert!(!settings.allow_null_collections);
}

#[test]
fn test_settings_from_json_fills_missing_keys() {
    let settings = MapperSettings::from_json(r#"{ "maxExecutionPlanDepth": 4 }"#)
        .expect("valid settings");
    assert_eq!(settings.max_execution_plan_depth, 4);
    assert_eq!(
        settings.allow_null_destination_values,
        limits::DEFAULT_ALLOW_NULL_DESTINATION_VALUES
    );

    let settings = MapperSettings::from_json(r#"{ "allowNullCollections": true }"#)
        .expect("valid settings");
    assert!(settings.allow_null_collections);
    assert_eq!(
        settings.max_execution_plan_depth,
        limits::DEFAULT_MAX_EXECUTION_PLAN_DEPTH
    );
}

#[test]
fn test_settings_from_invalid_json() {
    let error = MapperSettings::from_json(r#"{ "maxExecutionPlanDepth": "deep" }"#)
        .expect_err("depth must be a number");
    assert!(matches!(error, ConfigError::Settings(_)));
}

#[test]
fn test_effective_plan_depth_is_capped() {
    let settings = MapperSettings {
        max_execution_plan_depth: u32::MAX,
        ..MapperSettings::default()
    };
    assert_eq!(
        settings.effective_plan_depth(),
        limits::MAX_EXECUTION_PLAN_DEPTH_CEILING
    );
}

struct People {
    types: Arc<TypeRegistry>,
    person: TypeId,
    person_dto: TypeId,
}

fn people() -> People {
    let types = Arc::new(TypeRegistry::new());
    let person = types.define(
        TypeDef::class("Person")
            .member("Name", TypeId::STRING)
            .member("Age", TypeId::INT)
            .member("Tags", types.list(TypeId::STRING)),
    );
    let person_dto = types.define(
        TypeDef::class("PersonDto")
            .member("Name", TypeId::STRING)
            .member("Age", TypeId::INT)
            .member("Tags", types.list(TypeId::STRING)),
    );
    People {
        types,
        person,
        person_dto,
    }
}

fn map_empty_person(config: Arc<MapperConfiguration>, people: &People) -> Value {
    let mapper = crate::mapper::Mapper::new(config);
    let source = Value::Object(ObjectValue::new(people.person));
    mapper
        .map(&source, people.person, people.person_dto)
        .expect("person maps")
}

#[test]
fn test_profile_inherits_settings_null_policy() {
    let people = people();
    let mut profile = ProfileBuilder::new("people");
    profile.create_map(people.person, people.person_dto);
    let mut builder = ConfigurationBuilder::new(people.types.clone());
    builder
        .settings(MapperSettings {
            allow_null_destination_values: false,
            ..MapperSettings::default()
        })
        .add_profile(profile);
    let config = builder.build().expect("configuration seals");

    let map = config
        .resolve_type_map(people.person, people.person_dto)
        .expect("configured");
    assert!(!map.profile().null_policy().allow_null_destination_values);
    assert!(!config.default_profile().null_policy().allow_null_destination_values);

    let mapped = map_empty_person(config, &people);
    assert_eq!(mapped.field("Name"), Value::from(""));
    assert_eq!(mapped.field("Age"), Value::Int(0));
    assert_eq!(mapped.field("Tags"), Value::List(Vec::new()));
}

#[test]
fn test_profile_null_policy_overrides_settings() {
    let people = people();
    let mut profile = ProfileBuilder::new("people");
    profile.null_policy(NullPolicy {
        allow_null_destination_values: true,
        allow_null_collections: false,
    });
    profile
        .create_map(people.person, people.person_dto)
        .null_substitute("Name", "anonymous");
    let mut builder = ConfigurationBuilder::new(people.types.clone());
    builder
        .settings(MapperSettings {
            allow_null_destination_values: false,
            ..MapperSettings::default()
        })
        .add_profile(profile);
    let config = builder.build().expect("configuration seals");

    let mapped = map_empty_person(config, &people);
    assert_eq!(mapped.field("Name"), Value::from("anonymous"));
    assert_eq!(mapped.field("Age"), Value::Null);
    assert_eq!(mapped.field("Tags"), Value::List(Vec::new()));
}

#[test]
fn test_find_type_map_does_not_seal() {
    let people = people();
    let boxed = people.types.define(
        TypeDef::class("Box")
            .generic(["T"])
            .member("Value", people.types.param(0)),
    );
    let mut profile = ProfileBuilder::new("boxes");
    profile.create_map(boxed, boxed);
    let mut builder = ConfigurationBuilder::new(people.types.clone());
    builder.add_profile(profile);
    let config = builder.build().expect("configuration seals");

    let box_int = people.types.apply(boxed, &[TypeId::INT]).expect("arity matches");
    let found = config
        .find_type_map(TypePair::new(box_int, box_int))
        .expect("template closes");
    assert!(!found.is_sealed());

    let resolved = config
        .resolve_type_map(box_int, box_int)
        .expect("cached");
    assert!(Arc::ptr_eq(&found, &resolved));
    assert!(resolved.is_sealed());
}

#[test]
fn test_build_execution_plan_prewarms_cache() {
    let people = people();
    let mut profile = ProfileBuilder::new("people");
    profile.create_map(people.person, people.person_dto);
    let mut builder = ConfigurationBuilder::new(people.types.clone());
    builder.add_profile(profile);
    let config = builder.build().expect("configuration seals");

    assert_eq!(config.stats().plan_entries, 0);
    let warmed = config.build_execution_plan(people.person, people.person_dto);
    let stats = config.stats();
    assert_eq!(stats.plan_entries, 1);
    assert_eq!(stats.plans_compiled, 1);
    assert_eq!(stats.configured_maps, 1);

    let again = config.execution_plan(&MapRequest::new(TypePair::new(
        people.person,
        people.person_dto,
    )));
    assert!(Arc::ptr_eq(&warmed, &again));
    assert_eq!(config.stats().plans_compiled, 1);
}

#[test]
fn test_execution_plan_expression_adapts_derived_request() {
    let people = people();
    let employee = people.types.define(TypeDef::class("Employee").extends(people.person));
    let mut profile = ProfileBuilder::new("people");
    profile.create_map(people.person, people.person_dto);
    let mut builder = ConfigurationBuilder::new(people.types.clone());
    builder.add_profile(profile);
    let config = builder.build().expect("configuration seals");

    let request = MapRequest::new(TypePair::new(employee, people.person_dto));
    let expression = config.execution_plan_expression(&request);
    assert_eq!(expression.unwrapped().kind(), "adapter");
    assert_eq!(config.stats().plan_entries, 0);
}
