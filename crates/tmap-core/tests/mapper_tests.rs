use super::*;
use crate::config::ConfigurationBuilder;
use crate::error::MappingError;
use crate::profile::ProfileBuilder;
use crate::registry::TypeRegistry;
use crate::types::TypeDef;
use crate::value::ObjectValue;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

struct Shop {
    types: Arc<TypeRegistry>,
    customer: TypeId,
    customer_dto: TypeId,
    address: TypeId,
    address_dto: TypeId,
}

fn shop() -> Shop {
    let types = Arc::new(TypeRegistry::new());
    let address = types.define(
        TypeDef::class("Address")
            .member("Street", TypeId::STRING)
            .member("Zip", TypeId::STRING),
    );
    let address_dto = types.define(
        TypeDef::class("AddressDto")
            .member("Street", TypeId::STRING)
            .member("Zip", TypeId::INT),
    );
    let customer = types.define(
        TypeDef::class("Customer")
            .member("Name", TypeId::STRING)
            .member("Address", address)
            .member("Age", TypeId::STRING),
    );
    let customer_dto = types.define(
        TypeDef::class("CustomerDto")
            .member("FullName", TypeId::STRING)
            .member("Address", address_dto)
            .member("Age", TypeId::INT)
            .member("Source", TypeId::STRING)
            .member("Secret", TypeId::STRING),
    );
    Shop {
        types,
        customer,
        customer_dto,
        address,
        address_dto,
    }
}

fn shop_mapper(shop: &Shop) -> Mapper {
    let mut profile = ProfileBuilder::new("shop");
    profile
        .create_map(shop.customer, shop.customer_dto)
        .map_from("FullName", "Name")
        .constant("Source", "import")
        .ignore("Secret");
    profile.create_map(shop.address, shop.address_dto);
    let mut builder = ConfigurationBuilder::new(shop.types.clone());
    builder.add_profile(profile);
    Mapper::new(builder.build().expect("configuration seals"))
}

fn customer(shop: &Shop, age: &str) -> Value {
    Value::Object(
        ObjectValue::new(shop.customer)
            .with("Name", "Ada")
            .with("Age", age)
            .with(
                "Address",
                ObjectValue::new(shop.address)
                    .with("Street", "Main St")
                    .with("Zip", "12345"),
            ),
    )
}

#[test]
fn test_map_applies_member_rules_and_nested_maps() {
    init_tracing();
    let shop = shop();
    let mapper = shop_mapper(&shop);

    let mapped = mapper
        .map(&customer(&shop, "36"), shop.customer, shop.customer_dto)
        .expect("customer maps");

    let object = mapped.as_object().expect("object");
    assert_eq!(object.ty, shop.customer_dto);
    assert_eq!(mapped.field("FullName"), Value::from("Ada"));
    assert_eq!(mapped.field("Age"), Value::Int(36));
    assert_eq!(mapped.field("Source"), Value::from("import"));
    assert_eq!(object.get("Secret"), None);

    let address = mapped.field("Address");
    assert_eq!(address.as_object().map(|object| object.ty), Some(shop.address_dto));
    assert_eq!(address.field("Street"), Value::from("Main St"));
    assert_eq!(address.field("Zip"), Value::Int(12345));
}

#[test]
fn test_map_into_reuses_destination() {
    let shop = shop();
    let mapper = shop_mapper(&shop);
    let existing = Value::Object(
        ObjectValue::new(shop.customer_dto)
            .with("Secret", "keep me")
            .with("FullName", "old"),
    );

    let mapped = mapper
        .map_into(&customer(&shop, "1"), existing, shop.customer, shop.customer_dto)
        .expect("customer maps");
    assert_eq!(mapped.field("Secret"), Value::from("keep me"));
    assert_eq!(mapped.field("FullName"), Value::from("Ada"));
}

#[test]
fn test_failures_carry_pair_and_member() {
    let shop = shop();
    let mapper = shop_mapper(&shop);

    let error = mapper
        .map(&customer(&shop, "old"), shop.customer, shop.customer_dto)
        .expect_err("age does not parse");
    match &error {
        MappingError::Execution {
            source_type,
            destination_type,
            member,
            ..
        } => {
            assert_eq!(source_type, "String");
            assert_eq!(destination_type, "Int");
            assert_eq!(member.as_deref(), Some("CustomerDto.Age"));
        }
        other => panic!("expected execution error, got {other:?}"),
    }
    assert_eq!(
        error.to_string(),
        "error mapping types String -> Int (member CustomerDto.Age)"
    );
    assert_eq!(error.root_cause().to_string(), "cannot convert old to Int");
}

#[test]
fn test_runtime_type_selects_plan() {
    let shop = shop();
    let mapper = shop_mapper(&shop);

    // Declared as Object, the runtime type picks the Customer map.
    let mapped = mapper
        .map(&customer(&shop, "5"), TypeId::OBJECT, shop.customer_dto)
        .expect("runtime pair resolves");
    assert_eq!(mapped.field("FullName"), Value::from("Ada"));

    let requests = mapper.configuration().stats().plan_entries;
    assert_eq!(requests, 1);
}

#[test]
fn test_null_source_maps_to_null() {
    let shop = shop();
    let mapper = shop_mapper(&shop);

    let mapped = mapper
        .map(&Value::Null, shop.customer, shop.customer_dto)
        .expect("null maps");
    assert!(mapped.is_null());
}

#[test]
fn test_context_exposes_configuration() {
    let shop = shop();
    let mapper = shop_mapper(&shop);
    let config = mapper.configuration().clone();
    let mut ctx = MappingContext::new(&config);

    assert!(std::ptr::eq(ctx.configuration(), &*config));
    ctx.items_mut().insert("key".to_string(), Value::Int(1));
    assert_eq!(ctx.items().get("key"), Some(&Value::Int(1)));
}

#[test]
fn test_adapted_map_must_produce_requested_destination() {
    let types = Arc::new(TypeRegistry::new());
    let animal = types.define(TypeDef::class("Animal").member("Name", TypeId::STRING));
    let dog = types.define(TypeDef::class("Dog").extends(animal));
    let animal_dto = types.define(TypeDef::class("AnimalDto").member("Name", TypeId::STRING));
    let dog_dto = types.define(TypeDef::class("DogDto").extends(animal_dto));
    let mut profile = ProfileBuilder::new("zoo");
    profile.create_map(animal, animal_dto);
    let mut builder = ConfigurationBuilder::new(types.clone());
    builder.add_profile(profile);
    let mapper = Mapper::new(builder.build().expect("configuration seals"));
    let rex = Value::Object(ObjectValue::new(dog).with("Name", "Rex"));

    // (Dog, AnimalDto) falls back to the Animal map and AnimalDto fits.
    let mapped = mapper.map(&rex, dog, animal_dto).expect("base destination");
    assert_eq!(mapped.as_object().map(|object| object.ty), Some(animal_dto));

    // An AnimalDto cannot stand in for the DogDto that was asked for.
    let error = mapper
        .map(&rex, dog, dog_dto)
        .expect_err("AnimalDto is not a DogDto");
    assert_eq!(
        error.root_cause().to_string(),
        "mapped value of type AnimalDto is not assignable to DogDto"
    );
}
