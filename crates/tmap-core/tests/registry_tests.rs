use super::*;

#[test]
fn test_registry_builtins() {
    let types = TypeRegistry::new();

    assert_eq!(types.get(TypeId::OBJECT), Some(TypeData::Object));
    assert_eq!(types.primitive_kind(TypeId::INT), Some(PrimitiveKind::Int));
    assert_eq!(types.primitive_kind(TypeId::STRING), Some(PrimitiveKind::String));
    assert!(types.is_value_type(TypeId::BOOL));
    assert!(!types.is_value_type(TypeId::OBJECT));
    assert_eq!(types.display(TypeId::FLOAT), "Float");
}

#[test]
fn test_registry_instance_ids_are_unique() {
    let a = TypeRegistry::new();
    let b = TypeRegistry::new();
    assert_ne!(a.instance_id(), b.instance_id());
}

#[test]
fn test_structural_types_are_interned() {
    let types = TypeRegistry::new();

    let a = types.list(TypeId::INT);
    let b = types.list(TypeId::INT);
    let c = types.list(TypeId::STRING);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(types.param(0), types.param(0));
    assert_ne!(types.param(0), types.param(1));
    assert_eq!(types.list_element(a), Some(TypeId::INT));
}

#[test]
fn test_nominal_definitions_are_not_interned() {
    let types = TypeRegistry::new();

    let first = types.define(TypeDef::class("Same"));
    let second = types.define(TypeDef::class("Same"));
    assert_ne!(first, second);
    assert!(!first.is_builtin());
}

#[test]
fn test_apply_closes_generic_definition() {
    let types = TypeRegistry::new();
    let boxed = types.define(
        TypeDef::class("Box")
            .generic(["T"])
            .member("Value", types.param(0)),
    );

    let box_int = types.apply(boxed, &[TypeId::INT]).expect("arity matches");
    assert_eq!(types.apply(boxed, &[TypeId::INT]), Some(box_int));
    assert_eq!(types.display(box_int), "Box<Int>");
    assert_eq!(types.display(boxed), "Box<T>");
    assert_eq!(types.generic_definition(box_int), Some(boxed));
    assert_eq!(types.generic_definition(boxed), Some(boxed));
    assert_eq!(types.generic_args(box_int).as_slice(), &[TypeId::INT]);
    assert_eq!(types.member_type(box_int, "Value"), Some(TypeId::INT));
    assert!(types.contains_generic_parameters(boxed));
    assert!(!types.contains_generic_parameters(box_int));
}

#[test]
fn test_apply_rejects_arity_mismatch() {
    let types = TypeRegistry::new();
    let boxed = types.define(TypeDef::class("Box").generic(["T"]));
    let plain = types.define(TypeDef::class("Plain"));

    assert_eq!(types.apply(boxed, &[]), None);
    assert_eq!(types.apply(boxed, &[TypeId::INT, TypeId::INT]), None);
    assert_eq!(types.apply(plain, &[TypeId::INT]), None);
}

#[test]
fn test_base_type_defaults_to_object() {
    let types = TypeRegistry::new();
    let animal = types.define(TypeDef::class("Animal"));
    let dog = types.define(TypeDef::class("Dog").extends(animal));
    let named = types.define(TypeDef::interface("INamed"));
    let point = types.define(TypeDef::structure("Point"));

    assert_eq!(types.base_type(dog), Some(animal));
    assert_eq!(types.base_type(animal), Some(TypeId::OBJECT));
    assert_eq!(types.base_type(point), Some(TypeId::OBJECT));
    assert_eq!(types.base_type(TypeId::INT), Some(TypeId::OBJECT));
    assert_eq!(types.base_type(named), None);
    assert_eq!(types.base_type(TypeId::OBJECT), None);
    assert_eq!(types.ancestors(dog), vec![dog, animal, TypeId::OBJECT]);
}

#[test]
fn test_generic_base_is_substituted() {
    let types = TypeRegistry::new();
    let base = types.define(TypeDef::class("Base").generic(["T"]).member("Item", types.param(0)));
    let base_t0 = types.apply(base, &[types.param(0)]).expect("arity matches");
    let derived = types.define(TypeDef::class("Derived").generic(["T"]).extends(base_t0));

    let derived_int = types.apply(derived, &[TypeId::INT]).expect("arity matches");
    let base_int = types.apply(base, &[TypeId::INT]).expect("arity matches");
    assert_eq!(types.base_type(derived_int), Some(base_int));
    assert_eq!(types.member_type(derived_int, "Item"), Some(TypeId::INT));
}

#[test]
fn test_members_merge_inherited_first() {
    let types = TypeRegistry::new();
    let animal = types.define(
        TypeDef::class("Animal")
            .member("Name", TypeId::STRING)
            .member("Age", TypeId::INT),
    );
    let dog = types.define(
        TypeDef::class("Dog")
            .extends(animal)
            .member("Breed", TypeId::STRING)
            .member("Age", TypeId::FLOAT),
    );

    let members = types.members(dog);
    let names: Vec<&str> = members.iter().map(|member| &*member.name).collect();
    assert_eq!(names, vec!["Name", "Age", "Breed"]);
    assert_eq!(types.member_type(dog, "Age"), Some(TypeId::FLOAT));
    assert_eq!(types.member_type(dog, "Missing"), None);
}

#[test]
fn test_define_with_allows_self_reference() {
    let types = TypeRegistry::new();
    let node = types.define_with(|id| {
        TypeDef::class("Node")
            .member("Value", TypeId::INT)
            .member("Children", types.list(id))
    });

    let children = types.member_type(node, "Children").expect("member exists");
    assert_eq!(types.list_element(children), Some(node));
    assert_eq!(types.display(children), "List<Node>");
}

#[test]
fn test_is_assignable() {
    let types = TypeRegistry::new();
    let named = types.define(TypeDef::interface("INamed"));
    let animal = types.define(TypeDef::class("Animal").implements(named));
    let dog = types.define(TypeDef::class("Dog").extends(animal));
    let cat = types.define(TypeDef::class("Cat").extends(animal));

    assert!(types.is_assignable(dog, dog));
    assert!(types.is_assignable(dog, animal));
    assert!(types.is_assignable(dog, named));
    assert!(types.is_assignable(cat, TypeId::OBJECT));
    assert!(!types.is_assignable(animal, dog));
    assert!(!types.is_assignable(dog, cat));
}

#[test]
fn test_value_types() {
    let types = TypeRegistry::new();
    let point = types.define(TypeDef::structure("Point"));
    let pair = types.define(TypeDef::structure("Pair").generic(["T"]));
    let pair_int = types.apply(pair, &[TypeId::INT]).expect("arity matches");
    let class = types.define(TypeDef::class("Thing"));

    assert!(types.is_value_type(point));
    assert!(types.is_value_type(pair_int));
    assert!(!types.is_value_type(class));
    assert!(!types.is_value_type(types.list(TypeId::INT)));
}

#[test]
fn test_concurrent_interning_yields_one_id() {
    use rayon::prelude::*;

    let types = TypeRegistry::new();
    let boxed = types.define(TypeDef::class("Box").generic(["T"]));

    let ids: Vec<TypeId> = (0..64)
        .into_par_iter()
        .map(|_| types.apply(boxed, &[TypeId::STRING]).expect("arity matches"))
        .collect();
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
}
