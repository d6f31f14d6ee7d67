use super::*;
use crate::config::ConfigurationBuilder;
use crate::profile::{NullPolicy, Profile, ProfileBuilder};
use crate::registry::TypeRegistry;
use crate::types::{TypeDef, TypeId};
use indexmap::IndexSet;

struct Zoo {
    types: Arc<TypeRegistry>,
    animal: TypeId,
    dog: TypeId,
    animal_dto: TypeId,
    dog_dto: TypeId,
}

fn zoo() -> Zoo {
    let types = Arc::new(TypeRegistry::new());
    let animal = types.define(TypeDef::class("Animal").member("Name", TypeId::STRING));
    let dog = types.define(
        TypeDef::class("Dog")
            .extends(animal)
            .member("Breed", TypeId::STRING),
    );
    let animal_dto = types.define(TypeDef::class("AnimalDto").member("Name", TypeId::STRING));
    let dog_dto = types.define(
        TypeDef::class("DogDto")
            .extends(animal_dto)
            .member("Breed", TypeId::STRING),
    );
    Zoo {
        types,
        animal,
        dog,
        animal_dto,
        dog_dto,
    }
}

fn configure(zoo: &Zoo, pairs: &[(TypeId, TypeId)]) -> Arc<MapperConfiguration> {
    let mut profile = ProfileBuilder::new("zoo");
    for &(source, destination) in pairs {
        profile.create_map(source, destination);
    }
    let mut builder = ConfigurationBuilder::new(zoo.types.clone());
    builder.add_profile(profile);
    builder.build().expect("configuration seals")
}

#[test]
fn test_resolving_twice_returns_same_instance() {
    let zoo = zoo();
    let config = configure(&zoo, &[(zoo.animal, zoo.animal_dto)]);
    let cache = config.resolved_maps();

    let first = cache
        .resolve(&config, TypePair::new(zoo.dog, zoo.animal_dto))
        .expect("hierarchy fallback finds a map");
    let computed = cache.resolutions_computed();
    let second = cache
        .resolve(&config, TypePair::new(zoo.dog, zoo.animal_dto))
        .expect("cached");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.resolutions_computed(), computed);
}

#[test]
fn test_missing_pair_is_cached() {
    let zoo = zoo();
    let config = configure(&zoo, &[(zoo.animal, zoo.animal_dto)]);
    let cache = config.resolved_maps();
    let pair = TypePair::new(zoo.animal, TypeId::INT);

    let before = cache.resolutions_computed();
    assert!(cache.resolve(&config, pair).is_none());
    assert!(cache.resolve(&config, pair).is_none());
    assert_eq!(cache.resolutions_computed(), before + 1);
    assert!(cache.is_cached(pair));
    assert!(cache.peek(pair).is_none());
}

#[test]
fn test_hierarchy_fallback_finds_base_map() {
    let zoo = zoo();
    let config = configure(&zoo, &[(zoo.animal, zoo.animal_dto)]);

    let map = config
        .find_type_map(TypePair::new(zoo.dog, zoo.animal_dto))
        .expect("base map serves derived source");
    assert_eq!(map.pair(), TypePair::new(zoo.animal, zoo.animal_dto));
}

#[test]
fn test_hierarchy_fallback_is_destination_major() {
    let zoo = zoo();
    // (Dog, Object) is a closer source but a farther destination than
    // (Animal, AnimalDto).
    let config = configure(
        &zoo,
        &[(zoo.dog, TypeId::OBJECT), (zoo.animal, zoo.animal_dto)],
    );

    let map = config
        .find_type_map(TypePair::new(zoo.dog, zoo.dog_dto))
        .expect("fallback finds a map");
    assert_eq!(map.pair(), TypePair::new(zoo.animal, zoo.animal_dto));
}

#[test]
fn test_peek_never_searches() {
    let zoo = zoo();
    let config = configure(&zoo, &[(zoo.animal, zoo.animal_dto)]);
    let cache = config.resolved_maps();
    let pair = TypePair::new(zoo.dog, zoo.animal_dto);

    assert!(cache.peek(pair).is_none());
    assert!(!cache.is_cached(pair));
}

#[test]
fn test_insert_if_absent_keeps_existing_map() {
    let zoo = zoo();
    let config = configure(&zoo, &[]);
    let cache = config.resolved_maps();
    let pair = TypePair::new(zoo.dog, zoo.dog_dto);
    let profile = Arc::new(Profile::new("manual", NullPolicy::default()));
    let map = |pair| Arc::new(TypeMap::new(pair, profile.clone(), Vec::new(), None, IndexSet::new()));

    // A cached miss is replaced.
    assert!(cache.resolve(&config, pair).is_none());
    let first = map(pair);
    assert!(cache.insert_if_absent(pair, first.clone()));

    let second = map(pair);
    assert!(!cache.insert_if_absent(pair, second.clone()));
    assert!(cache.peek(pair).is_some_and(|found| Arc::ptr_eq(&found, &first)));

    cache.insert(pair, second.clone());
    assert!(cache.peek(pair).is_some_and(|found| Arc::ptr_eq(&found, &second)));
}

#[test]
fn test_concurrent_resolution_searches_once() {
    use rayon::prelude::*;

    let zoo = zoo();
    let config = configure(&zoo, &[(zoo.animal, zoo.animal_dto)]);
    let cache = config.resolved_maps();
    let pair = TypePair::new(zoo.dog, zoo.animal_dto);
    let before = cache.resolutions_computed();

    let maps: Vec<Arc<TypeMap>> = (0..32)
        .into_par_iter()
        .filter_map(|_| cache.resolve(&config, pair))
        .collect();

    assert_eq!(maps.len(), 32);
    assert!(maps.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_eq!(cache.resolutions_computed(), before + 1);
}
