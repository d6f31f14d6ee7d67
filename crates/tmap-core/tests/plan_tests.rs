use super::*;
use crate::config::{ConfigurationBuilder, MapperConfiguration};
use crate::error::MappingError;
use crate::mapper::Mapper;
use crate::pair::{MapRequest, TypePair};
use crate::profile::ProfileBuilder;
use crate::registry::TypeRegistry;
use crate::settings::MapperSettings;
use crate::types::{TypeDef, TypeId};
use crate::value::{ObjectValue, Value};
use std::sync::Arc;

struct Tree {
    node: TypeId,
    node_dto: TypeId,
}

fn tree_config(depth: u32) -> (Arc<MapperConfiguration>, Tree) {
    let types = Arc::new(TypeRegistry::new());
    let node = types.define_with(|id| {
        TypeDef::class("Node")
            .member("Value", TypeId::INT)
            .member("Children", types.list(id))
    });
    let node_dto = types.define_with(|id| {
        TypeDef::class("NodeDto")
            .member("Value", TypeId::INT)
            .member("Children", types.list(id))
    });

    let mut profile = ProfileBuilder::new("tree");
    profile.create_map(node, node_dto);
    let mut builder = ConfigurationBuilder::new(types);
    builder
        .settings(MapperSettings {
            max_execution_plan_depth: depth,
            ..MapperSettings::default()
        })
        .add_profile(profile);
    let config = builder.build().expect("configuration seals");
    (config, Tree { node, node_dto })
}

/// A chain of `levels` nodes, each holding one child.
fn chain(node: TypeId, levels: i64) -> Value {
    let mut current = Value::Object(
        ObjectValue::new(node)
            .with("Value", levels)
            .with("Children", Vec::<Value>::new()),
    );
    for value in (1..levels).rev() {
        current = Value::Object(
            ObjectValue::new(node)
                .with("Value", value)
                .with("Children", vec![current]),
        );
    }
    current
}

fn deepest_value(mut value: &Value) -> Option<i64> {
    loop {
        let object = value.as_object()?;
        match object.get("Children").and_then(Value::as_list) {
            Some([child]) => value = child,
            _ => {
                return match object.get("Value") {
                    Some(Value::Int(number)) => Some(*number),
                    _ => None,
                };
            }
        }
    }
}

#[test]
fn test_self_referential_map_inlines_up_to_depth_bound() {
    for depth in [0u32, 1, 3] {
        let (config, tree) = tree_config(depth);
        let map = config
            .resolve_type_map(tree.node, tree.node_dto)
            .expect("map is configured");
        let expression = map.expression().expect("map is sealed");

        // The map's own body plus `depth` inlined copies.
        assert_eq!(expression.inline_depth(), depth + 1, "depth {depth}");
        assert_eq!(expression.runtime_dispatch_count(), 1, "depth {depth}");
    }
}

#[test]
fn test_deep_tree_maps_past_inline_bound() {
    let (config, tree) = tree_config(1);
    let mapper = Mapper::new(config);

    let source = chain(tree.node, 6);
    let mapped = mapper
        .map(&source, tree.node, tree.node_dto)
        .expect("tree maps");

    assert_eq!(mapped.as_object().map(|object| object.ty), Some(tree.node_dto));
    assert_eq!(deepest_value(&mapped), Some(6));
}

#[test]
fn test_same_request_returns_same_plan() {
    let (config, tree) = tree_config(1);

    let first = config.build_execution_plan(tree.node, tree.node_dto);
    let compiled = config.execution_plans().compiled_count();
    let second = config.build_execution_plan(tree.node, tree.node_dto);

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(config.execution_plans().compiled_count(), compiled);
    assert!(
        config
            .execution_plans()
            .contains(&MapRequest::new(TypePair::new(tree.node, tree.node_dto)))
    );
}

#[test]
fn test_exact_pair_delegates_to_sealed_map() {
    let (config, tree) = tree_config(1);
    let request = MapRequest::new(TypePair::new(tree.node, tree.node_dto));

    let expression = build_expression(&config, &request);
    assert!(matches!(expression, PlanExpr::NullGuard { .. }));
    assert_eq!(expression.unwrapped().kind(), "delegate");
}

#[test]
fn test_unresolvable_pair_fails_on_first_use() {
    let (config, tree) = tree_config(1);
    let unrelated = config.types().define(TypeDef::class("Unrelated"));

    // Compiling succeeds; the failure is deferred to the first run.
    let plan = config.build_execution_plan(tree.node, unrelated);
    let expression =
        build_expression(&config, &MapRequest::new(TypePair::new(tree.node, unrelated)));
    assert_eq!(expression.unwrapped().kind(), "unresolvable");

    let mut ctx = crate::mapper::MappingContext::new(&config);
    let source = chain(tree.node, 1);
    let error = plan(&source, None, &mut ctx).expect_err("pair is unresolvable");
    match &error {
        MappingError::UnresolvablePair {
            source_type,
            destination_type,
            member,
        } => {
            assert_eq!(source_type, "Node");
            assert_eq!(destination_type, "Unrelated");
            assert_eq!(member, &None);
        }
        other => panic!("expected unresolvable pair, got {other:?}"),
    }
    assert!(error.to_string().contains("Node -> Unrelated"));
}

#[test]
fn test_null_source_short_circuits_whole_plan() {
    let (config, tree) = tree_config(1);
    let plan = config.build_execution_plan(tree.node, tree.node_dto);
    let mut ctx = crate::mapper::MappingContext::new(&config);

    let mapped = plan(&Value::Null, None, &mut ctx).expect("null maps");
    assert_eq!(mapped, Value::Null);
}

#[test]
fn test_null_children_become_empty_list() {
    let (config, tree) = tree_config(1);
    let mapper = Mapper::new(config);
    let source = Value::Object(ObjectValue::new(tree.node).with("Value", 1i64));

    let mapped = mapper
        .map(&source, tree.node, tree.node_dto)
        .expect("node maps");
    assert_eq!(mapped.field("Children"), Value::List(Vec::new()));
}

#[test]
fn test_compile_sequence_rejects_non_list() {
    let plan = compile(&PlanExpr::Sequence {
        element: Box::new(PlanExpr::Identity),
    });
    let (config, _) = tree_config(1);
    let mut ctx = crate::mapper::MappingContext::new(&config);

    let error = plan(&Value::Int(3), None, &mut ctx).expect_err("not a list");
    assert!(matches!(
        error,
        MappingError::Unexpected {
            expected: "List",
            found: "Int"
        }
    ));
}

#[test]
fn test_concurrent_first_use_compiles_once() {
    use rayon::prelude::*;

    let (config, tree) = tree_config(1);
    let request = MapRequest::new(TypePair::new(tree.node, tree.node_dto));
    let before = config.execution_plans().compiled_count();

    let plans: Vec<CompiledPlan> = (0..32)
        .into_par_iter()
        .map(|_| config.execution_plan(&request))
        .collect();

    assert_eq!(config.execution_plans().compiled_count(), before + 1);
    assert!(plans.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}
