//! Integration tests for rule compilation and routing

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use proptest::prelude::*;
use sharding_core::{ShardingRuleConfig, TableRuleConfig};
use sharding_rule::{
    AlgorithmRegistry, ConfigError, DataNode, KeyGenerator, PreciseShardingAlgorithm, RuleHolder,
    ShardingKey, ShardingRule, ShardingValue, TableRule,
};

#[derive(Default)]
struct IncrementKeyGenerator {
    next: AtomicI64,
}

impl KeyGenerator for IncrementKeyGenerator {
    fn generate_key(&self) -> i64 {
        self.next.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Routes integer keys to the target whose suffix equals `key % targets`
struct ModuloAlgorithm;

impl PreciseShardingAlgorithm for ModuloAlgorithm {
    fn do_sharding(&self, available: &[String], _column: &str, value: &ShardingKey) -> Option<String> {
        let ShardingKey::Int(key) = value else {
            return None;
        };
        let suffix = format!("_{}", key.rem_euclid(available.len() as i64));
        available.iter().find(|t| t.ends_with(&suffix)).cloned()
    }
}

fn registry() -> AlgorithmRegistry {
    let registry = AlgorithmRegistry::default();
    registry.register_key_generator("increment", Arc::new(IncrementKeyGenerator::default()));
    registry.register_precise("modulo", Arc::new(ModuloAlgorithm));
    registry
}

const CONFIG: &str = r#"{
    "data_source_names": ["ds_0", "ds_1"],
    "default_data_source_name": "ds_0",
    "tables": [
        {
            "logic_table": "t_order",
            "actual_data_nodes": "ds_${0..1}.t_order_${0..1}",
            "database_strategy": {
                "type": "standard",
                "sharding_column": "user_id",
                "precise_algorithm": "modulo"
            },
            "table_strategy": {
                "type": "inline",
                "sharding_column": "order_id",
                "algorithm_expression": "t_order_${order_id % 2}"
            },
            "key_generator_column": "order_id",
            "key_generator": "increment"
        },
        {
            "logic_table": "t_order_item",
            "actual_data_nodes": "ds_$->{0..1}.t_order_item_$->{0..1}",
            "table_strategy": {
                "type": "inline",
                "sharding_column": "order_id",
                "algorithm_expression": "t_order_item_${order_id % 2}"
            }
        }
    ],
    "binding_table_groups": ["t_order, t_order_item"],
    "default_database_strategy": {
        "type": "inline",
        "sharding_column": "user_id",
        "algorithm_expression": "ds_${user_id % 2}"
    },
    "master_slave_rules": [{
        "name": "ms_ds",
        "master_data_source_name": "master",
        "slave_data_source_names": ["slave_0", "slave_1", "slave_2"]
    }]
}"#;

#[test]
fn test_compile_and_route_from_json() {
    let config = ShardingRuleConfig::from_json_str(CONFIG).unwrap();
    let rule = ShardingRule::new(&config, &registry()).unwrap();

    let nodes = rule
        .route(
            "t_order",
            &[ShardingValue::single("user_id", 11)],
            &[ShardingValue::list("order_id", [4, 7])],
        )
        .unwrap();
    assert_eq!(
        nodes,
        vec![DataNode::new("ds_1", "t_order_0"), DataNode::new("ds_1", "t_order_1")]
    );

    let items = rule
        .route(
            "T_ORDER_ITEM",
            &[ShardingValue::single("user_id", 4)],
            &[ShardingValue::single("order_id", 7)],
        )
        .unwrap();
    assert_eq!(items, vec![DataNode::new("ds_0", "t_order_item_1")]);

    let binding = rule.find_binding_table_rule("t_order_item").unwrap();
    assert_eq!(binding.binding_actual_table("ds_0", "t_order_item", "t_order_1"), Some("t_order_item_1"));
}

#[test]
fn test_key_generation_and_reads() {
    let config = ShardingRuleConfig::from_json_str(CONFIG).unwrap();
    let rule = ShardingRule::new(&config, &registry()).unwrap();

    assert_eq!(rule.generate_key_column("t_order"), Some("order_id"));
    assert_eq!(rule.generate_key("t_order"), Some(1));
    assert_eq!(rule.generate_key("t_order"), Some(2));
    assert_eq!(rule.generate_key("t_order_item"), None);

    let reads: Vec<&str> = (0..6).filter_map(|_| rule.route_read("ms_ds")).collect();
    assert_eq!(reads, vec!["slave_0", "slave_1", "slave_2", "slave_0", "slave_1", "slave_2"]);
}

#[test]
fn test_unknown_algorithm_from_json() {
    let config = ShardingRuleConfig::from_json_str(CONFIG).unwrap();
    let err = ShardingRule::new(&config, &AlgorithmRegistry::default()).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownAlgorithm { .. }));
}

#[test]
fn test_reload_through_holder() {
    let registry = registry();
    let config = ShardingRuleConfig::from_json_str(CONFIG).unwrap();
    let holder = RuleHolder::from_config(&config, &registry).unwrap();

    let mut narrowed = config.clone();
    narrowed.data_source_names = vec!["ds_0".to_string()];
    assert!(holder.reload(&narrowed, &registry).is_err());
    assert_eq!(holder.current().data_source_names().len(), 2);

    narrowed.tables.clear();
    narrowed.binding_table_groups.clear();
    holder.reload(&narrowed, &registry).unwrap();
    assert!(holder.current().table_rules().is_empty());
}

proptest! {
    #[test]
    fn prop_nodes_reference_registered_sources(
        registered in 1usize..5,
        referenced in 1usize..5,
        tables in 1usize..4,
    ) {
        let data_sources: Vec<String> = (0..registered).map(|i| format!("ds_{}", i)).collect();
        let config = TableRuleConfig::new(
            "t_order",
            format!("ds_${{0..<{}}}.t_order_${{0..<{}}}", referenced, tables),
        );

        match TableRule::new(&config, &data_sources, &AlgorithmRegistry::default()) {
            Ok(rule) => {
                prop_assert!(referenced <= registered);
                prop_assert_eq!(rule.actual_data_nodes().len(), referenced * tables);
                for node in rule.actual_data_nodes() {
                    prop_assert!(data_sources.iter().any(|ds| ds == node.data_source_name()));
                }
            }
            Err(ConfigError::InvalidDataNode(raw)) => {
                prop_assert!(referenced > registered);
                let expected_prefix = format!("ds_{}.", registered);
                prop_assert!(raw.starts_with(&expected_prefix));
            }
            Err(e) => prop_assert!(false, "unexpected error: {}", e),
        }
    }
}
