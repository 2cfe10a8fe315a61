//! Integration tests for the inspector

use std::fs;

use sharding_core::InspectConfig;
use sharding_inspect::{InspectError, Inspector};
use sharding_rule::ConfigError;
use tempfile::tempdir;

const VALID: &str = r#"{
    "data_source_names": ["ds_0", "ds_1"],
    "tables": [
        {
            "logic_table": "t_order",
            "actual_data_nodes": "ds_${0..1}.t_order_${0..1}",
            "table_strategy": {
                "type": "inline",
                "sharding_column": "order_id",
                "algorithm_expression": "t_order_${order_id % 2}"
            }
        },
        { "logic_table": "t_config" }
    ],
    "default_database_strategy": {
        "type": "inline",
        "sharding_column": "user_id",
        "algorithm_expression": "ds_${user_id % 2}"
    },
    "master_slave_rules": [{
        "name": "ms_ds",
        "master_data_source_name": "master",
        "slave_data_source_names": ["slave_0", "slave_1"],
        "load_balance_algorithm": "random"
    }]
}"#;

fn inspector_for(json: &str) -> (tempfile::TempDir, Inspector) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sharding.json");
    fs::write(&path, json).unwrap();

    let inspector = Inspector::new(InspectConfig {
        rule_config_path: path,
        ..Default::default()
    });
    (dir, inspector)
}

#[test]
fn test_inspect_valid_config() {
    let (_dir, inspector) = inspector_for(VALID);
    let summary = inspector.inspect().unwrap();

    assert_eq!(summary.tables.len(), 2);
    assert_eq!(summary.tables[0].logic_table, "t_order");
    assert_eq!(summary.tables[0].nodes, 4);
    assert_eq!(summary.tables[1].logic_table, "t_config");
    assert_eq!(summary.tables[1].data_sources, vec!["ds_0", "ds_1"]);
    assert_eq!(summary.master_slave_groups[0].algorithm, "Random");
}

#[test]
fn test_inspect_invalid_data_node() {
    let json = VALID.replace("ds_${0..1}.t_order_${0..1}", "ds_${0..2}.t_order_0");
    let (_dir, inspector) = inspector_for(&json);

    let err = inspector.inspect().unwrap_err();
    assert!(matches!(
        err,
        InspectError::Rule(ConfigError::InvalidDataNode(ref node)) if node == "ds_2.t_order_0"
    ));
    assert!(err.to_string().contains("ds_2.t_order_0"));
}

#[test]
fn test_inspect_empty_slaves() {
    let json = VALID.replace(r#"["slave_0", "slave_1"]"#, "[]");
    let (_dir, inspector) = inspector_for(&json);

    let err = inspector.inspect().unwrap_err();
    assert!(matches!(err, InspectError::Rule(ConfigError::EmptySlaves(_))));
}

#[test]
fn test_inspect_malformed_json() {
    let (_dir, inspector) = inspector_for("{ \"tables\": [");
    assert!(matches!(inspector.inspect(), Err(InspectError::Load(_))));
}

#[test]
fn test_routing_through_loaded_rule() {
    let (dir, inspector) = inspector_for(VALID);
    let rule = inspector.load_rule(dir.path().join("sharding.json")).unwrap();

    let nodes = rule
        .route(
            "t_order",
            &[sharding_rule::ShardingValue::single("user_id", 2)],
            &[sharding_rule::ShardingValue::single("order_id", 5)],
        )
        .unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].to_string(), "ds_0.t_order_1");

    let read = rule.route_read("ms_ds").unwrap();
    assert!(read == "slave_0" || read == "slave_1");
}
