//! Declarative rule configuration
//!
//! These are plain value structs. Nothing here is validated: the
//! `sharding-rule` crate compiles them into immutable rules and reports
//! every problem as a typed configuration error. Required string fields
//! default to empty so that a missing field surfaces from rule
//! construction, not from the JSON parser.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Table rule configuration for one logical table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRuleConfig {
    /// Logical table name referenced by application SQL
    pub logic_table: String,

    /// Inline expression enumerating `datasource.table` nodes.
    /// Blank means the table exists unmodified on every data source.
    pub actual_data_nodes: Option<String>,

    /// Database level strategy (None = broadcast across data sources)
    pub database_strategy: Option<ShardingStrategyConfig>,

    /// Table level strategy (None = broadcast across tables)
    pub table_strategy: Option<ShardingStrategyConfig>,

    /// Column filled by the key generator
    pub key_generator_column: Option<String>,

    /// Registered key generator name
    pub key_generator: Option<String>,

    /// Logical index name
    pub logic_index: Option<String>,
}

impl TableRuleConfig {
    /// Create a config with a logical table and a node expression
    pub fn new(logic_table: impl Into<String>, actual_data_nodes: impl Into<String>) -> Self {
        Self {
            logic_table: logic_table.into(),
            actual_data_nodes: Some(actual_data_nodes.into()),
            ..Default::default()
        }
    }

    /// Create a config without explicit nodes (broadcast table)
    pub fn broadcast(logic_table: impl Into<String>) -> Self {
        Self {
            logic_table: logic_table.into(),
            ..Default::default()
        }
    }

    pub fn with_database_strategy(mut self, strategy: ShardingStrategyConfig) -> Self {
        self.database_strategy = Some(strategy);
        self
    }

    pub fn with_table_strategy(mut self, strategy: ShardingStrategyConfig) -> Self {
        self.table_strategy = Some(strategy);
        self
    }

    pub fn with_key_generator(mut self, column: impl Into<String>, generator: impl Into<String>) -> Self {
        self.key_generator_column = Some(column.into());
        self.key_generator = Some(generator.into());
        self
    }

    pub fn with_logic_index(mut self, logic_index: impl Into<String>) -> Self {
        self.logic_index = Some(logic_index.into());
        self
    }
}

/// Sharding strategy configuration
///
/// Algorithms are referenced by the name they were registered under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShardingStrategyConfig {
    /// Single sharding column
    Standard {
        sharding_column: String,
        precise_algorithm: String,
        #[serde(default)]
        range_algorithm: Option<String>,
    },

    /// Multiple sharding columns, comma separated
    Complex {
        sharding_columns: String,
        algorithm: String,
    },

    /// Routing driven by caller supplied hint values
    Hint {
        algorithm: String,
    },

    /// Target computed from an inline expression, e.g. `t_order_${order_id % 2}`
    Inline {
        sharding_column: String,
        algorithm_expression: String,
    },

    /// No narrowing
    None,
}

impl ShardingStrategyConfig {
    pub fn standard(column: impl Into<String>, precise_algorithm: impl Into<String>) -> Self {
        Self::Standard {
            sharding_column: column.into(),
            precise_algorithm: precise_algorithm.into(),
            range_algorithm: None,
        }
    }

    pub fn inline(column: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::Inline {
            sharding_column: column.into(),
            algorithm_expression: expression.into(),
        }
    }
}

/// Master-slave (read/write split) group configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterSlaveRuleConfig {
    /// Group name, used as a logical data source name
    pub name: String,

    /// Writable master
    pub master_data_source_name: String,

    /// Read-only replicas
    pub slave_data_source_names: Vec<String>,

    /// Registered load-balance algorithm name (None = registry default)
    pub load_balance_algorithm: Option<String>,
}

impl MasterSlaveRuleConfig {
    pub fn new(
        name: impl Into<String>,
        master: impl Into<String>,
        slaves: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            master_data_source_name: master.into(),
            slave_data_source_names: slaves.into_iter().map(Into::into).collect(),
            load_balance_algorithm: None,
        }
    }

    pub fn with_load_balance_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.load_balance_algorithm = Some(algorithm.into());
        self
    }
}

/// Whole rule set configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShardingRuleConfig {
    /// Registered data source names, in registration order
    pub data_source_names: Vec<String>,

    /// Data source used for tables without a rule
    pub default_data_source_name: Option<String>,

    pub tables: Vec<TableRuleConfig>,

    /// Each entry is a comma separated group of logical tables
    pub binding_table_groups: Vec<String>,

    pub default_database_strategy: Option<ShardingStrategyConfig>,

    pub default_table_strategy: Option<ShardingStrategyConfig>,

    pub master_slave_rules: Vec<MasterSlaveRuleConfig>,
}

/// Errors loading a configuration document
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rule configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ShardingRuleConfig {
    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        debug!(
            path = %path.display(),
            tables = config.tables.len(),
            master_slave_rules = config.master_slave_rules.len(),
            "Loaded rule configuration"
        );
        Ok(config)
    }
}

/// Inspector process configuration
#[derive(Debug, Clone, PartialEq)]
pub struct InspectConfig {
    /// Path of the JSON rule configuration
    pub rule_config_path: PathBuf,

    /// Log filter directive
    pub log_level: String,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            rule_config_path: PathBuf::from("conf/sharding.json"),
            log_level: "info".to_string(),
        }
    }
}

impl InspectConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = InspectConfig::default();

        if let Ok(path) = std::env::var("SHARDING_CONFIG") {
            if !path.trim().is_empty() {
                config.rule_config_path = PathBuf::from(path.trim());
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            if !level.trim().is_empty() {
                config.log_level = level.trim().to_string();
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_inspect_config() {
        let config = InspectConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.rule_config_path, PathBuf::from("conf/sharding.json"));
    }

    #[test]
    fn test_parse_rule_config() {
        let json = r#"{
            "data_source_names": ["ds_0", "ds_1"],
            "tables": [{
                "logic_table": "t_order",
                "actual_data_nodes": "ds_${0..1}.t_order_${0..1}",
                "database_strategy": {
                    "type": "inline",
                    "sharding_column": "user_id",
                    "algorithm_expression": "ds_${user_id % 2}"
                },
                "table_strategy": { "type": "none" },
                "key_generator_column": "order_id",
                "key_generator": "increment"
            }],
            "binding_table_groups": ["t_order, t_order_item"],
            "master_slave_rules": [{
                "name": "ms_ds",
                "master_data_source_name": "master",
                "slave_data_source_names": ["slave_0", "slave_1"]
            }]
        }"#;

        let config = ShardingRuleConfig::from_json_str(json).unwrap();
        assert_eq!(config.data_source_names, vec!["ds_0", "ds_1"]);

        let table = &config.tables[0];
        assert_eq!(table.logic_table, "t_order");
        assert_eq!(
            table.database_strategy,
            Some(ShardingStrategyConfig::inline("user_id", "ds_${user_id % 2}"))
        );
        assert_eq!(table.table_strategy, Some(ShardingStrategyConfig::None));
        assert!(table.logic_index.is_none());

        let ms = &config.master_slave_rules[0];
        assert_eq!(ms.slave_data_source_names.len(), 2);
        assert!(ms.load_balance_algorithm.is_none());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let config: MasterSlaveRuleConfig = serde_json::from_str("{}").unwrap();
        assert!(config.name.is_empty());
        assert!(config.slave_data_source_names.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let result = ShardingRuleConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigLoadError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = ShardingRuleConfig::from_json_file("/nonexistent/sharding.json");
        assert!(matches!(result, Err(ConfigLoadError::Io { .. })));
    }
}
