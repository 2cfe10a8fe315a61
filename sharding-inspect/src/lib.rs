//! Sharding Inspect - rule configuration checker
//!
//! Loads a JSON rule configuration, compiles it and reports the resulting
//! topology:
//! - data sources and node count of every table rule
//! - binding table groups
//! - master-slave groups and their load-balance algorithm

use std::path::Path;

use sharding_core::{ConfigLoadError, InspectConfig, ShardingRuleConfig};
use sharding_rule::{AlgorithmRegistry, ConfigError, ShardingRule};
use thiserror::Error;
use tracing::info;

/// Errors turning a configuration file into a rule
#[derive(Debug, Error)]
pub enum InspectError {
    #[error(transparent)]
    Load(#[from] ConfigLoadError),

    #[error("Invalid sharding rule: {0}")]
    Rule(#[from] ConfigError),
}

/// One table rule as reported by the inspector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub logic_table: String,
    pub data_sources: Vec<String>,
    pub nodes: usize,
}

/// One master-slave group as reported by the inspector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterSlaveSummary {
    pub name: String,
    pub master: String,
    pub slaves: Vec<String>,
    pub algorithm: &'static str,
}

/// Topology of a compiled rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSummary {
    pub tables: Vec<TableSummary>,
    pub binding_groups: Vec<Vec<String>>,
    pub master_slave_groups: Vec<MasterSlaveSummary>,
}

impl RuleSummary {
    pub fn of(rule: &ShardingRule) -> Self {
        let tables = rule
            .table_rules()
            .iter()
            .map(|t| TableSummary {
                logic_table: t.logic_table().to_string(),
                data_sources: t.actual_data_source_names().into_iter().map(str::to_string).collect(),
                nodes: t.actual_data_nodes().len(),
            })
            .collect();

        let binding_groups = rule
            .binding_table_rules()
            .iter()
            .map(|b| b.logic_tables().into_iter().map(str::to_string).collect())
            .collect();

        let master_slave_groups = rule
            .master_slave_rules()
            .iter()
            .map(|ms| MasterSlaveSummary {
                name: ms.name().to_string(),
                master: ms.master_data_source_name().to_string(),
                slaves: ms.slave_data_source_names().to_vec(),
                algorithm: ms.load_balance_algorithm().name(),
            })
            .collect();

        Self {
            tables,
            binding_groups,
            master_slave_groups,
        }
    }

    /// Emit the summary as structured log lines
    pub fn log(&self) {
        for table in &self.tables {
            info!(
                logic_table = %table.logic_table,
                data_sources = ?table.data_sources,
                nodes = table.nodes,
                "Table rule"
            );
        }
        for group in &self.binding_groups {
            info!(tables = ?group, "Binding table group");
        }
        for ms in &self.master_slave_groups {
            info!(
                name = %ms.name,
                master = %ms.master,
                slaves = ?ms.slaves,
                algorithm = ms.algorithm,
                "Master-slave group"
            );
        }
    }
}

/// Configuration checker
pub struct Inspector {
    config: InspectConfig,
    registry: AlgorithmRegistry,
}

impl Inspector {
    /// Create an inspector with the default algorithm registry
    pub fn new(config: InspectConfig) -> Self {
        Self::with_registry(config, AlgorithmRegistry::default())
    }

    pub fn with_registry(config: InspectConfig, registry: AlgorithmRegistry) -> Self {
        info!(
            path = %config.rule_config_path.display(),
            "Creating inspector"
        );
        Self { config, registry }
    }

    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Load and compile the configured rule file
    pub fn inspect(&self) -> Result<RuleSummary, InspectError> {
        let rule = self.load_rule(&self.config.rule_config_path)?;
        Ok(RuleSummary::of(&rule))
    }

    /// Load and compile a rule file
    pub fn load_rule(&self, path: impl AsRef<Path>) -> Result<ShardingRule, InspectError> {
        let config = ShardingRuleConfig::from_json_file(path)?;
        Ok(ShardingRule::new(&config, &self.registry)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharding_core::{MasterSlaveRuleConfig, TableRuleConfig};

    #[test]
    fn test_rule_summary() {
        let config = ShardingRuleConfig {
            data_source_names: vec!["ds_0".to_string(), "ds_1".to_string()],
            tables: vec![
                TableRuleConfig::new("t_order", "ds_${0..1}.t_order_${0..1}"),
                TableRuleConfig::new("t_order_item", "ds_${0..1}.t_order_item_${0..1}"),
            ],
            binding_table_groups: vec!["t_order,t_order_item".to_string()],
            master_slave_rules: vec![MasterSlaveRuleConfig::new("ms", "master", ["slave_0"])],
            ..Default::default()
        };
        let rule = ShardingRule::new(&config, &AlgorithmRegistry::default()).unwrap();
        let summary = RuleSummary::of(&rule);

        assert_eq!(summary.tables.len(), 2);
        assert_eq!(summary.tables[0].data_sources, vec!["ds_0", "ds_1"]);
        assert_eq!(summary.tables[0].nodes, 4);
        assert_eq!(summary.binding_groups, vec![vec!["t_order", "t_order_item"]]);
        assert_eq!(summary.master_slave_groups[0].algorithm, "RoundRobin");
    }

    #[test]
    fn test_missing_file() {
        let inspector = Inspector::new(InspectConfig {
            rule_config_path: "/nonexistent/sharding.json".into(),
            ..Default::default()
        });
        assert!(matches!(inspector.inspect(), Err(InspectError::Load(_))));
    }
}
