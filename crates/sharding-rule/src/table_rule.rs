//! Table rule: compiled topology and strategies of one logical table
//!
//! Built once from a [`TableRuleConfig`] and read-only afterwards. Every
//! query method is a pure function over already-validated state.

use std::sync::Arc;

use sharding_core::TableRuleConfig;
use tracing::debug;

use crate::data_node::DataNode;
use crate::error::ConfigError;
use crate::inline_expr;
use crate::key_gen::KeyGeneratorBinding;
use crate::registry::AlgorithmRegistry;
use crate::strategy::{BuildStrategy, ShardingStrategy};

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Compiled rule for one logical table
#[derive(Debug, Clone)]
pub struct TableRule {
    logic_table: String,
    actual_data_nodes: Vec<DataNode>,
    database_strategy: Option<Arc<dyn ShardingStrategy>>,
    table_strategy: Option<Arc<dyn ShardingStrategy>>,
    key_generator: Option<KeyGeneratorBinding>,
    logic_index: Option<String>,
}

impl TableRule {
    /// Compile a table rule against the registered data source names
    ///
    /// A blank node expression makes a broadcast table: one node per
    /// registered data source, named after the logical table.
    pub fn new(
        config: &TableRuleConfig,
        data_source_names: &[String],
        registry: &AlgorithmRegistry,
    ) -> Result<Self, ConfigError> {
        let raw_logic_table = config.logic_table.trim();
        if raw_logic_table.is_empty() {
            return Err(ConfigError::MissingField("logic_table"));
        }
        let logic_table = raw_logic_table.to_lowercase();

        let expanded = inline_expr::evaluate(config.actual_data_nodes.as_deref().unwrap_or_default())?;
        let actual_data_nodes = if expanded.is_empty() {
            debug!(
                logic_table = %logic_table,
                data_sources = data_source_names.len(),
                "No actual data nodes configured, treating as broadcast table"
            );
            Self::broadcast_nodes(raw_logic_table, data_source_names)
        } else {
            Self::parse_nodes(&expanded, data_source_names)?
        };
        if actual_data_nodes.is_empty() {
            return Err(ConfigError::EmptyDataNodes(logic_table));
        }

        let database_strategy = config
            .database_strategy
            .as_ref()
            .map(|c| c.build(registry))
            .transpose()?;
        let table_strategy = config
            .table_strategy
            .as_ref()
            .map(|c| c.build(registry))
            .transpose()?;

        let key_generator = match (
            non_blank(config.key_generator_column.as_deref()),
            non_blank(config.key_generator.as_deref()),
        ) {
            (Some(column), Some(generator)) => {
                Some(KeyGeneratorBinding::new(column, registry.key_generator(generator)?))
            }
            _ => None,
        };

        let logic_index = non_blank(config.logic_index.as_deref()).map(str::to_lowercase);

        debug!(
            logic_table = %logic_table,
            nodes = actual_data_nodes.len(),
            database_strategy = database_strategy.as_ref().map(|s| s.name()).unwrap_or("-"),
            table_strategy = table_strategy.as_ref().map(|s| s.name()).unwrap_or("-"),
            "Compiled table rule"
        );

        Ok(Self {
            logic_table,
            actual_data_nodes,
            database_strategy,
            table_strategy,
            key_generator,
            logic_index,
        })
    }

    fn broadcast_nodes(logic_table: &str, data_source_names: &[String]) -> Vec<DataNode> {
        data_source_names
            .iter()
            .map(|ds| DataNode::new(ds.as_str(), logic_table))
            .collect()
    }

    fn parse_nodes(raw_nodes: &[String], data_source_names: &[String]) -> Result<Vec<DataNode>, ConfigError> {
        raw_nodes
            .iter()
            .map(|raw| {
                let node = DataNode::parse(raw)?;
                if !data_source_names.iter().any(|ds| ds == node.data_source_name()) {
                    return Err(ConfigError::InvalidDataNode(raw.clone()));
                }
                Ok(node)
            })
            .collect()
    }

    /// Lower-cased logical table name
    pub fn logic_table(&self) -> &str {
        &self.logic_table
    }

    /// Physical topology in configuration order
    pub fn actual_data_nodes(&self) -> &[DataNode] {
        &self.actual_data_nodes
    }

    pub fn database_strategy(&self) -> Option<&Arc<dyn ShardingStrategy>> {
        self.database_strategy.as_ref()
    }

    pub fn table_strategy(&self) -> Option<&Arc<dyn ShardingStrategy>> {
        self.table_strategy.as_ref()
    }

    pub fn key_generator(&self) -> Option<&KeyGeneratorBinding> {
        self.key_generator.as_ref()
    }

    pub fn generate_key_column(&self) -> Option<&str> {
        self.key_generator.as_ref().map(KeyGeneratorBinding::column)
    }

    pub fn logic_index(&self) -> Option<&str> {
        self.logic_index.as_deref()
    }

    /// Distinct data source names, first-seen order
    pub fn actual_data_source_names(&self) -> Vec<&str> {
        let mut result: Vec<&str> = Vec::new();
        for node in &self.actual_data_nodes {
            if !result.contains(&node.data_source_name()) {
                result.push(node.data_source_name());
            }
        }
        result
    }

    /// Distinct table names on exactly `data_source_name`, first-seen order
    pub fn actual_table_names(&self, data_source_name: &str) -> Vec<&str> {
        let mut result: Vec<&str> = Vec::new();
        for node in self.actual_data_nodes.iter().filter(|n| n.data_source_name() == data_source_name) {
            if !result.contains(&node.table_name()) {
                result.push(node.table_name());
            }
        }
        result
    }

    /// Position of the first node matching both names case-insensitively
    pub fn find_actual_table_index(&self, data_source_name: &str, table_name: &str) -> Option<usize> {
        self.actual_data_nodes
            .iter()
            .position(|node| node.matches(data_source_name, table_name))
    }

    /// Whether any node's table name matches, ignoring case and data source
    pub fn is_existed(&self, table_name: &str) -> bool {
        self.actual_data_nodes
            .iter()
            .any(|node| node.table_name().eq_ignore_ascii_case(table_name))
    }
}
