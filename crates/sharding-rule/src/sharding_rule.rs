//! Sharding rule: the compiled rule set of one configuration snapshot
//!
//! # Routing Decision Tree
//!
//! ```text
//! logic table + values
//!        │
//!        ▼
//! find TableRule ──None──► TableRuleNotFound
//!        │
//!        ▼
//! database strategy (rule's, else default)
//!   over actual data source names
//!        │
//!        ▼
//! table strategy (rule's, else default)
//!   over actual table names of each chosen source
//!        │
//!        ▼
//! matching DataNodes, topology order
//!   (nothing selected at either step ──► NoRoute)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use sharding_core::ShardingRuleConfig;
use tracing::{info, warn};

use crate::binding_table_rule::BindingTableRule;
use crate::data_node::DataNode;
use crate::error::{ConfigError, RouteError, RouteLevel};
use crate::master_slave_rule::MasterSlaveRule;
use crate::registry::AlgorithmRegistry;
use crate::strategy::{BuildStrategy, NoneShardingStrategy, ShardingStrategy};
use crate::table_rule::TableRule;
use crate::types::ShardingValue;

/// Immutable rule set shared by all routing operations
#[derive(Debug, Clone)]
pub struct ShardingRule {
    data_source_names: Vec<String>,
    default_data_source_name: Option<String>,
    table_rules: Vec<TableRule>,
    binding_table_rules: Vec<BindingTableRule>,
    default_database_strategy: Arc<dyn ShardingStrategy>,
    default_table_strategy: Arc<dyn ShardingStrategy>,
    master_slave_rules: Vec<MasterSlaveRule>,
}

impl ShardingRule {
    /// Compile a whole configuration snapshot
    pub fn new(config: &ShardingRuleConfig, registry: &AlgorithmRegistry) -> Result<Self, ConfigError> {
        let data_source_names = config.data_source_names.clone();

        let default_data_source_name = match config.default_data_source_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                if !data_source_names.iter().any(|ds| ds == name) {
                    return Err(ConfigError::UnknownDataSource(name.to_string()));
                }
                Some(name.to_string())
            }
            _ => None,
        };

        let mut table_rules: Vec<TableRule> = Vec::with_capacity(config.tables.len());
        for table_config in &config.tables {
            let rule = TableRule::new(table_config, &data_source_names, registry)?;
            if table_rules.iter().any(|r| r.logic_table() == rule.logic_table()) {
                return Err(ConfigError::DuplicateTableRule(rule.logic_table().to_string()));
            }
            table_rules.push(rule);
        }

        let binding_table_rules = config
            .binding_table_groups
            .iter()
            .map(|group| Self::build_binding_rule(group, &table_rules))
            .collect::<Result<Vec<_>, _>>()?;

        let default_database_strategy = Self::build_default(config.default_database_strategy.as_ref(), registry)?;
        let default_table_strategy = Self::build_default(config.default_table_strategy.as_ref(), registry)?;

        let mut master_slave_rules: Vec<MasterSlaveRule> = Vec::with_capacity(config.master_slave_rules.len());
        for ms_config in &config.master_slave_rules {
            let rule = MasterSlaveRule::new(ms_config, registry)?;
            if master_slave_rules.iter().any(|r| r.name() == rule.name()) {
                return Err(ConfigError::DuplicateMasterSlaveRule(rule.name().to_string()));
            }
            master_slave_rules.push(rule);
        }

        info!(
            data_sources = data_source_names.len(),
            table_rules = table_rules.len(),
            binding_groups = binding_table_rules.len(),
            master_slave_rules = master_slave_rules.len(),
            "Sharding rule compiled"
        );

        Ok(Self {
            data_source_names,
            default_data_source_name,
            table_rules,
            binding_table_rules,
            default_database_strategy,
            default_table_strategy,
            master_slave_rules,
        })
    }

    fn build_binding_rule(group: &str, table_rules: &[TableRule]) -> Result<BindingTableRule, ConfigError> {
        let members = group
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|logic_table| {
                table_rules
                    .iter()
                    .find(|r| r.logic_table().eq_ignore_ascii_case(logic_table))
                    .cloned()
                    .ok_or_else(|| ConfigError::InvalidBindingTables {
                        group: group.to_string(),
                        reason: format!("no table rule for '{}'", logic_table),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        BindingTableRule::new(group, members)
    }

    fn build_default(
        config: Option<&sharding_core::ShardingStrategyConfig>,
        registry: &AlgorithmRegistry,
    ) -> Result<Arc<dyn ShardingStrategy>, ConfigError> {
        match config {
            Some(config) => config.build(registry),
            None => Ok(Arc::new(NoneShardingStrategy::new())),
        }
    }

    pub fn data_source_names(&self) -> &[String] {
        &self.data_source_names
    }

    pub fn default_data_source_name(&self) -> Option<&str> {
        self.default_data_source_name.as_deref()
    }

    pub fn table_rules(&self) -> &[TableRule] {
        &self.table_rules
    }

    pub fn binding_table_rules(&self) -> &[BindingTableRule] {
        &self.binding_table_rules
    }

    pub fn master_slave_rules(&self) -> &[MasterSlaveRule] {
        &self.master_slave_rules
    }

    /// Table rule of a logical table, case-insensitive
    pub fn find_table_rule(&self, logic_table: &str) -> Option<&TableRule> {
        self.table_rules
            .iter()
            .find(|r| r.logic_table().eq_ignore_ascii_case(logic_table))
    }

    /// Table rule owning a physical table name
    pub fn find_table_rule_by_actual_table(&self, actual_table: &str) -> Option<&TableRule> {
        self.table_rules.iter().find(|r| r.is_existed(actual_table))
    }

    /// Database strategy applying to `rule`
    pub fn database_strategy<'a>(&'a self, rule: &'a TableRule) -> &'a Arc<dyn ShardingStrategy> {
        rule.database_strategy().unwrap_or(&self.default_database_strategy)
    }

    /// Table strategy applying to `rule`
    pub fn table_strategy<'a>(&'a self, rule: &'a TableRule) -> &'a Arc<dyn ShardingStrategy> {
        rule.table_strategy().unwrap_or(&self.default_table_strategy)
    }

    pub fn find_binding_table_rule(&self, logic_table: &str) -> Option<&BindingTableRule> {
        self.binding_table_rules
            .iter()
            .find(|r| r.has_logic_table(logic_table))
    }

    /// Whether all logical tables belong to one binding group
    pub fn is_all_binding_tables(&self, logic_tables: &[&str]) -> bool {
        let Some(first) = logic_tables.first() else {
            return false;
        };
        self.find_binding_table_rule(first)
            .map(|binding| logic_tables.iter().all(|t| binding.has_logic_table(t)))
            .unwrap_or(false)
    }

    /// Whether any strategy in the rule set shards on `column`
    pub fn is_sharding_column(&self, column: &str) -> bool {
        let defaults = [&self.default_database_strategy, &self.default_table_strategy];
        let per_table = self
            .table_rules
            .iter()
            .flat_map(|r| r.database_strategy().into_iter().chain(r.table_strategy()));

        defaults
            .into_iter()
            .chain(per_table)
            .flat_map(|s| s.sharding_columns())
            .any(|c| c.eq_ignore_ascii_case(column))
    }

    pub fn generate_key_column(&self, logic_table: &str) -> Option<&str> {
        self.find_table_rule(logic_table)?.generate_key_column()
    }

    /// Next key for the table's generated column, if one is bound
    pub fn generate_key(&self, logic_table: &str) -> Option<i64> {
        self.find_table_rule(logic_table)?
            .key_generator()
            .map(|binding| binding.generate_key())
    }

    pub fn find_master_slave_rule(&self, name: &str) -> Option<&MasterSlaveRule> {
        self.master_slave_rules.iter().find(|r| r.name() == name)
    }

    /// Data source serving the next read of a master-slave group
    pub fn route_read(&self, group: &str) -> Option<&str> {
        self.find_master_slave_rule(group).map(MasterSlaveRule::route_read)
    }

    fn no_route(rule: &TableRule, level: RouteLevel) -> RouteError {
        warn!(logic_table = %rule.logic_table(), level = %level, "Sharding value matched no configured target");
        RouteError::NoRoute {
            logic_table: rule.logic_table().to_string(),
            level,
        }
    }

    /// Data nodes of `logic_table` selected by the database strategy and
    /// then the table strategy
    ///
    /// Fails with [`RouteError::NoRoute`] when either step selects nothing.
    pub fn route(
        &self,
        logic_table: &str,
        database_values: &[ShardingValue],
        table_values: &[ShardingValue],
    ) -> Result<Vec<DataNode>, RouteError> {
        let rule = self
            .find_table_rule(logic_table)
            .ok_or_else(|| RouteError::TableRuleNotFound(logic_table.to_string()))?;

        let available: Vec<String> = rule
            .actual_data_source_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let data_sources = self.database_strategy(rule).route(&available, database_values)?;
        if data_sources.is_empty() {
            return Err(Self::no_route(rule, RouteLevel::Database));
        }

        let table_strategy = self.table_strategy(rule);
        let mut routed: HashMap<&str, Vec<String>> = HashMap::with_capacity(data_sources.len());
        for ds in &data_sources {
            let tables: Vec<String> = rule
                .actual_table_names(ds)
                .into_iter()
                .map(str::to_string)
                .collect();
            let chosen = table_strategy.route(&tables, table_values)?;
            if chosen.is_empty() {
                return Err(Self::no_route(rule, RouteLevel::Table));
            }
            routed.insert(ds.as_str(), chosen);
        }

        Ok(rule
            .actual_data_nodes()
            .iter()
            .filter(|node| {
                routed
                    .get(node.data_source_name())
                    .map(|tables| tables.iter().any(|t| t == node.table_name()))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}
