//! Master-slave rule: one writable master and its read replicas

use std::sync::Arc;

use sharding_core::MasterSlaveRuleConfig;
use tracing::debug;

use crate::error::ConfigError;
use crate::registry::AlgorithmRegistry;
use crate::strategy::LoadBalanceAlgorithm;

/// Compiled read/write split group
#[derive(Debug, Clone)]
pub struct MasterSlaveRule {
    name: String,
    master_data_source_name: String,
    slave_data_source_names: Vec<String>,
    load_balance_algorithm: Arc<dyn LoadBalanceAlgorithm>,
}

impl MasterSlaveRule {
    /// Compile a group; a group without slaves is rejected
    pub fn new(config: &MasterSlaveRuleConfig, registry: &AlgorithmRegistry) -> Result<Self, ConfigError> {
        let name = config.name.trim();
        if name.is_empty() {
            return Err(ConfigError::MissingField("name"));
        }
        let master = config.master_data_source_name.trim();
        if master.is_empty() {
            return Err(ConfigError::MissingField("master_data_source_name"));
        }
        if config.slave_data_source_names.is_empty() {
            return Err(ConfigError::EmptySlaves(name.to_string()));
        }

        let load_balance_algorithm = registry.load_balance(config.load_balance_algorithm.as_deref())?;

        debug!(
            name = %name,
            master = %master,
            slaves = config.slave_data_source_names.len(),
            algorithm = load_balance_algorithm.name(),
            "Compiled master-slave rule"
        );

        Ok(Self {
            name: name.to_string(),
            master_data_source_name: master.to_string(),
            slave_data_source_names: config.slave_data_source_names.clone(),
            load_balance_algorithm,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn master_data_source_name(&self) -> &str {
        &self.master_data_source_name
    }

    pub fn slave_data_source_names(&self) -> &[String] {
        &self.slave_data_source_names
    }

    pub fn load_balance_algorithm(&self) -> &Arc<dyn LoadBalanceAlgorithm> {
        &self.load_balance_algorithm
    }

    /// Data source serving the next read of this group
    pub fn route_read(&self) -> &str {
        self.load_balance_algorithm
            .select(&self.name, &self.master_data_source_name, &self.slave_data_source_names)
    }

    /// Whether `data_source_name` is this group's master or one of its slaves
    pub fn contains_data_source(&self, data_source_name: &str) -> bool {
        self.master_data_source_name == data_source_name
            || self.slave_data_source_names.iter().any(|s| s == data_source_name)
    }
}
