//! Complex Strategy: several sharding columns handed to one algorithm

use std::sync::Arc;

use crate::error::RouteError;
use crate::types::{retain_available, ShardingValue};
use super::{ComplexKeysShardingAlgorithm, ShardingStrategy};

/// Multi-column sharding strategy
pub struct ComplexShardingStrategy {
    columns: Vec<String>,
    algorithm: Arc<dyn ComplexKeysShardingAlgorithm>,
}

impl ComplexShardingStrategy {
    pub fn new(columns: Vec<String>, algorithm: Arc<dyn ComplexKeysShardingAlgorithm>) -> Self {
        Self { columns, algorithm }
    }
}

impl std::fmt::Debug for ComplexShardingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplexShardingStrategy")
            .field("columns", &self.columns)
            .finish()
    }
}

impl ShardingStrategy for ComplexShardingStrategy {
    fn sharding_columns(&self) -> &[String] {
        &self.columns
    }

    fn route(&self, available: &[String], values: &[ShardingValue]) -> Result<Vec<String>, RouteError> {
        let relevant: Vec<ShardingValue> = values
            .iter()
            .filter(|v| self.columns.iter().any(|c| v.is_for_column(c)))
            .cloned()
            .collect();

        if relevant.is_empty() {
            return Ok(available.to_vec());
        }

        let chosen = self.algorithm.do_sharding(available, &relevant);
        Ok(retain_available(available, &chosen))
    }

    fn name(&self) -> &'static str {
        "Complex"
    }
}
