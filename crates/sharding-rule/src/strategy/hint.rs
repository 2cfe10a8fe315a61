//! Hint Strategy
//!
//! Ignores values extracted from the statement. The routing engine passes
//! the caller's out-of-band hint values instead, whatever their column.

use std::sync::Arc;

use crate::error::RouteError;
use crate::types::{retain_available, ShardingValue};
use super::{HintShardingAlgorithm, ShardingStrategy};

/// Hint-driven sharding strategy
pub struct HintShardingStrategy {
    columns: Vec<String>,
    algorithm: Arc<dyn HintShardingAlgorithm>,
}

impl HintShardingStrategy {
    pub fn new(algorithm: Arc<dyn HintShardingAlgorithm>) -> Self {
        Self {
            columns: Vec::new(),
            algorithm,
        }
    }
}

impl std::fmt::Debug for HintShardingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HintShardingStrategy").finish()
    }
}

impl ShardingStrategy for HintShardingStrategy {
    fn sharding_columns(&self) -> &[String] {
        &self.columns
    }

    fn route(&self, available: &[String], hints: &[ShardingValue]) -> Result<Vec<String>, RouteError> {
        if hints.is_empty() {
            return Ok(available.to_vec());
        }

        let chosen: Vec<String> = hints
            .iter()
            .flat_map(|hint| self.algorithm.do_sharding(available, hint))
            .collect();
        Ok(retain_available(available, &chosen))
    }

    fn name(&self) -> &'static str {
        "Hint"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShardingKey;

    /// Routes to the target named by the hint
    struct NamedTarget;

    impl HintShardingAlgorithm for NamedTarget {
        fn do_sharding(&self, _available: &[String], hint: &ShardingValue) -> Vec<String> {
            match hint {
                ShardingValue::List { values, .. } => values.iter().map(ShardingKey::to_string).collect(),
                ShardingValue::Range { .. } => Vec::new(),
            }
        }
    }

    #[test]
    fn test_hint_ignores_column() {
        let strategy = HintShardingStrategy::new(Arc::new(NamedTarget));
        let available = vec!["ds_0".to_string(), "ds_1".to_string()];
        let hints = vec![ShardingValue::single("anything", "ds_1")];

        assert_eq!(strategy.route(&available, &hints).unwrap(), vec!["ds_1"]);
        assert!(strategy.sharding_columns().is_empty());
    }

    #[test]
    fn test_no_hint_broadcasts() {
        let strategy = HintShardingStrategy::new(Arc::new(NamedTarget));
        let available = vec!["ds_0".to_string(), "ds_1".to_string()];
        assert_eq!(strategy.route(&available, &[]).unwrap(), available);
    }
}
