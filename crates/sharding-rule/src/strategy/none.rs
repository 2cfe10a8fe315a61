//! Strategy that never narrows

use crate::error::RouteError;
use crate::types::ShardingValue;
use super::ShardingStrategy;

/// Broadcast strategy: every available target is routed to
#[derive(Debug, Clone, Default)]
pub struct NoneShardingStrategy {
    columns: Vec<String>,
}

impl NoneShardingStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShardingStrategy for NoneShardingStrategy {
    fn sharding_columns(&self) -> &[String] {
        &self.columns
    }

    fn route(&self, available: &[String], _values: &[ShardingValue]) -> Result<Vec<String>, RouteError> {
        Ok(available.to_vec())
    }

    fn name(&self) -> &'static str {
        "None"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_all_targets() {
        let strategy = NoneShardingStrategy::new();
        let available = vec!["ds_0".to_string(), "ds_1".to_string()];
        let values = vec![ShardingValue::single("user_id", 1)];

        assert_eq!(strategy.route(&available, &values).unwrap(), available);
        assert!(strategy.sharding_columns().is_empty());
    }
}
