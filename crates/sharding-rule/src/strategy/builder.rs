//! Builds strategies from their declarative configuration

use std::sync::Arc;

use sharding_core::ShardingStrategyConfig;

use crate::error::ConfigError;
use crate::registry::AlgorithmRegistry;
use super::{
    ComplexShardingStrategy, HintShardingStrategy, InlineShardingStrategy, NoneShardingStrategy,
    ShardingStrategy, StandardShardingStrategy,
};

/// Compile a strategy configuration, resolving algorithm names
pub trait BuildStrategy {
    fn build(&self, registry: &AlgorithmRegistry) -> Result<Arc<dyn ShardingStrategy>, ConfigError>;
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::MissingField(field));
    }
    Ok(value)
}

impl BuildStrategy for ShardingStrategyConfig {
    fn build(&self, registry: &AlgorithmRegistry) -> Result<Arc<dyn ShardingStrategy>, ConfigError> {
        let strategy: Arc<dyn ShardingStrategy> = match self {
            ShardingStrategyConfig::Standard {
                sharding_column,
                precise_algorithm,
                range_algorithm,
            } => {
                let column = required(sharding_column, "sharding_column")?;
                let precise = registry.precise(required(precise_algorithm, "precise_algorithm")?)?;
                let mut strategy = StandardShardingStrategy::new(column, precise);
                if let Some(name) = range_algorithm.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                    strategy = strategy.with_range(registry.range(name)?);
                }
                Arc::new(strategy)
            }
            ShardingStrategyConfig::Complex {
                sharding_columns,
                algorithm,
            } => {
                let columns: Vec<String> = sharding_columns
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect();
                if columns.is_empty() {
                    return Err(ConfigError::MissingField("sharding_columns"));
                }
                let algorithm = registry.complex(required(algorithm, "algorithm")?)?;
                Arc::new(ComplexShardingStrategy::new(columns, algorithm))
            }
            ShardingStrategyConfig::Hint { algorithm } => {
                let algorithm = registry.hint(required(algorithm, "algorithm")?)?;
                Arc::new(HintShardingStrategy::new(algorithm))
            }
            ShardingStrategyConfig::Inline {
                sharding_column,
                algorithm_expression,
            } => Arc::new(InlineShardingStrategy::new(
                required(sharding_column, "sharding_column")?,
                algorithm_expression,
            )?),
            ShardingStrategyConfig::None => Arc::new(NoneShardingStrategy::new()),
        };
        Ok(strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::PreciseShardingAlgorithm;
    use crate::types::ShardingKey;

    struct First;

    impl PreciseShardingAlgorithm for First {
        fn do_sharding(&self, available: &[String], _column: &str, _value: &ShardingKey) -> Option<String> {
            available.first().cloned()
        }
    }

    #[test]
    fn test_build_each_kind() {
        let registry = AlgorithmRegistry::default();
        registry.register_precise("first", Arc::new(First));

        let standard = ShardingStrategyConfig::standard("order_id", "first").build(&registry).unwrap();
        assert_eq!(standard.name(), "Standard");
        assert_eq!(standard.sharding_columns(), ["order_id".to_string()]);

        let inline = ShardingStrategyConfig::inline("user_id", "ds_${user_id % 2}").build(&registry).unwrap();
        assert_eq!(inline.name(), "Inline");

        let none = ShardingStrategyConfig::None.build(&registry).unwrap();
        assert_eq!(none.name(), "None");
    }

    #[test]
    fn test_unknown_algorithm() {
        let registry = AlgorithmRegistry::default();
        let err = ShardingStrategyConfig::Hint { algorithm: "by_tenant".to_string() }
            .build(&registry)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownAlgorithm {
                kind: "hint sharding algorithm",
                name: "by_tenant".to_string()
            }
        );
    }

    #[test]
    fn test_complex_requires_columns() {
        let registry = AlgorithmRegistry::default();
        let config = ShardingStrategyConfig::Complex {
            sharding_columns: " , ".to_string(),
            algorithm: "any".to_string(),
        };
        assert_eq!(config.build(&registry).unwrap_err(), ConfigError::MissingField("sharding_columns"));
    }

    #[test]
    fn test_standard_requires_column() {
        let registry = AlgorithmRegistry::default();
        let config = ShardingStrategyConfig::standard("", "first");
        assert_eq!(config.build(&registry).unwrap_err(), ConfigError::MissingField("sharding_column"));
    }
}
