//! Sharding algorithm contracts
//!
//! Implemented by users and registered by name in the
//! [`AlgorithmRegistry`](crate::AlgorithmRegistry). Strategies only decide
//! which values reach an algorithm; the algorithms decide the targets.

use std::ops::Bound;

use crate::types::{ShardingKey, ShardingValue};

/// Maps one `=`/`IN` value to one target
pub trait PreciseShardingAlgorithm: Send + Sync {
    /// Returns the chosen target, or None when no target applies
    fn do_sharding(&self, available: &[String], column: &str, value: &ShardingKey) -> Option<String>;
}

/// Maps a range condition to a set of targets
pub trait RangeShardingAlgorithm: Send + Sync {
    fn do_sharding(
        &self,
        available: &[String],
        column: &str,
        lower: &Bound<ShardingKey>,
        upper: &Bound<ShardingKey>,
    ) -> Vec<String>;
}

/// Maps values of several columns to a set of targets
pub trait ComplexKeysShardingAlgorithm: Send + Sync {
    fn do_sharding(&self, available: &[String], values: &[ShardingValue]) -> Vec<String>;
}

/// Maps caller supplied hint values to a set of targets
pub trait HintShardingAlgorithm: Send + Sync {
    fn do_sharding(&self, available: &[String], hint: &ShardingValue) -> Vec<String>;
}
