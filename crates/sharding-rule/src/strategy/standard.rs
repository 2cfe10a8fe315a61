//! Standard Strategy: one sharding column
//!
//! `=` and `IN` values go through the precise algorithm one by one; range
//! conditions go through the optional range algorithm.

use std::sync::Arc;

use tracing::trace;

use crate::error::RouteError;
use crate::types::{retain_available, ShardingValue};
use super::{PreciseShardingAlgorithm, RangeShardingAlgorithm, ShardingStrategy};

/// Single-column sharding strategy
pub struct StandardShardingStrategy {
    column: String,
    precise: Arc<dyn PreciseShardingAlgorithm>,
    range: Option<Arc<dyn RangeShardingAlgorithm>>,
}

impl StandardShardingStrategy {
    /// Create with a precise algorithm only
    pub fn new(column: impl Into<String>, precise: Arc<dyn PreciseShardingAlgorithm>) -> Self {
        Self {
            column: column.into(),
            precise,
            range: None,
        }
    }

    /// Add a range algorithm
    pub fn with_range(mut self, range: Arc<dyn RangeShardingAlgorithm>) -> Self {
        self.range = Some(range);
        self
    }
}

impl std::fmt::Debug for StandardShardingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardShardingStrategy")
            .field("column", &self.column)
            .field("has_range", &self.range.is_some())
            .finish()
    }
}

impl ShardingStrategy for StandardShardingStrategy {
    fn sharding_columns(&self) -> &[String] {
        std::slice::from_ref(&self.column)
    }

    fn route(&self, available: &[String], values: &[ShardingValue]) -> Result<Vec<String>, RouteError> {
        let mut matched = false;
        let mut chosen = Vec::new();

        for value in values.iter().filter(|v| v.is_for_column(&self.column)) {
            matched = true;
            match value {
                ShardingValue::List { values, .. } => {
                    chosen.extend(
                        values
                            .iter()
                            .filter_map(|key| self.precise.do_sharding(available, &self.column, key)),
                    );
                }
                ShardingValue::Range { lower, upper, .. } => {
                    let range = self
                        .range
                        .as_ref()
                        .ok_or_else(|| RouteError::RangeUnsupported(self.column.clone()))?;
                    chosen.extend(range.do_sharding(available, &self.column, lower, upper));
                }
            }
        }

        if !matched {
            return Ok(available.to_vec());
        }

        trace!(column = %self.column, chosen = ?chosen, "Standard sharding");
        Ok(retain_available(available, &chosen))
    }

    fn name(&self) -> &'static str {
        "Standard"
    }
}
