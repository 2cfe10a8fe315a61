//! Routing Strategies
//!
//! This module contains the two selection capabilities used by rules:
//!
//! - `ShardingStrategy`: narrows data sources or tables for a statement
//!   - `StandardShardingStrategy`: single sharding column
//!   - `ComplexShardingStrategy`: multiple sharding columns
//!   - `HintShardingStrategy`: caller supplied hint values
//!   - `InlineShardingStrategy`: inline expression over one column
//!   - `NoneShardingStrategy`: no narrowing
//! - `LoadBalanceAlgorithm`: picks one slave for a read
//!   - `RoundRobinLoadBalanceAlgorithm`: fair rotation per group
//!   - `RandomLoadBalanceAlgorithm`: uniform choice
//!
//! # Strategy Hierarchy
//!
//! ```text
//! Statement
//!     │
//!     ▼
//! ┌─────────────────────────┐
//! │   Database Strategy     │  (Which data sources?)
//! └───────────┬─────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────┐
//! │   Table Strategy        │  (Which tables on each data source?)
//! └───────────┬─────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────┐
//! │   Load Balance          │  (Which replica serves a read?)
//! └─────────────────────────┘
//! ```

mod algorithm;
mod builder;
mod complex;
mod hint;
mod inline;
mod none;
mod random;
mod round_robin;
mod standard;

pub use algorithm::{
    ComplexKeysShardingAlgorithm, HintShardingAlgorithm, PreciseShardingAlgorithm,
    RangeShardingAlgorithm,
};
pub use builder::BuildStrategy;
pub use complex::ComplexShardingStrategy;
pub use hint::HintShardingStrategy;
pub use inline::InlineShardingStrategy;
pub use none::NoneShardingStrategy;
pub use random::RandomLoadBalanceAlgorithm;
pub use round_robin::RoundRobinLoadBalanceAlgorithm;
pub use standard::StandardShardingStrategy;

use crate::error::RouteError;
use crate::types::ShardingValue;

/// Trait for sharding strategies
///
/// `available` is either data source names or table names, depending on
/// whether the strategy is applied at database or table level.
pub trait ShardingStrategy: Send + Sync + std::fmt::Debug {
    /// Columns this strategy shards on (empty for hint and none)
    fn sharding_columns(&self) -> &[String];

    /// Subset of `available` to route to, in `available` order
    fn route(&self, available: &[String], values: &[ShardingValue]) -> Result<Vec<String>, RouteError>;

    /// Strategy name for logging
    fn name(&self) -> &'static str;
}

/// Trait for master-slave load-balance algorithms
pub trait LoadBalanceAlgorithm: Send + Sync + std::fmt::Debug {
    /// Select the data source serving one read for `group`.
    ///
    /// Returns `master` when `slaves` is empty.
    fn select<'a>(&self, group: &str, master: &'a str, slaves: &'a [String]) -> &'a str;

    /// Algorithm name for logging
    fn name(&self) -> &'static str;
}
