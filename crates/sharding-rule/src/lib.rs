//! Sharding Rule - Rule and Routing Core
//!
//! Compiles declarative rule configuration into immutable rules that
//! decide where a logical table lives and which replica serves a read.
//!
//! # Architecture
//!
//! ```text
//! ShardingRuleConfig (sharding-core)
//!     │
//!     ▼
//! ┌─────────────────────────┐
//! │   AlgorithmRegistry     │  Resolves algorithm / key generator names
//! └───────────┬─────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────┐
//! │     ShardingRule        │  Table rules, binding groups,
//! │                         │  master-slave groups, default strategies
//! └───────────┬─────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────┐
//! │      RuleHolder         │  Active snapshot, swapped on reload
//! └─────────────────────────┘
//! ```
//!
//! # Building Blocks
//!
//! - **Inline expressions**: `ds_${0..1}.t_order_${[0, 1]}` expands to the
//!   cartesian product of its placeholders
//! - **DataNode**: one physical `datasource.table` location
//! - **TableRule**: topology and strategies of one logical table
//! - **MasterSlaveRule**: master, slaves and a load-balance algorithm
//!
//! # Example
//!
//! ```rust,ignore
//! use sharding_core::{ShardingRuleConfig, ShardingStrategyConfig, TableRuleConfig};
//! use sharding_rule::{AlgorithmRegistry, ShardingRule, ShardingValue};
//!
//! let config = ShardingRuleConfig {
//!     data_source_names: vec!["ds_0".into(), "ds_1".into()],
//!     tables: vec![TableRuleConfig::new("t_order", "ds_${0..1}.t_order_${0..1}")
//!         .with_table_strategy(ShardingStrategyConfig::inline("order_id", "t_order_${order_id % 2}"))],
//!     ..Default::default()
//! };
//! let rule = ShardingRule::new(&config, &AlgorithmRegistry::default())?;
//! let nodes = rule.route("t_order", &[], &[ShardingValue::single("order_id", 7)])?;
//! ```

// Core modules
mod error;
mod types;
pub mod inline_expr;
mod data_node;
mod key_gen;
mod registry;

// Strategy module (sharding strategies and load-balance algorithms)
pub mod strategy;

// Rules
mod table_rule;
mod binding_table_rule;
mod master_slave_rule;
mod sharding_rule;
mod holder;

// Re-exports: Error types
pub use error::{ConfigError, RouteError, RouteLevel};

// Re-exports: Core types
pub use types::{
    ShardingKey, ShardingValue, DEFAULT_LOAD_BALANCE_ALGORITHM, RANDOM_ALGORITHM,
    ROUND_ROBIN_ALGORITHM,
};
pub use data_node::DataNode;
pub use inline_expr::InlineExpression;
pub use key_gen::{KeyGenerator, KeyGeneratorBinding};
pub use registry::AlgorithmRegistry;

// Re-exports: Strategy traits and implementations
pub use strategy::{
    // Traits
    ShardingStrategy, LoadBalanceAlgorithm, BuildStrategy,
    PreciseShardingAlgorithm, RangeShardingAlgorithm,
    ComplexKeysShardingAlgorithm, HintShardingAlgorithm,
    // Sharding strategies
    StandardShardingStrategy, ComplexShardingStrategy, HintShardingStrategy,
    InlineShardingStrategy, NoneShardingStrategy,
    // Load-balance algorithms
    RoundRobinLoadBalanceAlgorithm, RandomLoadBalanceAlgorithm,
};

// Re-exports: Rules
pub use table_rule::TableRule;
pub use binding_table_rule::BindingTableRule;
pub use master_slave_rule::MasterSlaveRule;
pub use sharding_rule::ShardingRule;
pub use holder::RuleHolder;
