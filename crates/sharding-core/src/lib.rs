//! Sharding Core - Declarative rule configuration
//!
//! This crate provides the configuration values consumed by
//! sharding-rule and sharding-inspect.

pub mod config;

pub use config::{
    ConfigLoadError, InspectConfig, MasterSlaveRuleConfig, ShardingRuleConfig,
    ShardingStrategyConfig, TableRuleConfig,
};
