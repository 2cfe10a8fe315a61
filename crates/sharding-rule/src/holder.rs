//! Rule holder: the currently active rule snapshot
//!
//! Readers take an `Arc` of the current rule and keep routing with it
//! while a reload compiles and swaps in a replacement.

use std::sync::Arc;

use parking_lot::RwLock;
use sharding_core::ShardingRuleConfig;
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::registry::AlgorithmRegistry;
use crate::sharding_rule::ShardingRule;

/// Shared holder of the active [`ShardingRule`]
#[derive(Debug)]
pub struct RuleHolder {
    current: RwLock<Arc<ShardingRule>>,
}

impl RuleHolder {
    pub fn new(rule: ShardingRule) -> Self {
        Self {
            current: RwLock::new(Arc::new(rule)),
        }
    }

    /// Compile `config` and hold the result
    pub fn from_config(config: &ShardingRuleConfig, registry: &AlgorithmRegistry) -> Result<Self, ConfigError> {
        Ok(Self::new(ShardingRule::new(config, registry)?))
    }

    /// Snapshot of the active rule
    pub fn current(&self) -> Arc<ShardingRule> {
        self.current.read().clone()
    }

    /// Replace the active rule, returning the previous one
    pub fn swap(&self, rule: ShardingRule) -> Arc<ShardingRule> {
        let previous = std::mem::replace(&mut *self.current.write(), Arc::new(rule));
        info!(
            table_rules = previous.table_rules().len(),
            "Active sharding rule replaced"
        );
        previous
    }

    /// Compile `config` and swap it in; on error the active rule is kept
    pub fn reload(&self, config: &ShardingRuleConfig, registry: &AlgorithmRegistry) -> Result<(), ConfigError> {
        match ShardingRule::new(config, registry) {
            Ok(rule) => {
                self.swap(rule);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Rule reload rejected, keeping active rule");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharding_core::TableRuleConfig;

    fn config(tables: &[&str]) -> ShardingRuleConfig {
        ShardingRuleConfig {
            data_source_names: vec!["ds_0".to_string()],
            tables: tables
                .iter()
                .map(|t| TableRuleConfig::new(*t, format!("ds_0.{}_0", t)))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_swap_keeps_old_snapshot_alive() {
        let registry = AlgorithmRegistry::default();
        let holder = RuleHolder::from_config(&config(&["t_order"]), &registry).unwrap();

        let before = holder.current();
        holder.reload(&config(&["t_user"]), &registry).unwrap();

        assert!(before.find_table_rule("t_order").is_some());
        assert!(holder.current().find_table_rule("t_order").is_none());
        assert!(holder.current().find_table_rule("t_user").is_some());
    }

    #[test]
    fn test_failed_reload_keeps_active_rule() {
        let registry = AlgorithmRegistry::default();
        let holder = RuleHolder::from_config(&config(&["t_order"]), &registry).unwrap();

        let mut bad = config(&["t_user"]);
        bad.tables[0].actual_data_nodes = Some("ds_9.t_user_0".to_string());

        let err = holder.reload(&bad, &registry).unwrap_err();
        assert_eq!(err, ConfigError::InvalidDataNode("ds_9.t_user_0".to_string()));
        assert!(holder.current().find_table_rule("t_order").is_some());
    }

    #[test]
    fn test_concurrent_readers_during_swap() {
        let registry = AlgorithmRegistry::default();
        let holder = RuleHolder::from_config(&config(&["t_order"]), &registry).unwrap();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let rule = holder.current();
                        assert_eq!(rule.table_rules().len(), 1);
                    }
                });
            }
            s.spawn(|| {
                for i in 0..50 {
                    let table = if i % 2 == 0 { "t_user" } else { "t_order" };
                    holder.reload(&config(&[table]), &registry).unwrap();
                }
            });
        });
    }
}
