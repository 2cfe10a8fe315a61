//! Common types for the rule module
//!
//! Centralizes sharding value definitions shared by strategies and rules.

use std::ops::Bound;

use serde::{Deserialize, Serialize};

/// Name of the built-in round-robin load-balance algorithm
pub const ROUND_ROBIN_ALGORITHM: &str = "round_robin";

/// Name of the built-in random load-balance algorithm
pub const RANDOM_ALGORITHM: &str = "random";

/// Load-balance algorithm used when a group does not name one
pub const DEFAULT_LOAD_BALANCE_ALGORITHM: &str = ROUND_ROBIN_ALGORITHM;

/// A sharding column value taken from a statement or a hint
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShardingKey {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for ShardingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShardingKey::Int(v) => write!(f, "{}", v),
            ShardingKey::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ShardingKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ShardingKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ShardingKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Values of one sharding column
#[derive(Debug, Clone, PartialEq)]
pub enum ShardingValue {
    /// `=` and `IN` conditions
    List {
        column: String,
        values: Vec<ShardingKey>,
    },

    /// `BETWEEN` and comparison conditions
    Range {
        column: String,
        lower: Bound<ShardingKey>,
        upper: Bound<ShardingKey>,
    },
}

impl ShardingValue {
    /// Single `column = value` condition
    pub fn single(column: impl Into<String>, value: impl Into<ShardingKey>) -> Self {
        Self::List {
            column: column.into(),
            values: vec![value.into()],
        }
    }

    /// `column IN (values)` condition
    pub fn list<K: Into<ShardingKey>>(column: impl Into<String>, values: impl IntoIterator<Item = K>) -> Self {
        Self::List {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Inclusive `column BETWEEN lower AND upper` condition
    pub fn between(column: impl Into<String>, lower: impl Into<ShardingKey>, upper: impl Into<ShardingKey>) -> Self {
        Self::Range {
            column: column.into(),
            lower: Bound::Included(lower.into()),
            upper: Bound::Included(upper.into()),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            ShardingValue::List { column, .. } | ShardingValue::Range { column, .. } => column,
        }
    }

    /// Whether this value applies to the given column (case-insensitive)
    pub fn is_for_column(&self, column: &str) -> bool {
        self.column().eq_ignore_ascii_case(column)
    }
}

/// Keep `available` entries that appear in `chosen`, in `available` order,
/// without duplicates.
pub(crate) fn retain_available(available: &[String], chosen: &[String]) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(chosen.len().min(available.len()));
    for each in available {
        if chosen.iter().any(|c| c == each) && !result.contains(each) {
            result.push(each.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharding_key_display() {
        assert_eq!(ShardingKey::from(42).to_string(), "42");
        assert_eq!(ShardingKey::from("beijing").to_string(), "beijing");
    }

    #[test]
    fn test_value_column_match() {
        let value = ShardingValue::single("ORDER_ID", 1);
        assert!(value.is_for_column("order_id"));
        assert!(!value.is_for_column("user_id"));
    }

    #[test]
    fn test_retain_available_keeps_topology_order() {
        let available = vec!["t_0".to_string(), "t_1".to_string(), "t_2".to_string()];
        let chosen = vec!["t_2".to_string(), "t_x".to_string(), "t_0".to_string(), "t_2".to_string()];
        assert_eq!(retain_available(&available, &chosen), vec!["t_0", "t_2"]);
    }
}
