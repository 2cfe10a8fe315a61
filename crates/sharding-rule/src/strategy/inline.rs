//! Inline Strategy
//!
//! Computes the target name from an inline expression bound to the value of
//! one sharding column, e.g. `t_order_${order_id % 2}`. Uses the same
//! evaluator that expands actual data nodes.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::{ConfigError, RouteError};
use crate::inline_expr::InlineExpression;
use crate::types::{retain_available, ShardingValue};
use super::ShardingStrategy;

/// Expression-based single-column strategy
#[derive(Debug, Clone)]
pub struct InlineShardingStrategy {
    column: String,
    /// Variable name the expression uses for the column
    binding: String,
    expression: InlineExpression,
}

impl InlineShardingStrategy {
    /// Parse and validate the expression
    ///
    /// The expression may only reference the sharding column, in any case.
    pub fn new(column: impl Into<String>, expression: &str) -> Result<Self, ConfigError> {
        let column = column.into();
        if column.trim().is_empty() {
            return Err(ConfigError::MissingField("sharding_column"));
        }
        let parsed = InlineExpression::parse(expression)?;
        if parsed.is_empty() {
            return Err(ConfigError::MissingField("algorithm_expression"));
        }

        let variables = parsed.variables();
        if let Some(other) = variables.iter().find(|v| !v.eq_ignore_ascii_case(&column)) {
            return Err(ConfigError::invalid_expression(
                expression,
                format!("references '{}' but the sharding column is '{}'", other, column),
            ));
        }
        if variables.len() > 1 {
            return Err(ConfigError::invalid_expression(
                expression,
                format!("refers to the sharding column '{}' under more than one spelling", column),
            ));
        }
        let binding = variables.into_iter().next().unwrap_or_else(|| column.clone());

        Ok(Self {
            column,
            binding,
            expression: parsed,
        })
    }

    pub fn expression(&self) -> &str {
        self.expression.as_str()
    }
}

impl ShardingStrategy for InlineShardingStrategy {
    fn sharding_columns(&self) -> &[String] {
        std::slice::from_ref(&self.column)
    }

    fn route(&self, available: &[String], values: &[ShardingValue]) -> Result<Vec<String>, RouteError> {
        let mut matched = false;
        let mut chosen = Vec::new();

        for value in values.iter().filter(|v| v.is_for_column(&self.column)) {
            match value {
                ShardingValue::List { values, .. } => {
                    matched = true;
                    for key in values {
                        let bindings = HashMap::from([(self.binding.clone(), key.clone())]);
                        chosen.extend(self.expression.evaluate_with(&bindings)?);
                    }
                }
                ShardingValue::Range { .. } => {
                    debug!(column = %self.column, "Inline strategy cannot narrow a range, broadcasting");
                    return Ok(available.to_vec());
                }
            }
        }

        if !matched {
            return Ok(available.to_vec());
        }

        trace!(expression = %self.expression.as_str(), chosen = ?chosen, "Inline sharding");
        Ok(retain_available(available, &chosen))
    }

    fn name(&self) -> &'static str {
        "Inline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> Vec<String> {
        vec!["t_order_0".to_string(), "t_order_1".to_string()]
    }

    #[test]
    fn test_inline_route() {
        let strategy = InlineShardingStrategy::new("order_id", "t_order_${order_id % 2}").unwrap();

        let values = vec![ShardingValue::single("order_id", 7)];
        assert_eq!(strategy.route(&tables(), &values).unwrap(), vec!["t_order_1"]);

        let values = vec![ShardingValue::list("order_id", [1i64, 2])];
        assert_eq!(strategy.route(&tables(), &values).unwrap(), tables());
    }

    #[test]
    fn test_range_broadcasts() {
        let strategy = InlineShardingStrategy::new("order_id", "t_order_${order_id % 2}").unwrap();
        let values = vec![ShardingValue::between("order_id", 1, 10)];
        assert_eq!(strategy.route(&tables(), &values).unwrap(), tables());
    }

    #[test]
    fn test_foreign_variable_rejected() {
        let result = InlineShardingStrategy::new("order_id", "t_order_${user_id % 2}");
        assert!(matches!(result, Err(ConfigError::InvalidExpression { .. })));
    }

    #[test]
    fn test_column_case_differs_from_expression() {
        let strategy = InlineShardingStrategy::new("ORDER_ID", "t_order_${order_id % 2}").unwrap();
        assert_eq!(strategy.sharding_columns(), ["ORDER_ID".to_string()]);

        let values = vec![ShardingValue::single("Order_Id", 3)];
        assert_eq!(strategy.route(&tables(), &values).unwrap(), vec!["t_order_1"]);

        let result = InlineShardingStrategy::new("order_id", "t_${order_id + ORDER_ID}");
        assert!(matches!(result, Err(ConfigError::InvalidExpression { .. })));
    }

    #[test]
    fn test_blank_expression_rejected() {
        let result = InlineShardingStrategy::new("order_id", "  ");
        assert_eq!(result.unwrap_err(), ConfigError::MissingField("algorithm_expression"));
    }

    #[test]
    fn test_text_value_fails_arithmetic() {
        let strategy = InlineShardingStrategy::new("order_id", "t_order_${order_id % 2}").unwrap();
        let values = vec![ShardingValue::single("order_id", "abc")];
        assert!(matches!(strategy.route(&tables(), &values), Err(RouteError::Inline(_))));
    }
}
