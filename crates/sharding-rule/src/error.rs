//! Error types for rule construction and strategy routing

use thiserror::Error;

/// Configuration error raised while compiling rules
///
/// Every variant carries the raw configuration fragment the operator wrote.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Actual data node references an unregistered data source
    #[error("Cannot find data source in sharding rule, invalid actual data node is: '{0}'")]
    InvalidDataNode(String),

    /// Data node is not of the form `datasource.table`
    #[error("Malformed data node '{0}', expected 'datasource.table'")]
    MalformedDataNode(String),

    /// Data source name that is not registered
    #[error("Unknown data source '{0}'")]
    UnknownDataSource(String),

    /// Required field absent or blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Table rule resolved to no data nodes at all
    #[error("Table rule '{0}' has no actual data nodes")]
    EmptyDataNodes(String),

    /// Master-slave group without replicas
    #[error("Master-slave rule '{0}' has no slave data sources")]
    EmptySlaves(String),

    /// Inline expression could not be evaluated
    #[error("Invalid inline expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    /// Algorithm or key generator name not registered
    #[error("Unknown {kind}: '{name}'")]
    UnknownAlgorithm { kind: &'static str, name: String },

    /// Two table rules for the same logical table
    #[error("Duplicate table rule for logic table '{0}'")]
    DuplicateTableRule(String),

    /// Two master-slave groups with the same name
    #[error("Duplicate master-slave rule '{0}'")]
    DuplicateMasterSlaveRule(String),

    /// Binding table group is inconsistent
    #[error("Invalid binding table group '{group}': {reason}")]
    InvalidBindingTables { group: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid_expression(expression: &str, reason: impl Into<String>) -> Self {
        Self::InvalidExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}

/// Error evaluating a sharding strategy against query values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Range condition on a strategy without a range algorithm
    #[error("Range sharding is not supported for column '{0}'")]
    RangeUnsupported(String),

    /// Inline strategy expression failed for a value
    #[error("Inline sharding failed: {0}")]
    Inline(#[from] ConfigError),

    /// No table rule for the logical table
    #[error("Table rule not found: {0}")]
    TableRuleNotFound(String),

    /// A strategy selected no configured target
    #[error("No {level} route info for logic table '{logic_table}'")]
    NoRoute {
        logic_table: String,
        level: RouteLevel,
    },
}

/// Routing step that produced no target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteLevel {
    Database,
    Table,
}

impl std::fmt::Display for RouteLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteLevel::Database => write!(f, "database"),
            RouteLevel::Table => write!(f, "table"),
        }
    }
}
