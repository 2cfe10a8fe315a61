//! Data node: one physical (data source, table) location

use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DELIMITER: char = '.';

/// Physical location of one shard of a logical table
///
/// Equality matches the data source name exactly and the table name
/// case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataNode {
    data_source_name: String,
    table_name: String,
}

impl DataNode {
    /// Create from its two parts
    pub fn new(data_source_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            data_source_name: data_source_name.into(),
            table_name: table_name.into(),
        }
    }

    /// Parse `datasource.table`
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut parts = raw.split(DELIMITER);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(ds), Some(table), None) if !ds.trim().is_empty() && !table.trim().is_empty() => {
                Ok(Self::new(ds.trim(), table.trim()))
            }
            _ => Err(ConfigError::MalformedDataNode(raw.to_string())),
        }
    }

    pub fn data_source_name(&self) -> &str {
        &self.data_source_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Case-insensitive match on both parts, as used by routing lookups
    pub fn matches(&self, data_source_name: &str, table_name: &str) -> bool {
        self.data_source_name.eq_ignore_ascii_case(data_source_name)
            && self.table_name.eq_ignore_ascii_case(table_name)
    }
}

impl PartialEq for DataNode {
    fn eq(&self, other: &Self) -> bool {
        self.data_source_name == other.data_source_name
            && self.table_name.eq_ignore_ascii_case(&other.table_name)
    }
}

impl Eq for DataNode {}

impl Hash for DataNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data_source_name.hash(state);
        self.table_name.to_ascii_lowercase().hash(state);
    }
}

impl FromStr for DataNode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for DataNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.data_source_name, DELIMITER, self.table_name)
    }
}
