//! Binding table rule
//!
//! Logical tables sharded identically (e.g. `t_order` and `t_order_item`).
//! The n-th actual node of every member lives together, so a statement
//! joining them never needs a cartesian route.

use crate::error::ConfigError;
use crate::table_rule::TableRule;

/// Group of table rules sharing one node layout
#[derive(Debug, Clone)]
pub struct BindingTableRule {
    table_rules: Vec<TableRule>,
}

impl BindingTableRule {
    /// Build from the member rules; all members must have as many nodes
    pub fn new(group: &str, table_rules: Vec<TableRule>) -> Result<Self, ConfigError> {
        let Some(first) = table_rules.first() else {
            return Err(ConfigError::InvalidBindingTables {
                group: group.to_string(),
                reason: "no tables".to_string(),
            });
        };

        let expected = first.actual_data_nodes().len();
        if let Some(other) = table_rules.iter().find(|r| r.actual_data_nodes().len() != expected) {
            return Err(ConfigError::InvalidBindingTables {
                group: group.to_string(),
                reason: format!(
                    "'{}' has {} actual data nodes but '{}' has {}",
                    other.logic_table(),
                    other.actual_data_nodes().len(),
                    first.logic_table(),
                    expected
                ),
            });
        }

        Ok(Self { table_rules })
    }

    pub fn table_rules(&self) -> &[TableRule] {
        &self.table_rules
    }

    pub fn has_logic_table(&self, logic_table: &str) -> bool {
        self.table_rules
            .iter()
            .any(|r| r.logic_table().eq_ignore_ascii_case(logic_table))
    }

    pub fn logic_tables(&self) -> Vec<&str> {
        self.table_rules.iter().map(TableRule::logic_table).collect()
    }

    /// Actual table of `logic_table` bound to `other_actual_table` on `data_source_name`
    ///
    /// The position of `other_actual_table` in its own rule selects the
    /// node of `logic_table` at the same position.
    pub fn binding_actual_table(
        &self,
        data_source_name: &str,
        logic_table: &str,
        other_actual_table: &str,
    ) -> Option<&str> {
        let index = self
            .table_rules
            .iter()
            .find_map(|r| r.find_actual_table_index(data_source_name, other_actual_table))?;

        self.table_rules
            .iter()
            .find(|r| r.logic_table().eq_ignore_ascii_case(logic_table))
            .and_then(|r| r.actual_data_nodes().get(index))
            .map(|node| node.table_name())
    }
}
