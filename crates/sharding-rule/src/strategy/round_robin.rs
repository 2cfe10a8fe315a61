//! Round-Robin Load Balance for Slave Selection
//!
//! Each master-slave group owns one cursor. Selecting advances the cursor
//! with a single `fetch_add`, so concurrent readers of the same group never
//! observe the same cursor value.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use super::LoadBalanceAlgorithm;

/// Round-robin slave selection, cursor scoped per group name
#[derive(Debug, Default)]
pub struct RoundRobinLoadBalanceAlgorithm {
    cursors: RwLock<HashMap<String, Arc<AtomicUsize>>>,
}

impl RoundRobinLoadBalanceAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the cursor of a group
    fn cursor(&self, group: &str) -> Arc<AtomicUsize> {
        if let Some(cursor) = self.cursors.read().get(group) {
            return cursor.clone();
        }

        self.cursors
            .write()
            .entry(group.to_string())
            .or_insert_with(|| Arc::new(AtomicUsize::new(0)))
            .clone()
    }
}

impl LoadBalanceAlgorithm for RoundRobinLoadBalanceAlgorithm {
    fn select<'a>(&self, group: &str, master: &'a str, slaves: &'a [String]) -> &'a str {
        if slaves.is_empty() {
            return master;
        }

        let ticket = self.cursor(group).fetch_add(1, Ordering::Relaxed);
        let slave = &slaves[ticket % slaves.len()];
        trace!(group = %group, ticket = ticket, slave = %slave, "Selected by round robin");
        slave
    }

    fn name(&self) -> &'static str {
        "RoundRobin"
    }
}
