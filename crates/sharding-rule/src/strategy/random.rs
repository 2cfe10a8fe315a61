//! Random Load Balance for Slave Selection

use rand::Rng;
use tracing::trace;

use super::LoadBalanceAlgorithm;

/// Uniform random slave selection, no shared state
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomLoadBalanceAlgorithm;

impl RandomLoadBalanceAlgorithm {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalanceAlgorithm for RandomLoadBalanceAlgorithm {
    fn select<'a>(&self, group: &str, master: &'a str, slaves: &'a [String]) -> &'a str {
        if slaves.is_empty() {
            return master;
        }

        let slave = &slaves[rand::thread_rng().gen_range(0..slaves.len())];
        trace!(group = %group, slave = %slave, "Selected at random");
        slave
    }

    fn name(&self) -> &'static str {
        "Random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_selects_a_slave() {
        let algorithm = RandomLoadBalanceAlgorithm::new();
        let slaves = vec!["s0".to_string(), "s1".to_string(), "s2".to_string()];

        let mut seen = HashSet::new();
        for _ in 0..500 {
            let picked = algorithm.select("ms", "master", &slaves);
            assert!(slaves.iter().any(|s| s == picked));
            seen.insert(picked);
        }
        // 500 draws over 3 slaves reach all of them
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_single_slave() {
        let algorithm = RandomLoadBalanceAlgorithm::new();
        let slaves = vec!["s0".to_string()];
        for _ in 0..10 {
            assert_eq!(algorithm.select("ms", "master", &slaves), "s0");
        }
    }

    #[test]
    fn test_empty_slaves_falls_back_to_master() {
        assert_eq!(RandomLoadBalanceAlgorithm.select("ms", "master", &[]), "master");
    }
}
