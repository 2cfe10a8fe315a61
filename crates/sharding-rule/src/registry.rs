//! Algorithm registry - resolves algorithm names used in configuration
//!
//! Passed explicitly into rule construction. `AlgorithmRegistry::default()`
//! carries the built-in load-balance algorithms; tests and embedders
//! register their own sharding algorithms, key generators and fakes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::ConfigError;
use crate::key_gen::KeyGenerator;
use crate::strategy::{
    ComplexKeysShardingAlgorithm, HintShardingAlgorithm, LoadBalanceAlgorithm,
    PreciseShardingAlgorithm, RandomLoadBalanceAlgorithm, RangeShardingAlgorithm,
    RoundRobinLoadBalanceAlgorithm,
};
use crate::types::{DEFAULT_LOAD_BALANCE_ALGORITHM, RANDOM_ALGORITHM, ROUND_ROBIN_ALGORITHM};

type Table<T> = RwLock<HashMap<String, Arc<T>>>;

fn lookup<T: ?Sized>(table: &Table<T>, kind: &'static str, name: &str) -> Result<Arc<T>, ConfigError> {
    table
        .read()
        .get(name)
        .cloned()
        .ok_or_else(|| ConfigError::UnknownAlgorithm {
            kind,
            name: name.to_string(),
        })
}

/// Registry of named algorithms
pub struct AlgorithmRegistry {
    precise: Table<dyn PreciseShardingAlgorithm>,
    range: Table<dyn RangeShardingAlgorithm>,
    complex: Table<dyn ComplexKeysShardingAlgorithm>,
    hint: Table<dyn HintShardingAlgorithm>,
    key_generators: Table<dyn KeyGenerator>,
    load_balancers: Table<dyn LoadBalanceAlgorithm>,
    default_load_balance: RwLock<String>,
}

impl AlgorithmRegistry {
    /// Create a registry with nothing registered
    pub fn empty() -> Self {
        Self {
            precise: RwLock::new(HashMap::new()),
            range: RwLock::new(HashMap::new()),
            complex: RwLock::new(HashMap::new()),
            hint: RwLock::new(HashMap::new()),
            key_generators: RwLock::new(HashMap::new()),
            load_balancers: RwLock::new(HashMap::new()),
            default_load_balance: RwLock::new(DEFAULT_LOAD_BALANCE_ALGORITHM.to_string()),
        }
    }

    /// Create a registry with the built-in load-balance algorithms
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register_load_balance(ROUND_ROBIN_ALGORITHM, Arc::new(RoundRobinLoadBalanceAlgorithm::new()));
        registry.register_load_balance(RANDOM_ALGORITHM, Arc::new(RandomLoadBalanceAlgorithm::new()));
        registry
    }

    pub fn register_precise(&self, name: impl Into<String>, algorithm: Arc<dyn PreciseShardingAlgorithm>) {
        let name = name.into();
        info!(name = %name, "Registering precise sharding algorithm");
        self.precise.write().insert(name, algorithm);
    }

    pub fn register_range(&self, name: impl Into<String>, algorithm: Arc<dyn RangeShardingAlgorithm>) {
        let name = name.into();
        info!(name = %name, "Registering range sharding algorithm");
        self.range.write().insert(name, algorithm);
    }

    pub fn register_complex(&self, name: impl Into<String>, algorithm: Arc<dyn ComplexKeysShardingAlgorithm>) {
        let name = name.into();
        info!(name = %name, "Registering complex sharding algorithm");
        self.complex.write().insert(name, algorithm);
    }

    pub fn register_hint(&self, name: impl Into<String>, algorithm: Arc<dyn HintShardingAlgorithm>) {
        let name = name.into();
        info!(name = %name, "Registering hint sharding algorithm");
        self.hint.write().insert(name, algorithm);
    }

    pub fn register_key_generator(&self, name: impl Into<String>, generator: Arc<dyn KeyGenerator>) {
        let name = name.into();
        info!(name = %name, "Registering key generator");
        self.key_generators.write().insert(name, generator);
    }

    pub fn register_load_balance(&self, name: impl Into<String>, algorithm: Arc<dyn LoadBalanceAlgorithm>) {
        let name = name.into();
        info!(name = %name, algorithm = algorithm.name(), "Registering load balance algorithm");
        self.load_balancers.write().insert(name, algorithm);
    }

    /// Change which load-balance algorithm groups get by default
    pub fn set_default_load_balance(&self, name: impl Into<String>) {
        *self.default_load_balance.write() = name.into();
    }

    pub fn precise(&self, name: &str) -> Result<Arc<dyn PreciseShardingAlgorithm>, ConfigError> {
        lookup(&self.precise, "precise sharding algorithm", name)
    }

    pub fn range(&self, name: &str) -> Result<Arc<dyn RangeShardingAlgorithm>, ConfigError> {
        lookup(&self.range, "range sharding algorithm", name)
    }

    pub fn complex(&self, name: &str) -> Result<Arc<dyn ComplexKeysShardingAlgorithm>, ConfigError> {
        lookup(&self.complex, "complex sharding algorithm", name)
    }

    pub fn hint(&self, name: &str) -> Result<Arc<dyn HintShardingAlgorithm>, ConfigError> {
        lookup(&self.hint, "hint sharding algorithm", name)
    }

    pub fn key_generator(&self, name: &str) -> Result<Arc<dyn KeyGenerator>, ConfigError> {
        lookup(&self.key_generators, "key generator", name)
    }

    /// Resolve a load-balance algorithm, falling back to the default name
    pub fn load_balance(&self, name: Option<&str>) -> Result<Arc<dyn LoadBalanceAlgorithm>, ConfigError> {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => lookup(&self.load_balancers, "load balance algorithm", name),
            None => {
                let default = self.default_load_balance.read().clone();
                lookup(&self.load_balancers, "load balance algorithm", &default)
            }
        }
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgorithmRegistry")
            .field("precise", &self.precise.read().keys().collect::<Vec<_>>())
            .field("range", &self.range.read().keys().collect::<Vec<_>>())
            .field("complex", &self.complex.read().keys().collect::<Vec<_>>())
            .field("hint", &self.hint.read().keys().collect::<Vec<_>>())
            .field("key_generators", &self.key_generators.read().keys().collect::<Vec<_>>())
            .field("load_balancers", &self.load_balancers.read().keys().collect::<Vec<_>>())
            .finish()
    }
}
