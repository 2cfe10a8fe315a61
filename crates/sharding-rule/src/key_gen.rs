//! Key generator contract and its binding to a table column

use std::sync::Arc;

/// Produces distributed-unique key values
///
/// The generation algorithm is supplied by the embedder and registered in
/// the [`AlgorithmRegistry`](crate::AlgorithmRegistry).
pub trait KeyGenerator: Send + Sync {
    fn generate_key(&self) -> i64;
}

/// A generated-key column together with the generator that fills it
#[derive(Clone)]
pub struct KeyGeneratorBinding {
    column: String,
    generator: Arc<dyn KeyGenerator>,
}

impl KeyGeneratorBinding {
    pub fn new(column: impl Into<String>, generator: Arc<dyn KeyGenerator>) -> Self {
        Self {
            column: column.into(),
            generator,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn generator(&self) -> &Arc<dyn KeyGenerator> {
        &self.generator
    }

    pub fn generate_key(&self) -> i64 {
        self.generator.generate_key()
    }
}

impl std::fmt::Debug for KeyGeneratorBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyGeneratorBinding")
            .field("column", &self.column)
            .finish_non_exhaustive()
    }
}
