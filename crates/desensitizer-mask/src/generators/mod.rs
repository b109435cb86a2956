//! Type tag → generator registry.
//!
//! A generator turns an opaque 64-bit seed into a synthetic value. Equal
//! seeds must yield equal values, which is what lets the mapper make masking
//! consistent without remembering every value it produced.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use desensitizer_core::CellValue;

use crate::errors::{GeneratorError, UnknownTypeError};

pub mod catalog;

/// Produces synthetic values for one semantic type.
pub trait Generator: Send + Sync {
    /// Tag the generator is registered under.
    fn type_tag(&self) -> &str;

    /// Deterministic in `seed`.
    fn generate(&self, seed: u64) -> Result<CellValue, GeneratorError>;

    /// Constant generators ignore their seed, so their output never needs
    /// to be remembered.
    fn is_constant(&self) -> bool {
        false
    }
}

/// Capability-indexed table of generators.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: BTreeMap<String, Arc<dyn Generator>>,
}

impl GeneratorRegistry {
    /// Registry holding the built-in catalogue.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        catalog::register(&mut registry);
        registry
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a generator under its own tag, replacing any previous entry.
    pub fn register_generator(&mut self, generator: Arc<dyn Generator>) {
        self.generators
            .insert(generator.type_tag().to_string(), generator);
    }

    pub fn resolve(&self, type_tag: &str) -> Result<Arc<dyn Generator>, UnknownTypeError> {
        self.generators
            .get(type_tag)
            .cloned()
            .ok_or_else(|| UnknownTypeError(type_tag.to_string()))
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.generators.contains_key(type_tag)
    }

    /// Registered tags in sorted order.
    pub fn type_tags(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("type_tags", &self.generators.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// RNG every catalogue generator draws from.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
