//! Run-wide original → synthetic value mapping.
//!
//! The mapper is a pure function of `(scope, original)` for the lifetime of
//! a run. The hashed strategy derives the generator seed from a keyed digest
//! and keeps no state; the cached strategy remembers every distinct pair and
//! draws fresh seeds from a per-scope generator keyed by the run seed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use desensitizer_config::{ScopeSelector, StrategyKind};
use desensitizer_core::CellValue;

use crate::errors::GeneratorError;
use crate::generators::Generator;

/// Namespace under which equal originals share a synthetic value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MappingScope(Arc<str>);

impl MappingScope {
    pub fn for_type(type_tag: &str) -> Self {
        Self(format!("type:{type_tag}").into())
    }

    /// The table name is length-prefixed so that dots inside identifiers
    /// cannot make two columns share a scope.
    pub fn for_column(table: &str, column: &str) -> Self {
        let table = table.to_lowercase();
        Self(format!("column:{}:{table}.{}", table.len(), column.to_lowercase()).into())
    }

    pub fn global() -> Self {
        Self("global".into())
    }

    pub fn named(name: &str) -> Self {
        Self(format!("named:{name}").into())
    }

    /// Scope a configured column maps under.
    pub fn resolve(selector: &ScopeSelector, table: &str, column: &str, type_tag: &str) -> Self {
        match selector {
            ScopeSelector::Type => Self::for_type(type_tag),
            ScopeSelector::Column => Self::for_column(table, column),
            ScopeSelector::Global => Self::global(),
            ScopeSelector::Named(name) => Self::named(name),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MappingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

enum Strategy {
    Hashed {
        key: u64,
    },
    Cached {
        base_seed: u64,
        scopes: HashMap<MappingScope, ScopeStore>,
        entries: u64,
    },
}

/// Mapping state of one scope. Each scope draws fresh seeds from its own
/// generator so first sightings in one scope never shift another's values.
struct ScopeStore {
    rng: ChaCha8Rng,
    values: HashMap<String, CellValue>,
}

impl ScopeStore {
    fn new(base_seed: u64, scope: &MappingScope) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(keyed_seed(base_seed, scope, "")),
            values: HashMap::new(),
        }
    }
}

/// Owns the mapping state of one run. Never shared between runs.
pub struct ValueMapper {
    strategy: Strategy,
}

impl ValueMapper {
    pub fn new(kind: StrategyKind, seed: Option<u64>) -> Self {
        match kind {
            StrategyKind::Hashed => Self::hashed(seed.unwrap_or_default()),
            StrategyKind::Cached => Self::cached(seed),
        }
    }

    pub fn hashed(key: u64) -> Self {
        Self {
            strategy: Strategy::Hashed { key },
        }
    }

    /// Without a seed the fresh seeds come from OS entropy and the output is
    /// not reproducible.
    pub fn cached(seed: Option<u64>) -> Self {
        let base_seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        Self {
            strategy: Strategy::Cached {
                base_seed,
                scopes: HashMap::new(),
                entries: 0,
            },
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self.strategy {
            Strategy::Hashed { .. } => StrategyKind::Hashed,
            Strategy::Cached { .. } => StrategyKind::Cached,
        }
    }

    /// Synthetic value for `original` under `scope`.
    ///
    /// Null and the empty string are returned unchanged.
    pub fn map(
        &mut self,
        scope: &MappingScope,
        original: &CellValue,
        generator: &dyn Generator,
    ) -> Result<CellValue, GeneratorError> {
        if original.is_vacant() {
            return Ok(original.clone());
        }
        if generator.is_constant() {
            return generator.generate(0);
        }
        let Some(key) = original.mapping_key() else {
            return Ok(original.clone());
        };

        match &mut self.strategy {
            Strategy::Hashed { key: run_key } => {
                generator.generate(keyed_seed(*run_key, scope, &key))
            }
            Strategy::Cached {
                base_seed,
                scopes,
                entries,
            } => {
                let store = scopes
                    .entry(scope.clone())
                    .or_insert_with(|| ScopeStore::new(*base_seed, scope));
                if let Some(value) = store.values.get(key.as_ref()) {
                    return Ok(value.clone());
                }
                let value = generator.generate(store.rng.next_u64())?;
                store.values.insert(key.into_owned(), value.clone());
                *entries += 1;
                Ok(value)
            }
        }
    }

    /// Number of stored pairs; `None` for the stateless hashed strategy.
    pub fn distinct_mappings(&self) -> Option<u64> {
        match &self.strategy {
            Strategy::Hashed { .. } => None,
            Strategy::Cached { entries, .. } => Some(*entries),
        }
    }
}

impl fmt::Debug for ValueMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueMapper")
            .field("strategy", &self.kind())
            .field("distinct_mappings", &self.distinct_mappings())
            .finish()
    }
}

fn keyed_seed(run_key: u64, scope: &MappingScope, mapping_key: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(run_key.to_le_bytes());
    hasher.update(scope.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(mapping_key.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
