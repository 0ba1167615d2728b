use serde::{Deserialize, Serialize};

use crate::config::CacheLevelConfig;
use crate::error::ConfigError;
use crate::store::{AssocStore, Geometry};

/// The outcome of a single cache access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

/// Per-cache counters, updated on every access.
///
/// `write_backs` counts dirty evictions; no memory contents are modelled,
/// but the write-back events themselves are exact
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheStats {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub reads: u64,
    pub read_hits: u64,
    pub writes: u64,
    pub write_hits: u64,
    pub write_backs: u64,
}

/// A write-back, write-allocate hardware cache.
///
/// All associativities run through the same [`AssocStore`]; the block
/// payload is a unit placeholder since the simulation tracks tags and state
/// bits, not data
pub struct Cache {
    name: String,
    store: AssocStore<()>,
    block_size: u32,
    stats: CacheStats,
}

impl Cache {
    pub fn new(config: &CacheLevelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let capacity = config.size / config.block_size;
        let offset_bits = config.block_size.trailing_zeros();
        Ok(Self {
            name: config.name.clone(),
            store: AssocStore::new(capacity, config.associativity, offset_bits)?,
            block_size: config.block_size,
            stats: CacheStats::default(),
        })
    }

    /// Performs one access against the cache.
    ///
    /// A hit refreshes recency and, for writes, marks the line dirty. A miss
    /// selects a victim (invalid ways first, then LRU), accounts a write-back
    /// if the victim was dirty, and installs the new line - dirty from the
    /// start on a write miss, clean on a read miss
    pub fn access(&mut self, addr: u32, is_write: bool) -> CacheOutcome {
        self.stats.accesses += 1;
        if is_write {
            self.stats.writes += 1;
        } else {
            self.stats.reads += 1;
        }

        let parts = self.store.decompose(addr);
        if let Some(way) = self.store.find(parts.index, parts.tag) {
            self.stats.hits += 1;
            if is_write {
                self.stats.write_hits += 1;
                self.store.slot_mut(parts.index, way).dirty = true;
            } else {
                self.stats.read_hits += 1;
            }
            self.store.touch(parts.index, way);
            return CacheOutcome::Hit;
        }

        self.stats.misses += 1;
        let victim = self.store.select_victim(parts.index);
        if self
            .store
            .install(parts.index, victim, parts.tag, (), is_write)
            .is_some()
        {
            self.stats.write_backs += 1;
        }
        CacheOutcome::Miss
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &Geometry {
        self.store.geometry()
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Whether the cache carries any recency bookkeeping; direct-mapped
    /// caches never do
    pub fn uses_recency(&self) -> bool {
        self.store.uses_recency()
    }
}
