use std::io::Read;

use serde::Deserialize;

use crate::error::ConfigError;

/// The hierarchy supports exactly one or two cache levels
pub const MAX_CACHE_LEVELS: usize = 2;

/// A full simulation configuration: one or two cache levels plus a TLB
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    pub caches: Vec<CacheLevelConfig>,
    pub tlb: TlbConfig,
}

/// A configuration for a single cache level
#[derive(Debug, Clone, Deserialize)]
pub struct CacheLevelConfig {
    pub name: String,
    pub size: u32,
    pub block_size: u32,
    pub associativity: Associativity,
}

/// A TLB configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TlbConfig {
    pub entries: u32,
    pub associativity: Associativity,
}

/// How slots share sets - direct, full, 2way, or 4way
///
/// Direct-mapped is one way per set; fully-associative is one set holding
/// every way
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub enum Associativity {
    #[serde(alias = "direct")]
    Direct,
    #[serde(alias = "full")]
    Full,
    #[serde(alias = "2way")]
    TwoWay,
    #[serde(alias = "4way")]
    FourWay,
}

impl Associativity {
    /// The number of ways sharing one set in a store of `capacity` slots
    pub fn ways(self, capacity: u32) -> u32 {
        match self {
            Associativity::Direct => 1,
            Associativity::Full => capacity,
            Associativity::TwoWay => 2,
            Associativity::FourWay => 4,
        }
    }
}

impl SimConfig {
    /// Reads a configuration from its JSON form
    pub fn from_json(reader: impl Read) -> Result<Self, ConfigError> {
        serde_json::from_reader(reader).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Checks every constraint the simulator relies on. Construction of the
    /// individual components re-derives the geometric ones, but rejecting
    /// here means no partially-built simulator is ever observable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.caches.is_empty() || self.caches.len() > MAX_CACHE_LEVELS {
            return Err(ConfigError::BadLevelCount(self.caches.len()));
        }
        for cache in &self.caches {
            cache.validate()?;
        }
        for (i, pair) in self.caches.windows(2).enumerate() {
            let (inner, outer) = (&pair[0], &pair[1]);
            if outer.size < inner.size {
                return Err(ConfigError::ShrinkingLevelSize {
                    level: i + 2,
                    size: outer.size,
                    prev_level: i + 1,
                    prev_size: inner.size,
                });
            }
            if outer.block_size < inner.block_size {
                return Err(ConfigError::ShrinkingBlockSize {
                    level: i + 2,
                    block: outer.block_size,
                    prev_level: i + 1,
                    prev_block: inner.block_size,
                });
            }
        }
        self.tlb.validate()
    }
}

impl CacheLevelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 || self.size % 4 != 0 {
            return Err(ConfigError::BadCacheSize(self.size));
        }
        if self.block_size < 4 || self.block_size % 4 != 0 {
            return Err(ConfigError::BadBlockSize(self.block_size));
        }
        if !self.block_size.is_power_of_two() {
            return Err(ConfigError::BlockNotPowerOfTwo(self.block_size));
        }
        if self.block_size > self.size {
            return Err(ConfigError::BlockLargerThanCache {
                block: self.block_size,
                size: self.size,
            });
        }
        let capacity = self.size / self.block_size;
        let ways = self.associativity.ways(capacity);
        if capacity % ways != 0 {
            return Err(ConfigError::CapacityNotWayDivisible { capacity, ways });
        }
        Ok(())
    }
}

impl TlbConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entries < 2 || !self.entries.is_power_of_two() {
            return Err(ConfigError::BadTlbEntries(self.entries));
        }
        let ways = self.associativity.ways(self.entries);
        if self.entries % ways != 0 {
            return Err(ConfigError::CapacityNotWayDivisible {
                capacity: self.entries,
                ways,
            });
        }
        Ok(())
    }
}
