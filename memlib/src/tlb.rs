use serde::{Deserialize, Serialize};

use crate::config::TlbConfig;
use crate::error::ConfigError;
use crate::store::{AssocStore, Geometry, SlotDump};

/// A page-number translation handed back by the TLB or the page table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub ppn: u32,
    pub dirty: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TlbStats {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
}

/// The translation-lookaside buffer.
///
/// Same engine as the cache, but keyed on page numbers: the 12-bit page
/// offset never reaches the store, so its own offset field is zero bits wide
/// and the VPN splits into tag and set index only
pub struct Tlb {
    store: AssocStore<u32>,
    stats: TlbStats,
}

impl Tlb {
    pub fn new(config: &TlbConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store: AssocStore::new(config.entries, config.associativity, 0)?,
            stats: TlbStats::default(),
        })
    }

    /// Looks up a VPN, refreshing its recency on a hit
    pub fn lookup(&mut self, vpn: u32) -> Option<Translation> {
        self.stats.accesses += 1;
        let parts = self.store.decompose(vpn);
        match self.store.find(parts.index, parts.tag) {
            Some(way) => {
                self.stats.hits += 1;
                let slot = self.store.slot(parts.index, way);
                let translation = Translation {
                    ppn: slot.payload,
                    dirty: slot.dirty,
                };
                self.store.touch(parts.index, way);
                Some(translation)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Caches a VPN-to-PPN translation.
    ///
    /// A resident VPN has its PPN updated in place, keeping its dirty bit;
    /// otherwise the victim way is overwritten with a clean entry. Either
    /// path leaves the entry most recently used. Inserts are not counted as
    /// accesses
    pub fn insert(&mut self, vpn: u32, ppn: u32) {
        let parts = self.store.decompose(vpn);
        if let Some(way) = self.store.find(parts.index, parts.tag) {
            self.store.slot_mut(parts.index, way).payload = ppn;
            self.store.touch(parts.index, way);
            return;
        }
        let victim = self.store.select_victim(parts.index);
        // evicted translations need no write-back; the page table holds the
        // authoritative dirty state
        self.store.install(parts.index, victim, parts.tag, ppn, false);
    }

    /// Sets the dirty bit for a resident VPN; silently does nothing when the
    /// translation is absent
    pub fn mark_dirty(&mut self, vpn: u32) {
        let parts = self.store.decompose(vpn);
        if let Some(way) = self.store.find(parts.index, parts.tag) {
            self.store.slot_mut(parts.index, way).dirty = true;
        }
    }

    pub fn geometry(&self) -> &Geometry {
        self.store.geometry()
    }

    pub fn stats(&self) -> &TlbStats {
        &self.stats
    }

    /// Every entry in storage order for the verbose dump, with the full VPN
    /// rebuilt from tag and set index
    pub fn entries(&self) -> Vec<SlotDump> {
        let geometry = *self.store.geometry();
        self.store
            .slots()
            .map(|(set, _, slot)| {
                if slot.valid {
                    SlotDump {
                        valid: true,
                        dirty: slot.dirty,
                        key: Some(geometry.reconstruct(slot.tag, set)),
                        value: Some(slot.payload),
                    }
                } else {
                    SlotDump {
                        valid: false,
                        dirty: false,
                        key: None,
                        value: None,
                    }
                }
            })
            .collect()
    }
}
