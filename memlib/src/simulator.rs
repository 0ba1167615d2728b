use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cache::{Cache, CacheOutcome, CacheStats};
use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::multilevel::{HierarchyOutcome, MultiLevelCache};
use crate::pagetable::{PageTable, PageTableStats, PAGE_OFFSET_BITS};
use crate::tlb::{Tlb, TlbStats};
use crate::trace::{AccessMode, TraceEvent};

/// How the TLB answered an access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlbQuery {
    Hit,
    Miss,
}

/// How the page table answered an access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageQuery {
    Hit,
    Fault,
}

/// How the cache side of an access resolved: a plain hit/miss for a
/// single-level cache, or the hit level (if any) for a hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheQuery {
    Single(CacheOutcome),
    Levelled {
        hit_level: Option<usize>,
        levels: usize,
    },
}

/// Everything observed for one trace entry, consumed by the verbose printer.
/// The page table field is `None` when the TLB already supplied the
/// translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRecord {
    pub mode: AccessMode,
    pub vaddr: u32,
    pub paddr: u32,
    pub tlb: TlbQuery,
    pub page_table: Option<PageQuery>,
    pub cache: CacheQuery,
}

impl fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            AccessMode::Read => 'R',
            AccessMode::Write => 'W',
        };
        write!(f, "{mode} {:#010x} {:#010x} ", self.vaddr, self.paddr)?;
        match self.tlb {
            TlbQuery::Hit => write!(f, "TLB-HIT ")?,
            TlbQuery::Miss => write!(f, "TLB-MISS ")?,
        }
        match self.page_table {
            None => write!(f, "- ")?,
            Some(PageQuery::Hit) => write!(f, "PAGE-HIT ")?,
            Some(PageQuery::Fault) => write!(f, "PAGE-FAULT ")?,
        }
        match self.cache {
            CacheQuery::Single(CacheOutcome::Hit) => write!(f, "CACHE-HIT"),
            CacheQuery::Single(CacheOutcome::Miss) => write!(f, "CACHE-MISS"),
            CacheQuery::Levelled { hit_level, levels } => {
                let consulted = hit_level.map_or(levels, |hit| hit + 1);
                for level in 0..consulted {
                    if level > 0 {
                        write!(f, " ")?;
                    }
                    if hit_level == Some(level) {
                        write!(f, "L{}-HIT", level + 1)?;
                    } else {
                        write!(f, "L{}-MISS", level + 1)?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// The statistics of a finished (or in-flight) simulation. Serialises to the
/// reported output format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimReport {
    pub tlb: TlbStats,
    pub page_table: PageTableStats,
    pub caches: Vec<CacheLevelReport>,
}

/// Statistics for one cache level. `level_accesses` only appears for levels
/// beyond the first; the first level's figure is its own `accesses` counter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheLevelReport {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_accesses: Option<u64>,
    #[serde(flatten)]
    pub stats: CacheStats,
}

enum Hierarchy {
    Single(Cache),
    Multi(MultiLevelCache),
}

/// The owned simulation context: TLB, page table, and cache hierarchy.
///
/// One instance holds all mutable state for a run and is driven one trace
/// event at a time, so the whole pipeline is single-writer by construction
pub struct Simulator {
    tlb: Tlb,
    page_table: PageTable,
    hierarchy: Hierarchy,
}

impl Simulator {
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let tlb = Tlb::new(&config.tlb)?;
        let mut caches = config
            .caches
            .iter()
            .map(Cache::new)
            .collect::<Result<Vec<_>, _>>()?;
        let hierarchy = if caches.len() == 1 {
            Hierarchy::Single(caches.remove(0))
        } else {
            Hierarchy::Multi(MultiLevelCache::new(caches))
        };
        Ok(Self {
            tlb,
            page_table: PageTable::new(),
            hierarchy,
        })
    }

    /// Runs one trace event through translation and the cache hierarchy.
    ///
    /// The TLB is consulted first; on a miss the page table resolves the
    /// translation (faulting a page in if necessary) and the TLB is refilled.
    /// On a TLB hit the page table is still touched once so the frame's LRU
    /// position tracks the access, but the record reports it as not
    /// consulted. Writes propagate the dirty bit to both structures
    pub fn step(&mut self, event: TraceEvent) -> AccessRecord {
        let is_write = event.mode.is_write();
        let vpn = event.vaddr >> PAGE_OFFSET_BITS;
        let offset = event.vaddr & ((1 << PAGE_OFFSET_BITS) - 1);

        let (ppn, tlb_query, page_query) = match self.tlb.lookup(vpn) {
            Some(translation) => {
                let _ = self.page_table.lookup(vpn);
                (translation.ppn, TlbQuery::Hit, None)
            }
            None => {
                let (ppn, page_query) = match self.page_table.lookup(vpn) {
                    Some(translation) => (translation.ppn, PageQuery::Hit),
                    None => (self.page_table.handle_fault(vpn), PageQuery::Fault),
                };
                self.tlb.insert(vpn, ppn);
                (ppn, TlbQuery::Miss, Some(page_query))
            }
        };

        if is_write {
            self.tlb.mark_dirty(vpn);
            self.page_table.mark_dirty(vpn);
        }

        let paddr = (ppn << PAGE_OFFSET_BITS) | offset;
        let cache = match &mut self.hierarchy {
            Hierarchy::Single(cache) => CacheQuery::Single(cache.access(paddr, is_write)),
            Hierarchy::Multi(multi) => {
                let levels = multi.levels().len();
                let hit_level = match multi.access(paddr, is_write) {
                    HierarchyOutcome::Hit { level } => Some(level),
                    HierarchyOutcome::Miss => None,
                };
                CacheQuery::Levelled { hit_level, levels }
            }
        };

        AccessRecord {
            mode: event.mode,
            vaddr: event.vaddr,
            paddr,
            tlb: tlb_query,
            page_table: page_query,
            cache,
        }
    }

    /// Runs every event through the simulator and returns the statistics.
    /// The CLI drives [`Simulator::step`] itself so it can stream verbose
    /// records; this is the convenient path for tests and benchmarks
    pub fn simulate<I>(&mut self, events: I) -> SimReport
    where
        I: IntoIterator<Item = TraceEvent>,
    {
        for event in events {
            self.step(event);
        }
        self.report()
    }

    pub fn report(&self) -> SimReport {
        let caches = match &self.hierarchy {
            Hierarchy::Single(cache) => vec![CacheLevelReport {
                name: cache.name().to_owned(),
                level_accesses: None,
                stats: cache.stats().clone(),
            }],
            Hierarchy::Multi(multi) => multi
                .levels()
                .iter()
                .enumerate()
                .map(|(level, cache)| CacheLevelReport {
                    name: cache.name().to_owned(),
                    level_accesses: (level > 0).then(|| multi.level_accesses(level)),
                    stats: cache.stats().clone(),
                })
                .collect(),
        };
        SimReport {
            tlb: self.tlb.stats().clone(),
            page_table: self.page_table.stats().clone(),
            caches,
        }
    }

    pub fn tlb(&self) -> &Tlb {
        &self.tlb
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn caches(&self) -> &[Cache] {
        match &self.hierarchy {
            Hierarchy::Single(cache) => std::slice::from_ref(cache),
            Hierarchy::Multi(multi) => multi.levels(),
        }
    }
}
