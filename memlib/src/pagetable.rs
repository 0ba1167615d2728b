use serde::{Deserialize, Serialize};

use crate::recency::RecencyList;
use crate::store::SlotDump;
use crate::tlb::Translation;

/// 4KB pages
pub const PAGE_OFFSET_BITS: u32 = 12;
/// 2^14 entries covering 26-bit virtual addresses
pub const PAGE_TABLE_ENTRIES: usize = 1 << 14;
/// 1MB of physical memory
pub const NUM_FRAMES: usize = 256;

/// One entry of the linear page table, indexed directly by VPN
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageTableEntry {
    pub present: bool,
    pub dirty: bool,
    pub ppn: u32,
}

/// A physical frame. The owner is a weak back-reference by VPN, resolved
/// through the page table when the frame is reclaimed
#[derive(Debug, Clone, Copy, Default)]
struct Frame {
    owner: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageTableStats {
    pub accesses: u64,
    pub page_faults: u64,
    pub page_faults_with_dirty_eviction: u64,
}

/// The linear page table plus its physical-frame allocator.
///
/// Every frame lives in exactly one of the free list and the used list; the
/// used list doubles as the LRU ordering for frame eviction. Frames are
/// created once at construction and only move between the two lists
pub struct PageTable {
    table: Vec<PageTableEntry>,
    frames: Vec<Frame>,
    free: RecencyList,
    used: RecencyList,
    stats: PageTableStats,
}

impl Default for PageTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PageTable {
    pub fn new() -> Self {
        Self {
            table: vec![PageTableEntry::default(); PAGE_TABLE_ENTRIES],
            frames: vec![Frame::default(); NUM_FRAMES],
            // linked in ascending order so frames allocate as 0, 1, 2, ...
            free: RecencyList::linked(NUM_FRAMES),
            used: RecencyList::unlinked(NUM_FRAMES),
            stats: PageTableStats::default(),
        }
    }

    /// Looks up a VPN. A present entry refreshes its frame in the used list;
    /// an absent one is a page fault the caller resolves via `handle_fault`
    pub fn lookup(&mut self, vpn: u32) -> Option<Translation> {
        self.stats.accesses += 1;
        let entry = self.table[vpn as usize];
        if !entry.present {
            return None;
        }
        self.used.touch(entry.ppn as usize);
        Some(Translation {
            ppn: entry.ppn,
            dirty: entry.dirty,
        })
    }

    /// Brings the page for `vpn` into memory and returns its frame number.
    ///
    /// A free frame is used if one remains; otherwise the least recently
    /// touched resident page is evicted, accounting a dirty eviction when its
    /// entry was dirty. Both lists being empty cannot happen once the
    /// allocator holds any frames, so that state aborts rather than erroring
    pub fn handle_fault(&mut self, vpn: u32) -> u32 {
        self.stats.page_faults += 1;

        let frame_id = match self.free.pop_head() {
            Some(frame_id) => frame_id,
            None => {
                let victim = match self.used.tail() {
                    Some(victim) => victim,
                    None => panic!(
                        "frame allocator invariant violated: free and used lists are both empty"
                    ),
                };
                self.used.remove(victim);
                if let Some(owner) = self.frames[victim].owner {
                    let entry = &mut self.table[owner as usize];
                    if entry.dirty {
                        self.stats.page_faults_with_dirty_eviction += 1;
                        // the page would be written to disk here; only the
                        // dirty transition is modelled
                        entry.dirty = false;
                    }
                    entry.present = false;
                }
                victim
            }
        };

        let entry = &mut self.table[vpn as usize];
        entry.present = true;
        entry.dirty = false;
        entry.ppn = frame_id as u32;
        self.frames[frame_id].owner = Some(vpn);
        self.used.insert_head(frame_id);
        frame_id as u32
    }

    /// Sets the dirty bit for a present VPN; silently does nothing otherwise
    pub fn mark_dirty(&mut self, vpn: u32) {
        let entry = &mut self.table[vpn as usize];
        if entry.present {
            entry.dirty = true;
        }
    }

    pub fn stats(&self) -> &PageTableStats {
        &self.stats
    }

    pub fn entry(&self, vpn: u32) -> &PageTableEntry {
        &self.table[vpn as usize]
    }

    pub fn free_frames(&self) -> usize {
        self.free.len()
    }

    /// The present entries in VPN order for the verbose dump
    pub fn entries(&self) -> Vec<SlotDump> {
        self.table
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.present)
            .map(|(vpn, entry)| SlotDump {
                valid: true,
                dirty: entry.dirty,
                key: Some(vpn as u32),
                value: Some(entry.ppn),
            })
            .collect()
    }
}
