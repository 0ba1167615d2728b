use std::fmt;

use crate::config::Associativity;
use crate::error::ConfigError;
use crate::recency::RecencyList;

/// Width of the keys handed to a store. Cache stores decompose full 32-bit
/// physical addresses; the TLB store decomposes page numbers but keeps the
/// same nominal width
pub const ADDRESS_BITS: u32 = 32;

/// The shape of a set-associative store: how many sets and ways it has and
/// how a key splits into tag, index, and offset fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub total_capacity: u32,
    pub num_sets: u32,
    pub ways_per_set: u32,
    pub offset_bits: u32,
    pub index_bits: u32,
    pub tag_bits: u32,
}

/// A key split into its geometry fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyParts {
    pub tag: u32,
    pub index: u32,
    pub offset: u32,
}

impl Geometry {
    /// Derives the geometry for `capacity` slots at the given associativity.
    ///
    /// Direct-mapped puts every slot in its own set, fully-associative puts
    /// every slot in one set, and the N-way modes split evenly. Construction
    /// fails when the split is impossible or would produce an unusable index
    /// mask; everything downstream assumes a validated geometry
    pub fn new(
        capacity: u32,
        associativity: Associativity,
        offset_bits: u32,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        let ways_per_set = associativity.ways(capacity);
        if capacity % ways_per_set != 0 {
            return Err(ConfigError::CapacityNotWayDivisible {
                capacity,
                ways: ways_per_set,
            });
        }
        let num_sets = capacity / ways_per_set;
        if !num_sets.is_power_of_two() {
            return Err(ConfigError::SetsNotPowerOfTwo(num_sets));
        }
        // A fully-associative store has one set and therefore zero index bits,
        // so the index is always 0 no matter what the key holds
        let index_bits = num_sets.trailing_zeros();
        debug_assert!(offset_bits + index_bits < ADDRESS_BITS);
        Ok(Self {
            total_capacity: capacity,
            num_sets,
            ways_per_set,
            offset_bits,
            index_bits,
            tag_bits: ADDRESS_BITS - offset_bits - index_bits,
        })
    }

    /// Splits a key into tag, set index, and block offset
    pub fn decompose(&self, key: u32) -> KeyParts {
        let offset = key & ((1 << self.offset_bits) - 1);
        let index = (key >> self.offset_bits) & ((1 << self.index_bits) - 1);
        let tag = key >> (self.offset_bits + self.index_bits);
        KeyParts { tag, index, offset }
    }

    /// Rebuilds the block-aligned key a `(tag, index)` pair came from
    pub fn reconstruct(&self, tag: u32, index: u32) -> u32 {
        ((tag << self.index_bits) | index) << self.offset_bits
    }
}

/// One slot of an associative store: a cache line, TLB entry, or any other
/// tagged payload. Invalid slots carry no meaningful tag or payload
#[derive(Debug, Clone)]
pub struct Slot<P> {
    pub valid: bool,
    pub dirty: bool,
    pub tag: u32,
    pub payload: P,
}

/// A displaced valid-and-dirty slot, returned from `install` as the
/// write-back signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evicted<P> {
    pub tag: u32,
    pub payload: P,
}

/// A fixed-capacity set-associative container with LRU replacement.
///
/// This is the one replacement-and-geometry engine shared by the hardware
/// cache and the TLB; only the payload type and key width differ between
/// them. Slots live in one set-major arena and each multi-way set keeps a
/// [`RecencyList`] over its way indices. Direct-mapped sets have no
/// replacement choice and never allocate or touch a recency list
pub struct AssocStore<P> {
    geometry: Geometry,
    slots: Vec<Slot<P>>,
    recency: Vec<Option<RecencyList>>,
}

impl<P: Default> AssocStore<P> {
    pub fn new(
        capacity: u32,
        associativity: Associativity,
        offset_bits: u32,
    ) -> Result<Self, ConfigError> {
        let geometry = Geometry::new(capacity, associativity, offset_bits)?;
        let slots = (0..capacity)
            .map(|_| Slot {
                valid: false,
                dirty: false,
                tag: 0,
                payload: P::default(),
            })
            .collect();
        let recency = (0..geometry.num_sets)
            .map(|_| {
                if geometry.ways_per_set > 1 {
                    Some(RecencyList::linked(geometry.ways_per_set as usize))
                } else {
                    None
                }
            })
            .collect();
        Ok(Self {
            geometry,
            slots,
            recency,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn decompose(&self, key: u32) -> KeyParts {
        self.geometry.decompose(key)
    }

    /// Whether any set carries a recency list. Direct-mapped stores never do
    pub fn uses_recency(&self) -> bool {
        self.recency.iter().any(Option::is_some)
    }

    fn position(&self, index: u32, way: u32) -> usize {
        (index * self.geometry.ways_per_set + way) as usize
    }

    pub fn slot(&self, index: u32, way: u32) -> &Slot<P> {
        &self.slots[self.position(index, way)]
    }

    pub fn slot_mut(&mut self, index: u32, way: u32) -> &mut Slot<P> {
        let pos = self.position(index, way);
        &mut self.slots[pos]
    }

    /// Finds the way holding `tag` in the given set, if it is resident
    pub fn find(&self, index: u32, tag: u32) -> Option<u32> {
        let base = self.position(index, 0);
        let ways = self.geometry.ways_per_set as usize;
        self.slots[base..base + ways]
            .iter()
            .position(|slot| slot.valid && slot.tag == tag)
            .map(|way| way as u32)
    }

    /// Marks a way most recently used within its set
    pub fn touch(&mut self, index: u32, way: u32) {
        if let Some(list) = &mut self.recency[index as usize] {
            list.touch(way as usize);
        }
    }

    /// Picks the way to replace: the first invalid way in scan order, else
    /// the sole way of a direct-mapped set, else the recency tail
    pub fn select_victim(&self, index: u32) -> u32 {
        let base = self.position(index, 0);
        let ways = self.geometry.ways_per_set as usize;
        if let Some(way) = self.slots[base..base + ways].iter().position(|s| !s.valid) {
            return way as u32;
        }
        match &self.recency[index as usize] {
            None => 0,
            Some(list) => list
                .tail()
                .expect("multi-way set with an empty recency list") as u32,
        }
    }

    /// Overwrites a way with a new tag and payload and touches it. If the
    /// way held a valid dirty slot, the displaced contents are returned so
    /// the caller can account for the write-back
    pub fn install(
        &mut self,
        index: u32,
        way: u32,
        tag: u32,
        payload: P,
        dirty: bool,
    ) -> Option<Evicted<P>> {
        let pos = self.position(index, way);
        let slot = &mut self.slots[pos];
        let displaced_tag = slot.tag;
        let displaced_dirty = slot.valid && slot.dirty;
        let displaced_payload = std::mem::replace(&mut slot.payload, payload);
        slot.valid = true;
        slot.dirty = dirty;
        slot.tag = tag;
        self.touch(index, way);
        displaced_dirty.then_some(Evicted {
            tag: displaced_tag,
            payload: displaced_payload,
        })
    }

    /// Every slot in storage order (set-major, way-minor), with its set and
    /// way coordinates. This is the ordering used by the verbose entry dumps
    pub fn slots(&self) -> impl Iterator<Item = (u32, u32, &Slot<P>)> {
        let ways = self.geometry.ways_per_set;
        self.slots
            .iter()
            .enumerate()
            .map(move |(i, slot)| (i as u32 / ways, i as u32 % ways, slot))
    }
}

/// One slot rendered for the verbose entry dump. Absent slots keep the key
/// and value fields empty so the dump shows a placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDump {
    pub valid: bool,
    pub dirty: bool,
    pub key: Option<u32>,
    pub value: Option<u32>,
}

impl fmt::Display for SlotDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.valid as u8, self.dirty as u8)?;
        match (self.key, self.value) {
            (Some(key), Some(value)) => write!(f, " {key:#07x} {value:#07x}"),
            _ => write!(f, " - -"),
        }
    }
}
