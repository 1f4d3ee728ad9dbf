//! LRU-K (K=2) replacement engine.
//!
//! Two ordered lists back the engine:
//! - a probationary FIFO, bounded by entry count, where every new key starts;
//! - the main LRU, bounded only by the shared byte budget, reached on the
//!   key's second access.
//!
//! Ordering is tracked with a monotonic tick per entry: each list is a
//! `BTreeMap<u64, String>` from tick to key, so the coldest entry is always
//! the smallest tick and move-to-front is a remove + reinsert at a fresh
//! tick. Lookups go through a companion `HashMap` that also records which
//! list currently holds the key.

use std::collections::{BTreeMap, HashMap};

use anyhow::{bail, Result};

use super::view::ByteView;

/// Default bound on the probationary FIFO, in entries.
pub const DEFAULT_FIFO_ENTRIES: usize = 10;

/// Callback invoked after an entry has been evicted and its bytes released.
pub type EvictionHook = Box<dyn Fn(&str, &ByteView) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    /// Entry is on probation; a second access promotes it.
    Fifo,
    /// Entry has proven itself and lives in the main LRU.
    Main,
}

struct Slot {
    value: ByteView,
    tick: u64,
    segment: Segment,
}

pub struct LrukCache {
    max_bytes: usize,
    used_bytes: usize,
    fifo_max_entries: usize,
    tick: u64,
    /// Main LRU recency order: smallest tick is the coldest entry.
    main_order: BTreeMap<u64, String>,
    /// Probationary insertion order: smallest tick is the oldest entry.
    fifo_order: BTreeMap<u64, String>,
    slots: HashMap<String, Slot>,
    on_evict: EvictionHook,
}

impl LrukCache {
    pub fn new(max_bytes: usize, fifo_max_entries: usize, on_evict: Option<EvictionHook>) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            fifo_max_entries,
            tick: 0,
            main_order: BTreeMap::new(),
            fifo_order: BTreeMap::new(),
            slots: HashMap::new(),
            on_evict: on_evict.unwrap_or_else(|| Box::new(|_, _| {})),
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Looks up a key, refreshing its recency. A hit in the probationary
    /// FIFO is the key's second access and promotes it into the main LRU;
    /// sizes do not change on promotion.
    pub fn get(&mut self, key: &str) -> Option<ByteView> {
        let (old_tick, segment) = {
            let slot = self.slots.get(key)?;
            (slot.tick, slot.segment)
        };

        match segment {
            Segment::Fifo => {
                self.fifo_order.remove(&old_tick);
            }
            Segment::Main => {
                self.main_order.remove(&old_tick);
            }
        }

        let tick = self.next_tick();
        self.main_order.insert(tick, key.to_string());

        let slot = self.slots.get_mut(key).expect("slot vanished during get");
        slot.tick = tick;
        slot.segment = Segment::Main;
        Some(slot.value.clone())
    }

    /// Inserts or updates a key.
    ///
    /// A value that cannot fit in the cache at all is rejected without
    /// mutating any state. An update to a key already in the main LRU moves
    /// it to the front and re-balances the byte budget from the main tail.
    /// An update to a probationary key counts as its second access: the key
    /// is promoted first, then updated. A brand-new key enters the FIFO
    /// front after making room in both the entry and byte budgets.
    pub fn add(&mut self, key: &str, value: ByteView) -> Result<()> {
        if key.len() + value.len() > self.max_bytes {
            bail!("add exceeds max capacity");
        }

        match self.slots.get(key).map(|slot| slot.segment) {
            Some(Segment::Main) => {
                self.update_resident(key, value);
                while self.used_bytes > self.max_bytes && self.evict_main_tail() {}
            }
            Some(Segment::Fifo) => {
                self.promote(key);
                self.update_resident(key, value);
                while self.used_bytes > self.max_bytes && self.remove_oldest() {}
            }
            None => {
                while self.fifo_order.len() >= self.fifo_max_entries && self.evict_fifo_tail() {}

                let size = key.len() + value.len();
                while self.used_bytes + size > self.max_bytes && self.remove_oldest() {}

                let tick = self.next_tick();
                self.fifo_order.insert(tick, key.to_string());
                self.slots.insert(
                    key.to_string(),
                    Slot {
                        value,
                        tick,
                        segment: Segment::Fifo,
                    },
                );
                self.used_bytes += size;
            }
        }
        Ok(())
    }

    /// Replaces the value of a key already in the main LRU, moving it to the
    /// front and adjusting `used_bytes` by the size delta.
    fn update_resident(&mut self, key: &str, value: ByteView) {
        let tick = self.next_tick();
        let slot = self
            .slots
            .get_mut(key)
            .expect("update_resident on absent key");
        let old_tick = slot.tick;
        let old_len = slot.value.len();
        let new_len = value.len();
        slot.value = value;
        slot.tick = tick;

        self.main_order.remove(&old_tick);
        self.main_order.insert(tick, key.to_string());
        self.used_bytes = self.used_bytes - old_len + new_len;
    }

    /// Moves a probationary key into the main LRU at the front. Sizes are
    /// unchanged; the entry keeps its value.
    fn promote(&mut self, key: &str) {
        let old_tick = match self.slots.get(key) {
            Some(slot) => slot.tick,
            None => return,
        };
        self.fifo_order.remove(&old_tick);

        let tick = self.next_tick();
        if let Some(slot) = self.slots.get_mut(key) {
            slot.tick = tick;
            slot.segment = Segment::Main;
        }
        self.main_order.insert(tick, key.to_string());
    }

    /// Evicts one entry, preferring the probationary FIFO tail over the main
    /// LRU tail. Returns false when the cache is empty.
    pub fn remove_oldest(&mut self) -> bool {
        if self.evict_fifo_tail() {
            return true;
        }
        self.evict_main_tail()
    }

    fn evict_fifo_tail(&mut self) -> bool {
        match self.fifo_order.pop_first() {
            Some((_, key)) => {
                self.evict_entry(&key);
                true
            }
            None => false,
        }
    }

    fn evict_main_tail(&mut self) -> bool {
        match self.main_order.pop_first() {
            Some((_, key)) => {
                self.evict_entry(&key);
                true
            }
            None => false,
        }
    }

    /// Removes the entry from the slot map and releases its bytes before the
    /// eviction hook observes it.
    fn evict_entry(&mut self, key: &str) {
        let Some(slot) = self.slots.remove(key) else {
            return;
        };
        self.used_bytes -= key.len() + slot.value.len();
        (self.on_evict)(key, &slot.value);
    }

    /// Total entries across both lists.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Entries currently on probation.
    pub fn fifo_len(&self) -> usize {
        self.fifo_order.len()
    }

    /// Entries currently in the main LRU.
    pub fn main_len(&self) -> usize {
        self.main_order.len()
    }

    #[cfg(test)]
    pub(crate) fn contains_fifo(&self, key: &str) -> bool {
        self.slots
            .get(key)
            .map(|slot| slot.segment == Segment::Fifo)
            .unwrap_or(false)
    }

    #[cfg(test)]
    pub(crate) fn contains_main(&self, key: &str) -> bool {
        self.slots
            .get(key)
            .map(|slot| slot.segment == Segment::Main)
            .unwrap_or(false)
    }
}
