// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The sparse slot allocator.
//!
//! Slots are handed out lowest-first. A freed slot below the current used
//! count is a hole and is reused before the allocator grows; compaction moves
//! live slots down into the holes.

use super::bitset::SlotBitset;
use super::Slot;
use serde::Deserialize;

/// Growth parameters for a [`SparseAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AllocatorSettings {
    /// Capacity reserved by the first growth.
    pub initial_capacity: usize,
    /// Below this capacity the allocator doubles; above it, it grows by 25%.
    pub doubling_limit: usize,
    /// Hard ceiling. Needing more slots than this is an "index full" panic.
    pub max_capacity: usize,
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        Self {
            initial_capacity: 8,
            doubling_limit: 4096,
            max_capacity: Slot::MAX as usize,
        }
    }
}

/// Occupancy figures for one sparse aspect.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AllocatorStats {
    /// Used slots.
    pub length: usize,
    /// Reserved slots.
    pub capacity: usize,
    /// One past the highest used slot.
    pub high_water: usize,
    /// Free slots below the high-water mark.
    pub holes: usize,
    /// `holes / high_water`, or 0 when nothing is used.
    pub fragmentation: f32,
}

/// A bitset-backed slot allocator with reuse and amortized growth.
#[derive(Debug, Clone, Default)]
pub struct SparseAllocator {
    length: usize,
    capacity: usize,
    used: SlotBitset,
    settings: AllocatorSettings,
}

impl SparseAllocator {
    /// Creates an empty allocator with no reserved slots.
    pub fn new(settings: AllocatorSettings) -> Self {
        Self {
            length: 0,
            capacity: 0,
            used: SlotBitset::new(),
            settings,
        }
    }

    /// Number of used slots.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if no slot is used.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of reserved slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The growth parameters.
    pub fn settings(&self) -> &AllocatorSettings {
        &self.settings
    }

    /// Returns `true` if `slot` is used.
    pub fn is_used(&self, slot: Slot) -> bool {
        self.used.is_set(slot)
    }

    /// Iterates over used slots in ascending order.
    pub fn iter_used(&self) -> impl Iterator<Item = Slot> + '_ {
        self.used.iter_ones()
    }

    /// A free slot below the used count, if one exists.
    pub fn reuse(&self) -> Option<Slot> {
        self.used.first_clear(self.length as Slot)
    }

    fn next_capacity(&self) -> usize {
        let settings = &self.settings;
        let wanted = if self.capacity == 0 {
            settings.initial_capacity.max(1)
        } else if self.capacity < settings.doubling_limit {
            self.capacity * 2
        } else {
            self.capacity + (self.capacity / 4).max(1)
        };

        if wanted <= settings.max_capacity {
            wanted
        } else if self.capacity < settings.max_capacity {
            settings.max_capacity
        } else {
            panic!(
                "index full: sparse allocator is at its maximum capacity of {} slots",
                settings.max_capacity
            );
        }
    }

    /// Returns the lowest unused slot, growing first if every reserved slot
    /// is used. The slot is not marked; call [`mark_used`](Self::mark_used).
    ///
    /// `on_grow` receives the new capacity each time the allocator grows, so
    /// the owner can resize its storage before touching the slot.
    ///
    /// # Panics
    /// Panics with "index full" when growth would exceed `max_capacity`.
    pub fn allocate_slot(&mut self, mut on_grow: impl FnMut(usize)) -> Slot {
        loop {
            if let Some(slot) = self.used.first_clear(self.capacity as Slot) {
                return slot;
            }
            let capacity = self.next_capacity();
            log::debug!(
                "Sparse allocator growing from {} to {} slots",
                self.capacity,
                capacity
            );
            self.capacity = capacity;
            on_grow(capacity);
        }
    }

    /// Marks `slot` as used.
    ///
    /// # Panics
    /// Panics if the slot is already used or lies beyond the capacity.
    pub fn mark_used(&mut self, slot: Slot) {
        assert!(
            (slot as usize) < self.capacity,
            "slot {slot} is beyond the allocator capacity of {}",
            self.capacity
        );
        assert!(!self.used.is_set(slot), "slot {slot} is already in use");
        self.used.set(slot);
        self.length += 1;
        log::trace!("Slot {slot} marked used ({} in use)", self.length);
    }

    /// Marks `slot` as free. Freeing a free slot does nothing.
    pub fn free(&mut self, slot: Slot) {
        if self.used.is_set(slot) {
            self.used.clear(slot);
            self.length -= 1;
            log::trace!("Slot {slot} freed ({} in use)", self.length);
        }
    }

    /// Moves used slots down into the holes, lowest hole first.
    ///
    /// `swap(hole, used)` must relocate the owner's data from `used` to `hole`
    /// and return `true`; on `false` the slot stays where it is. Returns the
    /// number of slots moved.
    pub fn compact(&mut self, mut swap: impl FnMut(Slot, Slot) -> bool) -> usize {
        let limit = self.capacity as Slot;
        let Some(mut hole) = self.used.first_clear(limit) else {
            return 0;
        };

        let occupied: Vec<Slot> = self.used.iter_ones().filter(|&s| s > hole).collect();
        let mut moved = 0;
        for slot in occupied {
            if swap(hole, slot) {
                self.used.set(hole);
                self.used.clear(slot);
                moved += 1;
                // `slot` itself is now clear, so a next hole always exists.
                hole = self.used.first_clear_from(hole + 1, limit).unwrap_or(slot);
            } else {
                log::warn!("Compaction refused to move slot {slot} into hole {hole}");
            }
        }

        log::debug!("Compaction moved {moved} slots ({} in use)", self.length);
        moved
    }

    /// Frees every slot, keeping the capacity.
    pub fn clear(&mut self) {
        self.used.clear_all();
        self.length = 0;
    }

    /// Current occupancy figures.
    pub fn stats(&self) -> AllocatorStats {
        let high_water = self
            .used
            .iter_ones()
            .last()
            .map_or(0, |slot| slot as usize + 1);
        let holes = high_water - self.length;
        AllocatorStats {
            length: self.length,
            capacity: self.capacity,
            high_water,
            holes,
            fragmentation: if high_water == 0 {
                0.0
            } else {
                holes as f32 / high_water as f32
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take(allocator: &mut SparseAllocator) -> Slot {
        let slot = allocator.allocate_slot(|_| {});
        allocator.mark_used(slot);
        slot
    }

    #[test]
    fn growth_doubles_then_adds_a_quarter() {
        let mut allocator = SparseAllocator::new(AllocatorSettings {
            initial_capacity: 2,
            doubling_limit: 8,
            max_capacity: 100,
        });
        let mut grown = Vec::new();
        for _ in 0..11 {
            let slot = allocator.allocate_slot(|capacity| grown.push(capacity));
            allocator.mark_used(slot);
        }
        assert_eq!(grown, vec![2, 4, 8, 10, 12]);
        assert_eq!(allocator.len(), 11);
        assert_eq!(allocator.capacity(), 12);
    }

    #[test]
    fn allocate_does_not_mark() {
        let mut allocator = SparseAllocator::new(AllocatorSettings::default());
        let first = allocator.allocate_slot(|_| {});
        let again = allocator.allocate_slot(|_| {});
        assert_eq!(first, again);
        assert!(allocator.is_empty());
    }

    #[test]
    fn freed_slot_is_reused_before_growth() {
        let mut allocator = SparseAllocator::new(AllocatorSettings {
            initial_capacity: 4,
            ..Default::default()
        });
        for expected in 0..4 {
            assert_eq!(take(&mut allocator), expected);
        }
        assert_eq!(allocator.reuse(), None);

        allocator.free(1);
        assert_eq!(allocator.len(), 3);
        assert_eq!(allocator.reuse(), Some(1));
        assert_eq!(take(&mut allocator), 1);
        assert_eq!(allocator.capacity(), 4);
    }

    #[test]
    fn free_is_idempotent() {
        let mut allocator = SparseAllocator::new(AllocatorSettings::default());
        let slot = take(&mut allocator);
        allocator.free(slot);
        allocator.free(slot);
        assert_eq!(allocator.len(), 0);
    }

    #[test]
    #[should_panic(expected = "already in use")]
    fn marking_twice_panics() {
        let mut allocator = SparseAllocator::new(AllocatorSettings::default());
        let slot = take(&mut allocator);
        allocator.mark_used(slot);
    }

    #[test]
    #[should_panic(expected = "index full")]
    fn growing_past_the_ceiling_panics() {
        let mut allocator = SparseAllocator::new(AllocatorSettings {
            initial_capacity: 2,
            doubling_limit: 8,
            max_capacity: 3,
        });
        for _ in 0..4 {
            take(&mut allocator);
        }
    }

    #[test]
    fn compaction_fills_holes_from_the_bottom() {
        let mut allocator = SparseAllocator::new(AllocatorSettings::default());
        for _ in 0..5 {
            take(&mut allocator);
        }
        allocator.free(1);
        allocator.free(3);

        let mut moves = Vec::new();
        let moved = allocator.compact(|hole, used| {
            moves.push((hole, used));
            true
        });

        assert_eq!(moved, 2);
        assert_eq!(moves, vec![(1, 2), (2, 4)]);
        assert_eq!(allocator.iter_used().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(allocator.stats().holes, 0);
    }

    #[test]
    fn refused_moves_leave_slots_in_place() {
        let mut allocator = SparseAllocator::new(AllocatorSettings::default());
        for _ in 0..3 {
            take(&mut allocator);
        }
        allocator.free(0);

        let moved = allocator.compact(|_, used| used != 1);
        assert_eq!(moved, 1);
        assert_eq!(allocator.iter_used().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn stats_report_fragmentation() {
        let mut allocator = SparseAllocator::new(AllocatorSettings::default());
        for _ in 0..4 {
            take(&mut allocator);
        }
        allocator.free(0);
        allocator.free(1);

        let stats = allocator.stats();
        assert_eq!(stats.length, 2);
        assert_eq!(stats.high_water, 4);
        assert_eq!(stats.holes, 2);
        assert!((stats.fragmentation - 0.5).abs() < f32::EPSILON);

        allocator.clear();
        assert_eq!(allocator.stats().fragmentation, 0.0);
        assert_eq!(allocator.capacity(), 8);
    }
}
