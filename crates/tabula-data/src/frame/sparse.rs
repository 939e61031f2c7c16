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

//! Sparse aspects: at most one element per frame ordinal, stored in slots
//! handed out by a [`SparseAllocator`].

use super::allocator::{AllocatorSettings, AllocatorStats, SparseAllocator};
use super::column::ByteColumn;
use super::dense::{move_to, order_layout};
use super::index::ResizePlan;
use super::slot_map::{MapKind, OrdinalMap, SlotMap};
use super::{Ordinal, Slot};
use tabula_core::layout::{layout_of, FieldType, Layout};

/// The forward (ordinal to slot) and reverse (slot to ordinal) maps together
/// with the allocator that owns the slots.
///
/// For every used slot `s`, `forward[reverse[s]] == s`, and every ordinal in
/// the forward map points at a used slot.
#[derive(Debug, Clone)]
pub struct SparseSlots {
    allocator: SparseAllocator,
    forward: SlotMap,
    reverse: SlotMap,
}

/// Maps rebuilt for a resize, not yet installed.
#[derive(Debug)]
pub struct PreparedSlots {
    forward: SlotMap,
    reverse: SlotMap,
    dropped: Vec<Slot>,
}

impl PreparedSlots {
    /// Slots whose ordinal fell outside the new shape.
    pub fn dropped(&self) -> &[Slot] {
        &self.dropped
    }
}

impl SparseSlots {
    /// Creates an empty slot table. Reverse maps are always array-backed,
    /// since slots are dense by construction.
    pub fn new(settings: AllocatorSettings, map: MapKind) -> Self {
        Self {
            allocator: SparseAllocator::new(settings),
            forward: SlotMap::new(map),
            reverse: SlotMap::new(MapKind::Array),
        }
    }

    /// The slot holding an ordinal's element.
    pub fn slot_of(&self, ordinal: Ordinal) -> Option<Slot> {
        self.forward.get(ordinal)
    }

    /// The ordinal stored in a slot.
    pub fn ordinal_of(&self, slot: Slot) -> Option<Ordinal> {
        self.reverse.get(slot)
    }

    /// Used slots.
    pub fn len(&self) -> usize {
        self.allocator.len()
    }

    /// Returns `true` if no slot is used.
    pub fn is_empty(&self) -> bool {
        self.allocator.is_empty()
    }

    /// Reserved slots.
    pub fn capacity(&self) -> usize {
        self.allocator.capacity()
    }

    /// The underlying allocator.
    pub fn allocator(&self) -> &SparseAllocator {
        &self.allocator
    }

    /// Occupancy figures.
    pub fn stats(&self) -> AllocatorStats {
        self.allocator.stats()
    }

    /// `(ordinal, slot)` pairs in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Ordinal, Slot)> + '_ {
        self.allocator
            .iter_used()
            .filter_map(|slot| self.reverse.get(slot).map(|ordinal| (ordinal, slot)))
    }

    /// Returns the ordinal's slot, assigning one if it has none. A hole
    /// below the used count is preferred over a fresh slot. The flag is
    /// `true` when the slot was just assigned.
    pub fn acquire(&mut self, ordinal: Ordinal, on_grow: impl FnMut(usize)) -> (Slot, bool) {
        if let Some(slot) = self.forward.get(ordinal) {
            return (slot, false);
        }
        let slot = match self.allocator.reuse() {
            Some(slot) => slot,
            None => self.allocator.allocate_slot(on_grow),
        };
        self.allocator.mark_used(slot);
        self.forward.insert(ordinal, slot);
        self.reverse.insert(slot, ordinal);
        (slot, true)
    }

    /// Unmaps an ordinal and frees its slot.
    pub fn release(&mut self, ordinal: Ordinal) -> Option<Slot> {
        let slot = self.forward.remove(ordinal)?;
        self.reverse.remove(slot);
        self.allocator.free(slot);
        Some(slot)
    }

    /// Translates every mapped ordinal through `plan`. Pure.
    pub fn prepare_resize(&self, plan: &ResizePlan) -> PreparedSlots {
        let mut forward = SlotMap::new(self.forward.kind());
        let mut reverse = SlotMap::new(MapKind::Array);
        let mut dropped = Vec::new();

        for (ordinal, slot) in self.iter() {
            match plan.translate(ordinal) {
                Some(moved) => {
                    forward.insert(moved, slot);
                    reverse.insert(slot, moved);
                }
                None => dropped.push(slot),
            }
        }

        PreparedSlots {
            forward,
            reverse,
            dropped,
        }
    }

    /// Installs maps built by [`prepare_resize`](Self::prepare_resize) and
    /// frees the dropped slots. `on_drop(slot, used)` runs after each slot is
    /// freed, with the remaining used count.
    pub fn commit_resize(&mut self, prepared: PreparedSlots, mut on_drop: impl FnMut(Slot, usize)) {
        self.forward = prepared.forward;
        self.reverse = prepared.reverse;
        for slot in prepared.dropped {
            self.allocator.free(slot);
            on_drop(slot, self.allocator.len());
        }
    }

    /// Repacks used slots into the lowest positions. `relocate(hole, used)`
    /// moves the owner's data; the maps are updated here.
    pub fn compact(&mut self, mut relocate: impl FnMut(Slot, Slot)) -> usize {
        let forward = &mut self.forward;
        let reverse = &mut self.reverse;
        self.allocator.compact(|hole, used| {
            let Some(ordinal) = reverse.remove(used) else {
                return false;
            };
            reverse.insert(hole, ordinal);
            forward.insert(ordinal, hole);
            relocate(hole, used);
            true
        })
    }

    /// Frees everything, keeping capacity.
    pub fn clear(&mut self) {
        self.allocator.clear();
        self.forward.clear();
        self.reverse.clear();
    }
}

/// A sparse column of typed values.
///
/// Free slots always hold zeroes: removal, resize and compaction zero the
/// slots they vacate.
#[derive(Debug, Clone)]
pub struct SparseDatum {
    layout: Layout,
    slots: SparseSlots,
    column: ByteColumn,
}

impl SparseDatum {
    /// Creates an empty sparse column of `ty`.
    pub fn new(ty: &FieldType, settings: AllocatorSettings, map: MapKind) -> Self {
        let layout = layout_of(ty);
        let column = ByteColumn::new(layout.byte_stride, 0);
        Self {
            layout,
            slots: SparseSlots::new(settings, map),
            column,
        }
    }

    /// The element layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The slot table.
    pub fn slots(&self) -> &SparseSlots {
        &self.slots
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The whole packed buffer, `capacity` elements long.
    pub fn bytes(&self) -> &[u8] {
        self.column.bytes()
    }

    /// Returns `true` if the ordinal has an element.
    pub fn contains(&self, ordinal: Ordinal) -> bool {
        self.slots.slot_of(ordinal).is_some()
    }

    /// Byte position of the ordinal's element in [`bytes`](Self::bytes).
    pub fn element_offset(&self, ordinal: Ordinal) -> Option<usize> {
        self.slots
            .slot_of(ordinal)
            .map(|slot| slot as usize * self.layout.byte_stride)
    }

    /// Reads one field of the ordinal's element.
    pub fn read(&self, ordinal: Ordinal, offset: usize, len: usize) -> Option<&[u8]> {
        let slot = self.slots.slot_of(ordinal)?;
        Some(self.column.field(slot as usize, offset, len))
    }

    /// Byte position of the ordinal's element, assigning a zeroed slot first
    /// if needed.
    pub fn ensure(&mut self, ordinal: Ordinal) -> usize {
        let column = &mut self.column;
        let (slot, _) = self.slots.acquire(ordinal, |capacity| column.grow(capacity));
        slot as usize * self.layout.byte_stride
    }

    /// Writes one field, assigning a slot first if needed.
    pub fn write(&mut self, ordinal: Ordinal, offset: usize, bytes: &[u8]) {
        let start = self.ensure(ordinal) + offset;
        self.column.span_mut(start, bytes.len()).copy_from_slice(bytes);
    }

    /// Removes the ordinal's element. Returns `false` if it had none.
    pub fn remove(&mut self, ordinal: Ordinal) -> bool {
        match self.slots.release(ordinal) {
            Some(slot) => {
                self.column.zero(slot as usize);
                true
            }
            None => false,
        }
    }

    pub(crate) fn span(&self, start: usize, len: usize) -> &[u8] {
        self.column.span(start, len)
    }

    pub(crate) fn span_mut(&mut self, start: usize, len: usize) -> &mut [u8] {
        self.column.span_mut(start, len)
    }

    /// Remaps the slot table through `plan`. Pure.
    pub fn prepare_resize(&self, plan: &ResizePlan) -> PreparedSlots {
        self.slots.prepare_resize(plan)
    }

    /// Installs a prepared slot table. Surviving elements stay in their
    /// slots; dropped ones are freed and zeroed.
    pub fn commit_resize(&mut self, prepared: PreparedSlots) {
        let column = &mut self.column;
        self.slots
            .commit_resize(prepared, |slot, _| column.zero(slot as usize));
    }

    /// Moves elements down into holes. Returns the number moved.
    pub fn compact(&mut self) -> usize {
        let column = &mut self.column;
        self.slots
            .compact(|hole, used| column.relocate(hole as usize, used as usize))
    }

    /// Removes every element, keeping capacity.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.column.clear();
    }
}

/// A sparse draw order over the slots of the elements it holds.
///
/// `position` and `order` are inverse permutations of `0..capacity`, and the
/// first [`len`](Self::len) positions hold exactly the used slots. New
/// elements are appended at the end of that live range; removed ones are
/// swapped out of it.
#[derive(Debug, Clone)]
pub struct SparseOrder {
    layout: Layout,
    slots: SparseSlots,
    position: Vec<u32>,
    order: Vec<u32>,
}

fn extend_identity(position: &mut Vec<u32>, order: &mut Vec<u32>, capacity: usize) {
    for item in position.len() as u32..capacity as u32 {
        position.push(item);
        order.push(item);
    }
}

impl SparseOrder {
    /// Creates an empty sparse order.
    pub fn new(settings: AllocatorSettings, map: MapKind) -> Self {
        Self {
            layout: order_layout(),
            slots: SparseSlots::new(settings, map),
            position: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Always a single `uint32` field.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The slot table.
    pub fn slots(&self) -> &SparseSlots {
        &self.slots
    }

    /// Number of ordered elements.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing is ordered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns `true` if the ordinal has an element.
    pub fn contains(&self, ordinal: Ordinal) -> bool {
        self.slots.slot_of(ordinal).is_some()
    }

    /// The draw position of the ordinal's element.
    pub fn order_of(&self, ordinal: Ordinal) -> Option<u32> {
        let slot = self.slots.slot_of(ordinal)?;
        Some(self.order[slot as usize])
    }

    /// The slot drawn at `position`.
    pub fn slot_at(&self, position: u32) -> Slot {
        self.position[position as usize]
    }

    /// The used slots in draw order.
    pub fn live_positions(&self) -> &[u32] {
        &self.position[..self.len()]
    }

    /// The full position array as raw bytes. Only the first
    /// [`len`](Self::len) entries are drawn.
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.position)
    }

    /// Gives the ordinal an element if it has none, appended at the end of
    /// the draw order. Returns its slot.
    pub fn ensure(&mut self, ordinal: Ordinal) -> Slot {
        let position = &mut self.position;
        let order = &mut self.order;
        let (slot, fresh) = self
            .slots
            .acquire(ordinal, |capacity| extend_identity(position, order, capacity));
        if fresh {
            let last = self.slots.len() as u32 - 1;
            move_to(&mut self.position, &mut self.order, slot, last);
        }
        slot
    }

    /// Moves the ordinal's element to draw position `position`, swapping with
    /// the element there. The ordinal gets an element first if needed.
    ///
    /// # Panics
    /// Panics unless `position` is below [`len`](Self::len).
    pub fn set_order(&mut self, ordinal: Ordinal, position: u32) {
        let slot = self.ensure(ordinal);
        let len = self.len();
        assert!(
            (position as usize) < len,
            "order position {position} is out of range for {len} elements"
        );
        move_to(&mut self.position, &mut self.order, slot, position);
    }

    /// Removes the ordinal's element. Returns `false` if it had none.
    pub fn remove(&mut self, ordinal: Ordinal) -> bool {
        match self.slots.release(ordinal) {
            Some(slot) => {
                let end = self.slots.len() as u32;
                move_to(&mut self.position, &mut self.order, slot, end);
                true
            }
            None => false,
        }
    }

    /// Remaps the slot table through `plan`. Pure.
    pub fn prepare_resize(&self, plan: &ResizePlan) -> PreparedSlots {
        self.slots.prepare_resize(plan)
    }

    /// Installs a prepared slot table, pulling dropped slots out of the live
    /// range. Surviving elements keep their relative draw order only where
    /// no dropped slot was swapped past them.
    pub fn commit_resize(&mut self, prepared: PreparedSlots) {
        let position = &mut self.position;
        let order = &mut self.order;
        self.slots.commit_resize(prepared, |slot, used| {
            move_to(position, order, slot, used as u32)
        });
    }

    /// Moves elements down into holes; each keeps its draw position.
    pub fn compact(&mut self) -> usize {
        let position = &mut self.position;
        let order = &mut self.order;
        self.slots.compact(|hole, used| {
            let (hole, used) = (hole as usize, used as usize);
            order.swap(hole, used);
            position[order[hole] as usize] = hole as u32;
            position[order[used] as usize] = used as u32;
        })
    }

    /// Removes every element, keeping capacity.
    pub fn clear(&mut self) {
        self.slots.clear();
        let capacity = self.position.len();
        self.position.clear();
        self.order.clear();
        extend_identity(&mut self.position, &mut self.order, capacity);
    }
}
