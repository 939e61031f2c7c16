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

//! The four aspect variants behind one type.

use super::allocator::{AllocatorSettings, AllocatorStats};
use super::column::ByteColumn;
use super::dense::{DenseDatum, DenseOrder};
use super::index::ResizePlan;
use super::slot_map::MapKind;
use super::sparse::{PreparedSlots, SparseDatum, SparseOrder, SparseSlots};
use super::{Ordinal, Slot};
use serde::Deserialize;
use tabula_core::layout::{FieldType, Layout};

/// How an aspect stores its elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Storage {
    /// One element per frame ordinal.
    #[default]
    Dense,
    /// At most one element per frame ordinal, in allocator slots.
    Sparse,
}

/// What an aspect holds.
#[derive(Debug, Clone, PartialEq)]
pub enum AspectKind {
    /// Values of a field type.
    Datum(FieldType),
    /// A draw-order permutation.
    Order,
}

/// Everything needed to build one aspect.
#[derive(Debug, Clone, PartialEq)]
pub struct AspectSpec {
    /// Storage discipline.
    pub storage: Storage,
    /// Contents.
    pub kind: AspectKind,
    /// Forward-map backing for sparse aspects.
    pub map: MapKind,
    /// Growth parameters for sparse aspects.
    pub settings: AllocatorSettings,
}

impl AspectSpec {
    /// A dense datum aspect.
    pub fn dense(ty: impl Into<FieldType>) -> Self {
        Self::new(Storage::Dense, AspectKind::Datum(ty.into()))
    }

    /// A sparse datum aspect.
    pub fn sparse(ty: impl Into<FieldType>) -> Self {
        Self::new(Storage::Sparse, AspectKind::Datum(ty.into()))
    }

    /// A dense order aspect.
    pub fn dense_order() -> Self {
        Self::new(Storage::Dense, AspectKind::Order)
    }

    /// A sparse order aspect.
    pub fn sparse_order() -> Self {
        Self::new(Storage::Sparse, AspectKind::Order)
    }

    fn new(storage: Storage, kind: AspectKind) -> Self {
        Self {
            storage,
            kind,
            map: MapKind::default(),
            settings: AllocatorSettings::default(),
        }
    }

    /// Uses a different forward-map backing.
    pub fn with_map(mut self, map: MapKind) -> Self {
        self.map = map;
        self
    }

    /// Uses different allocator growth parameters.
    pub fn with_settings(mut self, settings: AllocatorSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// One column of a frame.
#[derive(Debug, Clone)]
pub enum Aspect {
    /// See [`DenseDatum`].
    DenseDatum(DenseDatum),
    /// See [`DenseOrder`].
    DenseOrder(DenseOrder),
    /// See [`SparseDatum`].
    SparseDatum(SparseDatum),
    /// See [`SparseOrder`].
    SparseOrder(SparseOrder),
}

/// A resize computed for one aspect but not yet applied.
#[derive(Debug)]
pub enum PreparedResize {
    /// A new dense buffer.
    Column(ByteColumn),
    /// A new dense order length.
    Identity(usize),
    /// New sparse maps.
    Slots(PreparedSlots),
}

impl Aspect {
    /// Builds an empty aspect for a frame of `length`.
    pub fn new(spec: &AspectSpec, length: usize) -> Self {
        match (&spec.storage, &spec.kind) {
            (Storage::Dense, AspectKind::Datum(ty)) => {
                Self::DenseDatum(DenseDatum::new(ty, length))
            }
            (Storage::Dense, AspectKind::Order) => Self::DenseOrder(DenseOrder::new(length)),
            (Storage::Sparse, AspectKind::Datum(ty)) => {
                Self::SparseDatum(SparseDatum::new(ty, spec.settings, spec.map))
            }
            (Storage::Sparse, AspectKind::Order) => {
                Self::SparseOrder(SparseOrder::new(spec.settings, spec.map))
            }
        }
    }

    /// The element layout. Order aspects expose a single `uint32`.
    pub fn layout(&self) -> &Layout {
        match self {
            Self::DenseDatum(aspect) => aspect.layout(),
            Self::DenseOrder(aspect) => aspect.layout(),
            Self::SparseDatum(aspect) => aspect.layout(),
            Self::SparseOrder(aspect) => aspect.layout(),
        }
    }

    /// The storage discipline.
    pub fn storage(&self) -> Storage {
        match self {
            Self::DenseDatum(_) | Self::DenseOrder(_) => Storage::Dense,
            Self::SparseDatum(_) | Self::SparseOrder(_) => Storage::Sparse,
        }
    }

    /// Returns `true` for order aspects.
    pub fn is_order(&self) -> bool {
        matches!(self, Self::DenseOrder(_) | Self::SparseOrder(_))
    }

    /// Number of elements: the frame length for dense aspects, the used
    /// count for sparse ones.
    pub fn len(&self) -> usize {
        match self {
            Self::DenseDatum(aspect) => aspect.len(),
            Self::DenseOrder(aspect) => aspect.len(),
            Self::SparseDatum(aspect) => aspect.len(),
            Self::SparseOrder(aspect) => aspect.len(),
        }
    }

    /// Returns `true` if the aspect holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The buffer a GPU upload sends verbatim.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::DenseDatum(aspect) => aspect.bytes(),
            Self::DenseOrder(aspect) => aspect.bytes(),
            Self::SparseDatum(aspect) => aspect.bytes(),
            Self::SparseOrder(aspect) => aspect.bytes(),
        }
    }

    /// The slot table of a sparse aspect.
    pub fn slots(&self) -> Option<&SparseSlots> {
        match self {
            Self::SparseDatum(aspect) => Some(aspect.slots()),
            Self::SparseOrder(aspect) => Some(aspect.slots()),
            _ => None,
        }
    }

    /// `(ordinal, slot)` pairs of a sparse aspect, slot-ascending.
    pub fn sparse_iter(&self) -> Option<impl Iterator<Item = (Ordinal, Slot)> + '_> {
        self.slots().map(|slots| slots.iter())
    }

    /// Whether the ordinal has an element. Dense aspects always do.
    pub fn contains(&self, ordinal: Ordinal) -> bool {
        match self {
            Self::DenseDatum(_) | Self::DenseOrder(_) => true,
            Self::SparseDatum(aspect) => aspect.contains(ordinal),
            Self::SparseOrder(aspect) => aspect.contains(ordinal),
        }
    }

    /// Removes the ordinal's element from a sparse aspect.
    ///
    /// # Panics
    /// Panics on dense aspects, which cannot lose elements.
    pub fn remove(&mut self, ordinal: Ordinal) -> bool {
        match self {
            Self::SparseDatum(aspect) => aspect.remove(ordinal),
            Self::SparseOrder(aspect) => aspect.remove(ordinal),
            _ => panic!("cannot remove an element from a dense aspect"),
        }
    }

    /// Draw position of the ordinal in an order aspect.
    ///
    /// # Panics
    /// Panics on datum aspects.
    pub fn order_of(&self, ordinal: Ordinal) -> Option<u32> {
        match self {
            Self::DenseOrder(aspect) => Some(aspect.order_of(ordinal)),
            Self::SparseOrder(aspect) => aspect.order_of(ordinal),
            _ => panic!("datum aspects have no order"),
        }
    }

    /// Moves the ordinal to a draw position in an order aspect.
    ///
    /// # Panics
    /// Panics on datum aspects and on positions past the live range.
    pub fn set_order(&mut self, ordinal: Ordinal, position: u32) {
        match self {
            Self::DenseOrder(aspect) => aspect.set_order(ordinal, position),
            Self::SparseOrder(aspect) => aspect.set_order(ordinal, position),
            _ => panic!("datum aspects have no order"),
        }
    }

    /// Computes this aspect's share of a frame resize. Pure.
    pub fn prepare_resize(&self, plan: &ResizePlan) -> PreparedResize {
        match self {
            Self::DenseDatum(aspect) => PreparedResize::Column(aspect.prepare_resize(plan)),
            Self::DenseOrder(aspect) => PreparedResize::Identity(aspect.prepare_resize(plan)),
            Self::SparseDatum(aspect) => PreparedResize::Slots(aspect.prepare_resize(plan)),
            Self::SparseOrder(aspect) => PreparedResize::Slots(aspect.prepare_resize(plan)),
        }
    }

    /// Applies a resize computed by [`prepare_resize`](Self::prepare_resize)
    /// on this same aspect.
    pub fn commit_resize(&mut self, prepared: PreparedResize) {
        match (self, prepared) {
            (Self::DenseDatum(aspect), PreparedResize::Column(column)) => {
                aspect.commit_resize(column)
            }
            (Self::DenseOrder(aspect), PreparedResize::Identity(length)) => {
                aspect.commit_resize(length)
            }
            (Self::SparseDatum(aspect), PreparedResize::Slots(slots)) => {
                aspect.commit_resize(slots)
            }
            (Self::SparseOrder(aspect), PreparedResize::Slots(slots)) => {
                aspect.commit_resize(slots)
            }
            _ => unreachable!("a prepared resize is applied to the aspect that produced it"),
        }
    }

    /// Zeroes dense data, resets orders to identity, empties sparse aspects.
    pub fn clear(&mut self) {
        match self {
            Self::DenseDatum(aspect) => aspect.clear(),
            Self::DenseOrder(aspect) => aspect.clear(),
            Self::SparseDatum(aspect) => aspect.clear(),
            Self::SparseOrder(aspect) => aspect.clear(),
        }
    }

    /// Repacks a sparse aspect. Returns the number of elements moved.
    ///
    /// # Panics
    /// Panics on dense aspects, which have nothing to compact.
    pub fn compact(&mut self) -> usize {
        match self {
            Self::SparseDatum(aspect) => aspect.compact(),
            Self::SparseOrder(aspect) => aspect.compact(),
            _ => panic!("compaction is only supported on sparse aspects"),
        }
    }

    /// Occupancy of a sparse aspect.
    pub fn stats(&self) -> Option<AllocatorStats> {
        self.slots().map(SparseSlots::stats)
    }

    /// Byte position of the ordinal's element in [`bytes`](Self::bytes),
    /// if it has one. Datum aspects only.
    pub(crate) fn element_offset(&self, ordinal: Ordinal) -> Option<usize> {
        match self {
            Self::DenseDatum(aspect) => aspect.element_offset(ordinal),
            Self::SparseDatum(aspect) => aspect.element_offset(ordinal),
            _ => None,
        }
    }

    pub(crate) fn span(&self, start: usize, len: usize) -> &[u8] {
        match self {
            Self::DenseDatum(aspect) => aspect.span(start, len),
            Self::SparseDatum(aspect) => aspect.span(start, len),
            _ => panic!("order aspects have no fields"),
        }
    }

    pub(crate) fn span_mut(&mut self, start: usize, len: usize) -> &mut [u8] {
        match self {
            Self::DenseDatum(aspect) => aspect.span_mut(start, len),
            Self::SparseDatum(aspect) => aspect.span_mut(start, len),
            _ => panic!("order aspects have no fields"),
        }
    }

    /// Reads one field. Dense reads past the end yield zeroes; sparse reads
    /// of an ordinal without an element yield `None`.
    pub fn read_field(&self, ordinal: Ordinal, offset: usize, len: usize) -> Option<&[u8]> {
        match self {
            Self::DenseDatum(aspect) => Some(aspect.read(ordinal, offset, len)),
            Self::SparseDatum(aspect) => aspect.read(ordinal, offset, len),
            _ => panic!("order aspects have no fields"),
        }
    }

    /// Writes one field. Sparse aspects assign a slot on first write.
    pub fn write_field(&mut self, ordinal: Ordinal, offset: usize, bytes: &[u8]) {
        match self {
            Self::DenseDatum(aspect) => aspect.write(ordinal, offset, bytes),
            Self::SparseDatum(aspect) => aspect.write(ordinal, offset, bytes),
            _ => panic!("order aspects have no fields"),
        }
    }

    /// Byte position of the ordinal's element, assigning a sparse slot if
    /// needed. Datum aspects only.
    pub(crate) fn ensure_element(&mut self, ordinal: Ordinal) -> usize {
        match self {
            Self::DenseDatum(aspect) => aspect
                .element_offset(ordinal)
                .unwrap_or_else(|| panic!("ordinal {ordinal} is out of range")),
            Self::SparseDatum(aspect) => aspect.ensure(ordinal),
            _ => panic!("order aspects have no fields"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::index::RemapRange;
    use tabula_core::layout::ScalarKind;

    #[test]
    fn specs_build_the_matching_variant() {
        let dense = Aspect::new(&AspectSpec::dense(ScalarKind::Uint8), 3);
        assert_eq!(dense.storage(), Storage::Dense);
        assert_eq!(dense.len(), 3);
        assert!(dense.contains(100));

        let sparse = Aspect::new(&AspectSpec::sparse_order().with_map(MapKind::Hashed), 3);
        assert_eq!(sparse.storage(), Storage::Sparse);
        assert!(sparse.is_order());
        assert!(sparse.is_empty());
        assert_eq!(sparse.layout().byte_stride, 4);
    }

    #[test]
    #[should_panic(expected = "only supported on sparse aspects")]
    fn compacting_a_dense_aspect_panics() {
        Aspect::new(&AspectSpec::dense(ScalarKind::Uint8), 3).compact();
    }

    #[test]
    fn dense_order_resets_to_identity_on_resize() {
        let mut aspect = Aspect::new(&AspectSpec::dense_order(), 3);
        aspect.set_order(2, 0);
        let plan = ResizePlan {
            old_length: 3,
            new_length: 4,
            remap: vec![RemapRange {
                old_start: 0,
                old_end: 3,
                new_start: 0,
            }],
        };
        let prepared = aspect.prepare_resize(&plan);
        aspect.commit_resize(prepared);
        assert_eq!(aspect.bytes(), bytemuck::cast_slice::<u32, u8>(&[0, 1, 2, 3]));
    }

    #[test]
    fn sparse_fields_read_none_until_written() {
        let mut aspect = Aspect::new(&AspectSpec::sparse(ScalarKind::Uint16), 8);
        assert_eq!(aspect.read_field(3, 0, 2), None);
        aspect.write_field(3, 0, &9u16.to_ne_bytes());
        assert_eq!(aspect.read_field(3, 0, 2), Some(&9u16.to_ne_bytes()[..]));
        assert!(aspect.remove(3));
        assert_eq!(aspect.read_field(3, 0, 2), None);
    }
}
