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

//! The columnar entity-attribute frame.
//!
//! A [`DataFrame`] pairs one [`Index`] (how domain references become dense
//! ordinals) with named aspects. Dense aspects hold one element per ordinal;
//! sparse aspects hold at most one, in slots handed out by a
//! [`SparseAllocator`] and tracked by forward and reverse maps. Datum aspects
//! store packed values laid out by `tabula_core::layout`; order aspects store
//! a draw-order permutation that doubles as an element-index buffer.
//!
//! All access goes through [`Cursor`] and [`CursorMut`], which hold a borrow
//! of the frame, so a cursor cannot survive a resize or a compaction.

mod accessor;
mod allocator;
mod aspect;
mod bitset;
mod column;
mod cursor;
mod data_frame;
mod dense;
mod index;
mod schema;
mod slot_map;
mod sparse;

pub use accessor::{AccessorTable, AspectId, FieldHandle};
pub use allocator::{AllocatorSettings, AllocatorStats, SparseAllocator};
pub use aspect::{Aspect, AspectKind, AspectSpec, PreparedResize, Storage};
pub use bitset::SlotBitset;
pub use column::ByteColumn;
pub use cursor::{Cursor, CursorMut, RowWalker};
pub use data_frame::{AspectStats, DataFrame, FrameBuilder, FrameStats};
pub use dense::{DenseDatum, DenseOrder};
pub use index::{GridIndex, Index, MonotonicIndex, Ordinal, RemapRange, ResizePlan};
pub use schema::{AspectSchema, FrameSchema, KindSchema, SchemaError};
pub use slot_map::{ArrayMap, HashedMap, MapKind, OrdinalMap, SlotMap};
pub use sparse::{PreparedSlots, SparseDatum, SparseOrder, SparseSlots};

/// A physical position inside a sparse aspect.
pub type Slot = u32;

#[cfg(test)]
mod tests;
