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

//! Dense aspects: exactly one element per frame ordinal.

use super::column::ByteColumn;
use super::index::ResizePlan;
use super::Ordinal;
use tabula_core::layout::{layout_of, FieldType, Layout, ScalarKind};

/// Enough zero bytes for the widest field (a 4x4 float matrix).
pub(crate) const ZEROES: [u8; 64] = [0; 64];

/// The layout every order aspect exposes: one `uint32` per element.
pub(crate) fn order_layout() -> Layout {
    layout_of(&FieldType::from(ScalarKind::Uint32))
}

/// A dense column of typed values. Ordinal and element index coincide.
#[derive(Debug, Clone)]
pub struct DenseDatum {
    layout: Layout,
    column: ByteColumn,
}

impl DenseDatum {
    /// Creates a zeroed column of `length` elements of `ty`.
    pub fn new(ty: &FieldType, length: usize) -> Self {
        let layout = layout_of(ty);
        let column = ByteColumn::new(layout.byte_stride, length);
        Self { layout, column }
    }

    /// The element layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.column.len()
    }

    /// Returns `true` if the column holds no elements.
    pub fn is_empty(&self) -> bool {
        self.column.is_empty()
    }

    /// The packed buffer.
    pub fn bytes(&self) -> &[u8] {
        self.column.bytes()
    }

    /// Byte position of an element in [`bytes`](Self::bytes), if in range.
    pub fn element_offset(&self, ordinal: Ordinal) -> Option<usize> {
        ((ordinal as usize) < self.len()).then(|| ordinal as usize * self.layout.byte_stride)
    }

    /// Reads the `len` bytes of one field. Ordinals past the end read as
    /// zeroes.
    pub fn read(&self, ordinal: Ordinal, offset: usize, len: usize) -> &[u8] {
        if (ordinal as usize) < self.len() {
            self.column.field(ordinal as usize, offset, len)
        } else {
            &ZEROES[..len]
        }
    }

    /// Overwrites one field.
    ///
    /// # Panics
    /// Panics if `ordinal` is out of range.
    pub fn write(&mut self, ordinal: Ordinal, offset: usize, bytes: &[u8]) {
        assert!(
            (ordinal as usize) < self.len(),
            "ordinal {ordinal} is out of range for {} elements",
            self.len()
        );
        self.column
            .field_mut(ordinal as usize, offset, bytes.len())
            .copy_from_slice(bytes);
    }

    pub(crate) fn span(&self, start: usize, len: usize) -> &[u8] {
        self.column.span(start, len)
    }

    pub(crate) fn span_mut(&mut self, start: usize, len: usize) -> &mut [u8] {
        self.column.span_mut(start, len)
    }

    /// Builds the resized buffer without touching the current one.
    pub fn prepare_resize(&self, plan: &ResizePlan) -> ByteColumn {
        self.column.remapped(plan)
    }

    /// Swaps in a buffer built by [`prepare_resize`](Self::prepare_resize).
    pub fn commit_resize(&mut self, column: ByteColumn) {
        self.column = column;
    }

    /// Zeroes every element in place.
    pub fn clear(&mut self) {
        self.column.clear();
    }
}

/// A dense permutation of the frame's ordinals.
///
/// `position[p]` is the ordinal drawn at position `p` and `order[o]` is the
/// position of ordinal `o`. The two arrays are inverse permutations of
/// `0..len` after every mutation. `position` doubles as an element-index
/// buffer in draw order.
#[derive(Debug, Clone)]
pub struct DenseOrder {
    layout: Layout,
    position: Vec<u32>,
    order: Vec<u32>,
}

/// Moves `item` to `target` in a pair of inverse permutations, sending the
/// item that held `target` to `item`'s old position.
pub(crate) fn move_to(position: &mut [u32], order: &mut [u32], item: u32, target: u32) {
    let previous = order[item as usize];
    let displaced = position[target as usize];
    position[previous as usize] = displaced;
    order[displaced as usize] = previous;
    position[target as usize] = item;
    order[item as usize] = target;
}

pub(crate) fn identity(length: usize) -> Vec<u32> {
    (0..length as u32).collect()
}

impl DenseOrder {
    /// Creates the identity permutation of `length`.
    pub fn new(length: usize) -> Self {
        Self {
            layout: order_layout(),
            position: identity(length),
            order: identity(length),
        }
    }

    /// Always a single `uint32` field.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Number of ordinals.
    pub fn len(&self) -> usize {
        self.position.len()
    }

    /// Returns `true` if the permutation is empty.
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// The draw position of an ordinal. Ordinals past the end read as 0.
    pub fn order_of(&self, ordinal: Ordinal) -> u32 {
        self.order.get(ordinal as usize).copied().unwrap_or(0)
    }

    /// The ordinal drawn at `position`.
    pub fn ordinal_at(&self, position: u32) -> Ordinal {
        self.position[position as usize]
    }

    /// Moves `ordinal` to `position`, swapping with the ordinal that held it.
    ///
    /// # Panics
    /// Panics unless both `ordinal` and `position` are below the length.
    pub fn set_order(&mut self, ordinal: Ordinal, position: u32) {
        let len = self.len();
        assert!(
            (position as usize) < len,
            "order position {position} is out of range for {len} elements"
        );
        assert!(
            (ordinal as usize) < len,
            "ordinal {ordinal} is out of range for {len} elements"
        );

        move_to(&mut self.position, &mut self.order, ordinal, position);
    }

    /// The ordinals in draw order.
    pub fn positions(&self) -> &[u32] {
        &self.position
    }

    /// `position[]` as raw bytes.
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.position)
    }

    /// Order does not survive a resize: the result is always the identity
    /// permutation of the new length.
    pub fn prepare_resize(&self, plan: &ResizePlan) -> usize {
        plan.new_length
    }

    /// Installs the identity permutation of `length`.
    pub fn commit_resize(&mut self, length: usize) {
        self.position = identity(length);
        self.order = identity(length);
    }

    /// Back to the identity permutation.
    pub fn clear(&mut self) {
        let length = self.len();
        self.commit_resize(length);
    }
}
