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

//! Packed byte storage shared by the datum aspects.

use super::index::ResizePlan;

/// A contiguous, byte-packed column of fixed-width elements.
///
/// Element `i` occupies `bytes[i * stride..(i + 1) * stride]`. The column
/// never interprets its contents; fields are read through the offsets the
/// layout calculator produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteColumn {
    stride: usize,
    bytes: Vec<u8>,
}

impl ByteColumn {
    /// Creates a zeroed column of `len` elements.
    pub fn new(stride: usize, len: usize) -> Self {
        assert!(stride > 0, "a byte column needs a non-zero stride");
        Self {
            stride,
            bytes: vec![0; stride * len],
        }
    }

    /// Bytes per element.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.bytes.len() / self.stride
    }

    /// Returns `true` if the column holds no elements.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The raw buffer, ready for upload.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `len` bytes at `offset` within element `index`.
    pub fn field(&self, index: usize, offset: usize, len: usize) -> &[u8] {
        let start = index * self.stride + offset;
        &self.bytes[start..start + len]
    }

    /// Mutable `len` bytes at `offset` within element `index`.
    pub fn field_mut(&mut self, index: usize, offset: usize, len: usize) -> &mut [u8] {
        let start = index * self.stride + offset;
        &mut self.bytes[start..start + len]
    }

    /// Raw bytes starting at an absolute byte position.
    pub fn span(&self, start: usize, len: usize) -> &[u8] {
        &self.bytes[start..start + len]
    }

    /// Mutable raw bytes starting at an absolute byte position.
    pub fn span_mut(&mut self, start: usize, len: usize) -> &mut [u8] {
        &mut self.bytes[start..start + len]
    }

    /// Extends the column with zeroed elements up to `len`. Never shrinks.
    pub fn grow(&mut self, len: usize) {
        if len > self.len() {
            self.bytes.resize(len * self.stride, 0);
        }
    }

    /// Copies element `from` over element `to` and zeroes `from`.
    pub fn relocate(&mut self, to: usize, from: usize) {
        if to == from {
            return;
        }
        let stride = self.stride;
        self.bytes
            .copy_within(from * stride..(from + 1) * stride, to * stride);
        self.zero(from);
    }

    /// Zeroes one element.
    pub fn zero(&mut self, index: usize) {
        let stride = self.stride;
        self.bytes[index * stride..(index + 1) * stride].fill(0);
    }

    /// Zeroes every element in place.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Builds the column for a resized frame: a zeroed buffer of the plan's
    /// length with every remap range copied across.
    pub fn remapped(&self, plan: &ResizePlan) -> Self {
        let stride = self.stride;
        let mut bytes = vec![0; plan.new_length * stride];
        for range in &plan.remap {
            let from = range.old_start as usize * stride..range.old_end as usize * stride;
            let to = range.new_start as usize * stride;
            bytes[to..to + from.len()].copy_from_slice(&self.bytes[from]);
        }
        Self { stride, bytes }
    }
}
