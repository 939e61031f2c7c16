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

//! Index strategies: how a domain reference becomes a dense ordinal.
//!
//! An index owns the frame's length. Resizing is split in two steps so the
//! frame can stay atomic: [`Index::plan_resize`] is pure and describes which
//! ranges of old ordinals survive and where they land, and
//! [`Index::apply_resize`] commits the new shape once every aspect has been
//! rebuilt from the plan.

use std::fmt::Debug;

/// A dense position `0..len` assigned by an index.
pub type Ordinal = u32;

/// A contiguous block of old ordinals `[old_start, old_end)` that moves to
/// `[new_start, new_start + len)` during a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemapRange {
    /// First old ordinal of the block.
    pub old_start: Ordinal,
    /// One past the last old ordinal of the block.
    pub old_end: Ordinal,
    /// Where the block starts in the new ordinal space.
    pub new_start: Ordinal,
}

impl RemapRange {
    /// Number of ordinals in the block.
    pub fn len(&self) -> usize {
        (self.old_end - self.old_start) as usize
    }

    /// Returns `true` if the block is empty.
    pub fn is_empty(&self) -> bool {
        self.old_end == self.old_start
    }

    /// Maps an old ordinal through this block.
    pub fn translate(&self, old: Ordinal) -> Option<Ordinal> {
        (self.old_start..self.old_end)
            .contains(&old)
            .then(|| self.new_start + (old - self.old_start))
    }
}

/// The outcome of planning a resize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizePlan {
    /// Frame length before the resize.
    pub old_length: usize,
    /// Frame length after the resize.
    pub new_length: usize,
    /// Surviving blocks, sorted by `old_start` and non-overlapping.
    pub remap: Vec<RemapRange>,
}

impl ResizePlan {
    /// Maps an old ordinal to its new ordinal, or `None` if it was dropped.
    pub fn translate(&self, old: Ordinal) -> Option<Ordinal> {
        let at = self.remap.partition_point(|range| range.old_end <= old);
        self.remap.get(at).and_then(|range| range.translate(old))
    }
}

/// A strategy mapping domain references to ordinals and back.
pub trait Index: Debug {
    /// What callers address elements with.
    type Reference: Copy + Debug;
    /// What a resize is requested with.
    type Shape: Copy + Debug + PartialEq;

    /// The number of ordinals.
    fn len(&self) -> usize;

    /// Returns `true` if the index holds no ordinals.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The current shape.
    fn shape(&self) -> Self::Shape;

    /// Resolves a reference. Out-of-domain references yield `None`.
    fn to_ordinal(&self, reference: Self::Reference) -> Option<Ordinal>;

    /// The reference an ordinal corresponds to.
    fn to_reference(&self, ordinal: Ordinal) -> Self::Reference;

    /// Describes how existing ordinals move under a new shape. Pure.
    fn plan_resize(&self, shape: Self::Shape) -> ResizePlan;

    /// Commits a new shape.
    fn apply_resize(&mut self, shape: Self::Shape);
}

fn checked_length(length: usize) -> usize {
    assert!(
        length <= Ordinal::MAX as usize,
        "frame length {length} exceeds the ordinal range"
    );
    length
}

/// Monotonic integer identity: references are ids `1..=len`, and id `n` is
/// ordinal `n - 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonotonicIndex {
    length: usize,
}

impl MonotonicIndex {
    /// Creates an index of `length` ids.
    pub fn new(length: usize) -> Self {
        Self {
            length: checked_length(length),
        }
    }

    /// The id stored at an ordinal.
    pub fn id(&self, ordinal: Ordinal) -> u32 {
        ordinal + 1
    }
}

impl Index for MonotonicIndex {
    type Reference = u32;
    type Shape = usize;

    fn len(&self) -> usize {
        self.length
    }

    fn shape(&self) -> usize {
        self.length
    }

    fn to_ordinal(&self, id: u32) -> Option<Ordinal> {
        let ordinal = id.checked_sub(1)?;
        ((ordinal as usize) < self.length).then_some(ordinal)
    }

    fn to_reference(&self, ordinal: Ordinal) -> u32 {
        self.id(ordinal)
    }

    fn plan_resize(&self, length: usize) -> ResizePlan {
        let kept = self.length.min(checked_length(length)) as Ordinal;
        let remap = if kept == 0 {
            Vec::new()
        } else {
            vec![RemapRange {
                old_start: 0,
                old_end: kept,
                new_start: 0,
            }]
        };
        ResizePlan {
            old_length: self.length,
            new_length: length,
            remap,
        }
    }

    fn apply_resize(&mut self, length: usize) {
        self.length = checked_length(length);
    }
}

/// Two-dimensional grid addressing in row-major order:
/// `ordinal = y * width + x`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridIndex {
    width: u32,
    height: u32,
}

impl GridIndex {
    /// Creates a `width` x `height` grid.
    pub fn new(width: u32, height: u32) -> Self {
        checked_length(width as usize * height as usize);
        Self { width, height }
    }

    /// Grid width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Column of an ordinal.
    pub fn x(&self, ordinal: Ordinal) -> u32 {
        ordinal % self.width
    }

    /// Row of an ordinal.
    pub fn y(&self, ordinal: Ordinal) -> u32 {
        ordinal / self.width
    }

    /// Cell coordinates of an ordinal.
    pub fn xy(&self, ordinal: Ordinal) -> (u32, u32) {
        (self.x(ordinal), self.y(ordinal))
    }
}

impl Index for GridIndex {
    type Reference = (i32, i32);
    type Shape = (u32, u32);

    fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn shape(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn to_ordinal(&self, (x, y): (i32, i32)) -> Option<Ordinal> {
        let x = u32::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u32::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(y * self.width + x)
    }

    fn to_reference(&self, ordinal: Ordinal) -> (i32, i32) {
        let (x, y) = self.xy(ordinal);
        (x as i32, y as i32)
    }

    fn plan_resize(&self, (width, height): (u32, u32)) -> ResizePlan {
        let new_length = checked_length(width as usize * height as usize);
        let kept_width = self.width.min(width);
        let kept_rows = self.height.min(height);

        let remap = if kept_width == 0 || kept_rows == 0 {
            Vec::new()
        } else if self.width == width {
            // Whole rows survive, so the overlap is one contiguous block.
            vec![RemapRange {
                old_start: 0,
                old_end: kept_rows * width,
                new_start: 0,
            }]
        } else {
            (0..kept_rows)
                .map(|y| RemapRange {
                    old_start: y * self.width,
                    old_end: y * self.width + kept_width,
                    new_start: y * width,
                })
                .collect()
        };

        ResizePlan {
            old_length: self.len(),
            new_length,
            remap,
        }
    }

    fn apply_resize(&mut self, (width, height): (u32, u32)) {
        checked_length(width as usize * height as usize);
        self.width = width;
        self.height = height;
    }
}
