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

//! Cursors: lightweight views bound to one ordinal of a frame.

use super::accessor::{AspectId, FieldHandle};
use super::data_frame::DataFrame;
use super::index::Index;
use super::Ordinal;
use std::cell::Cell;
use tabula_core::layout::FieldValue;

/// A resolved vector or matrix field of the bound element: the byte position
/// of its first component in the aspect buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SubView {
    pub(crate) base: usize,
}

/// One cache entry per compound field of the frame.
#[derive(Debug)]
struct ViewCache(Box<[Cell<Option<SubView>>]>);

impl ViewCache {
    fn new(len: usize) -> Self {
        Self((0..len).map(|_| Cell::new(None)).collect())
    }

    fn invalidate(&self) {
        for view in self.0.iter() {
            view.set(None);
        }
    }
}

/// A read-only view of one element.
#[derive(Debug)]
pub struct Cursor<'f, I: Index> {
    frame: &'f DataFrame<I>,
    ordinal: Ordinal,
    views: ViewCache,
}

impl<'f, I: Index> Cursor<'f, I> {
    pub(crate) fn new(frame: &'f DataFrame<I>, ordinal: Ordinal) -> Self {
        Self {
            frame,
            ordinal,
            views: ViewCache::new(frame.compound_count()),
        }
    }

    /// The bound ordinal.
    pub fn ordinal(&self) -> Ordinal {
        self.ordinal
    }

    /// The domain reference of the bound ordinal.
    pub fn reference(&self) -> I::Reference {
        self.frame.index().to_reference(self.ordinal)
    }

    /// Binds the cursor to another ordinal, dropping every cached view.
    pub fn rebind(&mut self, ordinal: Ordinal) {
        self.ordinal = ordinal;
        self.views.invalidate();
    }

    /// Reads a field. Dense fields always yield a value; sparse fields yield
    /// `None` when the element has none.
    ///
    /// # Panics
    /// Panics if `T` does not match the field's kind and element count.
    pub fn read<T: FieldValue>(&self, field: FieldHandle) -> Option<T> {
        self.frame.read_value(self.ordinal, field)
    }

    /// Reads one component of a vector or matrix field.
    ///
    /// # Panics
    /// Panics on a kind mismatch or an out-of-range component.
    pub fn component<T: FieldValue>(&self, field: FieldHandle, index: usize) -> Option<T> {
        self.frame
            .read_component(self.ordinal, field, index, &self.views.0)
    }

    /// Whether the element exists in an aspect. Always `true` for dense ones.
    pub fn has(&self, aspect: AspectId) -> bool {
        self.frame.aspect(aspect).contains(self.ordinal)
    }

    /// The draw position in an order aspect.
    pub fn order(&self, aspect: AspectId) -> Option<u32> {
        self.frame.aspect(aspect).order_of(self.ordinal)
    }
}

/// A read-write view of one element.
#[derive(Debug)]
pub struct CursorMut<'f, I: Index> {
    frame: &'f mut DataFrame<I>,
    ordinal: Ordinal,
    views: ViewCache,
}

impl<'f, I: Index> CursorMut<'f, I> {
    pub(crate) fn new(frame: &'f mut DataFrame<I>, ordinal: Ordinal) -> Self {
        let views = ViewCache::new(frame.compound_count());
        Self {
            frame,
            ordinal,
            views,
        }
    }

    /// The bound ordinal.
    pub fn ordinal(&self) -> Ordinal {
        self.ordinal
    }

    /// The domain reference of the bound ordinal.
    pub fn reference(&self) -> I::Reference {
        self.frame.index().to_reference(self.ordinal)
    }

    /// Binds the cursor to another ordinal, dropping every cached view.
    pub fn rebind(&mut self, ordinal: Ordinal) {
        self.ordinal = ordinal;
        self.views.invalidate();
    }

    /// See [`Cursor::read`].
    pub fn read<T: FieldValue>(&self, field: FieldHandle) -> Option<T> {
        self.frame.read_value(self.ordinal, field)
    }

    /// See [`Cursor::component`].
    pub fn component<T: FieldValue>(&self, field: FieldHandle, index: usize) -> Option<T> {
        self.frame
            .read_component(self.ordinal, field, index, &self.views.0)
    }

    /// See [`Cursor::has`].
    pub fn has(&self, aspect: AspectId) -> bool {
        self.frame.aspect(aspect).contains(self.ordinal)
    }

    /// See [`Cursor::order`].
    pub fn order(&self, aspect: AspectId) -> Option<u32> {
        self.frame.aspect(aspect).order_of(self.ordinal)
    }

    /// Writes a field. On a sparse aspect the element is created first if
    /// it does not exist, with its other fields zeroed.
    ///
    /// # Panics
    /// Panics if `T` does not match the field's kind and element count.
    pub fn write<T: FieldValue>(&mut self, field: FieldHandle, value: T) {
        self.frame.write_value(self.ordinal, field, &value);
    }

    /// Writes one component of a vector or matrix field.
    ///
    /// # Panics
    /// Panics on a kind mismatch or an out-of-range component.
    pub fn set_component<T: FieldValue>(&mut self, field: FieldHandle, index: usize, value: T) {
        self.frame
            .write_component(self.ordinal, field, index, &value, &self.views.0);
    }

    /// Moves the element to a draw position in an order aspect, swapping
    /// with the element there.
    ///
    /// # Panics
    /// Panics if `position` is not below the aspect's length.
    pub fn set_order(&mut self, aspect: AspectId, position: u32) {
        self.frame.aspect_mut(aspect).set_order(self.ordinal, position);
    }

    /// Removes the element from a sparse aspect. Returns `false` if it had
    /// none.
    ///
    /// # Panics
    /// Panics on dense aspects.
    pub fn remove(&mut self, aspect: AspectId) -> bool {
        self.views.invalidate();
        self.frame.aspect_mut(aspect).remove(self.ordinal)
    }
}

/// Steps one [`CursorMut`] through every ordinal of a frame.
///
/// ```ignore
/// let mut walk = frame.walk_mut();
/// while let Some(row) = walk.next_row() {
///     row.write(field, 0u8);
/// }
/// ```
#[derive(Debug)]
pub struct RowWalker<'f, I: Index> {
    cursor: CursorMut<'f, I>,
    next: Ordinal,
}

impl<'f, I: Index> RowWalker<'f, I> {
    pub(crate) fn new(frame: &'f mut DataFrame<I>) -> Self {
        Self {
            cursor: CursorMut::new(frame, 0),
            next: 0,
        }
    }

    /// Rebinds the cursor to the next ordinal, or returns `None` at the end.
    pub fn next_row(&mut self) -> Option<&mut CursorMut<'f, I>> {
        if self.next as usize >= self.cursor.frame.len() {
            return None;
        }
        self.cursor.rebind(self.next);
        self.next += 1;
        Some(&mut self.cursor)
    }
}
