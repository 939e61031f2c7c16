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

//! The frame: one index and a set of named aspects.

use super::accessor::{AccessorTable, AspectId, FieldHandle};
use super::allocator::AllocatorStats;
use super::aspect::{Aspect, AspectSpec, PreparedResize, Storage};
use super::cursor::{Cursor, CursorMut, RowWalker, SubView};
use super::dense::ZEROES;
use super::index::Index;
use super::Ordinal;
use ahash::AHashMap;
use std::cell::Cell;
use tabula_core::layout::{FieldType, FieldValue};

/// Per-aspect figures reported by [`DataFrame::stats`].
#[derive(Debug, Clone, PartialEq)]
pub struct AspectStats {
    /// The aspect name.
    pub name: String,
    /// Its storage discipline.
    pub storage: Storage,
    /// Size of its upload buffer.
    pub bytes: usize,
    /// Allocator occupancy, for sparse aspects.
    pub allocator: Option<AllocatorStats>,
}

/// A snapshot of a frame's size and fragmentation.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    /// The frame length.
    pub length: usize,
    /// One entry per aspect, in declaration order.
    pub aspects: Vec<AspectStats>,
}

/// A columnar store of named aspects over the ordinals of an [`Index`].
///
/// Elements are addressed through cursors: [`cursor_at`](Self::cursor_at)
/// resolves a domain reference, [`get`](Self::get) takes an ordinal.
/// Structural changes ([`resize`](Self::resize), [`clear`](Self::clear),
/// [`compact`](Self::compact)) need `&mut self`, so no cursor can outlive
/// them.
#[derive(Debug, Clone)]
pub struct DataFrame<I: Index> {
    index: I,
    names: Vec<String>,
    aspects: Vec<Aspect>,
    lookup: AHashMap<String, AspectId>,
    accessors: AccessorTable,
}

/// Declares the aspects of a [`DataFrame`].
#[derive(Debug)]
pub struct FrameBuilder<I: Index> {
    index: I,
    aspects: Vec<(String, AspectSpec)>,
}

impl<I: Index> FrameBuilder<I> {
    /// Adds an aspect.
    pub fn aspect(mut self, name: impl Into<String>, spec: AspectSpec) -> Self {
        self.aspects.push((name.into(), spec));
        self
    }

    /// Adds a dense datum aspect.
    pub fn dense(self, name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        self.aspect(name, AspectSpec::dense(ty))
    }

    /// Adds a sparse datum aspect with default settings.
    pub fn sparse(self, name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        self.aspect(name, AspectSpec::sparse(ty))
    }

    /// Adds a dense order aspect.
    pub fn dense_order(self, name: impl Into<String>) -> Self {
        self.aspect(name, AspectSpec::dense_order())
    }

    /// Adds a sparse order aspect with default settings.
    pub fn sparse_order(self, name: impl Into<String>) -> Self {
        self.aspect(name, AspectSpec::sparse_order())
    }

    /// Builds the frame, sizing dense aspects to the index length.
    ///
    /// # Panics
    /// Panics if two aspects share a name.
    pub fn build(self) -> DataFrame<I> {
        let length = self.index.len();
        let mut names = Vec::with_capacity(self.aspects.len());
        let mut aspects = Vec::with_capacity(self.aspects.len());
        let mut lookup = AHashMap::new();

        for (name, spec) in self.aspects {
            let id = AspectId(aspects.len());
            if lookup.insert(name.clone(), id).is_some() {
                panic!("aspect `{name}` is declared twice");
            }
            aspects.push(Aspect::new(&spec, length));
            names.push(name);
        }

        let accessors = AccessorTable::compile(
            aspects
                .iter()
                .map(|aspect| (!aspect.is_order()).then(|| aspect.layout())),
        );

        log::debug!(
            "Built frame of {} elements with {} aspects",
            length,
            aspects.len()
        );

        DataFrame {
            index: self.index,
            names,
            aspects,
            lookup,
            accessors,
        }
    }
}

impl<I: Index> DataFrame<I> {
    /// Starts declaring a frame over `index`.
    pub fn builder(index: I) -> FrameBuilder<I> {
        FrameBuilder {
            index,
            aspects: Vec::new(),
        }
    }

    /// The frame length.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the frame has no elements.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The index strategy.
    pub fn index(&self) -> &I {
        &self.index
    }

    /// The current shape.
    pub fn shape(&self) -> I::Shape {
        self.index.shape()
    }

    /// Looks up an aspect by name.
    pub fn aspect_id(&self, name: &str) -> Option<AspectId> {
        self.lookup.get(name).copied()
    }

    /// An aspect by id.
    pub fn aspect(&self, id: AspectId) -> &Aspect {
        &self.aspects[id.0]
    }

    /// An aspect's name.
    pub fn aspect_name(&self, id: AspectId) -> &str {
        &self.names[id.0]
    }

    /// `(name, aspect)` pairs in declaration order.
    pub fn aspects(&self) -> impl Iterator<Item = (&str, &Aspect)> + '_ {
        self.names.iter().map(String::as_str).zip(&self.aspects)
    }

    /// The compiled accessor table.
    pub fn accessors(&self) -> &AccessorTable {
        &self.accessors
    }

    /// A named member of a struct-typed aspect.
    pub fn field(&self, aspect: &str, name: &str) -> Option<FieldHandle> {
        self.accessors.field(self.aspect_id(aspect)?, name)
    }

    /// The value field of a primitive-typed aspect.
    pub fn aspect_field(&self, aspect: &str) -> Option<FieldHandle> {
        self.accessors.aspect_field(self.aspect_id(aspect)?)
    }

    /// Resolves a domain reference to an ordinal inside the frame.
    pub fn ordinal_of(&self, reference: I::Reference) -> Option<Ordinal> {
        self.index
            .to_ordinal(reference)
            .filter(|&ordinal| (ordinal as usize) < self.len())
    }

    /// A cursor on the element a reference names.
    pub fn cursor_at(&self, reference: I::Reference) -> Option<Cursor<'_, I>> {
        let ordinal = self.ordinal_of(reference)?;
        Some(Cursor::new(self, ordinal))
    }

    /// A mutable cursor on the element a reference names.
    pub fn cursor_at_mut(&mut self, reference: I::Reference) -> Option<CursorMut<'_, I>> {
        let ordinal = self.ordinal_of(reference)?;
        Some(CursorMut::new(self, ordinal))
    }

    fn clamp(&self, ordinal: Ordinal) -> Ordinal {
        let len = self.len();
        assert!(len > 0, "cannot address an element of an empty frame");
        ordinal.min(len as Ordinal - 1)
    }

    /// A cursor on `ordinal`, clamped into the frame.
    ///
    /// # Panics
    /// Panics if the frame is empty.
    pub fn get(&self, ordinal: Ordinal) -> Cursor<'_, I> {
        let ordinal = self.clamp(ordinal);
        Cursor::new(self, ordinal)
    }

    /// A mutable cursor on `ordinal`, clamped into the frame.
    ///
    /// # Panics
    /// Panics if the frame is empty.
    pub fn get_mut(&mut self, ordinal: Ordinal) -> CursorMut<'_, I> {
        let ordinal = self.clamp(ordinal);
        CursorMut::new(self, ordinal)
    }

    /// Cursors over every ordinal, ascending.
    pub fn rows(&self) -> impl Iterator<Item = Cursor<'_, I>> + '_ {
        (0..self.len() as Ordinal).map(move |ordinal| Cursor::new(self, ordinal))
    }

    /// Cursors over the elements of a sparse aspect, in slot order.
    ///
    /// # Panics
    /// Panics if the aspect is dense.
    pub fn sparse_rows(&self, aspect: AspectId) -> impl Iterator<Item = Cursor<'_, I>> + '_ {
        self.aspects[aspect.0]
            .sparse_iter()
            .unwrap_or_else(|| panic!("aspect `{}` is not sparse", self.names[aspect.0]))
            .map(move |(ordinal, _)| Cursor::new(self, ordinal))
    }

    /// A single mutable cursor that steps through every ordinal.
    pub fn walk_mut(&mut self) -> RowWalker<'_, I> {
        RowWalker::new(self)
    }

    /// Reshapes the frame.
    ///
    /// Every aspect's new state is computed from the index's plan before any
    /// of them changes, then all of them and the index are switched over
    /// together.
    pub fn resize(&mut self, shape: I::Shape) {
        let plan = self.index.plan_resize(shape);
        let prepared: Vec<PreparedResize> = self
            .aspects
            .iter()
            .map(|aspect| aspect.prepare_resize(&plan))
            .collect();

        for (aspect, prepared) in self.aspects.iter_mut().zip(prepared) {
            aspect.commit_resize(prepared);
        }
        self.index.apply_resize(shape);

        log::debug!(
            "Frame resized from {} to {} elements through {} remap ranges",
            plan.old_length,
            plan.new_length,
            plan.remap.len()
        );
    }

    /// Zeroes dense data, resets orders and empties sparse aspects. The
    /// length is unchanged.
    pub fn clear(&mut self) {
        for aspect in &mut self.aspects {
            aspect.clear();
        }
    }

    /// Compacts every sparse aspect. Returns the number of elements moved.
    pub fn compact(&mut self) -> usize {
        self.compact_where(|_| true)
    }

    /// Compacts the sparse aspects whose fragmentation exceeds `threshold`.
    pub fn compact_fragmented(&mut self, threshold: f32) -> usize {
        self.compact_where(|stats| stats.fragmentation > threshold)
    }

    fn compact_where(&mut self, mut wanted: impl FnMut(&AllocatorStats) -> bool) -> usize {
        let mut moved = 0;
        for (name, aspect) in self.names.iter().zip(&mut self.aspects) {
            let Some(stats) = aspect.stats() else {
                continue;
            };
            if wanted(&stats) {
                let count = aspect.compact();
                log::debug!("Compacted aspect `{name}`: {count} elements moved");
                moved += count;
            }
        }
        moved
    }

    /// Size and fragmentation figures.
    pub fn stats(&self) -> FrameStats {
        FrameStats {
            length: self.len(),
            aspects: self
                .aspects()
                .map(|(name, aspect)| AspectStats {
                    name: name.to_owned(),
                    storage: aspect.storage(),
                    bytes: aspect.bytes().len(),
                    allocator: aspect.stats(),
                })
                .collect(),
        }
    }

    pub(crate) fn compound_count(&self) -> usize {
        self.accessors.compound_count()
    }

    pub(crate) fn read_value<T: FieldValue>(
        &self,
        ordinal: Ordinal,
        field: FieldHandle,
    ) -> Option<T> {
        field.check_value::<T>();
        self.aspects[field.aspect.0]
            .read_field(ordinal, field.offset, field.len)
            .map(T::decode)
    }

    pub(crate) fn write_value<T: FieldValue>(
        &mut self,
        ordinal: Ordinal,
        field: FieldHandle,
        value: &T,
    ) {
        field.check_value::<T>();
        let mut buffer = ZEROES;
        let bytes = &mut buffer[..field.len];
        value.encode(bytes);
        self.aspects[field.aspect.0].write_field(ordinal, field.offset, bytes);
    }

    fn cached_base(field: FieldHandle, views: &[Cell<Option<SubView>>]) -> Option<usize> {
        field
            .compound
            .and_then(|slot| views[slot].get())
            .map(|view| view.base)
    }

    fn remember(field: FieldHandle, views: &[Cell<Option<SubView>>], base: usize) {
        if let Some(slot) = field.compound {
            views[slot].set(Some(SubView { base }));
        }
    }

    pub(crate) fn read_component<T: FieldValue>(
        &self,
        ordinal: Ordinal,
        field: FieldHandle,
        index: usize,
        views: &[Cell<Option<SubView>>],
    ) -> Option<T> {
        field.check_component::<T>(index);
        let aspect = &self.aspects[field.aspect.0];
        let width = field.scalar.width();

        let base = match Self::cached_base(field, views) {
            Some(base) => base,
            None => match aspect.element_offset(ordinal) {
                Some(element) => {
                    let base = element + field.offset;
                    Self::remember(field, views, base);
                    base
                }
                None if aspect.storage() == Storage::Dense => {
                    return Some(T::decode(&ZEROES[..width]));
                }
                None => return None,
            },
        };
        Some(T::decode(aspect.span(base + index * width, width)))
    }

    pub(crate) fn write_component<T: FieldValue>(
        &mut self,
        ordinal: Ordinal,
        field: FieldHandle,
        index: usize,
        value: &T,
        views: &[Cell<Option<SubView>>],
    ) {
        field.check_component::<T>(index);
        let aspect = &mut self.aspects[field.aspect.0];
        let width = field.scalar.width();

        let base = match Self::cached_base(field, views) {
            Some(base) => base,
            None => {
                let base = aspect.ensure_element(ordinal) + field.offset;
                Self::remember(field, views, base);
                base
            }
        };
        value.encode(aspect.span_mut(base + index * width, width));
    }

    pub(crate) fn aspect_mut(&mut self, id: AspectId) -> &mut Aspect {
        &mut self.aspects[id.0]
    }
}
