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

//! The compiled accessor table: every field of every datum aspect resolved
//! once to a copyable handle.

use std::ops::Range;
use tabula_core::layout::{FieldShape, FieldValue, Layout, ScalarKind};

/// Identifies an aspect within its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AspectId(pub(crate) usize);

impl AspectId {
    /// Position of the aspect in declaration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A resolved field: where it lives and what it holds.
///
/// Handles are only meaningful for the frame that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldHandle {
    pub(crate) aspect: AspectId,
    pub(crate) offset: usize,
    pub(crate) len: usize,
    pub(crate) scalar: ScalarKind,
    pub(crate) shape: FieldShape,
    pub(crate) compound: Option<usize>,
}

impl FieldHandle {
    /// The owning aspect.
    pub fn aspect(&self) -> AspectId {
        self.aspect
    }

    /// Byte offset within an element.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes occupied by the field.
    pub fn byte_length(&self) -> usize {
        self.len
    }

    /// The element kind.
    pub fn scalar(&self) -> ScalarKind {
        self.scalar
    }

    /// The field shape.
    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    /// Number of scalar elements.
    pub fn elements(&self) -> usize {
        self.len / self.scalar.width()
    }

    /// Panics unless `T` has this field's scalar kind and element count.
    pub(crate) fn check_value<T: FieldValue>(&self) {
        if T::SCALAR != self.scalar || T::ELEMENTS != self.elements() {
            panic!(
                "field holds {} x {} but was accessed as {} x {}",
                self.elements(),
                self.scalar.tag(),
                T::ELEMENTS,
                T::SCALAR.tag()
            );
        }
    }

    /// Panics unless `T` is a single element of this field's kind and
    /// `index` addresses one of its components.
    pub(crate) fn check_component<T: FieldValue>(&self, index: usize) {
        if T::SCALAR != self.scalar || T::ELEMENTS != 1 {
            panic!(
                "components of this field are {} but were accessed as {} x {}",
                self.scalar.tag(),
                T::ELEMENTS,
                T::SCALAR.tag()
            );
        }
        assert!(
            index < self.elements(),
            "component {index} is out of range for a field of {} elements",
            self.elements()
        );
    }
}

/// Field handles for a whole frame, grouped by aspect.
#[derive(Debug, Clone, Default)]
pub struct AccessorTable {
    handles: Vec<FieldHandle>,
    names: Vec<String>,
    by_aspect: Vec<Range<usize>>,
    compound_count: usize,
}

impl AccessorTable {
    /// Compiles handles for a list of aspects in declaration order. Order
    /// aspects pass `None` and get no fields.
    pub fn compile<'a>(layouts: impl IntoIterator<Item = Option<&'a Layout>>) -> Self {
        let mut table = Self::default();
        for (index, layout) in layouts.into_iter().enumerate() {
            let start = table.handles.len();
            for field in layout.map(|l| l.fields.as_slice()).unwrap_or_default() {
                let compound = field.is_compound().then(|| {
                    table.compound_count += 1;
                    table.compound_count - 1
                });
                table.handles.push(FieldHandle {
                    aspect: AspectId(index),
                    offset: field.offset,
                    len: field.byte_length,
                    scalar: field.scalar,
                    shape: field.shape,
                    compound,
                });
                table.names.push(field.name.clone());
            }
            table.by_aspect.push(start..table.handles.len());
        }
        table
    }

    /// Every handle of one aspect, in declaration order.
    pub fn fields(&self, aspect: AspectId) -> &[FieldHandle] {
        self.by_aspect
            .get(aspect.0)
            .map_or(&[], |range| &self.handles[range.clone()])
    }

    /// Looks up a named struct member.
    pub fn field(&self, aspect: AspectId, name: &str) -> Option<FieldHandle> {
        let range = self.by_aspect.get(aspect.0)?.clone();
        let names = &self.names[range.clone()];
        let at = names.iter().position(|candidate| candidate == name)?;
        Some(self.handles[range.start + at])
    }

    /// The single unnamed field of a primitive-typed aspect.
    pub fn aspect_field(&self, aspect: AspectId) -> Option<FieldHandle> {
        self.field(aspect, "")
    }

    /// Number of vector and matrix fields across the frame.
    pub fn compound_count(&self) -> usize {
        self.compound_count
    }
}
