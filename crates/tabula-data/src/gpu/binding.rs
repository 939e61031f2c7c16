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

//! Vertex attribute and element-index layouts derived from aspect layouts.

use crate::frame::Aspect;
use std::borrow::Cow;
use tabula_core::layout::{FieldShape, ScalarKind};
use tabula_core::renderer::{
    IndexFormat, VertexAttributeDescriptor, VertexBufferLayoutDescriptor, VertexFormat,
    VertexStepMode,
};

#[derive(Debug, Clone)]
struct AttributeEntry {
    field: String,
    location: u32,
    normalized: Option<bool>,
}

/// Which aspect fields feed which shader locations.
///
/// Primitive-typed aspects have one unnamed field, bound with
/// [`value`](Self::value).
#[derive(Debug, Clone, Default)]
pub struct AttributeMap {
    entries: Vec<AttributeEntry>,
}

impl AttributeMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a struct member to a shader location.
    pub fn bind(mut self, field: impl Into<String>, location: u32) -> Self {
        self.entries.push(AttributeEntry {
            field: field.into(),
            location,
            normalized: None,
        });
        self
    }

    /// Binds a struct member, overriding the default normalization.
    pub fn bind_normalized(mut self, field: impl Into<String>, location: u32, normalized: bool) -> Self {
        self.entries.push(AttributeEntry {
            field: field.into(),
            location,
            normalized: Some(normalized),
        });
        self
    }

    /// Binds the value of a primitive-typed aspect.
    pub fn value(self, location: u32) -> Self {
        self.bind("", location)
    }
}

/// The vertex format for `components` elements of `scalar`.
///
/// # Panics
/// Panics on normalized 32-bit integers and on component counts outside
/// `1..=4`; neither has a vertex format.
pub fn vertex_format(scalar: ScalarKind, components: u8, normalized: bool) -> VertexFormat {
    use VertexFormat::*;

    let row: [VertexFormat; 4] = match (scalar, normalized) {
        (ScalarKind::Float32, _) => [Float32, Float32x2, Float32x3, Float32x4],
        (ScalarKind::Bool | ScalarKind::Uint8, false) => [Uint8, Uint8x2, Uint8x3, Uint8x4],
        (ScalarKind::Bool | ScalarKind::Uint8, true) => [Unorm8, Unorm8x2, Unorm8x3, Unorm8x4],
        (ScalarKind::Int8, false) => [Sint8, Sint8x2, Sint8x3, Sint8x4],
        (ScalarKind::Int8, true) => [Snorm8, Snorm8x2, Snorm8x3, Snorm8x4],
        (ScalarKind::Uint16, false) => [Uint16, Uint16x2, Uint16x3, Uint16x4],
        (ScalarKind::Uint16, true) => [Unorm16, Unorm16x2, Unorm16x3, Unorm16x4],
        (ScalarKind::Int16, false) => [Sint16, Sint16x2, Sint16x3, Sint16x4],
        (ScalarKind::Int16, true) => [Snorm16, Snorm16x2, Snorm16x3, Snorm16x4],
        (ScalarKind::Uint32, false) => [Uint32, Uint32x2, Uint32x3, Uint32x4],
        (ScalarKind::Int32, false) => [Sint32, Sint32x2, Sint32x3, Sint32x4],
        (ScalarKind::Uint32 | ScalarKind::Int32, true) => {
            panic!("{} attributes cannot be normalized", scalar.tag())
        }
    };

    assert!(
        (1..=4).contains(&components),
        "vertex attributes hold 1 to 4 components, not {components}"
    );
    row[components as usize - 1]
}

/// Describes an aspect's buffer as a vertex buffer.
///
/// The stride is the aspect's byte stride and each mapped field becomes an
/// attribute at its byte offset. A matrix takes one location per column.
/// Color-like vectors (`rgb`, `rgba`) are normalized unless the map says
/// otherwise; every other field is bound raw.
///
/// # Panics
/// Panics if the map names a field the aspect does not have, or asks for a
/// format no vertex attribute supports.
pub fn vertex_layout(
    aspect: &Aspect,
    attributes: &AttributeMap,
    step_mode: VertexStepMode,
) -> VertexBufferLayoutDescriptor<'static> {
    let layout = aspect.layout();
    let mut descriptors = Vec::with_capacity(attributes.entries.len());

    for entry in &attributes.entries {
        let (_, field) = layout
            .field(&entry.field)
            .unwrap_or_else(|| panic!("aspect has no field named `{}`", entry.field));
        let offset = field.offset as u64;

        match field.shape {
            FieldShape::Scalar => descriptors.push(VertexAttributeDescriptor {
                shader_location: entry.location,
                format: vertex_format(field.scalar, 1, entry.normalized.unwrap_or(false)),
                offset,
            }),
            FieldShape::Vector { components, color } => {
                descriptors.push(VertexAttributeDescriptor {
                    shader_location: entry.location,
                    format: vertex_format(
                        field.scalar,
                        components,
                        entry.normalized.unwrap_or(color),
                    ),
                    offset,
                })
            }
            FieldShape::Matrix { columns, rows } => {
                let column_bytes = rows as u64 * field.scalar.width() as u64;
                for column in 0..columns {
                    descriptors.push(VertexAttributeDescriptor {
                        shader_location: entry.location + column as u32,
                        format: vertex_format(field.scalar, rows, false),
                        offset: offset + column as u64 * column_bytes,
                    });
                }
            }
        }
    }

    VertexBufferLayoutDescriptor {
        array_stride: layout.byte_stride as u64,
        step_mode,
        attributes: Cow::Owned(descriptors),
    }
}

/// How to bind an aspect as an element-index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementBinding {
    /// The index width to bind with.
    pub format: IndexFormat,
    /// Number of indices to draw.
    pub count: u32,
    /// Whether the stored 8-bit indices must be widened to 16 bits on upload.
    pub widen: bool,
}

/// Describes an aspect's buffer as an element-index buffer.
///
/// Order aspects always qualify. Datum aspects must hold exactly one integer
/// scalar; 8- and 16-bit fields bind as `Uint16`, 32-bit ones as `Uint32`.
/// Sparse aspects draw up to their high-water mark, so compact them first to
/// avoid drawing the zeroes left in holes.
///
/// # Panics
/// Panics if the aspect is not a single integer scalar.
pub fn element_binding(aspect: &Aspect) -> ElementBinding {
    let field = aspect
        .layout()
        .single_scalar()
        .unwrap_or_else(|| panic!("element buffers need exactly one scalar field"));
    assert!(
        field.scalar.is_integer(),
        "element buffers need an integer field, not {}",
        field.scalar.tag()
    );

    let (format, widen) = match field.scalar.width() {
        1 => (IndexFormat::Uint16, true),
        2 => (IndexFormat::Uint16, false),
        _ => (IndexFormat::Uint32, false),
    };
    let count = match aspect {
        Aspect::SparseOrder(order) => order.len(),
        Aspect::SparseDatum(datum) => datum.slots().stats().high_water,
        _ => aspect.len(),
    };

    ElementBinding {
        format,
        count: count as u32,
        widen,
    }
}
