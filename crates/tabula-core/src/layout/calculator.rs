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

//! The byte layout calculator.
//!
//! Layouts are byte-packed: a struct member starts right where the previous
//! one ends, with no alignment padding, so the CPU buffer can be handed to
//! the GPU verbatim.

use super::scalar::ScalarKind;
use super::types::{FieldType, PrimitiveType};

/// The shape of a laid-out field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldShape {
    /// A single element.
    Scalar,
    /// A vector of `components` elements.
    Vector {
        /// Number of components.
        components: u8,
        /// Whether the vector is color-like (`rgb`/`rgba`).
        color: bool,
    },
    /// A column-major matrix.
    Matrix {
        /// Number of columns.
        columns: u8,
        /// Number of rows.
        rows: u8,
    },
}

/// One field of a [`Layout`], with its resolved byte range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldLayout {
    /// The member name. Empty for the single field of a primitive layout.
    pub name: String,
    /// Byte offset from the start of the element.
    pub offset: usize,
    /// Number of bytes the field occupies.
    pub byte_length: usize,
    /// The kind of every element in the field.
    pub scalar: ScalarKind,
    /// The field's shape.
    pub shape: FieldShape,
}

impl FieldLayout {
    /// The number of scalar elements in the field.
    pub fn element_count(&self) -> usize {
        self.byte_length / self.scalar.width()
    }

    /// Vectors and matrices are compound: they expose per-component access.
    pub fn is_compound(&self) -> bool {
        !matches!(self.shape, FieldShape::Scalar)
    }
}

/// The complete byte layout of one aspect element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Layout {
    /// Bytes occupied by one element; the distance between consecutive elements.
    pub byte_stride: usize,
    /// Fields in declaration order.
    pub fields: Vec<FieldLayout>,
}

impl Layout {
    /// Finds a field by name, returning its position and layout.
    pub fn field(&self, name: &str) -> Option<(usize, &FieldLayout)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    /// Returns the single field if the layout holds exactly one scalar.
    pub fn single_scalar(&self) -> Option<&FieldLayout> {
        match self.fields.as_slice() {
            [field] if field.shape == FieldShape::Scalar => Some(field),
            _ => None,
        }
    }
}

/// Returns the byte length of a primitive type.
pub fn byte_length(ty: &PrimitiveType) -> usize {
    element_count(ty) * ty.scalar_kind().width()
}

/// Returns the number of scalar elements in a primitive type.
pub fn element_count(ty: &PrimitiveType) -> usize {
    match ty {
        PrimitiveType::Scalar(_) => 1,
        PrimitiveType::Vector(vector) => vector.components as usize,
        PrimitiveType::Matrix(matrix) => matrix.columns as usize * matrix.rows as usize,
    }
}

fn shape_of(ty: &PrimitiveType) -> FieldShape {
    match ty {
        PrimitiveType::Scalar(_) => FieldShape::Scalar,
        PrimitiveType::Vector(vector) => FieldShape::Vector {
            components: vector.components,
            color: vector.color,
        },
        PrimitiveType::Matrix(matrix) => FieldShape::Matrix {
            columns: matrix.columns,
            rows: matrix.rows,
        },
    }
}

fn field_at(name: &str, offset: usize, ty: &PrimitiveType) -> FieldLayout {
    FieldLayout {
        name: name.to_owned(),
        offset,
        byte_length: byte_length(ty),
        scalar: ty.scalar_kind(),
        shape: shape_of(ty),
    }
}

/// Computes the packed layout of a field type.
///
/// # Panics
/// Panics on an empty struct or a struct with duplicate member names; both
/// are declaration errors.
pub fn layout_of(ty: &FieldType) -> Layout {
    match ty {
        FieldType::Primitive(primitive) => {
            let field = field_at("", 0, primitive);
            Layout {
                byte_stride: field.byte_length,
                fields: vec![field],
            }
        }
        FieldType::Struct(decl) => {
            assert!(!decl.fields.is_empty(), "struct `{}` has no fields", decl.name);
            let mut fields: Vec<FieldLayout> = Vec::with_capacity(decl.fields.len());
            let mut offset = 0;
            for (name, member) in &decl.fields {
                assert!(
                    fields.iter().all(|f| &f.name != name),
                    "struct `{}` declares `{name}` twice",
                    decl.name
                );
                let field = field_at(name, offset, member);
                offset += field.byte_length;
                fields.push(field);
            }
            Layout {
                byte_stride: offset,
                fields,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{MatrixType, StructType, VectorType};

    #[test]
    fn primitive_layout_is_a_single_unnamed_field() {
        let layout = layout_of(&FieldType::parse("vec3"));
        assert_eq!(layout.byte_stride, 12);
        assert_eq!(layout.fields.len(), 1);
        assert_eq!(layout.fields[0].name, "");
        assert_eq!(layout.fields[0].element_count(), 3);
        assert!(layout.fields[0].is_compound());
    }

    #[test]
    fn struct_members_are_byte_packed() {
        let decl = StructType::new("Tile")
            .field("flag", ScalarKind::Bool)
            .field("pos", VectorType::new(ScalarKind::Int16, 2))
            .tagged("color", "rgb")
            .field("world", MatrixType::new(4, 4))
            .field("id", ScalarKind::Uint32);
        let layout = layout_of(&FieldType::Struct(decl));

        let offsets: Vec<_> = layout.fields.iter().map(|f| f.offset).collect();
        assert_eq!(offsets, vec![0, 1, 5, 8, 72]);
        assert_eq!(layout.byte_stride, 76);

        let (index, color) = layout.field("color").unwrap();
        assert_eq!(index, 2);
        assert_eq!(
            color.shape,
            FieldShape::Vector {
                components: 3,
                color: true
            }
        );
        assert_eq!(color.byte_length, 3);
    }

    #[test]
    fn non_square_matrix_sizes() {
        let ty = PrimitiveType::Matrix(MatrixType::new(3, 2));
        assert_eq!(element_count(&ty), 6);
        assert_eq!(byte_length(&ty), 24);
    }

    #[test]
    fn single_scalar_detection() {
        assert!(layout_of(&FieldType::parse("uint16")).single_scalar().is_some());
        assert!(layout_of(&FieldType::parse("uvec2")).single_scalar().is_none());
    }

    #[test]
    #[should_panic(expected = "declares `a` twice")]
    fn duplicate_members_panic() {
        let decl = StructType::new("Dup")
            .field("a", ScalarKind::Uint8)
            .field("a", ScalarKind::Uint8);
        layout_of(&FieldType::Struct(decl));
    }
}
