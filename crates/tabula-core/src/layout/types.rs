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

//! Declared field types: scalars, vectors, matrices and structs of those.

use super::scalar::ScalarKind;

/// A fixed-size tuple of scalars of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VectorType {
    /// The kind of every component.
    pub scalar: ScalarKind,
    /// The number of components, 2 to 4.
    pub components: u8,
    /// Color-like vectors (`rgb`/`rgba`) bind as normalized attributes by default.
    pub color: bool,
}

impl VectorType {
    /// Creates a plain vector type.
    ///
    /// # Panics
    /// Panics if `components` is not in `2..=4`.
    pub fn new(scalar: ScalarKind, components: u8) -> Self {
        assert!(
            (2..=4).contains(&components),
            "vectors have 2 to 4 components, got {components}"
        );
        Self {
            scalar,
            components,
            color: false,
        }
    }

    /// The `rgb` alias: three color-like `uint8` components.
    pub fn rgb() -> Self {
        Self {
            color: true,
            ..Self::new(ScalarKind::Uint8, 3)
        }
    }

    /// The `rgba` alias: four color-like `uint8` components.
    pub fn rgba() -> Self {
        Self {
            color: true,
            ..Self::new(ScalarKind::Uint8, 4)
        }
    }
}

/// A column-major matrix of `float32` values (`matCxR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixType {
    /// Number of columns, 2 to 4.
    pub columns: u8,
    /// Number of rows, 2 to 4.
    pub rows: u8,
}

impl MatrixType {
    /// Creates a matrix type.
    ///
    /// # Panics
    /// Panics if either dimension is not in `2..=4`.
    pub fn new(columns: u8, rows: u8) -> Self {
        assert!(
            (2..=4).contains(&columns) && (2..=4).contains(&rows),
            "matrices are 2x2 to 4x4, got {columns}x{rows}"
        );
        Self { columns, rows }
    }
}

/// A type that can appear as a struct member: anything but a struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// A single scalar.
    Scalar(ScalarKind),
    /// A vector of scalars.
    Vector(VectorType),
    /// A float matrix.
    Matrix(MatrixType),
}

impl PrimitiveType {
    /// The scalar kind of every element.
    pub fn scalar_kind(&self) -> ScalarKind {
        match self {
            PrimitiveType::Scalar(kind) => *kind,
            PrimitiveType::Vector(vector) => vector.scalar,
            PrimitiveType::Matrix(_) => ScalarKind::Float32,
        }
    }

    /// Parses a type tag such as `uint8`, `vec3`, `rgba` or `mat4x3`.
    ///
    /// Returns `None` for tags outside the supported table.
    pub fn try_parse(tag: &str) -> Option<Self> {
        if let Some(kind) = ScalarKind::from_tag(tag) {
            return Some(PrimitiveType::Scalar(kind));
        }
        match tag {
            "rgb" => return Some(PrimitiveType::Vector(VectorType::rgb())),
            "rgba" => return Some(PrimitiveType::Vector(VectorType::rgba())),
            _ => {}
        }
        if let Some(dims) = tag.strip_prefix("mat") {
            return parse_matrix_dims(dims).map(PrimitiveType::Matrix);
        }

        let count = tag.chars().last()?;
        let prefix = &tag[..tag.len() - count.len_utf8()];
        let components = match count {
            '2' => 2,
            '3' => 3,
            '4' => 4,
            _ => return None,
        };
        let scalar = match prefix {
            "vec" => ScalarKind::Float32,
            "ivec" => ScalarKind::Int32,
            "uvec" => ScalarKind::Uint32,
            "bvec" => ScalarKind::Bool,
            "i8vec" => ScalarKind::Int8,
            "u8vec" => ScalarKind::Uint8,
            "i16vec" => ScalarKind::Int16,
            "u16vec" => ScalarKind::Uint16,
            _ => return None,
        };
        Some(PrimitiveType::Vector(VectorType::new(scalar, components)))
    }
}

fn parse_matrix_dims(dims: &str) -> Option<MatrixType> {
    let dim = |s: &str| match s {
        "2" => Some(2u8),
        "3" => Some(3),
        "4" => Some(4),
        _ => None,
    };
    match dims.split_once('x') {
        Some((columns, rows)) => Some(MatrixType::new(dim(columns)?, dim(rows)?)),
        None => {
            let n = dim(dims)?;
            Some(MatrixType::new(n, n))
        }
    }
}

impl From<ScalarKind> for PrimitiveType {
    fn from(kind: ScalarKind) -> Self {
        PrimitiveType::Scalar(kind)
    }
}

impl From<VectorType> for PrimitiveType {
    fn from(vector: VectorType) -> Self {
        PrimitiveType::Vector(vector)
    }
}

impl From<MatrixType> for PrimitiveType {
    fn from(matrix: MatrixType) -> Self {
        PrimitiveType::Matrix(matrix)
    }
}

/// A named, ordered list of primitive fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructType {
    /// The struct's name, used for diagnostics.
    pub name: String,
    /// Members in declaration order.
    pub fields: Vec<(String, PrimitiveType)>,
}

impl StructType {
    /// Starts an empty struct declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a member.
    pub fn field(mut self, name: impl Into<String>, ty: impl Into<PrimitiveType>) -> Self {
        self.fields.push((name.into(), ty.into()));
        self
    }

    /// Appends a member given by type tag.
    ///
    /// # Panics
    /// Panics on an unrecognized tag.
    pub fn tagged(self, name: impl Into<String>, tag: &str) -> Self {
        let ty = PrimitiveType::try_parse(tag)
            .unwrap_or_else(|| panic!("unrecognized field type tag `{tag}`"));
        self.field(name, ty)
    }
}

/// The declared type of an aspect's value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// A scalar, vector or matrix.
    Primitive(PrimitiveType),
    /// A struct of primitives.
    Struct(StructType),
}

impl FieldType {
    /// Parses a primitive type tag.
    ///
    /// # Panics
    /// Panics on an unrecognized tag. Types are fixed when an aspect is
    /// declared, so a bad tag is a programming error.
    pub fn parse(tag: &str) -> Self {
        Self::try_parse(tag).unwrap_or_else(|| panic!("unrecognized field type tag `{tag}`"))
    }

    /// Parses a primitive type tag, returning `None` when it is unknown.
    pub fn try_parse(tag: &str) -> Option<Self> {
        PrimitiveType::try_parse(tag).map(FieldType::Primitive)
    }
}

impl From<PrimitiveType> for FieldType {
    fn from(ty: PrimitiveType) -> Self {
        FieldType::Primitive(ty)
    }
}

impl From<ScalarKind> for FieldType {
    fn from(kind: ScalarKind) -> Self {
        FieldType::Primitive(kind.into())
    }
}

impl From<VectorType> for FieldType {
    fn from(vector: VectorType) -> Self {
        FieldType::Primitive(vector.into())
    }
}

impl From<MatrixType> for FieldType {
    fn from(matrix: MatrixType) -> Self {
        FieldType::Primitive(matrix.into())
    }
}

impl From<StructType> for FieldType {
    fn from(ty: StructType) -> Self {
        FieldType::Struct(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vector_and_matrix_tags() {
        assert_eq!(
            PrimitiveType::try_parse("vec3"),
            Some(PrimitiveType::Vector(VectorType::new(ScalarKind::Float32, 3)))
        );
        assert_eq!(
            PrimitiveType::try_parse("u16vec2"),
            Some(PrimitiveType::Vector(VectorType::new(ScalarKind::Uint16, 2)))
        );
        assert_eq!(
            PrimitiveType::try_parse("mat4"),
            Some(PrimitiveType::Matrix(MatrixType::new(4, 4)))
        );
        assert_eq!(
            PrimitiveType::try_parse("mat2x3"),
            Some(PrimitiveType::Matrix(MatrixType::new(2, 3)))
        );
    }

    #[test]
    fn color_aliases_are_flagged() {
        let PrimitiveType::Vector(rgba) = PrimitiveType::try_parse("rgba").unwrap() else {
            panic!("rgba should be a vector");
        };
        assert!(rgba.color);
        assert_eq!(rgba.scalar, ScalarKind::Uint8);
        assert_eq!(rgba.components, 4);
    }

    #[test]
    fn rejects_unknown_tags() {
        for tag in ["", "vec", "vec5", "mat5", "mat2x", "dvec3", "float64"] {
            assert_eq!(PrimitiveType::try_parse(tag), None, "tag `{tag}`");
        }
    }

    #[test]
    #[should_panic(expected = "unrecognized field type tag")]
    fn parse_panics_on_unknown_tag() {
        FieldType::parse("quaternion");
    }
}
