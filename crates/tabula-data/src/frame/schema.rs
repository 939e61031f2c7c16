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

//! Frame declarations loaded from RON.
//!
//! ```ron
//! (
//!     allocator: (initial_capacity: 16),
//!     aspects: [
//!         (name: "terrain", kind: Datum("uint8")),
//!         (name: "unit", storage: Sparse, kind: Struct(
//!             name: "Unit",
//!             fields: [("position", "vec2"), ("tint", "rgba")],
//!         )),
//!         (name: "draw", storage: Sparse, kind: Order),
//!     ],
//! )
//! ```

use super::allocator::AllocatorSettings;
use super::aspect::{AspectKind, AspectSpec, Storage};
use super::data_frame::DataFrame;
use super::index::Index;
use super::slot_map::MapKind;
use ahash::AHashSet;
use serde::Deserialize;
use tabula_core::layout::{FieldType, PrimitiveType, StructType};
use thiserror::Error;

/// Errors raised while loading a [`FrameSchema`].
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The text is not valid RON for a schema.
    #[error("failed to parse frame schema: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// A type tag names no known field type.
    #[error("aspect `{aspect}` uses unknown field type `{tag}`")]
    UnknownType {
        /// The offending aspect.
        aspect: String,
        /// The unrecognized tag.
        tag: String,
    },

    /// Two aspects share a name.
    #[error("aspect `{0}` is declared twice")]
    DuplicateAspect(String),

    /// A struct declares no members.
    #[error("aspect `{0}` declares an empty struct")]
    EmptyStruct(String),

    /// A struct declares the same member twice.
    #[error("aspect `{aspect}` declares member `{field}` twice")]
    DuplicateField {
        /// The offending aspect.
        aspect: String,
        /// The repeated member.
        field: String,
    },
}

/// What one aspect holds, as written in a schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum KindSchema {
    /// A primitive field type tag such as `"uint8"` or `"mat3x2"`.
    Datum(String),
    /// A named struct of primitive members.
    Struct {
        /// The struct name.
        name: String,
        /// `(member, type tag)` pairs in declaration order.
        fields: Vec<(String, String)>,
    },
    /// A draw-order permutation.
    Order,
}

/// One aspect declaration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AspectSchema {
    /// Unique aspect name.
    pub name: String,
    /// Dense unless stated otherwise.
    #[serde(default)]
    pub storage: Storage,
    /// Contents.
    pub kind: KindSchema,
    /// Forward-map backing for sparse aspects.
    #[serde(default)]
    pub map: MapKind,
    /// Per-aspect growth parameters, overriding the schema-wide ones.
    #[serde(default)]
    pub allocator: Option<AllocatorSettings>,
}

/// A whole frame declaration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrameSchema {
    /// Growth parameters shared by every sparse aspect.
    #[serde(default)]
    pub allocator: AllocatorSettings,
    /// Aspects in declaration order.
    pub aspects: Vec<AspectSchema>,
}

fn primitive(aspect: &str, tag: &str) -> Result<PrimitiveType, SchemaError> {
    PrimitiveType::try_parse(tag).ok_or_else(|| SchemaError::UnknownType {
        aspect: aspect.to_owned(),
        tag: tag.to_owned(),
    })
}

impl AspectSchema {
    /// Resolves the declaration into an [`AspectSpec`].
    pub fn to_spec(&self, defaults: AllocatorSettings) -> Result<AspectSpec, SchemaError> {
        let kind = match &self.kind {
            KindSchema::Datum(tag) => AspectKind::Datum(FieldType::from(primitive(&self.name, tag)?)),
            KindSchema::Struct { name, fields } => {
                if fields.is_empty() {
                    return Err(SchemaError::EmptyStruct(self.name.clone()));
                }
                let mut seen = AHashSet::new();
                let mut ty = StructType::new(name.clone());
                for (member, tag) in fields {
                    if !seen.insert(member.as_str()) {
                        return Err(SchemaError::DuplicateField {
                            aspect: self.name.clone(),
                            field: member.clone(),
                        });
                    }
                    ty = ty.field(member.clone(), primitive(&self.name, tag)?);
                }
                AspectKind::Datum(FieldType::from(ty))
            }
            KindSchema::Order => AspectKind::Order,
        };

        Ok(AspectSpec {
            storage: self.storage,
            kind,
            map: self.map,
            settings: self.allocator.unwrap_or(defaults),
        })
    }
}

impl FrameSchema {
    /// Parses a schema from RON text.
    ///
    /// ## Errors
    /// * `SchemaError::Parse` - If the text is not a valid schema.
    pub fn from_ron(text: &str) -> Result<Self, SchemaError> {
        Ok(ron::from_str(text)?)
    }

    /// Resolves every declaration, checking names and type tags.
    ///
    /// ## Errors
    /// * `SchemaError` - On duplicate names, unknown tags or malformed structs.
    pub fn specs(&self) -> Result<Vec<(String, AspectSpec)>, SchemaError> {
        let mut seen = AHashSet::new();
        self.aspects
            .iter()
            .map(|aspect| {
                if !seen.insert(aspect.name.as_str()) {
                    return Err(SchemaError::DuplicateAspect(aspect.name.clone()));
                }
                Ok((aspect.name.clone(), aspect.to_spec(self.allocator)?))
            })
            .collect()
    }
}

impl<I: Index> DataFrame<I> {
    /// Builds a frame over `index` from a schema.
    ///
    /// ## Errors
    /// * `SchemaError` - If the schema does not resolve.
    pub fn from_schema(index: I, schema: &FrameSchema) -> Result<Self, SchemaError> {
        let builder = schema
            .specs()?
            .into_iter()
            .fold(DataFrame::builder(index), |builder, (name, spec)| {
                builder.aspect(name, spec)
            });
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::index::MonotonicIndex;

    const SCHEMA: &str = r#"
        (
            allocator: (initial_capacity: 16),
            aspects: [
                (name: "terrain", kind: Datum("uint8")),
                (name: "unit", storage: Sparse, map: Hashed, kind: Struct(
                    name: "Unit",
                    fields: [("position", "vec2"), ("tint", "rgba")],
                )),
                (name: "draw", storage: Sparse, kind: Order,
                    allocator: Some((initial_capacity: 2))),
            ],
        )
    "#;

    #[test]
    fn schema_resolves_to_specs() {
        let schema = FrameSchema::from_ron(SCHEMA).unwrap();
        let specs = schema.specs().unwrap();

        assert_eq!(specs.len(), 3);
        assert_eq!(
            specs[0].1,
            AspectSpec::dense(FieldType::parse("uint8")).with_settings(schema.allocator)
        );
        assert_eq!(specs[1].1.storage, Storage::Sparse);
        assert_eq!(specs[1].1.map, MapKind::Hashed);
        assert_eq!(specs[1].1.settings.initial_capacity, 16);
        assert_eq!(specs[2].1.kind, AspectKind::Order);
        assert_eq!(specs[2].1.settings.initial_capacity, 2);
        assert_eq!(
            specs[2].1.settings.doubling_limit,
            AllocatorSettings::default().doubling_limit
        );
    }

    #[test]
    fn frames_build_from_schemas() {
        let schema = FrameSchema::from_ron(SCHEMA).unwrap();
        let frame = DataFrame::from_schema(MonotonicIndex::new(5), &schema).unwrap();

        assert_eq!(frame.len(), 5);
        assert!(frame.aspect_field("terrain").is_some());
        let tint = frame.field("unit", "tint").unwrap();
        assert_eq!(tint.offset(), 8);
        assert!(frame.aspect_id("draw").is_some());
    }

    #[test]
    fn unknown_tags_are_reported() {
        let schema = FrameSchema::from_ron(
            r#"(aspects: [(name: "bad", kind: Datum("float64"))])"#,
        )
        .unwrap();
        let error = schema.specs().unwrap_err();
        assert!(matches!(
            &error,
            SchemaError::UnknownType { aspect, tag } if aspect == "bad" && tag == "float64"
        ));
        assert_eq!(
            error.to_string(),
            "aspect `bad` uses unknown field type `float64`"
        );
    }

    #[test]
    fn duplicate_names_are_reported() {
        let schema = FrameSchema::from_ron(
            r#"(aspects: [(name: "a", kind: Order), (name: "a", kind: Datum("bool"))])"#,
        )
        .unwrap();
        assert!(matches!(
            schema.specs(),
            Err(SchemaError::DuplicateAspect(name)) if name == "a"
        ));
    }

    #[test]
    fn malformed_structs_are_reported() {
        let empty = FrameSchema::from_ron(
            r#"(aspects: [(name: "s", kind: Struct(name: "S", fields: []))])"#,
        )
        .unwrap();
        assert!(matches!(empty.specs(), Err(SchemaError::EmptyStruct(_))));

        let twice = FrameSchema::from_ron(
            r#"(aspects: [(name: "s", kind: Struct(name: "S", fields: [("x", "bool"), ("x", "int8")]))])"#,
        )
        .unwrap();
        assert!(matches!(
            twice.specs(),
            Err(SchemaError::DuplicateField { field, .. }) if field == "x"
        ));
    }

    #[test]
    fn invalid_ron_is_a_parse_error() {
        assert!(matches!(
            FrameSchema::from_ron("(aspects: [oops])"),
            Err(SchemaError::Parse(_))
        ));
    }
}
