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

//! The scalar kinds a field can be built from.

use serde::{Deserialize, Serialize};

/// The kind of a single scalar element.
///
/// The byte widths are fixed and match what the GPU expects when a buffer is
/// uploaded verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    /// A boolean stored as one byte, `0` or `1`.
    Bool,
    /// A signed 8-bit integer.
    Int8,
    /// An unsigned 8-bit integer.
    Uint8,
    /// A signed 16-bit integer.
    Int16,
    /// An unsigned 16-bit integer.
    Uint16,
    /// A signed 32-bit integer.
    Int32,
    /// An unsigned 32-bit integer.
    Uint32,
    /// A 32-bit IEEE float.
    Float32,
}

impl ScalarKind {
    /// Every scalar kind, in declaration order.
    pub const ALL: [ScalarKind; 8] = [
        ScalarKind::Bool,
        ScalarKind::Int8,
        ScalarKind::Uint8,
        ScalarKind::Int16,
        ScalarKind::Uint16,
        ScalarKind::Int32,
        ScalarKind::Uint32,
        ScalarKind::Float32,
    ];

    /// Returns the width in bytes of one element of this kind.
    pub const fn width(self) -> usize {
        match self {
            ScalarKind::Bool | ScalarKind::Int8 | ScalarKind::Uint8 => 1,
            ScalarKind::Int16 | ScalarKind::Uint16 => 2,
            ScalarKind::Int32 | ScalarKind::Uint32 | ScalarKind::Float32 => 4,
        }
    }

    /// Returns `true` for kinds bound as integer attributes (booleans included).
    pub const fn is_integer(self) -> bool {
        !matches!(self, ScalarKind::Float32)
    }

    /// Returns `true` for signed integer kinds.
    pub const fn is_signed(self) -> bool {
        matches!(self, ScalarKind::Int8 | ScalarKind::Int16 | ScalarKind::Int32)
    }

    /// The tag used for this kind in schemas.
    pub const fn tag(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int8 => "int8",
            ScalarKind::Uint8 => "uint8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Uint16 => "uint16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Float32 => "float32",
        }
    }

    /// Looks a scalar kind up by its tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}
