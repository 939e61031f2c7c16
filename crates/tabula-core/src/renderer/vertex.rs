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

//! Vertex attribute and index buffer formats.

use std::borrow::Cow;

/// The memory format of a single vertex attribute.
///
/// The 8- and 16-bit three-component formats exist because packed color
/// fields (`rgb`) are three bytes wide; backends without them must reject the
/// layout when building a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum VertexFormat {
    Uint8,
    Uint8x2,
    Uint8x3,
    Uint8x4,
    Sint8,
    Sint8x2,
    Sint8x3,
    Sint8x4,
    Unorm8,
    Unorm8x2,
    Unorm8x3,
    Unorm8x4,
    Snorm8,
    Snorm8x2,
    Snorm8x3,
    Snorm8x4,
    Uint16,
    Uint16x2,
    Uint16x3,
    Uint16x4,
    Sint16,
    Sint16x2,
    Sint16x3,
    Sint16x4,
    Unorm16,
    Unorm16x2,
    Unorm16x3,
    Unorm16x4,
    Snorm16,
    Snorm16x2,
    Snorm16x3,
    Snorm16x4,
    Uint32,
    Uint32x2,
    Uint32x3,
    Uint32x4,
    Sint32,
    Sint32x2,
    Sint32x3,
    Sint32x4,
    Float32,
    Float32x2,
    Float32x3,
    Float32x4,
}

impl VertexFormat {
    /// Returns the size in bytes of this vertex format.
    pub fn size(&self) -> usize {
        use VertexFormat::*;
        match self {
            Uint8 | Sint8 | Unorm8 | Snorm8 => 1,
            Uint8x2 | Sint8x2 | Unorm8x2 | Snorm8x2 => 2,
            Uint8x3 | Sint8x3 | Unorm8x3 | Snorm8x3 => 3,
            Uint8x4 | Sint8x4 | Unorm8x4 | Snorm8x4 => 4,
            Uint16 | Sint16 | Unorm16 | Snorm16 => 2,
            Uint16x2 | Sint16x2 | Unorm16x2 | Snorm16x2 => 4,
            Uint16x3 | Sint16x3 | Unorm16x3 | Snorm16x3 => 6,
            Uint16x4 | Sint16x4 | Unorm16x4 | Snorm16x4 => 8,
            Uint32 | Sint32 | Float32 => 4,
            Uint32x2 | Sint32x2 | Float32x2 => 8,
            Uint32x3 | Sint32x3 | Float32x3 => 12,
            Uint32x4 | Sint32x4 | Float32x4 => 16,
        }
    }

    /// Returns `true` for formats the shader reads as integers.
    pub fn is_integer(&self) -> bool {
        use VertexFormat::*;
        matches!(
            self,
            Uint8 | Uint8x2 | Uint8x3 | Uint8x4
                | Sint8 | Sint8x2 | Sint8x3 | Sint8x4
                | Uint16 | Uint16x2 | Uint16x3 | Uint16x4
                | Sint16 | Sint16x2 | Sint16x3 | Sint16x4
                | Uint32 | Uint32x2 | Uint32x3 | Uint32x4
                | Sint32 | Sint32x2 | Sint32x3 | Sint32x4
        )
    }
}

/// Defines how often the GPU advances to the next element in a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexStepMode {
    /// Advance once per vertex.
    #[default]
    Vertex,
    /// Advance once per instance.
    Instance,
}

/// Describes a single vertex attribute within a vertex buffer layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttributeDescriptor {
    /// The shader input location (`@location(n)`).
    pub shader_location: u32,
    /// The format of the attribute's data.
    pub format: VertexFormat,
    /// Byte offset of the attribute from the start of the element.
    pub offset: u64,
}

/// Describes the memory layout of a single vertex buffer.
#[derive(Debug, Clone)]
pub struct VertexBufferLayoutDescriptor<'a> {
    /// The byte distance between consecutive elements.
    pub array_stride: u64,
    /// How often the buffer is advanced.
    pub step_mode: VertexStepMode,
    /// Attributes contained in each element.
    pub attributes: Cow<'a, [VertexAttributeDescriptor]>,
}

/// The width of the indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// Indices are 16-bit unsigned integers.
    Uint16,
    /// Indices are 32-bit unsigned integers.
    Uint32,
}

impl IndexFormat {
    /// Size in bytes of one index.
    pub fn size(&self) -> usize {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}
