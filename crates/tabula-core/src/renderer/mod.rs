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

//! GPU buffer contracts.
//!
//! The frame never talks to a graphics API directly. It describes buffers and
//! vertex layouts with the types in this module and hands bytes to a
//! [`BufferDevice`] implemented by the rendering layer.

pub mod buffer;
pub mod device;
pub mod error;
pub mod vertex;

pub use self::buffer::{BufferDescriptor, BufferId, BufferUsage};
pub use self::device::BufferDevice;
pub use self::error::ResourceError;
pub use self::vertex::{
    IndexFormat, VertexAttributeDescriptor, VertexBufferLayoutDescriptor, VertexFormat,
    VertexStepMode,
};
