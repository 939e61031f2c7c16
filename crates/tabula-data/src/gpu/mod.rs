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

//! The GPU buffer binder.
//!
//! Aspects are already laid out byte-for-byte the way a vertex or index
//! buffer expects, so binding is a matter of describing the layout
//! ([`vertex_layout`], [`element_binding`]) and pushing the bytes through a
//! [`BufferDevice`](tabula_core::renderer::BufferDevice) ([`AspectUploader`]).

mod binding;
mod uploader;

pub use binding::{element_binding, vertex_format, vertex_layout, AttributeMap, ElementBinding};
pub use uploader::{AspectUploader, UploadTarget};
