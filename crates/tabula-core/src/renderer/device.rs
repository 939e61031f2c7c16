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

//! The device-side contract the GPU binder uploads through.

use super::buffer::{BufferDescriptor, BufferId};
use super::error::ResourceError;
use std::fmt::Debug;

/// The subset of a graphics device the frame needs: buffer creation,
/// in-place writes and destruction.
///
/// Implemented by the rendering layer. Writes are synchronous from the
/// caller's point of view; the device may stage them however it likes.
pub trait BufferDevice: Debug {
    /// Creates a new GPU buffer initialized with `data`.
    /// ## Errors
    /// * `ResourceError` - If the device cannot create the buffer.
    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError>;

    /// Writes `data` into an existing buffer at `offset`.
    /// ## Errors
    /// * `ResourceError` - If the buffer is unknown or the write is out of bounds.
    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError>;

    /// Destroys a GPU buffer.
    /// ## Errors
    /// * `ResourceError` - If the buffer is unknown.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;
}
