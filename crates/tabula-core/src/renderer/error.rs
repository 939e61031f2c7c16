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

//! Errors reported by the GPU boundary.

use super::buffer::BufferId;
use std::fmt;

/// An error raised by a [`BufferDevice`](super::BufferDevice) while managing buffers.
///
/// The frame never converts these; they reach the caller unchanged so the
/// rendering layer decides whether they are user visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The buffer handle does not name a live buffer.
    NotFound(BufferId),
    /// A write would run past the end of the buffer.
    OutOfBounds {
        /// The buffer being written.
        id: BufferId,
        /// End offset of the attempted write.
        end: u64,
        /// Size of the buffer.
        size: u64,
    },
    /// The device could not allocate the buffer.
    OutOfMemory {
        /// Requested size in bytes.
        requested: u64,
    },
    /// An error originating from the specific graphics backend.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound(id) => write!(f, "Buffer not found for ID: {id:?}"),
            ResourceError::OutOfBounds { id, end, size } => write!(
                f,
                "Write to buffer {id:?} ends at byte {end}, past its size of {size}"
            ),
            ResourceError::OutOfMemory { requested } => {
                write!(f, "Device could not allocate a buffer of {requested} bytes")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}
