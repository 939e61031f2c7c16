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

//! Pushes aspect buffers to the GPU.

use super::binding::element_binding;
use crate::frame::Aspect;
use std::borrow::Cow;
use tabula_core::renderer::{BufferDescriptor, BufferDevice, BufferId, BufferUsage, ResourceError};

/// What an uploaded buffer is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    /// A vertex buffer, uploaded verbatim.
    Vertex,
    /// An element-index buffer. 8-bit indices are widened to 16 bits.
    Element,
}

impl UploadTarget {
    fn usage(self) -> BufferUsage {
        match self {
            UploadTarget::Vertex => BufferUsage::VERTEX | BufferUsage::COPY_DST,
            UploadTarget::Element => BufferUsage::INDEX | BufferUsage::COPY_DST,
        }
    }
}

/// Keeps one GPU buffer in sync with one aspect.
///
/// The first [`send`](Self::send) creates the buffer. Later sends rewrite it
/// in place while the byte size is unchanged and recreate it when the size
/// changes (after a resize or allocator growth).
#[derive(Debug)]
pub struct AspectUploader {
    label: String,
    target: UploadTarget,
    buffer: Option<(BufferId, u64)>,
    staging: Vec<u8>,
}

impl AspectUploader {
    /// Creates an uploader that has not sent anything yet.
    pub fn new(label: impl Into<String>, target: UploadTarget) -> Self {
        Self {
            label: label.into(),
            target,
            buffer: None,
            staging: Vec::new(),
        }
    }

    /// An uploader for a vertex buffer.
    pub fn vertex(label: impl Into<String>) -> Self {
        Self::new(label, UploadTarget::Vertex)
    }

    /// An uploader for an element-index buffer.
    pub fn element(label: impl Into<String>) -> Self {
        Self::new(label, UploadTarget::Element)
    }

    /// The current GPU buffer, if one was created.
    pub fn buffer(&self) -> Option<BufferId> {
        self.buffer.map(|(id, _)| id)
    }

    /// Size of the current GPU buffer in bytes.
    pub fn size(&self) -> u64 {
        self.buffer.map_or(0, |(_, size)| size)
    }

    /// Uploads the aspect's bytes.
    ///
    /// ## Errors
    /// * `ResourceError` - Propagated unchanged from the device.
    ///
    /// # Panics
    /// Panics if an element target is given an aspect that cannot be an
    /// index buffer.
    pub fn send(
        &mut self,
        device: &dyn BufferDevice,
        aspect: &Aspect,
    ) -> Result<BufferId, ResourceError> {
        let data: &[u8] = match self.target {
            UploadTarget::Vertex => aspect.bytes(),
            UploadTarget::Element if element_binding(aspect).widen => {
                self.staging.clear();
                self.staging.extend(
                    aspect
                        .bytes()
                        .iter()
                        .flat_map(|&index| u16::from(index).to_ne_bytes()),
                );
                &self.staging
            }
            UploadTarget::Element => aspect.bytes(),
        };
        let size = data.len() as u64;

        if let Some((id, current)) = self.buffer {
            if current == size {
                device.write_buffer(id, 0, data)?;
                log::trace!("AspectUploader({}): rewrote {} bytes", self.label, size);
                return Ok(id);
            }
            device.destroy_buffer(id)?;
            self.buffer = None;
        }

        let id = device.create_buffer_with_data(
            &BufferDescriptor {
                label: Some(Cow::Borrowed(&self.label)),
                size,
                usage: self.target.usage(),
            },
            data,
        )?;
        self.buffer = Some((id, size));
        log::debug!(
            "AspectUploader({}): created buffer {:?} of {} bytes",
            self.label,
            id,
            size
        );
        Ok(id)
    }

    /// Destroys the GPU buffer, if any.
    ///
    /// ## Errors
    /// * `ResourceError` - Propagated unchanged from the device.
    pub fn release(&mut self, device: &dyn BufferDevice) -> Result<(), ResourceError> {
        match self.buffer.take() {
            Some((id, _)) => device.destroy_buffer(id),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::AspectSpec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tabula_core::layout::{FieldType, ScalarKind};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create { size: u64, usage: BufferUsage },
        Write { id: BufferId, len: usize },
        Destroy(BufferId),
    }

    /// A mock device that keeps buffer contents in memory and records calls.
    #[derive(Debug, Default)]
    struct MockBufferDevice {
        next_id: AtomicUsize,
        buffers: Mutex<HashMap<BufferId, Vec<u8>>>,
        calls: Mutex<Vec<Call>>,
    }

    impl MockBufferDevice {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn contents(&self, id: BufferId) -> Vec<u8> {
            self.buffers.lock().unwrap()[&id].clone()
        }
    }

    impl BufferDevice for MockBufferDevice {
        fn create_buffer_with_data(
            &self,
            descriptor: &BufferDescriptor,
            data: &[u8],
        ) -> Result<BufferId, ResourceError> {
            let id = BufferId(self.next_id.fetch_add(1, Ordering::Relaxed));
            self.buffers.lock().unwrap().insert(id, data.to_vec());
            self.calls.lock().unwrap().push(Call::Create {
                size: descriptor.size,
                usage: descriptor.usage,
            });
            Ok(id)
        }

        fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
            let mut buffers = self.buffers.lock().unwrap();
            let buffer = buffers.get_mut(&id).ok_or(ResourceError::NotFound(id))?;
            let end = offset + data.len() as u64;
            if end > buffer.len() as u64 {
                return Err(ResourceError::OutOfBounds {
                    id,
                    end,
                    size: buffer.len() as u64,
                });
            }
            buffer[offset as usize..end as usize].copy_from_slice(data);
            self.calls.lock().unwrap().push(Call::Write {
                id,
                len: data.len(),
            });
            Ok(())
        }

        fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
            self.buffers
                .lock()
                .unwrap()
                .remove(&id)
                .ok_or(ResourceError::NotFound(id))?;
            self.calls.lock().unwrap().push(Call::Destroy(id));
            Ok(())
        }
    }

    #[test]
    fn first_send_creates_then_rewrites_in_place() {
        let device = MockBufferDevice::default();
        let mut aspect = Aspect::new(&AspectSpec::dense(ScalarKind::Uint16), 2);
        let mut uploader = AspectUploader::vertex("heights");

        let id = uploader.send(&device, &aspect).unwrap();
        aspect.write_field(1, 0, &7u16.to_ne_bytes());
        let again = uploader.send(&device, &aspect).unwrap();

        assert_eq!(id, again);
        assert_eq!(
            device.calls(),
            vec![
                Call::Create {
                    size: 4,
                    usage: BufferUsage::VERTEX | BufferUsage::COPY_DST
                },
                Call::Write { id, len: 4 },
            ]
        );
        assert_eq!(device.contents(id), aspect.bytes());
    }

    #[test]
    fn size_changes_recreate_the_buffer() {
        let device = MockBufferDevice::default();
        let mut aspect = Aspect::new(&AspectSpec::sparse(ScalarKind::Uint32), 0);
        let mut uploader = AspectUploader::vertex("units");

        aspect.write_field(0, 0, &1u32.to_ne_bytes());
        let first = uploader.send(&device, &aspect).unwrap();
        for ordinal in 1..=8 {
            aspect.write_field(ordinal, 0, &1u32.to_ne_bytes());
        }
        let second = uploader.send(&device, &aspect).unwrap();

        assert_ne!(first, second);
        assert_eq!(device.calls()[1], Call::Destroy(first));
        assert_eq!(uploader.size(), aspect.bytes().len() as u64);

        uploader.release(&device).unwrap();
        assert_eq!(uploader.buffer(), None);
        assert_eq!(device.calls().last(), Some(&Call::Destroy(second)));
    }

    #[test]
    fn narrow_element_indices_are_widened() {
        let device = MockBufferDevice::default();
        let mut aspect = Aspect::new(&AspectSpec::dense(FieldType::parse("uint8")), 3);
        aspect.write_field(0, 0, &[2]);
        aspect.write_field(2, 0, &[1]);
        let mut uploader = AspectUploader::element("indices");

        let id = uploader.send(&device, &aspect).unwrap();

        let expected: Vec<u8> = [2u16, 0, 1].iter().flat_map(|i| i.to_ne_bytes()).collect();
        assert_eq!(device.contents(id), expected);
        assert_eq!(
            device.calls()[0],
            Call::Create {
                size: 6,
                usage: BufferUsage::INDEX | BufferUsage::COPY_DST
            }
        );
    }

    #[test]
    fn device_errors_propagate_unchanged() {
        let device = MockBufferDevice::default();
        let aspect = Aspect::new(&AspectSpec::dense_order(), 2);
        let mut uploader = AspectUploader::element("draw");
        let id = uploader.send(&device, &aspect).unwrap();
        device.destroy_buffer(id).unwrap();

        assert_eq!(
            uploader.send(&device, &aspect),
            Err(ResourceError::NotFound(id))
        );
    }
}
