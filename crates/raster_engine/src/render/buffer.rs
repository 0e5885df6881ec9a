//! Buffer management for vertex and index data
//!
//! Each wrapper owns exactly one driver handle, uploads its data once at
//! construction and releases the handle in `Drop`. Wrappers are move-only;
//! there is no way to copy a handle out and release it twice.

use std::mem;
use thiserror::Error;

use crate::render::gl::{
    BufferId, BufferTarget, BufferUsage, DeviceError, DeviceRef, VertexArrayId,
};

/// Buffer creation errors
#[derive(Error, Debug)]
pub enum BufferError {
    /// Attempted to create a buffer with no data
    #[error("Refusing to create an empty {0:?} buffer")]
    Empty(BufferTarget),

    /// Vertex layout with no attributes
    #[error("Vertex layout has no attributes")]
    EmptyLayout,

    /// Driver object creation failed
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Result alias for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// GPU buffer bound to a fixed slot
pub struct Buffer {
    device: DeviceRef,
    handle: BufferId,
    target: BufferTarget,
    size: usize,
}

impl Buffer {
    /// Create a buffer on `target` and upload `data` with static usage
    ///
    /// The bytes are copied by the driver; `data` is not referenced afterwards.
    pub fn new(device: DeviceRef, target: BufferTarget, data: &[u8]) -> BufferResult<Self> {
        if data.is_empty() {
            log::error!("Cannot create {:?} buffer from zero bytes", target);
            return Err(BufferError::Empty(target));
        }

        let handle = device.create_buffer()?;
        device.bind_buffer(target, Some(handle));
        device.buffer_data(target, data, BufferUsage::Static);

        log::trace!("Created {:?} buffer {} ({} bytes)", target, handle.raw(), data.len());

        Ok(Self {
            device,
            handle,
            target,
            size: data.len(),
        })
    }

    /// Make this buffer the active one on its slot
    pub fn bind(&self) {
        self.device.bind_buffer(self.target, Some(self.handle));
    }

    /// Reset this buffer's slot to none
    pub fn unbind(&self) {
        self.device.bind_buffer(self.target, None);
    }

    /// Get buffer handle
    pub fn handle(&self) -> BufferId {
        self.handle
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Binding slot
    pub fn target(&self) -> BufferTarget {
        self.target
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        log::trace!("Deleting {:?} buffer {}", self.target, self.handle.raw());
        self.device.delete_buffer(self.handle);
    }
}

/// Vertex buffer for interleaved attribute data
pub struct VertexBuffer {
    buffer: Buffer,
}

impl VertexBuffer {
    /// Create vertex buffer with vertex data
    pub fn new<T: bytemuck::Pod>(device: DeviceRef, vertices: &[T]) -> BufferResult<Self> {
        Self::from_bytes(device, bytemuck::cast_slice(vertices))
    }

    /// Create vertex buffer from raw bytes
    pub fn from_bytes(device: DeviceRef, bytes: &[u8]) -> BufferResult<Self> {
        Ok(Self {
            buffer: Buffer::new(device, BufferTarget::Vertex, bytes)?,
        })
    }

    /// Bind to the vertex attribute slot
    pub fn bind(&self) {
        self.buffer.bind();
    }

    /// Clear the vertex attribute slot
    pub fn unbind(&self) {
        self.buffer.unbind();
    }

    /// Get buffer handle
    pub fn handle(&self) -> BufferId {
        self.buffer.handle()
    }

    /// Get size
    pub fn size(&self) -> usize {
        self.buffer.size()
    }
}

/// Index buffer for `u32` element indices
pub struct IndexBuffer {
    buffer: Buffer,
    index_count: u32,
}

impl IndexBuffer {
    /// Create index buffer with index data
    pub fn new(device: DeviceRef, indices: &[u32]) -> BufferResult<Self> {
        Ok(Self {
            buffer: Buffer::new(device, BufferTarget::Index, bytemuck::cast_slice(indices))?,
            index_count: indices.len() as u32,
        })
    }

    /// Bind to the element index slot
    pub fn bind(&self) {
        self.buffer.bind();
    }

    /// Clear the element index slot
    pub fn unbind(&self) {
        self.buffer.unbind();
    }

    /// Get buffer handle
    pub fn handle(&self) -> BufferId {
        self.buffer.handle()
    }

    /// Get index count
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// One float attribute inside an interleaved vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader `layout (location = N)`
    pub location: u32,
    /// Number of `f32` components
    pub components: u32,
}

/// Interleaved float vertex layout; stride and offsets are derived from order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Build a layout from `(location, components)` pairs in memory order
    pub fn new(attributes: &[(u32, u32)]) -> Self {
        Self {
            attributes: attributes
                .iter()
                .map(|&(location, components)| VertexAttribute { location, components })
                .collect(),
        }
    }

    /// Position (3), normal (3), texture coordinate (2)
    pub fn position_normal_uv() -> Self {
        Self::new(&[(0, 3), (1, 3), (2, 2)])
    }

    /// Position (3) only
    pub fn position_only() -> Self {
        Self::new(&[(0, 3)])
    }

    /// Floats per vertex
    pub fn floats_per_vertex(&self) -> usize {
        self.attributes.iter().map(|a| a.components as usize).sum()
    }

    /// Bytes per vertex
    pub fn stride(&self) -> usize {
        self.floats_per_vertex() * mem::size_of::<f32>()
    }

    /// Attributes with their byte offsets
    pub fn offsets(&self) -> impl Iterator<Item = (VertexAttribute, usize)> + '_ {
        self.attributes.iter().scan(0usize, |offset, attribute| {
            let current = *offset;
            *offset += attribute.components as usize * mem::size_of::<f32>();
            Some((*attribute, current))
        })
    }
}

/// Vertex array object recording attribute bindings
pub struct VertexArray {
    device: DeviceRef,
    handle: VertexArrayId,
}

impl VertexArray {
    /// Create an empty vertex array
    pub fn new(device: DeviceRef) -> BufferResult<Self> {
        let handle = device.create_vertex_array()?;
        Ok(Self { device, handle })
    }

    /// Record `vertices` with `layout` into this vertex array
    pub fn attach(&self, vertices: &VertexBuffer, layout: &VertexLayout) {
        self.bind();
        vertices.bind();
        let stride = layout.stride() as i32;
        for (attribute, offset) in layout.offsets() {
            self.device.vertex_attrib_f32(
                attribute.location,
                attribute.components as i32,
                stride,
                offset as i32,
            );
        }
    }

    /// Record `indices` as this vertex array's element buffer
    pub fn attach_indices(&self, indices: &IndexBuffer) {
        self.bind();
        indices.bind();
    }

    /// Bind for drawing
    pub fn bind(&self) {
        self.device.bind_vertex_array(Some(self.handle));
    }

    /// Unbind any vertex array
    pub fn unbind(&self) {
        self.device.bind_vertex_array(None);
    }

    /// Get vertex array handle
    pub fn handle(&self) -> VertexArrayId {
        self.handle
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        self.device.delete_vertex_array(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gl::recording::RecordingDevice;

    #[test]
    fn test_buffer_drop_releases_its_handle_once() {
        let device = RecordingDevice::shared();
        let handle = {
            let buffer = VertexBuffer::new(device.clone(), &[0.0f32, 1.0, 2.0]).unwrap();
            assert!(device.state().live_buffers.contains(&buffer.handle()));
            buffer.handle()
        };

        let state = device.state();
        assert!(state.live_buffers.is_empty());
        assert_eq!(state.deleted_buffers, vec![handle]);
    }

    #[test]
    fn test_buffer_uploads_data_once_to_its_own_handle() {
        let device = RecordingDevice::shared();
        let buffer = VertexBuffer::new(device.clone(), &[1.0f32; 8]).unwrap();

        let state = device.state();
        assert_eq!(state.uploads, vec![(BufferTarget::Vertex, Some(buffer.handle()), 32)]);
        assert_eq!(buffer.size(), 32);
    }

    #[test]
    fn test_empty_buffer_is_rejected_without_driver_calls() {
        let device = RecordingDevice::shared();
        let result = IndexBuffer::new(device.clone(), &[]);

        assert!(matches!(result, Err(BufferError::Empty(BufferTarget::Index))));
        assert!(device.state().live_buffers.is_empty());
        assert!(device.state().uploads.is_empty());
    }

    #[test]
    fn test_creation_failure_is_reported() {
        let device = RecordingDevice::shared();
        device.fail_creation(true);

        let result = VertexBuffer::new(device.clone(), &[1.0f32]);
        assert!(matches!(result, Err(BufferError::Device(_))));
    }

    #[test]
    fn test_index_buffer_binds_element_slot() {
        let device = RecordingDevice::shared();
        let indices = IndexBuffer::new(device.clone(), &[0, 1, 2, 2, 3, 0]).unwrap();
        assert_eq!(indices.index_count(), 6);

        indices.bind();
        assert_eq!(
            device.state().buffer_bindings.get(&BufferTarget::Index),
            Some(&Some(indices.handle()))
        );
        indices.unbind();

        let state = device.state();
        assert_eq!(state.buffer_bindings.get(&BufferTarget::Index), Some(&None));
        assert!(state
            .bind_history
            .iter()
            .all(|(target, _)| *target == BufferTarget::Index));
    }

    #[test]
    fn test_unbind_without_bind_is_harmless() {
        let device = RecordingDevice::shared();
        let buffer = VertexBuffer::new(device.clone(), &[1.0f32, 2.0]).unwrap();
        buffer.unbind();
        drop(buffer);
        assert_eq!(device.state().deleted_buffers.len(), 1);
    }

    #[test]
    fn test_layout_stride_and_offsets() {
        let layout = VertexLayout::position_normal_uv();
        assert_eq!(layout.floats_per_vertex(), 8);
        assert_eq!(layout.stride(), 32);

        let offsets: Vec<(u32, usize)> = layout.offsets().map(|(a, o)| (a.location, o)).collect();
        assert_eq!(offsets, vec![(0, 0), (1, 12), (2, 24)]);

        assert_eq!(VertexLayout::position_only().stride(), 12);
    }

    #[test]
    fn test_vertex_array_records_layout() {
        let device = RecordingDevice::shared();
        let vao = VertexArray::new(device.clone()).unwrap();
        let vbo = VertexBuffer::new(device.clone(), &[0.0f32; 16]).unwrap();

        vao.attach(&vbo, &VertexLayout::position_normal_uv());

        let state = device.state();
        assert_eq!(
            state.attributes,
            vec![
                (Some(vao.handle()), 0, 3, 32, 0),
                (Some(vao.handle()), 1, 3, 32, 12),
                (Some(vao.handle()), 2, 2, 32, 24),
            ]
        );
    }
}
