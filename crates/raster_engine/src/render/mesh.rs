//! Hardcoded meshes
//!
//! Vertex data is interleaved `f32`: position, normal, texture coordinate
//! (3/3/2) for lit geometry and position only for light markers.

use crate::render::buffer::{BufferError, BufferResult, IndexBuffer, VertexArray, VertexBuffer, VertexLayout};
use crate::render::gl::{DeviceRef, PrimitiveMode};

/// Unit quad in the z = -2 plane, two triangles
#[rustfmt::skip]
pub const PLANE_VERTICES: [f32; 48] = [
     0.5,  0.5, -2.0,   0.0,  1.0,  0.0,  1.0, 1.0,
     0.5, -0.5, -2.0,   0.0,  1.0,  0.0,  1.0, 0.0,
    -0.5,  0.5, -2.0,   0.0,  1.0,  0.0,  0.0, 1.0,
     0.5, -0.5, -2.0,   0.0,  1.0,  0.0,  1.0, 0.0,
    -0.5, -0.5, -2.0,   0.0,  1.0,  0.0,  0.0, 0.0,
    -0.5,  0.5, -2.0,   0.0,  1.0,  0.0,  0.0, 1.0,
];

/// Unit cube centred on the origin, 36 vertices with per-face normals
#[rustfmt::skip]
pub const CUBE_VERTICES: [f32; 288] = [
    -0.5, -0.5, -0.5,   0.0,  0.0, -1.0,  0.0, 0.0,
     0.5, -0.5, -0.5,   0.0,  0.0, -1.0,  1.0, 0.0,
     0.5,  0.5, -0.5,   0.0,  0.0, -1.0,  1.0, 1.0,
     0.5,  0.5, -0.5,   0.0,  0.0, -1.0,  1.0, 1.0,
    -0.5,  0.5, -0.5,   0.0,  0.0, -1.0,  0.0, 1.0,
    -0.5, -0.5, -0.5,   0.0,  0.0, -1.0,  0.0, 0.0,

    -0.5, -0.5,  0.5,   0.0,  0.0,  1.0,  0.0, 0.0,
     0.5, -0.5,  0.5,   0.0,  0.0,  1.0,  1.0, 0.0,
     0.5,  0.5,  0.5,   0.0,  0.0,  1.0,  1.0, 1.0,
     0.5,  0.5,  0.5,   0.0,  0.0,  1.0,  1.0, 1.0,
    -0.5,  0.5,  0.5,   0.0,  0.0,  1.0,  0.0, 1.0,
    -0.5, -0.5,  0.5,   0.0,  0.0,  1.0,  0.0, 0.0,

    -0.5,  0.5,  0.5,  -1.0,  0.0,  0.0,  1.0, 0.0,
    -0.5,  0.5, -0.5,  -1.0,  0.0,  0.0,  1.0, 1.0,
    -0.5, -0.5, -0.5,  -1.0,  0.0,  0.0,  0.0, 1.0,
    -0.5, -0.5, -0.5,  -1.0,  0.0,  0.0,  0.0, 1.0,
    -0.5, -0.5,  0.5,  -1.0,  0.0,  0.0,  0.0, 0.0,
    -0.5,  0.5,  0.5,  -1.0,  0.0,  0.0,  1.0, 0.0,

     0.5,  0.5,  0.5,   1.0,  0.0,  0.0,  1.0, 0.0,
     0.5,  0.5, -0.5,   1.0,  0.0,  0.0,  1.0, 1.0,
     0.5, -0.5, -0.5,   1.0,  0.0,  0.0,  0.0, 1.0,
     0.5, -0.5, -0.5,   1.0,  0.0,  0.0,  0.0, 1.0,
     0.5, -0.5,  0.5,   1.0,  0.0,  0.0,  0.0, 0.0,
     0.5,  0.5,  0.5,   1.0,  0.0,  0.0,  1.0, 0.0,

    -0.5, -0.5, -0.5,   0.0, -1.0,  0.0,  0.0, 1.0,
     0.5, -0.5, -0.5,   0.0, -1.0,  0.0,  1.0, 1.0,
     0.5, -0.5,  0.5,   0.0, -1.0,  0.0,  1.0, 0.0,
     0.5, -0.5,  0.5,   0.0, -1.0,  0.0,  1.0, 0.0,
    -0.5, -0.5,  0.5,   0.0, -1.0,  0.0,  0.0, 0.0,
    -0.5, -0.5, -0.5,   0.0, -1.0,  0.0,  0.0, 1.0,

    -0.5,  0.5, -0.5,   0.0,  1.0,  0.0,  0.0, 1.0,
     0.5,  0.5, -0.5,   0.0,  1.0,  0.0,  1.0, 1.0,
     0.5,  0.5,  0.5,   0.0,  1.0,  0.0,  1.0, 0.0,
     0.5,  0.5,  0.5,   0.0,  1.0,  0.0,  1.0, 0.0,
    -0.5,  0.5,  0.5,   0.0,  1.0,  0.0,  0.0, 0.0,
    -0.5,  0.5, -0.5,   0.0,  1.0,  0.0,  0.0, 1.0,
];

/// Positions extracted from interleaved vertex data
///
/// Yields nothing for a layout narrower than a position.
pub fn positions_only(vertices: &[f32], layout: &VertexLayout) -> Vec<f32> {
    let floats_per_vertex = layout.floats_per_vertex();
    if floats_per_vertex < 3 {
        return Vec::new();
    }
    vertices
        .chunks_exact(floats_per_vertex)
        .flat_map(|vertex| vertex[..3].iter().copied())
        .collect()
}

/// GPU geometry: vertex array, vertex buffer and optional index buffer
pub struct Mesh {
    // Declared in reverse creation order so drops release newest first
    indices: Option<IndexBuffer>,
    vertices: VertexBuffer,
    vertex_array: VertexArray,
    vertex_count: usize,
    device: DeviceRef,
}

impl Mesh {
    /// Upload non-indexed geometry
    pub fn new(device: DeviceRef, vertices: &[f32], layout: &VertexLayout) -> BufferResult<Self> {
        let floats_per_vertex = layout.floats_per_vertex();
        if floats_per_vertex == 0 {
            log::error!("Cannot create a mesh from a layout with no attributes");
            return Err(BufferError::EmptyLayout);
        }

        let vertex_array = VertexArray::new(device.clone())?;
        let vertex_buffer = VertexBuffer::new(device.clone(), vertices)?;
        vertex_array.attach(&vertex_buffer, layout);
        vertex_array.unbind();

        let vertex_count = vertices.len() / floats_per_vertex;
        if vertices.len() % floats_per_vertex != 0 {
            log::warn!(
                "{} trailing floats ignored: data is not a whole number of {}-float vertices",
                vertices.len() % floats_per_vertex,
                floats_per_vertex
            );
        }
        log::debug!("Created mesh with {} vertices", vertex_count);

        Ok(Self {
            indices: None,
            vertices: vertex_buffer,
            vertex_array,
            vertex_count,
            device,
        })
    }

    /// Upload indexed geometry
    pub fn with_indices(
        device: DeviceRef,
        vertices: &[f32],
        indices: &[u32],
        layout: &VertexLayout,
    ) -> BufferResult<Self> {
        let mut mesh = Self::new(device.clone(), vertices, layout)?;
        mesh.vertex_array.bind();
        let index_buffer = IndexBuffer::new(device, indices)?;
        mesh.vertex_array.attach_indices(&index_buffer);
        mesh.vertex_array.unbind();
        mesh.indices = Some(index_buffer);
        Ok(mesh)
    }

    /// Floor quad with normals and texture coordinates
    pub fn plane(device: DeviceRef) -> BufferResult<Self> {
        Self::new(device, &PLANE_VERTICES, &VertexLayout::position_normal_uv())
    }

    /// Textured cube with normals
    pub fn cube(device: DeviceRef) -> BufferResult<Self> {
        Self::new(device, &CUBE_VERTICES, &VertexLayout::position_normal_uv())
    }

    /// Position-only cube used to mark light positions
    pub fn marker_cube(device: DeviceRef) -> BufferResult<Self> {
        let positions = positions_only(&CUBE_VERTICES, &VertexLayout::position_normal_uv());
        Self::new(device, &positions, &VertexLayout::position_only())
    }

    /// Bind the vertex array and draw every vertex (or index)
    pub fn draw(&self) {
        self.vertex_array.bind();
        match &self.indices {
            Some(indices) => self.device.draw_elements(PrimitiveMode::Triangles, indices.index_count() as i32),
            None => self.device.draw_arrays(PrimitiveMode::Triangles, 0, self.vertex_count as i32),
        }
    }

    /// Number of vertices in the vertex buffer
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Size of the vertex buffer in bytes
    pub fn vertex_bytes(&self) -> usize {
        self.vertices.size()
    }

    /// Whether draws go through an index buffer
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }
}
