//! # Vertex Data Structures
//!
//! GPU-compatible vertex format for the demonstrator's colored meshes.

/// A 3D vertex with interleaved position and color.
///
/// Six floats per vertex (x, y, z, r, g, b); `#[repr(C)]` fixes the
/// layout for GPU buffer upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// Vertex color [r, g, b]
    pub color: [f32; 3],
}

/// Interleaved floats per vertex.
pub const FLOATS_PER_VERTEX: usize = 6;

impl Vertex {
    /// Returns the vertex buffer layout for pipeline creation:
    /// position (Float32x3) at location 0, color (Float32x3) at location 1.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}
