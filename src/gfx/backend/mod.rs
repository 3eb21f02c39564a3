//! # Render Backend
//!
//! The narrow contract the core consumes from the graphics collaborator:
//! buffer lifecycle, shader program compile/link, name-based uniform
//! lookup, and the two draw primitives. Geometry and Material take the
//! backend as an explicit parameter instead of reaching for process-wide
//! state, so tests substitute [`MockBackend`] without any global fixture.
//!
//! Matrices cross this boundary in the crate's row-major convention; a
//! backend that wants column-major data transposes on its side of the
//! seam (see [`wgpu_backend::WgpuBackend`]).

pub mod mock;
pub mod wgpu_backend;

pub use mock::MockBackend;
pub use wgpu_backend::WgpuBackend;

use std::fmt;

use crate::math::Matrix4;

/// Handle to a GPU vertex or index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Handle to a compiled and linked shader program. Zero is the invalid
/// handle, so `Material::is_valid` is a plain non-zero check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

impl ProgramId {
    pub const INVALID: ProgramId = ProgramId(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Byte offset of a uniform inside a program's uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocation(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Construction-time backend failures. Both variants carry the backend's
/// diagnostic log; the failing backend cleans up after itself, so a caller
/// that receives an error holds no leaked GPU resource.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("shader program failed to link: {log}")]
    ShaderLink { log: String },
}

/// The draw-side services the scene graph consumes.
///
/// Single-threaded by design: one frame-loop thread owns the backend and
/// issues every call in update-then-render order.
pub trait RenderBackend {
    fn create_vertex_buffer(&mut self, data: &[f32]) -> BufferId;

    fn create_index_buffer(&mut self, data: &[u32]) -> BufferId;

    fn destroy_buffer(&mut self, buffer: BufferId);

    /// Compiles both stages and links them into a program. On failure
    /// nothing is retained backend-side.
    fn create_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ProgramId, BackendError>;

    fn destroy_program(&mut self, program: ProgramId);

    /// Activates a program for subsequent draws. Idempotent.
    fn use_program(&mut self, program: ProgramId);

    /// Looks up a uniform by name in the active program's uniform block.
    /// `None` means the program does not declare the uniform; callers
    /// decide whether that is fatal.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Stages a matrix for the next draw call. The matrix arrives in the
    /// crate's row-major convention.
    fn set_uniform_matrix(&mut self, location: UniformLocation, matrix: &Matrix4);

    /// Issues one indexed draw of `index_count` indices.
    fn draw_indexed(&mut self, vertices: BufferId, indices: BufferId, index_count: u32);

    /// Issues one non-indexed draw of `vertex_count` vertices.
    fn draw_arrays(&mut self, vertices: BufferId, vertex_count: u32);

    /// Post-projection clip-space adjustment this backend needs, applied
    /// by the render traversal after [`Camera::projection_matrix`]. The
    /// core's projection uses the near→−1, far→+1 depth convention;
    /// backends with a 0..1 depth range override this.
    ///
    /// [`Camera::projection_matrix`]: crate::gfx::camera::Camera::projection_matrix
    fn depth_correction(&self) -> Matrix4 {
        Matrix4::identity()
    }
}

/// Uniform block members are mat4x4 columns of a `Globals` struct declared
/// in the vertex stage; their byte offsets follow declaration order.
pub(crate) const MAT4_SIZE: u32 = 64;

/// Byte size of the largest supported uniform block (model + view +
/// projection).
pub(crate) const UNIFORM_BLOCK_SIZE: usize = 192;

/// Extracts the member names of the `Globals` uniform struct from a WGSL
/// vertex source, in declaration order.
///
/// This stands in for GL-style program reflection: every shader in this
/// crate declares at most `model`, `view`, and `projection`, all mat4x4,
/// so declaration order fixes each member's byte offset.
pub(crate) fn uniform_members(source: &str) -> Vec<String> {
    let mut members = Vec::new();
    let mut in_globals = false;
    for line in source.lines() {
        let line = line.trim();
        if !in_globals {
            if line.starts_with("struct Globals") {
                in_globals = true;
            }
            continue;
        }
        if line.starts_with('}') {
            break;
        }
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if let Some(colon) = line.find(':') {
            let name = line[..colon].trim();
            if !name.is_empty() {
                members.push(name.to_string());
            }
        }
    }
    members
}

/// Byte offset of `name` within the uniform block declared by `source`,
/// or `None` when the shader does not declare it.
pub(crate) fn uniform_offset(source: &str, name: &str) -> Option<UniformLocation> {
    uniform_members(source)
        .iter()
        .position(|member| member == name)
        .map(|index| UniformLocation(index as u32 * MAT4_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "\
struct Globals {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
};
";

    const REDUCED: &str = "\
struct Globals {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
};
";

    #[test]
    fn test_uniform_offsets_follow_declaration_order() {
        assert_eq!(uniform_offset(FULL, "model"), Some(UniformLocation(0)));
        assert_eq!(uniform_offset(FULL, "view"), Some(UniformLocation(64)));
        assert_eq!(uniform_offset(FULL, "projection"), Some(UniformLocation(128)));
    }

    #[test]
    fn test_missing_member_is_none() {
        assert_eq!(uniform_offset(REDUCED, "model"), None);
        assert_eq!(uniform_offset(REDUCED, "view"), Some(UniformLocation(0)));
    }

    #[test]
    fn test_no_globals_struct() {
        assert_eq!(uniform_offset("fn vs_main() {}", "model"), None);
    }
}
