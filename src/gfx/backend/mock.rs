//! Headless backend for tests.
//!
//! Tracks live buffer/program counts so resource-lifecycle tests can
//! assert that failed construction leaves nothing allocated, and records
//! every draw call and uniform write for inspection.

use std::collections::{HashMap, HashSet};

use crate::math::Matrix4;

use super::{
    uniform_offset, BackendError, BufferId, ProgramId, RenderBackend, ShaderStage,
    UniformLocation,
};

/// A draw call as observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub program: ProgramId,
    pub vertices: BufferId,
    pub indices: Option<BufferId>,
    pub count: u32,
    /// Uniform matrices staged since the previous draw, in write order.
    pub uniforms: Vec<(UniformLocation, [[f32; 4]; 4])>,
}

/// In-memory [`RenderBackend`] with allocation counters.
#[derive(Default)]
pub struct MockBackend {
    next_buffer: u32,
    next_program: u32,
    live_buffers: HashSet<BufferId>,
    programs: HashMap<ProgramId, String>,
    current_program: Option<ProgramId>,
    pending_uniforms: Vec<(UniformLocation, [[f32; 4]; 4])>,
    pub draws: Vec<RecordedDraw>,

    /// When set, `create_program` fails compilation of the named stage.
    pub fail_compile: Option<ShaderStage>,
    /// When true, `create_program` compiles both stages but fails to link.
    pub fail_link: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffers currently allocated.
    pub fn live_buffer_count(&self) -> usize {
        self.live_buffers.len()
    }

    /// Number of programs currently allocated.
    pub fn live_program_count(&self) -> usize {
        self.programs.len()
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.current_program
    }
}

impl RenderBackend for MockBackend {
    fn create_vertex_buffer(&mut self, _data: &[f32]) -> BufferId {
        self.next_buffer += 1;
        let id = BufferId(self.next_buffer);
        self.live_buffers.insert(id);
        id
    }

    fn create_index_buffer(&mut self, _data: &[u32]) -> BufferId {
        self.next_buffer += 1;
        let id = BufferId(self.next_buffer);
        self.live_buffers.insert(id);
        id
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        self.live_buffers.remove(&buffer);
    }

    fn create_program(
        &mut self,
        vertex_src: &str,
        _fragment_src: &str,
    ) -> Result<ProgramId, BackendError> {
        if let Some(stage) = self.fail_compile {
            return Err(BackendError::ShaderCompile {
                stage,
                log: format!("mock {stage} shader rejected"),
            });
        }
        if self.fail_link {
            return Err(BackendError::ShaderLink {
                log: "mock program rejected at link".into(),
            });
        }
        self.next_program += 1;
        let id = ProgramId(self.next_program);
        self.programs.insert(id, vertex_src.to_string());
        Ok(id)
    }

    fn destroy_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        self.current_program = Some(program);
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let source = self.programs.get(&program)?;
        uniform_offset(source, name)
    }

    fn set_uniform_matrix(&mut self, location: UniformLocation, matrix: &Matrix4) {
        self.pending_uniforms.push((location, matrix.to_array()));
    }

    fn draw_indexed(&mut self, vertices: BufferId, indices: BufferId, index_count: u32) {
        let uniforms = std::mem::take(&mut self.pending_uniforms);
        self.draws.push(RecordedDraw {
            program: self.current_program.unwrap_or(ProgramId::INVALID),
            vertices,
            indices: Some(indices),
            count: index_count,
            uniforms,
        });
    }

    fn draw_arrays(&mut self, vertices: BufferId, vertex_count: u32) {
        let uniforms = std::mem::take(&mut self.pending_uniforms);
        self.draws.push(RecordedDraw {
            program: self.current_program.unwrap_or(ProgramId::INVALID),
            vertices,
            indices: None,
            count: vertex_count,
            uniforms,
        });
    }
}
