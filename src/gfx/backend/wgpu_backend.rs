//! wgpu implementation of the [`RenderBackend`] seam.
//!
//! Shader "compile" and "link" map onto shader-module and render-pipeline
//! creation, each under a pushed validation error scope so failures come
//! back as values carrying the driver's diagnostic log instead of
//! panicking the process.
//!
//! `wgpu::RenderPass` borrows the encoder, so the backend cannot hand a
//! live pass across the trait boundary. Instead draw calls issued during
//! the scene traversal are recorded as commands and replayed into a single
//! render pass in [`WgpuBackend::end_frame`], with each draw's uniform
//! block placed in a dynamic-offset uniform ring.
//!
//! This file is also the crate's single row-major → column-major boundary:
//! [`RenderBackend::set_uniform_matrix`] transposes, and
//! [`RenderBackend::depth_correction`] remaps the core's −1..1 depth range
//! to wgpu's 0..1.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::gfx::scene::vertex::Vertex;
use crate::math::Matrix4;

use super::{
    uniform_offset, BackendError, BufferId, ProgramId, RenderBackend, ShaderStage,
    UniformLocation, UNIFORM_BLOCK_SIZE,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Dynamic-offset stride per draw; uniform offsets must honor the
/// device's 256-byte alignment floor.
const DRAW_STRIDE: usize = 256;

/// Uniform ring capacity in draws per frame.
const MAX_DRAWS: usize = 1024;

struct Program {
    pipeline: wgpu::RenderPipeline,
    vertex_source: String,
}

struct DrawCmd {
    program: ProgramId,
    vertices: BufferId,
    indices: Option<BufferId>,
    count: u32,
    uniform_offset: u32,
}

/// Real GPU backend over a window surface.
pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    globals_layout: wgpu::BindGroupLayout,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,

    buffers: HashMap<BufferId, wgpu::Buffer>,
    next_buffer: u32,
    programs: HashMap<ProgramId, Program>,
    next_program: u32,
    current_program: Option<ProgramId>,

    // Per-frame recording state.
    staged_block: [u8; UNIFORM_BLOCK_SIZE],
    frame_uniforms: Vec<u8>,
    frame_draws: Vec<DrawCmd>,
}

impl WgpuBackend {
    /// Creates a backend rendering to the given window.
    ///
    /// # Panics
    /// Panics if no suitable adapter or device is available; there is
    /// nothing useful this demonstrator can do without a GPU.
    pub fn new(window: impl Into<wgpu::SurfaceTarget<'static>>, width: u32, height: u32) -> Self {
        pollster::block_on(Self::new_async(window, width, height))
    }

    async fn new_async(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to request adapter!");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Armature Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .expect("Failed to request a device!");

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            // The vsync'd present is the frame loop's only blocking point.
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(UNIFORM_BLOCK_SIZE as u64),
                },
                count: None,
            }],
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Uniform Ring"),
            size: (MAX_DRAWS * DRAW_STRIDE) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &globals_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(UNIFORM_BLOCK_SIZE as u64),
                }),
            }],
        });

        Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            globals_layout,
            globals_buffer,
            globals_bind_group,
            buffers: HashMap::new(),
            next_buffer: 0,
            programs: HashMap::new(),
            next_program: 0,
            current_program: None,
            staged_block: [0; UNIFORM_BLOCK_SIZE],
            frame_uniforms: Vec::new(),
            frame_draws: Vec::new(),
        }
    }

    /// Reconfigures the surface and depth buffer after a window resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.config);
    }

    /// Current surface dimensions, for aspect-ratio computation.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Starts recording a frame. Draw calls issued before the matching
    /// [`WgpuBackend::end_frame`] are replayed into one render pass.
    pub fn begin_frame(&mut self) {
        self.frame_uniforms.clear();
        self.frame_draws.clear();
    }

    /// Replays the recorded frame into a single render pass and presents.
    pub fn end_frame(&mut self) {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("skipping frame, no surface texture: {e}");
                return;
            }
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if !self.frame_uniforms.is_empty() {
            self.queue
                .write_buffer(&self.globals_buffer, 0, &self.frame_uniforms);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.2,
                            b: 0.3,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for cmd in &self.frame_draws {
                let Some(program) = self.programs.get(&cmd.program) else {
                    continue;
                };
                let Some(vertex_buffer) = self.buffers.get(&cmd.vertices) else {
                    continue;
                };

                pass.set_pipeline(&program.pipeline);
                pass.set_bind_group(0, &self.globals_bind_group, &[cmd.uniform_offset]);
                pass.set_vertex_buffer(0, vertex_buffer.slice(..));

                match cmd.indices {
                    Some(index_id) => {
                        let Some(index_buffer) = self.buffers.get(&index_id) else {
                            continue;
                        };
                        pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..cmd.count, 0, 0..1);
                    }
                    None => pass.draw(0..cmd.count, 0..1),
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    fn compile(&self, source: &str, stage: ShaderStage) -> Result<wgpu::ShaderModule, BackendError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{stage} shader")),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        // The module drops on the error path; nothing is retained.
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(error) => Err(BackendError::ShaderCompile {
                stage,
                log: error.to_string(),
            }),
            None => Ok(module),
        }
    }

    fn stage_draw(&mut self, vertices: BufferId, indices: Option<BufferId>, count: u32) {
        let Some(program) = self.current_program else {
            log::warn!("draw issued with no program bound, skipping");
            return;
        };
        let offset = self.frame_uniforms.len();
        if offset + DRAW_STRIDE > MAX_DRAWS * DRAW_STRIDE {
            log::warn!("uniform ring exhausted, dropping draw");
            return;
        }
        self.frame_uniforms.extend_from_slice(&self.staged_block);
        self.frame_uniforms
            .resize(offset + DRAW_STRIDE, 0);
        self.frame_draws.push(DrawCmd {
            program,
            vertices,
            indices,
            count,
            uniform_offset: offset as u32,
        });
    }
}

impl RenderBackend for WgpuBackend {
    fn create_vertex_buffer(&mut self, data: &[f32]) -> BufferId {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.next_buffer += 1;
        let id = BufferId(self.next_buffer);
        self.buffers.insert(id, buffer);
        id
    }

    fn create_index_buffer(&mut self, data: &[u32]) -> BufferId {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.next_buffer += 1;
        let id = BufferId(self.next_buffer);
        self.buffers.insert(id, buffer);
        id
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
    }

    fn create_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ProgramId, BackendError> {
        let vs_module = self.compile(vertex_src, ShaderStage::Vertex)?;
        let fs_module = self.compile(fragment_src, ShaderStage::Fragment)?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Program Layout"),
                bind_group_layouts: &[&self.globals_layout],
                push_constant_ranges: &[],
            });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Program Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vs_module,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::desc()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fs_module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            // Pipeline and modules drop here; the caller holds nothing.
            return Err(BackendError::ShaderLink {
                log: error.to_string(),
            });
        }

        self.next_program += 1;
        let id = ProgramId(self.next_program);
        self.programs.insert(
            id,
            Program {
                pipeline,
                vertex_source: vertex_src.to_string(),
            },
        );
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
        let program = self.programs.get(&program)?;
        uniform_offset(&program.vertex_source, name)
    }

    fn set_uniform_matrix(&mut self, location: UniformLocation, matrix: &Matrix4) {
        // Single row-major -> column-major boundary for the whole crate.
        let transposed = matrix.transpose().to_array();
        let bytes = bytemuck::bytes_of(&transposed);
        let start = location.0 as usize;
        let end = start + bytes.len();
        if end > UNIFORM_BLOCK_SIZE {
            log::warn!("uniform write at offset {start} overflows the globals block");
            return;
        }
        self.staged_block[start..end].copy_from_slice(bytes);
    }

    fn draw_indexed(&mut self, vertices: BufferId, indices: BufferId, index_count: u32) {
        self.stage_draw(vertices, Some(indices), index_count);
    }

    fn draw_arrays(&mut self, vertices: BufferId, vertex_count: u32) {
        self.stage_draw(vertices, None, vertex_count);
    }

    fn depth_correction(&self) -> Matrix4 {
        // Core clip z is -1..1; wgpu expects 0..1. z' = 0.5z + 0.5w.
        Matrix4 {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 0.5, 0.0],
                [0.0, 0.0, 0.5, 1.0],
            ],
        }
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
