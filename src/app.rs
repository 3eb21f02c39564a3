//! Application shell: winit event loop, window lifecycle, and the demo
//! scene assembly.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use cgmath::Vector3;
use log::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

use crate::gfx::backend::WgpuBackend;
use crate::gfx::camera::CameraManager;
use crate::gfx::geometry::{primitives, Geometry};
use crate::gfx::material::Material;
use crate::gfx::scene::{NodeTransform, Scene, SceneNode};
use crate::gfx::shaders;
use crate::math::Matrix4;

/// The demonstrator application. Owns the event loop until `run`.
pub struct App {
    event_loop: Option<EventLoop<()>>,
    state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    backend: Option<WgpuBackend>,
    scene: Scene,
    last_frame: Option<Instant>,
}

impl App {
    pub fn new() -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;

        let camera_manager = CameraManager::orbit(
            Vector3::new(6.0, -6.0, 4.0),
            Vector3::new(0.0, 0.0, 0.0),
            std::f32::consts::FRAC_PI_4,
            1.0,
        );
        let scene = Scene::new(camera_manager);

        Ok(Self {
            event_loop: Some(event_loop),
            state: AppState {
                window: None,
                backend: None,
                scene,
                last_frame: None,
            },
        })
    }

    /// Runs the event loop until the window closes. Consumes self.
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self.state)
            .context("event loop terminated abnormally")?;
        Ok(())
    }
}

impl AppState {
    /// Compiles the demo materials, uploads the demo meshes, and builds
    /// the node hierarchy: a spinning parent cube with two orbiting child
    /// cubes, a matrix-positioned marker cube, and an unlit ground
    /// triangle.
    fn build_demo_scene(&mut self, backend: &mut WgpuBackend) -> anyhow::Result<()> {
        let scene = &mut self.scene;

        scene.materials.add(
            Material::create(
                backend,
                "vertex_color",
                shaders::VERTEX_COLOR_VS,
                shaders::VERTEX_COLOR_FS,
            )
            .context("material 'vertex_color'")?,
        );
        scene.materials.add(
            Material::create(
                backend,
                "unlit",
                shaders::UNLIT_VS,
                shaders::VERTEX_COLOR_FS,
            )
            .context("material 'unlit'")?,
        );

        let cube = primitives::generate_cube(1.0, [0.9, 0.4, 0.1]);
        scene.geometries.add(
            "cube",
            Geometry::create(backend, &cube.vertices, cube.indices.as_deref())
                .context("geometry 'cube'")?,
        );
        let small_cube = primitives::generate_cube(0.4, [0.2, 0.6, 0.9]);
        scene.geometries.add(
            "small_cube",
            Geometry::create(backend, &small_cube.vertices, small_cube.indices.as_deref())
                .context("geometry 'small_cube'")?,
        );
        let triangle = primitives::generate_triangle(8.0);
        scene.geometries.add(
            "ground",
            Geometry::create(backend, &triangle.vertices, triangle.indices.as_deref())
                .context("geometry 'ground'")?,
        );

        let parent = SceneNode::new("parent");
        {
            let mut node = parent.borrow_mut();
            node.geometry = Some("cube".into());
            node.material = Some("vertex_color".into());
            node.transform = NodeTransform::Trs {
                translation: Vector3::new(0.0, 0.0, 1.0),
                rotation: crate::math::Quaternion::identity(),
                scale: Vector3::new(1.0, 1.0, 1.0),
            };
            node.spin = Vector3::new(0.0, 0.0, 0.8);
        }

        for (name, offset) in [
            ("child_a", Vector3::new(2.0, 0.0, 0.0)),
            ("child_b", Vector3::new(-2.0, 0.0, 0.5)),
        ] {
            let child = SceneNode::new(name);
            {
                let mut node = child.borrow_mut();
                node.geometry = Some("small_cube".into());
                node.material = Some("vertex_color".into());
                node.transform = NodeTransform::Trs {
                    translation: offset,
                    rotation: crate::math::Quaternion::identity(),
                    scale: Vector3::new(1.0, 1.0, 1.0),
                };
                node.spin = Vector3::new(1.5, 0.0, 0.0);
            }
            SceneNode::add_child(&parent, child);
        }
        scene.add_root(parent);

        // A matrix-mode node: positioned once, never animated.
        let marker = SceneNode::new("marker");
        {
            let mut node = marker.borrow_mut();
            node.geometry = Some("small_cube".into());
            node.material = Some("vertex_color".into());
            node.transform =
                NodeTransform::Matrix(Matrix4::from_translation(Vector3::new(0.0, 3.0, 0.2)));
        }
        scene.add_root(marker);

        let ground = SceneNode::new("ground");
        {
            let mut node = ground.borrow_mut();
            node.geometry = Some("ground".into());
            node.material = Some("unlit".into());
        }
        scene.add_root(ground);

        info!(
            "demo scene ready: {} geometries, {} materials",
            scene.geometries.list().len(),
            scene.materials.list().len()
        );
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            WindowAttributes::default()
                .with_title("armature")
                .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let (width, height) = window.inner_size().into();
        let mut backend = WgpuBackend::new(window.clone(), width, height);
        self.scene.camera_manager.resize(width, height);

        if let Err(err) = self.build_demo_scene(&mut backend) {
            error!("failed to build demo scene: {err:#}");
            event_loop.exit();
            return;
        }
        self.backend = Some(backend);
        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        let Some(window) = self.window.as_ref() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.scene.shutdown(backend);
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    self.scene.shutdown(backend);
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                backend.resize(width, height);
                self.scene.camera_manager.resize(width, height);
                window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = self
                    .last_frame
                    .map(|last| (now - last).as_secs_f32())
                    .unwrap_or(0.0);
                self.last_frame = Some(now);

                self.scene.update(dt);
                backend.begin_frame();
                self.scene.render(backend);
                backend.end_frame();

                window.request_redraw();
            }
            other => {
                if self.scene.camera_manager.process_window_event(&other) {
                    window.request_redraw();
                }
            }
        }
    }
}
