//! # Scene
//!
//! [`Scene`] ties the pieces together: the camera, the asset managers,
//! and the root nodes of the transform hierarchy. The application shell
//! drives it with `update(dt)` then `render(backend)` each frame and
//! `shutdown(backend)` once on exit.

pub mod node;
pub mod vertex;

pub use node::{NodeHandle, NodeTransform, SceneNode};
pub use vertex::Vertex;

use crate::gfx::backend::RenderBackend;
use crate::gfx::camera::CameraManager;
use crate::gfx::geometry::GeometryManager;
use crate::gfx::material::MaterialManager;

pub struct Scene {
    pub camera_manager: CameraManager,
    pub geometries: GeometryManager,
    pub materials: MaterialManager,
    roots: Vec<NodeHandle>,
}

impl Scene {
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            geometries: GeometryManager::new(),
            materials: MaterialManager::new(),
            roots: Vec::new(),
        }
    }

    pub fn add_root(&mut self, node: NodeHandle) {
        self.roots.push(node);
    }

    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    /// Advances the camera and every node hierarchy by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.camera_manager.update();
        for root in &self.roots {
            root.borrow_mut().update(dt);
        }
    }

    /// Draws every root subtree in insertion order.
    pub fn render(&self, backend: &mut dyn RenderBackend) {
        for root in &self.roots {
            root.borrow().render(
                &self.camera_manager.camera,
                &self.materials,
                &self.geometries,
                backend,
            );
        }
    }

    /// Tears the scene down: nodes first, then the GPU assets they
    /// referenced.
    pub fn shutdown(&mut self, backend: &mut dyn RenderBackend) {
        for root in &self.roots {
            root.borrow_mut().destroy();
        }
        self.roots.clear();
        self.geometries.destroy_all(backend);
        self.materials.destroy_all(backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::MockBackend;
    use crate::gfx::geometry::{primitives, Geometry};
    use crate::gfx::material::Material;
    use crate::gfx::shaders;
    use cgmath::Vector3;

    fn demo_scene(backend: &mut MockBackend) -> Scene {
        let camera_manager = CameraManager::orbit(
            Vector3::new(5.0, 0.0, 3.0),
            Vector3::new(0.0, 0.0, 0.0),
            1.0,
            1.0,
        );
        let mut scene = Scene::new(camera_manager);
        scene.materials.add(
            Material::create(
                backend,
                "vertex_color",
                shaders::VERTEX_COLOR_VS,
                shaders::VERTEX_COLOR_FS,
            )
            .unwrap(),
        );
        let cube = primitives::generate_cube(1.0, [1.0, 0.5, 0.0]);
        scene.geometries.add(
            "cube",
            Geometry::create(backend, &cube.vertices, cube.indices.as_deref()).unwrap(),
        );

        let root = SceneNode::new("root");
        root.borrow_mut().geometry = Some("cube".into());
        root.borrow_mut().material = Some("vertex_color".into());
        root.borrow_mut().spin = Vector3::new(0.0, 0.0, 1.0);
        scene.add_root(root);
        scene
    }

    #[test]
    fn test_update_then_render_draws_roots() {
        let mut backend = MockBackend::new();
        let mut scene = demo_scene(&mut backend);

        scene.update(0.016);
        scene.render(&mut backend);
        assert_eq!(backend.draws.len(), 1);
        assert_eq!(backend.draws[0].count, 36);
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let mut backend = MockBackend::new();
        let mut scene = demo_scene(&mut backend);

        scene.shutdown(&mut backend);
        assert!(scene.roots().is_empty());
        assert_eq!(backend.live_buffer_count(), 0);
        assert_eq!(backend.live_program_count(), 0);

        // Rendering an empty scene draws nothing.
        scene.render(&mut backend);
        assert!(backend.draws.is_empty());
    }
}
