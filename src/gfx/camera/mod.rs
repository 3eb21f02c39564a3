//! # Camera System
//!
//! [`Camera`] owns the orthonormal frame and projection parameters;
//! [`OrbitController`] turns mouse input into orbital motion around a
//! target. [`CameraManager`] pairs the two and is what the application
//! shell talks to.

pub mod camera;
pub mod orbit_controller;

pub use camera::{Camera, WORLD_UP};
pub use orbit_controller::OrbitController;

use cgmath::Vector3;
use winit::event::WindowEvent;

/// A camera plus the controller that drives it.
pub struct CameraManager {
    pub camera: Camera,
    pub controller: OrbitController,
}

impl CameraManager {
    /// An orbiting camera at `position` aimed at `target`, with the
    /// controller's spherical state derived from that pose.
    pub fn orbit(position: Vector3<f32>, target: Vector3<f32>, fov: f32, aspect: f32) -> Self {
        let camera = Camera::look_at_target(position, target, fov, aspect);
        let mut controller = OrbitController::new(target, 1.0);
        controller.init_from_camera(&camera);
        Self { camera, controller }
    }

    /// Feeds a window event to the controller. Returns true when the
    /// camera moved and the scene should redraw.
    pub fn process_window_event(&mut self, event: &WindowEvent) -> bool {
        self.controller.process_window_event(event)
    }

    /// Applies the controller's current orbit state to the camera. Called
    /// once per frame before rendering.
    pub fn update(&mut self) {
        self.controller.update_camera(&mut self.camera);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.camera.set_aspect(width as f32 / height as f32);
        }
    }
}
