//! Mouse-driven orbit control: left-drag rotates about a target point,
//! scroll zooms along the view ray.

use std::f32::consts::FRAC_PI_2;

use cgmath::Vector3;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use super::camera::{Camera, WORLD_UP};

/// Elevation stays this far away from the poles so the camera frame never
/// degenerates against the world up axis.
const ELEVATION_MARGIN: f32 = 1e-3;

/// Orbit state: spherical coordinates around a target, plus drag tracking.
///
/// Azimuth is measured in the XY ground plane from the +X axis, elevation
/// from the ground plane toward +Z. `update_camera` maps the spherical
/// state to a camera position and aims the camera at the target.
pub struct OrbitController {
    pub target: Vector3<f32>,
    pub distance: f32,
    pub azimuth: f32,
    pub elevation: f32,

    pub rotation_sensitivity: f32,
    pub zoom_sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    dragging: bool,
    last_cursor: Option<(f32, f32)>,
}

impl OrbitController {
    pub fn new(target: Vector3<f32>, distance: f32) -> Self {
        Self {
            target,
            distance,
            azimuth: 0.0,
            elevation: 0.0,
            rotation_sensitivity: 0.005,
            zoom_sensitivity: 0.1,
            min_distance: 0.5,
            max_distance: 50.0,
            dragging: false,
            last_cursor: None,
        }
    }

    /// Adopts an existing camera's pose: distance and angles are recovered
    /// from the camera position relative to the target, so the first drag
    /// continues from where the camera already is instead of snapping.
    pub fn init_from_camera(&mut self, camera: &Camera) {
        let offset = camera.position - self.target;
        let horizontal = (offset.x * offset.x + offset.y * offset.y).sqrt();
        self.distance = (horizontal * horizontal + offset.z * offset.z).sqrt();
        if self.distance <= f32::EPSILON {
            self.azimuth = 0.0;
            self.elevation = 0.0;
            return;
        }
        self.azimuth = offset.y.atan2(offset.x);
        self.elevation = offset.z.atan2(horizontal);
        self.clamp_elevation();
    }

    /// Begins or ends a rotate drag. The press position seeds the cursor
    /// delta so the first move event produces no jump.
    pub fn on_button(&mut self, pressed: bool, x: f32, y: f32) {
        self.dragging = pressed;
        self.last_cursor = pressed.then_some((x, y));
    }

    /// Accumulates azimuth/elevation from cursor motion while dragging.
    /// Dragging right decreases azimuth; dragging up raises the camera.
    pub fn on_cursor_move(&mut self, x: f32, y: f32) {
        if !self.dragging {
            return;
        }
        if let Some((last_x, last_y)) = self.last_cursor {
            let dx = x - last_x;
            let dy = y - last_y;
            self.azimuth -= dx * self.rotation_sensitivity;
            self.elevation += dy * self.rotation_sensitivity;
            self.clamp_elevation();
        }
        self.last_cursor = Some((x, y));
    }

    /// Zooms along the view ray. Positive scroll moves closer; distance is
    /// clamped to `[min_distance, max_distance]`.
    pub fn on_scroll(&mut self, delta: f32) {
        self.distance =
            (self.distance - delta * self.zoom_sensitivity).clamp(self.min_distance, self.max_distance);
    }

    /// Writes the spherical state back to the camera: position on the
    /// orbit sphere, aimed at the target. The frame is rebuilt against
    /// the fixed world up every time, so roll never drifts in over many
    /// frames of incremental orbiting.
    pub fn update_camera(&self, camera: &mut Camera) {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        camera.position = Vector3::new(
            self.target.x + self.distance * cos_el * cos_az,
            self.target.y + self.distance * cos_el * sin_az,
            self.target.z + self.distance * sin_el,
        );
        camera.orient(self.target - camera.position, WORLD_UP);
    }

    /// Routes the window events the controller cares about. Returns true
    /// when the event changed controller state and a redraw is warranted.
    pub fn process_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let (x, y) = self.last_cursor.unwrap_or((0.0, 0.0));
                self.on_button(*state == ElementState::Pressed, x, y);
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let was_dragging = self.dragging;
                self.on_cursor_move(position.x as f32, position.y as f32);
                if !self.dragging {
                    // Track the cursor so the next press seeds a delta of
                    // zero at the press position.
                    self.last_cursor = Some((position.x as f32, position.y as f32));
                }
                was_dragging
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32,
                };
                self.on_scroll(amount);
                true
            }
            _ => false,
        }
    }

    fn clamp_elevation(&mut self) {
        let limit = FRAC_PI_2 - ELEVATION_MARGIN;
        self.elevation = self.elevation.clamp(-limit, limit);
    }
}
