//! First-person style camera holding an explicit position/look/up/right
//! frame plus perspective parameters.

use cgmath::{InnerSpace, Vector3};

use crate::math::{matrix, Matrix4};

/// A camera frame and its perspective projection parameters.
///
/// The three basis vectors stay unit length and mutually orthogonal, with
/// `cross(look, up) == right`. Every mutation re-orthonormalizes the
/// frame, so small numeric drift never accumulates.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vector3<f32>,
    look: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,

    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

/// World up axis. The ground plane is XY and Z points skyward.
pub const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 0.0, 1.0);

impl Camera {
    /// A camera at `position` looking along `look`, with the frame
    /// orthonormalized against the caller's `up` hint. The hint need not
    /// be orthogonal to `look`; skew is squeezed out here.
    pub fn new(
        position: Vector3<f32>,
        look: Vector3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect: f32,
    ) -> Self {
        let mut camera = Self {
            position,
            look: Vector3::new(0.0, -1.0, 0.0),
            up: WORLD_UP,
            right: Vector3::new(1.0, 0.0, 0.0),
            fov,
            aspect,
            near: 0.1,
            far: 100.0,
        };
        camera.orient(look, up);
        camera
    }

    /// A camera at `position` aimed at `target`, level with the world.
    pub fn look_at_target(
        position: Vector3<f32>,
        target: Vector3<f32>,
        fov: f32,
        aspect: f32,
    ) -> Self {
        Self::new(position, target - position, WORLD_UP, fov, aspect)
    }

    /// Re-aims the camera at `target` from its current position, keeping
    /// the current roll.
    pub fn look_at(&mut self, target: Vector3<f32>) {
        self.set_look(target - self.position);
    }

    /// Sets the look direction, re-deriving right/up from the current up
    /// so the frame stays orthonormal without changing roll.
    pub fn set_look(&mut self, look: Vector3<f32>) {
        let up = self.up;
        self.orient(look, up);
    }

    /// Rebuilds the frame from a look direction and an up hint.
    ///
    /// When `look` is (anti)parallel to the hint the horizontal reference
    /// degenerates; the previous `right` is kept as the tie breaker so the
    /// frame stays orthonormal. A zero-length `look` is ignored.
    pub fn orient(&mut self, look: Vector3<f32>, up: Vector3<f32>) {
        if look.magnitude2() <= f32::EPSILON {
            return;
        }
        self.look = look.normalize();

        let right = self.look.cross(up);
        if right.magnitude2() > 1e-10 {
            self.right = right.normalize();
        }
        self.up = self.right.cross(self.look).normalize();
    }

    /// Rotates all three frame vectors by `angle` radians about `axis`,
    /// then re-orthonormalizes. Rotating about the look axis rolls the
    /// camera.
    pub fn rotate(&mut self, axis: Vector3<f32>, angle: f32) {
        let rotation = crate::math::Quaternion::from_axis_angle(axis, angle);
        let look = rotation.rotate_vector(self.look);
        let up = rotation.rotate_vector(self.up);
        self.right = rotation.rotate_vector(self.right);
        self.orient(look, up);
    }

    pub fn look(&self) -> Vector3<f32> {
        self.look
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    /// World-to-eye transform built from the current frame.
    pub fn view_matrix(&self) -> Matrix4 {
        matrix::look_to(self.position, self.look, self.up, self.right)
    }

    /// Perspective projection with the near→−1, far→+1 depth convention.
    /// Backends with a different clip depth range append their
    /// [`depth_correction`](crate::gfx::backend::RenderBackend::depth_correction).
    pub fn projection_matrix(&self) -> Matrix4 {
        matrix::perspective(self.fov, self.aspect, self.near, self.far)
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec_near(a: Vector3<f32>, b: Vector3<f32>) {
        assert!(
            (a - b).magnitude() < 1e-5,
            "expected {:?}, got {:?}",
            b,
            a
        );
    }

    fn assert_orthonormal(camera: &Camera) {
        assert!((camera.look().magnitude() - 1.0).abs() < 1e-5);
        assert!((camera.up().magnitude() - 1.0).abs() < 1e-5);
        assert!((camera.right().magnitude() - 1.0).abs() < 1e-5);
        assert!(camera.look().dot(camera.up()).abs() < 1e-5);
        assert!(camera.look().dot(camera.right()).abs() < 1e-5);
        assert!(camera.up().dot(camera.right()).abs() < 1e-5);
        assert_vec_near(camera.look().cross(camera.up()), camera.right());
    }

    #[test]
    fn test_frame_is_orthonormal() {
        // Deliberately skewed up hint.
        let camera = Camera::new(
            Vector3::new(3.0, -4.0, 2.0),
            Vector3::new(-3.0, 4.0, -2.0),
            Vector3::new(0.3, 0.1, 1.0),
            1.0,
            1.0,
        );
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_look_at_target() {
        let camera = Camera::look_at_target(
            Vector3::new(5.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            1.0,
            1.0,
        );
        assert_vec_near(camera.look(), Vector3::new(-1.0, 0.0, 0.0));
        assert_vec_near(camera.up(), WORLD_UP);
        assert_vec_near(camera.right(), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_rotate_quarter_turn_about_world_up() {
        let mut camera = Camera::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            WORLD_UP,
            1.0,
            1.0,
        );
        camera.rotate(WORLD_UP, FRAC_PI_2);
        assert_vec_near(camera.look(), Vector3::new(0.0, 1.0, 0.0));
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_rotate_about_look_axis_rolls_frame() {
        let mut camera = Camera::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            WORLD_UP,
            1.0,
            1.0,
        );
        camera.rotate(camera.look(), FRAC_PI_2);

        // Look is unchanged, but the frame has rolled a quarter turn:
        // the old right becomes the new up.
        assert_vec_near(camera.look(), Vector3::new(1.0, 0.0, 0.0));
        assert_vec_near(camera.up(), Vector3::new(0.0, -1.0, 0.0));
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_degenerate_look_ignored() {
        let mut camera = Camera::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            WORLD_UP,
            1.0,
            1.0,
        );
        let look = camera.look();
        camera.set_look(Vector3::new(0.0, 0.0, 0.0));
        assert_vec_near(camera.look(), look);
    }

    #[test]
    fn test_vertical_look_keeps_previous_right() {
        let mut camera = Camera::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            WORLD_UP,
            1.0,
            1.0,
        );
        let right = camera.right();
        camera.set_look(WORLD_UP);
        assert_vec_near(camera.right(), right);
        assert!(camera.look().dot(camera.up()).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix_brings_target_to_eye_space() {
        let camera = Camera::look_at_target(
            Vector3::new(0.0, -5.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            1.0,
            1.0,
        );
        // A point straight ahead lands on the eye-space -Z axis.
        let eye = camera
            .view_matrix()
            .transform_point(Vector3::new(0.0, 0.0, 0.0));
        assert!(eye.x.abs() < 1e-5);
        assert!(eye.y.abs() < 1e-5);
        assert!((eye.z + 5.0).abs() < 1e-5);
    }
}
