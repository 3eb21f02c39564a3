//! Unit quaternion rotations.

use cgmath::{InnerSpace, Vector3};

use super::matrix::Matrix4;

/// A rotation as a unit quaternion `(x, y, z, w)`.
///
/// Immutable value type: every operation returns a new quaternion.
/// `a.mul(b)` composes as "apply `b` then `a`", matching the row-vector
/// matrix equivalent `b.to_matrix().mul(a.to_matrix())`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    /// The identity rotation.
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }

    /// Rotation of `angle` radians about `axis`.
    ///
    /// The axis is normalized internally; a zero-length axis degrades to
    /// the identity rotation.
    pub fn from_axis_angle(axis: Vector3<f32>, angle: f32) -> Self {
        let len = axis.magnitude();
        if len == 0.0 {
            return Self::identity();
        }
        let half = angle * 0.5;
        let s = half.sin() / len;
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: half.cos(),
        }
    }

    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Returns the unit quaternion with this orientation.
    ///
    /// A zero quaternion is a data error upstream; this fails closed and
    /// returns identity instead of dividing by zero.
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            return Self::identity();
        }
        Self {
            x: self.x / mag,
            y: self.y / mag,
            z: self.z / mag,
            w: self.w / mag,
        }
    }

    /// Hamilton product `self * rhs`: the rotation that applies `rhs`
    /// first, then `self`.
    pub fn mul(&self, rhs: &Quaternion) -> Quaternion {
        Quaternion {
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        }
    }

    /// Rotates a vector by this quaternion.
    pub fn rotate_vector(&self, v: Vector3<f32>) -> Vector3<f32> {
        // v' = v + 2w(q × v) + 2(q × (q × v))
        let q = Vector3::new(self.x, self.y, self.z);
        let t = 2.0 * q.cross(v);
        v + self.w * t + q.cross(t)
    }

    /// The equivalent rotation matrix under the crate's row-vector
    /// convention: `v.mul(q.to_matrix())` equals `q.rotate_vector(v)`.
    pub fn to_matrix(&self) -> Matrix4 {
        let (x, y, z, w) = (self.x, self.y, self.z, self.w);
        let (x2, y2, z2) = (x + x, y + y, z + z);

        let xx = x * x2;
        let xy = x * y2;
        let xz = x * z2;
        let yy = y * y2;
        let yz = y * z2;
        let zz = z * z2;
        let wx = w * x2;
        let wy = w * y2;
        let wz = w * z2;

        Matrix4 {
            m: [
                [1.0 - (yy + zz), xy + wz, xz - wy, 0.0],
                [xy - wz, 1.0 - (xx + zz), yz + wx, 0.0],
                [xz + wy, yz - wx, 1.0 - (xx + yy), 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    const TOL: f32 = 1e-5;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < TOL
    }

    #[test]
    fn test_axis_angle_is_unit() {
        // Deliberately unnormalized axis.
        let q = Quaternion::from_axis_angle(Vector3::new(3.0, -4.0, 12.0), 1.3);
        assert!((q.magnitude() - 1.0).abs() < TOL);
    }

    #[test]
    fn test_normalize_zero_fails_closed() {
        let zero = Quaternion {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 0.0,
        };
        assert_eq!(zero.normalize(), Quaternion::identity());
    }

    #[test]
    fn test_matrix_round_trip() {
        // 3 axes x 3 angles including the degenerate 0 and the half turn.
        let axes = [Vector3::unit_x(), Vector3::unit_y(), Vector3::unit_z()];
        let angles = [0.0, FRAC_PI_4, PI];
        let probe = Vector3::new(0.3, -1.2, 2.5);

        for axis in axes {
            for angle in angles {
                let q = Quaternion::from_axis_angle(axis, angle);
                let by_quat = q.rotate_vector(probe);
                let by_matrix = q.to_matrix().transform_point(probe);
                assert!(
                    close(by_quat, by_matrix),
                    "axis {axis:?} angle {angle}: {by_quat:?} vs {by_matrix:?}"
                );
            }
        }
    }

    #[test]
    fn test_mul_applies_rhs_first() {
        let about_z = Quaternion::from_axis_angle(Vector3::unit_z(), FRAC_PI_2);
        let about_x = Quaternion::from_axis_angle(Vector3::unit_x(), FRAC_PI_2);

        // Apply Z first, then X: +X -> +Y -> +Z.
        let composed = about_x.mul(&about_z);
        assert!(close(composed.rotate_vector(Vector3::unit_x()), Vector3::unit_z()));
    }

    #[test]
    fn test_mul_matches_matrix_composition() {
        let a = Quaternion::from_axis_angle(Vector3::new(1.0, 1.0, 0.0), 0.8);
        let b = Quaternion::from_axis_angle(Vector3::new(0.0, 1.0, -1.0), -1.2);

        // a.mul(b) applies b then a; in row-vector matrices that is
        // b.to_matrix().mul(a.to_matrix()).
        let lhs = a.mul(&b).to_matrix();
        let rhs = b.to_matrix().mul(&a.to_matrix());
        assert!(lhs.distance(&rhs) < TOL);
    }

    #[test]
    fn test_rotation_basic() {
        let q = Quaternion::from_axis_angle(Vector3::unit_z(), FRAC_PI_2);
        assert!(close(q.rotate_vector(Vector3::unit_x()), Vector3::unit_y()));
    }
}
