//! Row-major 4x4 matrix operations.

use cgmath::{InnerSpace, Vector3};

use super::quaternion::Quaternion;

/// A 4x4 matrix stored row-major under the row-vector convention
/// (`v' = v * M`).
///
/// Composition order follows from the convention: "apply A then B" is
/// `A.mul(B)`. Translation therefore lives in the fourth *row*, not the
/// fourth column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    /// Rows, outer index first: `m[row][col]`.
    pub m: [[f32; 4]; 4],
}

impl Matrix4 {
    /// The identity matrix. `Matrix4::identity().mul(m) == m` for all `m`
    /// (within floating-point tolerance).
    pub fn identity() -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Translation by `v`. Under the row-vector convention the offset
    /// occupies the fourth row.
    pub fn from_translation(v: Vector3<f32>) -> Self {
        let mut out = Self::identity();
        out.m[3][0] = v.x;
        out.m[3][1] = v.y;
        out.m[3][2] = v.z;
        out
    }

    /// Non-uniform scale along the principal axes.
    pub fn from_scale(sx: f32, sy: f32, sz: f32) -> Self {
        let mut out = Self::identity();
        out.m[0][0] = sx;
        out.m[1][1] = sy;
        out.m[2][2] = sz;
        out
    }

    /// Rotation of `angle` radians about `axis`.
    ///
    /// The axis need not be pre-normalized. A zero-length axis degrades to
    /// the identity matrix rather than producing NaN.
    pub fn from_axis_angle(axis: Vector3<f32>, angle: f32) -> Self {
        Quaternion::from_axis_angle(axis, angle).to_matrix()
    }

    /// Matrix product `self * rhs`: applies `self` first, then `rhs`,
    /// when multiplying row vectors from the left.
    pub fn mul(&self, rhs: &Matrix4) -> Matrix4 {
        let mut out = [[0.0f32; 4]; 4];
        for (i, row) in self.m.iter().enumerate() {
            for j in 0..4 {
                out[i][j] = row[0] * rhs.m[0][j]
                    + row[1] * rhs.m[1][j]
                    + row[2] * rhs.m[2][j]
                    + row[3] * rhs.m[3][j];
            }
        }
        Matrix4 { m: out }
    }

    /// The transposed matrix. Adapts between this crate's row-major
    /// convention and column-major consumers; `transpose(transpose(m)) == m`.
    pub fn transpose(&self) -> Matrix4 {
        let mut out = [[0.0f32; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                out[i][j] = self.m[j][i];
            }
        }
        Matrix4 { m: out }
    }

    /// Transforms a point (`w = 1`): `v' = v * M` including translation.
    pub fn transform_point(&self, v: Vector3<f32>) -> Vector3<f32> {
        Vector3::new(
            v.x * self.m[0][0] + v.y * self.m[1][0] + v.z * self.m[2][0] + self.m[3][0],
            v.x * self.m[0][1] + v.y * self.m[1][1] + v.z * self.m[2][1] + self.m[3][1],
            v.x * self.m[0][2] + v.y * self.m[1][2] + v.z * self.m[2][2] + self.m[3][2],
        )
    }

    /// Transforms a direction (`w = 0`): rotation and scale only.
    pub fn transform_vector(&self, v: Vector3<f32>) -> Vector3<f32> {
        Vector3::new(
            v.x * self.m[0][0] + v.y * self.m[1][0] + v.z * self.m[2][0],
            v.x * self.m[0][1] + v.y * self.m[1][1] + v.z * self.m[2][1],
            v.x * self.m[0][2] + v.y * self.m[1][2] + v.z * self.m[2][2],
        )
    }

    /// Transforms a point through the full homogeneous pipeline, including
    /// the perspective divide. Used by the projection tests.
    pub fn project_point(&self, v: Vector3<f32>) -> Vector3<f32> {
        let x = v.x * self.m[0][0] + v.y * self.m[1][0] + v.z * self.m[2][0] + self.m[3][0];
        let y = v.x * self.m[0][1] + v.y * self.m[1][1] + v.z * self.m[2][1] + self.m[3][1];
        let z = v.x * self.m[0][2] + v.y * self.m[1][2] + v.z * self.m[2][2] + self.m[3][2];
        let w = v.x * self.m[0][3] + v.y * self.m[1][3] + v.z * self.m[2][3] + self.m[3][3];
        if w == 0.0 {
            return Vector3::new(x, y, z);
        }
        Vector3::new(x / w, y / w, z / w)
    }

    /// Row-major `[[f32; 4]; 4]` view of this matrix for byte-level upload.
    pub fn to_array(&self) -> [[f32; 4]; 4] {
        self.m
    }

    /// Maximum absolute element-wise difference to `rhs`.
    pub fn distance(&self, rhs: &Matrix4) -> f32 {
        let mut max = 0.0f32;
        for i in 0..4 {
            for j in 0..4 {
                max = max.max((self.m[i][j] - rhs.m[i][j]).abs());
            }
        }
        max
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Builds a view matrix from a camera frame: world space into camera space,
/// camera looking down its local −Z.
pub fn look_to(
    position: Vector3<f32>,
    look: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,
) -> Matrix4 {
    Matrix4 {
        m: [
            [right.x, up.x, -look.x, 0.0],
            [right.y, up.y, -look.y, 0.0],
            [right.z, up.z, -look.z, 0.0],
            [
                -right.dot(position),
                -up.dot(position),
                look.dot(position),
                1.0,
            ],
        ],
    }
}

/// Builds a perspective projection with the OpenGL depth convention:
/// near maps to −1, far to +1 in clip space. Backends expecting a 0..1
/// depth range adapt at their upload boundary, not here.
pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
    let f = 1.0 / (fov * 0.5).tan();
    let mut m = [[0.0f32; 4]; 4];
    m[0][0] = f / aspect;
    m[1][1] = f;
    m[2][2] = (far + near) / (near - far);
    m[2][3] = -1.0;
    m[3][2] = 2.0 * far * near / (near - far);
    Matrix4 { m }
}
