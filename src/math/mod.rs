//! # Transform Primitives
//!
//! Row-major 4x4 matrix and unit quaternion math used by the camera and
//! scene graph.
//!
//! Every matrix in this crate follows the row-vector convention:
//! `v' = v * M`, so "apply A then B" composes as `A.mul(B)` and a child's
//! world transform is `child_local.mul(parent_world)`. The transpose to
//! the column-major layout GPU-side code expects happens at exactly one
//! place, the wgpu backend's uniform upload, and nowhere else.
//!
//! This layer never fails: degenerate input (zero-length rotation axis,
//! zero quaternion) degrades to identity instead of producing NaN.

pub mod matrix;
pub mod quaternion;

pub use matrix::Matrix4;
pub use quaternion::Quaternion;
