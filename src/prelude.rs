//! # Armature Prelude
//!
//! Brings the commonly used types into scope:
//!
//! ```no_run
//! use armature::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     env_logger::init();
//!     armature::default()?.run()
//! }
//! ```

// Re-export core application types
pub use crate::app::App;
pub use crate::default;

// Re-export graphics and scene types
pub use crate::gfx::backend::RenderBackend;
pub use crate::gfx::camera::{Camera, CameraManager, OrbitController};
pub use crate::gfx::geometry::primitives::{generate_cube, generate_triangle};
pub use crate::gfx::geometry::{Geometry, GeometryManager};
pub use crate::gfx::material::{Material, MaterialManager};
pub use crate::gfx::scene::{NodeHandle, NodeTransform, Scene, SceneNode};

// Re-export the math layer
pub use crate::math::{Matrix4, Quaternion};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Vector3, Zero};

// Re-export common standard library types
pub use std::time::Instant;
