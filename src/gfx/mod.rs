//! # Graphics Module
//!
//! Everything between the math layer and the window: the render backend
//! seam, mesh and material management, the camera system, and the scene
//! graph.
//!
//! ## Architecture Overview
//!
//! - **Backend** ([`backend`]) - the [`backend::RenderBackend`] trait,
//!   the wgpu implementation, and a headless mock for tests
//! - **Geometry** ([`geometry`]) - GPU mesh wrappers plus the demo
//!   primitive generators
//! - **Material** ([`material`]) - compiled shader programs, shared by
//!   name through [`material::MaterialManager`]
//! - **Camera** ([`camera`]) - orthonormal camera frame and the orbit
//!   controller
//! - **Scene** ([`scene`]) - transform hierarchy and render traversal
//!
//! Draw order follows scene-graph traversal; the depth buffer resolves
//! visibility.

pub mod backend;
pub mod camera;
pub mod geometry;
pub mod material;
pub mod scene;
pub mod shaders;

pub use backend::{MockBackend, RenderBackend, WgpuBackend};
pub use camera::{Camera, CameraManager, OrbitController};
pub use geometry::{Geometry, GeometryManager};
pub use material::{Material, MaterialManager};
pub use scene::{Scene, SceneNode};
