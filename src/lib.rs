// src/lib.rs
//! Armature
//!
//! A small interactive scene-graph demonstrator built on wgpu and winit:
//! row-major matrix/quaternion math, an orbiting camera, and a transform
//! hierarchy of animated meshes.

pub mod app;
pub mod gfx;
pub mod math;
pub mod prelude;

// Re-export main types for convenience
pub use app::App;

/// Creates a default application instance with the demo scene.
pub fn default() -> anyhow::Result<App> {
    App::new()
}
