//! Shader Sources
//!
//! WGSL source for the demonstrator's materials, kept in dedicated files
//! and embedded at compile time.

/// Vertex stage of the standard colored-mesh material; declares the full
/// model/view/projection uniform block.
pub const VERTEX_COLOR_VS: &str = include_str!("shaders/vertex_color.vs.wgsl");

/// Shared fragment stage: pass-through vertex color.
pub const VERTEX_COLOR_FS: &str = include_str!("shaders/vertex_color.fs.wgsl");

/// Vertex stage of the reduced world-space material; its uniform block
/// has no `model` member, so the model upload is skipped non-fatally.
pub const UNLIT_VS: &str = include_str!("shaders/unlit.vs.wgsl");
