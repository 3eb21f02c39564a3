//! # Geometry
//!
//! Immutable vertex/index data validated at creation and uploaded through
//! the render backend. A geometry may be shared by any number of scene
//! nodes; the [`GeometryManager`] owns the instances and releases their
//! GPU buffers at shutdown, never the nodes.

pub mod primitives;

use std::collections::HashMap;

use crate::gfx::backend::{BufferId, RenderBackend};
use crate::gfx::scene::vertex::FLOATS_PER_VERTEX;

/// Geometry construction failures. Validation runs before any GPU
/// allocation, so a failed create leaves no buffer behind.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error(
        "invalid geometry data: vertex array length {len} is not a multiple of {FLOATS_PER_VERTEX}"
    )]
    InvalidVertexData { len: usize },

    #[error("invalid geometry data: index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: u32 },
}

/// An immutable mesh: interleaved position+color vertices, optionally
/// indexed. Created once at startup, rendered with exactly one draw call,
/// destroyed once at shutdown.
#[derive(Debug)]
pub struct Geometry {
    vertex_buffer: BufferId,
    index_buffer: Option<BufferId>,
    vertex_count: u32,
    index_count: u32,
}

impl Geometry {
    /// Validates and uploads mesh data.
    ///
    /// `vertices` must hold a whole number of 6-float vertices; every
    /// index, when given, must reference an existing vertex.
    pub fn create(
        backend: &mut dyn RenderBackend,
        vertices: &[f32],
        indices: Option<&[u32]>,
    ) -> Result<Self, GeometryError> {
        if vertices.is_empty() || vertices.len() % FLOATS_PER_VERTEX != 0 {
            return Err(GeometryError::InvalidVertexData {
                len: vertices.len(),
            });
        }
        let vertex_count = (vertices.len() / FLOATS_PER_VERTEX) as u32;

        if let Some(indices) = indices {
            if let Some(&bad) = indices.iter().find(|&&index| index >= vertex_count) {
                return Err(GeometryError::IndexOutOfRange {
                    index: bad,
                    vertex_count,
                });
            }
        }

        let vertex_buffer = backend.create_vertex_buffer(vertices);
        let index_buffer = indices.map(|indices| backend.create_index_buffer(indices));

        Ok(Self {
            vertex_buffer,
            index_buffer,
            vertex_count,
            index_count: indices.map_or(0, |indices| indices.len() as u32),
        })
    }

    /// Issues exactly one draw call: indexed when indices were supplied at
    /// creation, otherwise a plain array draw.
    pub fn render(&self, backend: &mut dyn RenderBackend) {
        match self.index_buffer {
            Some(index_buffer) => {
                backend.draw_indexed(self.vertex_buffer, index_buffer, self.index_count)
            }
            None => backend.draw_arrays(self.vertex_buffer, self.vertex_count),
        }
    }

    /// Releases the GPU buffers. Call at most once; the manager does this
    /// at shutdown.
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        backend.destroy_buffer(self.vertex_buffer);
        if let Some(index_buffer) = self.index_buffer.take() {
            backend.destroy_buffer(index_buffer);
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }
}

/// Centralized geometry storage, keyed by name.
///
/// Scene nodes reference geometries by name rather than owning them,
/// so one mesh can back many nodes.
pub struct GeometryManager {
    geometries: HashMap<String, Geometry>,
}

impl GeometryManager {
    pub fn new() -> Self {
        Self {
            geometries: HashMap::new(),
        }
    }

    pub fn add(&mut self, name: &str, geometry: Geometry) {
        self.geometries.insert(name.to_string(), geometry);
    }

    pub fn get(&self, name: &str) -> Option<&Geometry> {
        self.geometries.get(name)
    }

    pub fn list(&self) -> Vec<&String> {
        self.geometries.keys().collect()
    }

    /// Releases every geometry's GPU buffers. Called once at shutdown.
    pub fn destroy_all(&mut self, backend: &mut dyn RenderBackend) {
        for geometry in self.geometries.values_mut() {
            geometry.destroy(backend);
        }
        self.geometries.clear();
    }
}

impl Default for GeometryManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::MockBackend;

    #[test]
    fn test_create_validates_vertex_stride() {
        let mut backend = MockBackend::new();
        let err = Geometry::create(&mut backend, &[0.0; 7], None).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidVertexData { len: 7 }));
        assert_eq!(backend.live_buffer_count(), 0);
    }

    #[test]
    fn test_create_validates_index_bounds() {
        let mut backend = MockBackend::new();
        // Two vertices, one index references a third.
        let err = Geometry::create(&mut backend, &[0.0; 12], Some(&[0, 1, 2])).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::IndexOutOfRange {
                index: 2,
                vertex_count: 2
            }
        ));
        // Nothing allocated after the failure.
        assert_eq!(backend.live_buffer_count(), 0);
    }

    #[test]
    fn test_indexed_geometry_draws_indexed() {
        let mut backend = MockBackend::new();
        let geometry =
            Geometry::create(&mut backend, &[0.0; 18], Some(&[0, 1, 2])).unwrap();
        assert_eq!(backend.live_buffer_count(), 2);
        assert!(geometry.is_indexed());

        geometry.render(&mut backend);
        assert_eq!(backend.draws.len(), 1);
        assert!(backend.draws[0].indices.is_some());
        assert_eq!(backend.draws[0].count, 3);
    }

    #[test]
    fn test_unindexed_geometry_draws_arrays() {
        let mut backend = MockBackend::new();
        let geometry = Geometry::create(&mut backend, &[0.0; 18], None).unwrap();
        assert_eq!(backend.live_buffer_count(), 1);

        geometry.render(&mut backend);
        assert_eq!(backend.draws.len(), 1);
        assert!(backend.draws[0].indices.is_none());
        assert_eq!(backend.draws[0].count, 3);
    }

    #[test]
    fn test_destroy_releases_buffers() {
        let mut backend = MockBackend::new();
        let mut geometry =
            Geometry::create(&mut backend, &[0.0; 18], Some(&[0, 1, 2])).unwrap();
        geometry.destroy(&mut backend);
        assert_eq!(backend.live_buffer_count(), 0);
    }

    #[test]
    fn test_manager_destroy_all() {
        let mut backend = MockBackend::new();
        let mut manager = GeometryManager::new();
        manager.add(
            "a",
            Geometry::create(&mut backend, &[0.0; 18], None).unwrap(),
        );
        manager.add(
            "b",
            Geometry::create(&mut backend, &[0.0; 36], Some(&[0, 1, 2])).unwrap(),
        );
        assert_eq!(backend.live_buffer_count(), 3);

        manager.destroy_all(&mut backend);
        assert_eq!(backend.live_buffer_count(), 0);
        assert!(manager.get("a").is_none());
    }
}
