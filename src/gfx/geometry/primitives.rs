//! Procedural mesh generators for the demo scene.

/// Raw mesh data ready for [`Geometry::create`].
///
/// [`Geometry::create`]: super::Geometry::create
pub struct MeshData {
    /// Interleaved x, y, z, r, g, b per vertex.
    pub vertices: Vec<f32>,
    /// Triangle-list indices; `None` for non-indexed meshes.
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 6
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.vertex_count() / 3,
        }
    }
}

/// Generates an indexed unit-color cube centered on the origin.
///
/// 8 shared corner vertices, 12 triangles, counter-clockwise winding
/// seen from outside (back faces cull).
pub fn generate_cube(size: f32, color: [f32; 3]) -> MeshData {
    let h = size * 0.5;
    let [r, g, b] = color;

    let corners: [[f32; 3]; 8] = [
        [-h, -h, -h],
        [h, -h, -h],
        [h, h, -h],
        [-h, h, -h],
        [-h, -h, h],
        [h, -h, h],
        [h, h, h],
        [-h, h, h],
    ];

    let mut vertices = Vec::with_capacity(8 * 6);
    for corner in corners {
        vertices.extend_from_slice(&corner);
        vertices.extend_from_slice(&[r, g, b]);
    }

    #[rustfmt::skip]
    let indices = vec![
        4, 5, 6,  4, 6, 7, // top (+z)
        0, 3, 2,  0, 2, 1, // bottom (-z)
        0, 1, 5,  0, 5, 4, // front (-y)
        2, 3, 7,  2, 7, 6, // back (+y)
        1, 2, 6,  1, 6, 5, // right (+x)
        3, 0, 4,  3, 4, 7, // left (-x)
    ];

    MeshData {
        vertices,
        indices: Some(indices),
    }
}

/// Generates a non-indexed RGB triangle in the ground (xy) plane,
/// exercising the array-draw path.
pub fn generate_triangle(size: f32) -> MeshData {
    let h = size * 0.5;
    #[rustfmt::skip]
    let vertices = vec![
        -h, -h, 0.0,  1.0, 0.0, 0.0,
         h, -h, 0.0,  0.0, 1.0, 0.0,
         0.0, h, 0.0,  0.0, 0.0, 1.0,
    ];
    MeshData {
        vertices,
        indices: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::vertex::FLOATS_PER_VERTEX;

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube(2.0, [1.0, 0.5, 0.0]);
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.vertices.len() % FLOATS_PER_VERTEX, 0);

        // Every index references an existing corner.
        let indices = cube.indices.as_ref().unwrap();
        assert!(indices.iter().all(|&i| (i as usize) < cube.vertex_count()));
    }

    #[test]
    fn test_cube_extent_and_color() {
        let cube = generate_cube(3.0, [0.2, 0.4, 0.6]);
        for vertex in cube.vertices.chunks(FLOATS_PER_VERTEX) {
            assert!(vertex[..3].iter().all(|coordinate| coordinate.abs() == 1.5));
            assert_eq!(&vertex[3..], &[0.2, 0.4, 0.6]);
        }
    }

    #[test]
    fn test_triangle_generation() {
        let triangle = generate_triangle(10.0);
        assert_eq!(triangle.vertex_count(), 3);
        assert_eq!(triangle.triangle_count(), 1);
        assert!(triangle.indices.is_none());
    }
}
