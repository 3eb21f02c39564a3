//! Scene graph nodes: transform hierarchy, per-axis spin animation, and
//! the recursive render traversal.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use cgmath::Vector3;
use log::debug;

use crate::gfx::backend::RenderBackend;
use crate::gfx::camera::Camera;
use crate::gfx::geometry::GeometryManager;
use crate::gfx::material::MaterialManager;
use crate::math::{Matrix4, Quaternion};

/// Shared, interior-mutable handle to a node. Parents own their children
/// through these; back-references are weak so the graph drops cleanly.
pub type NodeHandle = Rc<RefCell<SceneNode>>;

/// How a node expresses its local transform. The two modes are mutually
/// exclusive: animation only ever touches `Trs` rotation, and a `Matrix`
/// node's matrix is exactly what the caller stored.
#[derive(Debug, Clone)]
pub enum NodeTransform {
    Matrix(Matrix4),
    Trs {
        translation: Vector3<f32>,
        rotation: Quaternion,
        scale: Vector3<f32>,
    },
}

impl NodeTransform {
    pub fn trs() -> Self {
        NodeTransform::Trs {
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// A node in the transform hierarchy. Geometry and material are referenced
/// by name into the central managers, so many nodes can share one mesh.
pub struct SceneNode {
    pub name: String,
    pub transform: NodeTransform,

    /// Per-axis spin speeds in radians per second. All-zero means the
    /// node's rotation is whatever was set by hand.
    pub spin: Vector3<f32>,
    elapsed: f32,

    pub geometry: Option<String>,
    pub material: Option<String>,

    children: Vec<NodeHandle>,
    parent: Weak<RefCell<SceneNode>>,
}

impl SceneNode {
    pub fn new(name: &str) -> NodeHandle {
        Rc::new(RefCell::new(Self {
            name: name.to_string(),
            transform: NodeTransform::trs(),
            spin: Vector3::new(0.0, 0.0, 0.0),
            elapsed: 0.0,
            geometry: None,
            material: None,
            children: Vec::new(),
            parent: Weak::new(),
        }))
    }

    /// Appends `child` and points its parent reference at `parent`. A node
    /// already parented elsewhere is simply re-pointed; the previous
    /// parent keeps its (now stale) strong reference until `remove_child`.
    pub fn add_child(parent: &NodeHandle, child: NodeHandle) {
        child.borrow_mut().parent = Rc::downgrade(parent);
        parent.borrow_mut().children.push(child);
    }

    /// Unlinks `child` from `parent`. Returns false when `child` is not a
    /// direct child. Sibling order is not preserved.
    pub fn remove_child(parent: &NodeHandle, child: &NodeHandle) -> bool {
        let mut node = parent.borrow_mut();
        match node.children.iter().position(|c| Rc::ptr_eq(c, child)) {
            Some(index) => {
                node.children.swap_remove(index);
                child.borrow_mut().parent = Weak::new();
                true
            }
            None => false,
        }
    }

    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent.upgrade()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The node's transform relative to its parent. TRS composes scale,
    /// then rotation, then translation.
    pub fn local_transform(&self) -> Matrix4 {
        match &self.transform {
            NodeTransform::Matrix(matrix) => *matrix,
            NodeTransform::Trs {
                translation,
                rotation,
                scale,
            } => Matrix4::from_scale(scale.x, scale.y, scale.z)
                .mul(&rotation.to_matrix())
                .mul(&Matrix4::from_translation(*translation)),
        }
    }

    /// The node's transform in world space: local composed onto the
    /// parent's world transform, up the chain to a root. The hierarchy is
    /// acyclic by construction; there is no cycle guard here.
    pub fn world_transform(&self) -> Matrix4 {
        match self.parent.upgrade() {
            Some(parent) => self.local_transform().mul(&parent.borrow().world_transform()),
            None => self.local_transform(),
        }
    }

    /// Advances animation by `dt` seconds and recurses into children.
    ///
    /// A spinning TRS node's rotation is rebuilt from total elapsed time,
    /// one quaternion per axis, composed X then Y then Z and normalized.
    /// Matrix nodes are never mutated; their animation clock stays at 0.
    pub fn update(&mut self, dt: f32) {
        if let NodeTransform::Trs { rotation, .. } = &mut self.transform {
            self.elapsed += dt;

            if self.spin != Vector3::new(0.0, 0.0, 0.0) {
                let qx = Quaternion::from_axis_angle(
                    Vector3::new(1.0, 0.0, 0.0),
                    self.spin.x * self.elapsed,
                );
                let qy = Quaternion::from_axis_angle(
                    Vector3::new(0.0, 1.0, 0.0),
                    self.spin.y * self.elapsed,
                );
                let qz = Quaternion::from_axis_angle(
                    Vector3::new(0.0, 0.0, 1.0),
                    self.spin.z * self.elapsed,
                );
                *rotation = qx.mul(&qy).mul(&qz).normalize();
            }
        }

        for child in &self.children {
            child.borrow_mut().update(dt);
        }
    }

    /// Draws this node and its subtree. Nodes without both a geometry and
    /// a material still contribute their transform to descendants.
    ///
    /// Uniforms are looked up by name per draw; a shader that does not
    /// declare one of them just skips that upload.
    pub fn render(
        &self,
        camera: &Camera,
        materials: &MaterialManager,
        geometries: &GeometryManager,
        backend: &mut dyn RenderBackend,
    ) {
        if let (Some(material_name), Some(geometry_name)) = (&self.material, &self.geometry) {
            match (materials.get(material_name), geometries.get(geometry_name)) {
                (Some(material), Some(geometry)) => {
                    material.bind(backend);

                    let projection = camera
                        .projection_matrix()
                        .mul(&backend.depth_correction());
                    let uploads = [
                        ("model", self.world_transform()),
                        ("view", camera.view_matrix()),
                        ("projection", projection),
                    ];
                    for (name, matrix) in &uploads {
                        match material.uniform_location(backend, name) {
                            Some(location) => backend.set_uniform_matrix(location, matrix),
                            None => {
                                debug!("node '{}': shader has no '{}' uniform", self.name, name)
                            }
                        }
                    }

                    geometry.render(backend);
                }
                _ => debug!(
                    "node '{}': missing material '{}' or geometry '{}'",
                    self.name, material_name, geometry_name
                ),
            }
        }

        for child in &self.children {
            child.borrow().render(camera, materials, geometries, backend);
        }
    }

    /// Depth-first teardown of the subtree. The geometry and material the
    /// nodes referenced stay alive in their managers.
    pub fn destroy(&mut self) {
        for child in &self.children {
            child.borrow_mut().destroy();
        }
        self.children.clear();
        self.geometry = None;
        self.material = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::MockBackend;
    use crate::gfx::geometry::{primitives, Geometry};
    use crate::gfx::material::Material;
    use crate::gfx::shaders;

    fn assert_mat_near(a: &Matrix4, b: &Matrix4) {
        for row in 0..4 {
            for col in 0..4 {
                assert!(
                    (a.m[row][col] - b.m[row][col]).abs() < 1e-5,
                    "mismatch at [{}][{}]: {} vs {}",
                    row,
                    col,
                    a.m[row][col],
                    b.m[row][col]
                );
            }
        }
    }

    #[test]
    fn test_three_level_world_transform() {
        let root = SceneNode::new("root");
        let mid = SceneNode::new("mid");
        let leaf = SceneNode::new("leaf");

        root.borrow_mut().transform = NodeTransform::Trs {
            translation: Vector3::new(10.0, 0.0, 0.0),
            rotation: Quaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        };
        mid.borrow_mut().transform = NodeTransform::Trs {
            translation: Vector3::new(0.0, 5.0, 0.0),
            rotation: Quaternion::identity(),
            scale: Vector3::new(2.0, 2.0, 2.0),
        };
        leaf.borrow_mut().transform =
            NodeTransform::Matrix(Matrix4::from_translation(Vector3::new(0.0, 0.0, 1.0)));

        SceneNode::add_child(&root, mid.clone());
        SceneNode::add_child(&mid, leaf.clone());

        // leaf local, then mid local, then root local.
        let expected = Matrix4::from_translation(Vector3::new(0.0, 0.0, 1.0))
            .mul(
                &Matrix4::from_scale(2.0, 2.0, 2.0)
                    .mul(&Matrix4::from_translation(Vector3::new(0.0, 5.0, 0.0))),
            )
            .mul(&Matrix4::from_translation(Vector3::new(10.0, 0.0, 0.0)));
        assert_mat_near(&leaf.borrow().world_transform(), &expected);

        // The leaf origin lands where the chain says it should.
        let origin = leaf
            .borrow()
            .world_transform()
            .transform_point(Vector3::new(0.0, 0.0, 0.0));
        assert!((origin - Vector3::new(10.0, 5.0, 2.0)).x.abs() < 1e-5);
        assert!((origin.y - 5.0).abs() < 1e-5);
        assert!((origin.z - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_spin_rotation_from_elapsed_time() {
        let node = SceneNode::new("spinner");
        node.borrow_mut().spin = Vector3::new(2.0, 0.0, 0.0);

        node.borrow_mut().update(0.5);
        node.borrow_mut().update(1.0);

        let node = node.borrow();
        assert!((node.elapsed() - 1.5).abs() < 1e-6);
        let expected = Quaternion::from_axis_angle(Vector3::new(1.0, 0.0, 0.0), 3.0);
        match &node.transform {
            NodeTransform::Trs { rotation, .. } => {
                assert_mat_near(&rotation.to_matrix(), &expected.to_matrix());
            }
            NodeTransform::Matrix(_) => panic!("expected a TRS node"),
        }
    }

    #[test]
    fn test_matrix_mode_is_never_animated() {
        let matrix = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let node = SceneNode::new("static");
        node.borrow_mut().transform = NodeTransform::Matrix(matrix);
        node.borrow_mut().spin = Vector3::new(4.0, 5.0, 6.0);

        node.borrow_mut().update(2.0);

        let node = node.borrow();
        match &node.transform {
            NodeTransform::Matrix(m) => assert_mat_near(m, &matrix),
            NodeTransform::Trs { .. } => panic!("expected a matrix node"),
        }
        // The animation clock belongs to TRS mode only.
        assert_eq!(node.elapsed(), 0.0);
    }

    #[test]
    fn test_add_and_remove_child_pointers() {
        let parent = SceneNode::new("parent");
        let child = SceneNode::new("child");
        SceneNode::add_child(&parent, child.clone());

        assert_eq!(parent.borrow().children().len(), 1);
        assert!(child
            .borrow()
            .parent()
            .is_some_and(|p| Rc::ptr_eq(&p, &parent)));

        assert!(SceneNode::remove_child(&parent, &child));
        assert!(parent.borrow().children().is_empty());
        assert!(child.borrow().parent().is_none());

        // Removing again is a no-op.
        assert!(!SceneNode::remove_child(&parent, &child));
    }

    #[test]
    fn test_update_recurses_with_same_dt() {
        let parent = SceneNode::new("parent");
        let child = SceneNode::new("child");
        SceneNode::add_child(&parent, child.clone());

        parent.borrow_mut().update(0.25);
        parent.borrow_mut().update(0.25);
        assert!((child.borrow().elapsed() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_render_uploads_and_skips_missing_uniform() {
        let mut backend = MockBackend::new();
        let mut materials = MaterialManager::new();
        let mut geometries = GeometryManager::new();

        materials.add(
            Material::create(
                &mut backend,
                "full",
                shaders::VERTEX_COLOR_VS,
                shaders::VERTEX_COLOR_FS,
            )
            .unwrap(),
        );
        materials.add(
            Material::create(
                &mut backend,
                "unlit",
                shaders::UNLIT_VS,
                shaders::VERTEX_COLOR_FS,
            )
            .unwrap(),
        );

        let cube = primitives::generate_cube(1.0, [1.0, 0.0, 0.0]);
        geometries.add(
            "cube",
            Geometry::create(&mut backend, &cube.vertices, cube.indices.as_deref()).unwrap(),
        );
        let tri = primitives::generate_triangle(1.0);
        geometries.add(
            "tri",
            Geometry::create(&mut backend, &tri.vertices, tri.indices.as_deref()).unwrap(),
        );

        let root = SceneNode::new("root");
        root.borrow_mut().geometry = Some("cube".into());
        root.borrow_mut().material = Some("full".into());
        let child = SceneNode::new("child");
        child.borrow_mut().geometry = Some("tri".into());
        child.borrow_mut().material = Some("unlit".into());
        SceneNode::add_child(&root, child);

        let camera = Camera::look_at_target(
            Vector3::new(5.0, 0.0, 3.0),
            Vector3::new(0.0, 0.0, 0.0),
            1.0,
            1.0,
        );
        root.borrow()
            .render(&camera, &materials, &geometries, &mut backend);

        assert_eq!(backend.draws.len(), 2);
        // The full shader receives model + view + projection, the reduced
        // one only view + projection.
        assert_eq!(backend.draws[0].uniforms.len(), 3);
        assert_eq!(backend.draws[1].uniforms.len(), 2);
        assert!(backend.draws[0].indices.is_some());
        assert!(backend.draws[1].indices.is_none());
    }

    #[test]
    fn test_destroy_clears_subtree_but_not_assets() {
        let mut backend = MockBackend::new();
        let mut geometries = GeometryManager::new();
        let cube = primitives::generate_cube(1.0, [1.0, 1.0, 1.0]);
        geometries.add(
            "cube",
            Geometry::create(&mut backend, &cube.vertices, cube.indices.as_deref()).unwrap(),
        );

        let root = SceneNode::new("root");
        root.borrow_mut().geometry = Some("cube".into());
        let child = SceneNode::new("child");
        SceneNode::add_child(&root, child);

        root.borrow_mut().destroy();
        assert!(root.borrow().children().is_empty());
        assert!(root.borrow().geometry.is_none());
        // The mesh itself is still live in the manager.
        assert_eq!(backend.live_buffer_count(), 2);
        assert!(geometries.get("cube").is_some());
    }
}
