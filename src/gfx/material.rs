//! # Material System
//!
//! A material is a compiled shader program plus a name. Materials are
//! stored centrally in [`MaterialManager`] and shared between scene nodes
//! by name; the manager owns the GPU programs and releases them at
//! shutdown.

use std::collections::HashMap;

use crate::gfx::backend::{BackendError, ProgramId, RenderBackend, UniformLocation};

/// A shader program handle with bind/validate operations.
#[derive(Debug)]
pub struct Material {
    name: String,
    program: ProgramId,
}

impl Material {
    /// Compiles and links a program from vertex and fragment sources.
    ///
    /// On failure the backend retains nothing; the error carries the
    /// backend's diagnostic log.
    pub fn create(
        backend: &mut dyn RenderBackend,
        name: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self, BackendError> {
        let program = backend.create_program(vertex_src, fragment_src)?;
        Ok(Self {
            name: name.to_string(),
            program,
        })
    }

    /// Activates this material's program for subsequent draws. Idempotent.
    pub fn bind(&self, backend: &mut dyn RenderBackend) {
        backend.use_program(self.program);
    }

    /// Cheap post-construction sanity check: the program handle is
    /// non-zero. Not a guarantee that any particular uniform exists.
    pub fn is_valid(&self) -> bool {
        self.program.is_valid()
    }

    /// Surfaces the backend's uniform lookup. `None` means the shader
    /// does not declare the uniform; non-fatal, callers decide whether a
    /// missing uniform matters.
    pub fn uniform_location(
        &self,
        backend: &dyn RenderBackend,
        name: &str,
    ) -> Option<UniformLocation> {
        backend.uniform_location(self.program, name)
    }

    /// Releases the program. Called once by the manager at shutdown.
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        if self.program.is_valid() {
            backend.destroy_program(self.program);
            self.program = ProgramId::INVALID;
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Centralized material storage, keyed by name.
pub struct MaterialManager {
    materials: HashMap<String, Material>,
}

impl MaterialManager {
    pub fn new() -> Self {
        Self {
            materials: HashMap::new(),
        }
    }

    pub fn add(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn list(&self) -> Vec<&String> {
        self.materials.keys().collect()
    }

    /// Releases every material's program. Called once at shutdown.
    pub fn destroy_all(&mut self, backend: &mut dyn RenderBackend) {
        for material in self.materials.values_mut() {
            material.destroy(backend);
        }
        self.materials.clear();
    }
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::{MockBackend, ShaderStage};
    use crate::gfx::shaders;

    #[test]
    fn test_create_and_bind() {
        let mut backend = MockBackend::new();
        let material = Material::create(
            &mut backend,
            "vertex_color",
            shaders::VERTEX_COLOR_VS,
            shaders::VERTEX_COLOR_FS,
        )
        .unwrap();

        assert!(material.is_valid());
        material.bind(&mut backend);
        material.bind(&mut backend); // idempotent
        assert_eq!(backend.current_program(), Some(ProgramId(1)));
    }

    #[test]
    fn test_compile_failure_leaks_nothing() {
        let mut backend = MockBackend::new();
        backend.fail_compile = Some(ShaderStage::Vertex);

        let err = Material::create(&mut backend, "broken", "vs", "fs").unwrap_err();
        assert!(matches!(err, BackendError::ShaderCompile { .. }));
        assert_eq!(backend.live_program_count(), 0);
    }

    #[test]
    fn test_link_failure_leaks_nothing() {
        let mut backend = MockBackend::new();
        backend.fail_link = true;

        let err = Material::create(&mut backend, "broken", "vs", "fs").unwrap_err();
        let log = err.to_string();
        assert!(matches!(err, BackendError::ShaderLink { .. }));
        assert!(log.contains("link"));
        assert_eq!(backend.live_program_count(), 0);
    }

    #[test]
    fn test_missing_uniform_is_none() {
        let mut backend = MockBackend::new();
        let material = Material::create(
            &mut backend,
            "unlit",
            shaders::UNLIT_VS,
            shaders::VERTEX_COLOR_FS,
        )
        .unwrap();

        assert!(material.uniform_location(&backend, "model").is_none());
        assert!(material.uniform_location(&backend, "view").is_some());
        assert!(material.uniform_location(&backend, "projection").is_some());
    }

    #[test]
    fn test_manager_destroy_all() {
        let mut backend = MockBackend::new();
        let mut manager = MaterialManager::new();
        manager.add(
            Material::create(
                &mut backend,
                "a",
                shaders::VERTEX_COLOR_VS,
                shaders::VERTEX_COLOR_FS,
            )
            .unwrap(),
        );
        manager.add(
            Material::create(
                &mut backend,
                "b",
                shaders::UNLIT_VS,
                shaders::VERTEX_COLOR_FS,
            )
            .unwrap(),
        );
        assert_eq!(backend.live_program_count(), 2);

        manager.destroy_all(&mut backend);
        assert_eq!(backend.live_program_count(), 0);
        assert!(manager.get("a").is_none());
    }
}
