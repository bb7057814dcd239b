use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::resource::LoadError;

/// Registry of WGSL programs keyed by name.
///
/// Built-in sources are compiled into the binary. When an override directory is
/// set, `<dir>/<name>.wgsl` takes precedence, so shaders can be edited without
/// rebuilding.
#[derive(Debug, Default, Clone)]
pub struct ShaderLibrary {
    builtin: HashMap<String, &'static str>,
    override_dir: Option<PathBuf>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a built-in program. Re-registering a name replaces it.
    pub fn with_program(mut self, name: &str, wgsl: &'static str) -> Self {
        self.builtin.insert(name.to_string(), wgsl);
        self
    }

    pub fn with_override_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.override_dir = dir;
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builtin.contains_key(name) || self.override_path(name).is_some_and(|p| p.is_file())
    }

    /// Resolves the WGSL source for `name`.
    pub fn source(&self, name: &str) -> Result<Cow<'static, str>, LoadError> {
        if let Some(path) = self.override_path(name).filter(|p| p.is_file()) {
            log::info!("shader '{name}' loaded from {}", path.display());
            return std::fs::read_to_string(&path)
                .map(Cow::Owned)
                .map_err(|source| LoadError::Io { path, source });
        }

        self.builtin
            .get(name)
            .map(|src| Cow::Borrowed(*src))
            .ok_or_else(|| LoadError::UnknownShader(name.to_string()))
    }

    /// Creates a shader module for `name`.
    pub fn module(&self, device: &wgpu::Device, name: &str) -> Result<wgpu::ShaderModule, LoadError> {
        let source = self.source(name)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source),
        }))
    }

    fn override_path(&self, name: &str) -> Option<PathBuf> {
        self.override_dir
            .as_deref()
            .map(|dir: &Path| dir.join(format!("{name}.wgsl")))
    }
}
