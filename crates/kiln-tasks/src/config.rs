use std::path::PathBuf;

use anyhow::{Context, Result};

use kiln_engine::coords::UVec2;
use kiln_engine::device::GpuInit;
use kiln_engine::window::RuntimeConfig;

/// Task-level configuration.
///
/// Presets mirror the two task binaries; `apply_env` layers `KILN_*` overrides
/// on top.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskConfig {
    pub title: String,

    /// Initial window size in physical pixels.
    pub resolution: UVec2,

    pub vsync: bool,

    /// Number of frame slots (N). Must be at least 1.
    pub frames_in_flight: usize,

    /// Size of the compute-generated texture. Independent of the window.
    pub procedural_texture_size: UVec2,

    /// Static texture sampled by the composite pass.
    pub texture_path: PathBuf,

    /// Optional directory whose `<name>.wgsl` files replace the built-in programs.
    pub shader_dir: Option<PathBuf>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            title: "kiln".to_string(),
            resolution: UVec2::new(1280, 720),
            vsync: true,
            frames_in_flight: kiln_engine::frames::FRAMES_IN_FLIGHT,
            procedural_texture_size: UVec2::new(512, 512),
            texture_path: default_texture_path(),
            shader_dir: None,
        }
    }
}

impl TaskConfig {
    /// Three frames in flight.
    pub fn inflight_frames() -> Self {
        Self {
            title: "Inflight frames".to_string(),
            ..Self::default()
        }
    }

    /// Single frame slot: every frame waits for the previous one.
    pub fn local_shadertoy2() -> Self {
        Self {
            title: "Local shadertoy".to_string(),
            frames_in_flight: 1,
            ..Self::default()
        }
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Applies `KILN_VSYNC`, `KILN_FRAMES_IN_FLIGHT`, `KILN_TEXTURE` and
    /// `KILN_SHADER_DIR` as returned by `lookup`.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("KILN_VSYNC") {
            self.vsync = parse_bool(&v).with_context(|| format!("KILN_VSYNC={v}"))?;
        }

        if let Some(v) = lookup("KILN_FRAMES_IN_FLIGHT") {
            let n: usize = v
                .trim()
                .parse()
                .with_context(|| format!("KILN_FRAMES_IN_FLIGHT={v}"))?;
            anyhow::ensure!(n > 0, "KILN_FRAMES_IN_FLIGHT must be at least 1");
            self.frames_in_flight = n;
        }

        if let Some(v) = lookup("KILN_TEXTURE") {
            self.texture_path = PathBuf::from(v);
        }

        if let Some(v) = lookup("KILN_SHADER_DIR") {
            self.shader_dir = Some(PathBuf::from(v));
        }

        Ok(self)
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            resolution: self.resolution,
        }
    }

    pub fn gpu_init(&self) -> GpuInit {
        GpuInit {
            vsync: self.vsync,
            ..GpuInit::default()
        }
    }
}

fn default_texture_path() -> PathBuf {
    PathBuf::from(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/assets/textures/test_tex_1.png"
    ))
}

fn parse_bool(v: &str) -> Result<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{other}'"),
    }
}
