//! Built-in WGSL programs.

use std::path::PathBuf;

use kiln_engine::pipeline::ShaderLibrary;

/// Composite program: full-screen triangle sampling both textures.
pub const SHADER_TOY: &str = "shader_toy";

/// Compute program writing the procedural texture.
pub const TEXTURE_SHADER_TOY: &str = "texture_shader_toy";

/// Must match `@workgroup_size` in `texture_shader_toy.wgsl`.
pub const TEXTURE_WORKGROUP: u32 = 8;

/// Library seeded with both programs; `shader_dir` files take precedence.
pub fn library(shader_dir: Option<PathBuf>) -> ShaderLibrary {
    ShaderLibrary::new()
        .with_program(SHADER_TOY, include_str!("shaders/shader_toy.wgsl"))
        .with_program(
            TEXTURE_SHADER_TOY,
            include_str!("shaders/texture_shader_toy.wgsl"),
        )
        .with_override_dir(shader_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_programs_are_registered() {
        let lib = library(None);
        assert!(lib.contains(SHADER_TOY));
        assert!(lib.contains(TEXTURE_SHADER_TOY));
    }

    #[test]
    fn entry_points_follow_pipeline_conventions() {
        let lib = library(None);
        let compute = lib.source(TEXTURE_SHADER_TOY).unwrap();
        assert!(compute.contains("fn cs_main"));
        assert!(compute.contains("@workgroup_size(8, 8)"));

        let draw = lib.source(SHADER_TOY).unwrap();
        assert!(draw.contains("fn vs_main"));
        assert!(draw.contains("fn fs_main"));
    }
}
