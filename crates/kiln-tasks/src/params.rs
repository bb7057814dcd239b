use bytemuck::{Pod, Zeroable};

use kiln_engine::coords::UVec2;

/// Per-frame shader inputs, mirrored by `Params` in both WGSL programs.
///
/// Layout (24 bytes): `vec2<u32>` resolution, `vec2<u32>` mouse position,
/// `f32` time, then padding up to the struct's 8-byte alignment.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ShaderParams {
    /// Drawable size in physical pixels.
    pub resolution: UVec2,

    /// Pointer position in physical pixels, clamped to the drawable area.
    pub mouse_position: UVec2,

    /// Seconds since the loop started.
    pub time: f32,

    _pad: u32,
}

impl ShaderParams {
    pub fn new(resolution: UVec2, mouse_position: UVec2, time: f32) -> Self {
        Self {
            resolution,
            mouse_position,
            time,
            _pad: 0,
        }
    }
}
