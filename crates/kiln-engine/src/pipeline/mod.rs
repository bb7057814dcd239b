//! Named shader programs and the pipelines built from them.
//!
//! Programs are looked up by name in a [`ShaderLibrary`]. Pipelines are created
//! once at startup and never re-created per frame.
//!
//! Convention for programs:
//! - compute programs expose `cs_main`
//! - graphics programs expose `vs_main` / `fs_main` and draw a full-screen
//!   triangle from `@builtin(vertex_index)` (no vertex buffers)
//! - all resources live in bind group 0

mod bindings;
mod compute;
mod graphics;
mod library;

pub use bindings::{sampled_image, sampler, storage_image, uniform};
pub use compute::ComputePipeline;
pub use graphics::GraphicsPipeline;
pub use library::ShaderLibrary;
