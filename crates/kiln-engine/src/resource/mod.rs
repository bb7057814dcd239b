//! GPU resources owned by tasks: images, samplers and typed uniform buffers.
//!
//! Resources are created once at startup and are immutable afterwards, except
//! uniform buffers, which the host rewrites per frame under the frame ring's
//! protocol.

mod buffer;
mod error;
mod image;
mod sampler;

pub use buffer::UniformBuffer;
pub use error::LoadError;
pub use image::{decode_rgba8, Image};
pub use sampler::Sampler;
