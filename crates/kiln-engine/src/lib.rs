//! Kiln engine crate.
//!
//! This crate owns the platform + GPU runtime pieces the shader-toy tasks call
//! into: device/surface, window runtime, the in-flight frame ring, named shader
//! pipelines and image/sampler/buffer resources.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod frames;
pub mod pipeline;
pub mod resource;
