//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames, submitting and presenting them
//! - waiting on submissions, so `Gpu` can act as the frame ring's timeline
//! - turning device loss and uncaptured wgpu errors into `FrameError`s

mod error;
mod frame;
mod gpu;
mod health;
mod init;
mod surface;

pub use error::{FrameError, SurfaceErrorAction};
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
