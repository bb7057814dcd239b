//! Time subsystem.
//!
//! Provides frame timing without coupling to the runtime:
//! - one `FrameClock` per window, started when the loop is entered
//! - call `tick()` once per redraw to obtain `FrameTime`
//! - `FrameTime::elapsed` is the shader-facing time in seconds

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
