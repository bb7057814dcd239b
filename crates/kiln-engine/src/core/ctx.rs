use winit::window::Window;

use crate::coords::UVec2;
use crate::device::Gpu;
use crate::input::InputState;
use crate::time::FrameTime;

/// The task window.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    pub fn new(window: &'a Window) -> Self {
        Self { window }
    }

    /// Drawable size in physical pixels. Zero while minimized on some platforms.
    pub fn inner_size(&self) -> UVec2 {
        self.window.inner_size().into()
    }
}

/// Window + GPU access outside of a frame (startup, events, teardown).
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct GpuCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu:    &'a mut Gpu<'w>,
}

/// Per-frame context passed to `core::App::on_frame`.
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu:    &'a mut Gpu<'w>,
    pub input:  &'a InputState,
    pub time:   FrameTime,
}
