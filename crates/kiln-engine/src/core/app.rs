use anyhow::Result;
use winit::event::WindowEvent;

use super::ctx::{FrameCtx, GpuCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by tasks.
///
/// Errors returned from any callback are fatal: the runtime tears the window
/// down and returns the error from [`Runtime::run`](crate::window::Runtime::run).
pub trait App {
    /// Called once after the window and GPU exist, before the first frame.
    ///
    /// Load pipelines and static resources here.
    fn on_start(&mut self, ctx: &mut GpuCtx<'_, '_>) -> Result<()>;

    /// Called for every window event, before the runtime reacts to it.
    ///
    /// The runtime does not reconfigure the surface on resize; apps own that,
    /// since in-flight frames have to be drained first.
    fn on_window_event(&mut self, ctx: &mut GpuCtx<'_, '_>, event: &WindowEvent) -> Result<AppControl> {
        let _ = (ctx, event);
        Ok(AppControl::Continue)
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl>;

    /// Called once before the GPU and window are destroyed, if `on_start` succeeded.
    fn on_exit(&mut self, ctx: &mut GpuCtx<'_, '_>) {
        let _ = ctx;
    }
}
