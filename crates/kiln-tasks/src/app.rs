use anyhow::{Context, Result};
use winit::event::WindowEvent;

use kiln_engine::core::{App, AppControl, FrameCtx, GpuCtx};

use crate::app_loop::{FrameInput, FrameLoop, FrameOutcome, LoopEvent};
use crate::backend::{ParamsSlot, ToyResources, WgpuBackend};
use crate::config::TaskConfig;
use crate::shaders;

/// Seconds between frame-rate log lines.
const FPS_LOG_INTERVAL: f32 = 2.0;

// Field order is drop order: per-slot bind groups go before the images they
// reference.
struct Task {
    frame_loop: FrameLoop<ParamsSlot, wgpu::SubmissionIndex>,
    resources: ToyResources,
}

/// Shader-toy task hosted by the engine runtime.
pub struct ToyApp {
    config: TaskConfig,
    task: Option<Task>,

    fps_window_start: f32,
    fps_frames: u32,
}

impl ToyApp {
    pub fn new(config: TaskConfig) -> Self {
        Self {
            config,
            task: None,
            fps_window_start: 0.0,
            fps_frames: 0,
        }
    }

    fn count_frame(&mut self, elapsed: f32) {
        self.fps_frames += 1;
        let window = elapsed - self.fps_window_start;
        if window >= FPS_LOG_INTERVAL {
            log::info!("{:.1} fps", self.fps_frames as f32 / window);
            self.fps_window_start = elapsed;
            self.fps_frames = 0;
        }
    }
}

impl App for ToyApp {
    fn on_start(&mut self, ctx: &mut GpuCtx<'_, '_>) -> Result<()> {
        let library = shaders::library(self.config.shader_dir.clone());
        let resources = ToyResources::load(ctx.gpu, &library, &self.config)
            .context("failed to load task resources")?;

        let mut backend = WgpuBackend::new(ctx.gpu, &resources);
        let frame_loop = FrameLoop::new(
            &mut backend,
            self.config.frames_in_flight,
            ctx.window.inner_size(),
        )?;

        log::info!(
            "{} started with {} frame(s) in flight",
            self.config.title,
            self.config.frames_in_flight
        );

        self.task = Some(Task {
            frame_loop,
            resources,
        });
        Ok(())
    }

    fn on_window_event(&mut self, ctx: &mut GpuCtx<'_, '_>, event: &WindowEvent) -> Result<AppControl> {
        let Some(task) = self.task.as_mut() else {
            return Ok(AppControl::Continue);
        };

        let Some(event) = loop_event(event) else {
            return Ok(AppControl::Continue);
        };

        let mut backend = WgpuBackend::new(ctx.gpu, &task.resources);
        task.frame_loop.handle_event(&mut backend, event)?;

        if task.frame_loop.is_running() {
            Ok(AppControl::Continue)
        } else {
            Ok(AppControl::Exit)
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        let Some(task) = self.task.as_mut() else {
            return Ok(AppControl::Continue);
        };

        let input = FrameInput {
            elapsed: ctx.time.elapsed,
            pointer: ctx.input.last_pointer_pos,
        };

        let mut backend = WgpuBackend::new(ctx.gpu, &task.resources).with_window(ctx.window.window);
        let outcome = task.frame_loop.redraw(&mut backend, input)?;

        match outcome {
            FrameOutcome::Presented { .. } => self.count_frame(input.elapsed),
            FrameOutcome::Stopped => return Ok(AppControl::Exit),
            FrameOutcome::Skipped | FrameOutcome::Suspended => {}
        }
        Ok(AppControl::Continue)
    }

    fn on_exit(&mut self, ctx: &mut GpuCtx<'_, '_>) {
        let Some(mut task) = self.task.take() else {
            return;
        };

        let mut backend = WgpuBackend::new(ctx.gpu, &task.resources);
        task.frame_loop.shutdown(&mut backend);
        log::info!("{} frame(s) submitted", task.frame_loop.frame_counter());
    }
}

/// Window events the frame loop reacts to; everything else is ignored.
pub(crate) fn loop_event(event: &WindowEvent) -> Option<LoopEvent> {
    match event {
        WindowEvent::Resized(size) => Some(LoopEvent::Resized {
            width: size.width,
            height: size.height,
        }),
        WindowEvent::CloseRequested => Some(LoopEvent::CloseRequested),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalSize;

    use super::*;

    // ── loop_event ────────────────────────────────────────────────────────

    #[test]
    fn resize_carries_physical_size() {
        let event = WindowEvent::Resized(PhysicalSize::new(640, 480));
        assert_eq!(
            loop_event(&event),
            Some(LoopEvent::Resized {
                width: 640,
                height: 480
            })
        );
    }

    #[test]
    fn minimize_maps_to_zero_size() {
        let event = WindowEvent::Resized(PhysicalSize::new(0, 0));
        assert_eq!(
            loop_event(&event),
            Some(LoopEvent::Resized { width: 0, height: 0 })
        );
    }

    #[test]
    fn close_request_is_forwarded() {
        assert_eq!(loop_event(&WindowEvent::CloseRequested), Some(LoopEvent::CloseRequested));
    }

    #[test]
    fn other_events_are_ignored() {
        assert_eq!(loop_event(&WindowEvent::Focused(true)), None);
        assert_eq!(loop_event(&WindowEvent::RedrawRequested), None);
    }
}
