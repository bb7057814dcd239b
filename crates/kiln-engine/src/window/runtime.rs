use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::UVec2;
use crate::core::{App, AppControl, FrameCtx, GpuCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::{translate_window_event, InputState};
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,

    /// Initial drawable size in physical pixels.
    pub resolution: UVec2,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "kiln".to_string(),
            resolution: UVec2::new(1280, 720),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs `app` until its window closes or a callback fails.
    ///
    /// Returns the first fatal error raised by the app or by GPU setup.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// Field order matters only for readability; ouroboros drops `gpu` before the
// `window` it borrows.
#[self_referencing]
struct WindowEntry {
    input: InputState,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    started: bool,
    exit_requested: bool,
    fatal: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            started: false,
            exit_requested: false,
            fatal: None,
        }
    }

    fn fail(&mut self, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        self.exit_requested = true;
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let size = PhysicalSize::<u32>::from(self.config.resolution);
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            input: InputState::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        self.entry = Some(entry);
        Ok(())
    }

    fn start_app(&mut self) -> Result<()> {
        let Some(entry) = self.entry.as_mut() else {
            return Ok(());
        };
        let app = &mut self.app;

        entry
            .with_mut(|fields| {
                let mut ctx = GpuCtx {
                    window: WindowCtx::new(fields.window),
                    gpu: fields.gpu,
                };
                app.on_start(&mut ctx)
            })
            .context("application startup failed")?;

        // The frame clock starts when the loop is entered, not when the window appeared.
        entry.with_clock_mut(|clock| *clock = FrameClock::default());
        self.started = true;
        Ok(())
    }

    fn redraw(&mut self) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        let app = &mut self.app;

        let result = entry.with_mut(|fields| {
            let time = fields.clock.tick();
            let mut ctx = FrameCtx {
                window: WindowCtx::new(fields.window),
                gpu: fields.gpu,
                input: &*fields.input,
                time,
            };
            app.on_frame(&mut ctx)
        });

        match result {
            Ok(AppControl::Continue) => {}
            Ok(AppControl::Exit) => self.exit_requested = true,
            Err(err) => self.fail(err.context("frame failed")),
        }
    }

    /// Lets the app release its resources, then drops GPU and window (in that order).
    fn teardown(&mut self) {
        let Some(mut entry) = self.entry.take() else {
            return;
        };

        if self.started {
            let app = &mut self.app;
            entry.with_mut(|fields| {
                let mut ctx = GpuCtx {
                    window: WindowCtx::new(fields.window),
                    gpu: fields.gpu,
                };
                app.on_exit(&mut ctx);
            });
            self.started = false;
        }

        drop(entry);
        log::debug!("window and GPU released");
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.teardown();
        event_loop.exit();
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        let result = self
            .create_window_entry(event_loop)
            .and_then(|()| self.start_app());

        if let Err(err) = result {
            self.fail(err);
            self.shutdown(event_loop);
            return;
        }

        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            self.shutdown(event_loop);
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: the shader animates every frame.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            self.shutdown(event_loop);
            return;
        }

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return;
        };

        let result = entry.with_mut(|fields| {
            if let Some(ev) = translate_window_event(&event) {
                fields.input.apply_event(&ev);
            }

            let mut ctx = GpuCtx {
                window: WindowCtx::new(fields.window),
                gpu: fields.gpu,
            };
            app.on_window_event(&mut ctx, &event)
        });

        match result {
            Ok(AppControl::Continue) => {}
            Ok(AppControl::Exit) => self.exit_requested = true,
            Err(err) => self.fail(err),
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested");
                self.exit_requested = true;
            }
            WindowEvent::RedrawRequested if !self.exit_requested => self.redraw(),
            _ => {}
        }

        if self.exit_requested {
            self.shutdown(event_loop);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}
