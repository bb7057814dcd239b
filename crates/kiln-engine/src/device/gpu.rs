use std::time::Duration;

use anyhow::{Context, Result};
use winit::window::Window;

use crate::coords::UVec2;
use crate::frames::Timeline;

use super::health::DeviceHealth;
use super::surface::{self, SurfaceState};
use super::{FrameError, GpuFrame, GpuInit};

/// Owns wgpu core objects and the surface configuration.
///
/// This type is the low-level rendering context:
/// - creates Instance/Adapter/Device/Queue
/// - creates and configures the Surface (swapchain)
/// - acquires frames, submits and presents them
/// - blocks on submissions on behalf of the frame ring
pub struct Gpu<'w> {
    /// Kept alive for the lifetime of the surface.
    _instance: wgpu::Instance,

    /// Surface bound to the window.
    ///
    /// Surface lifetime is tied to the window; the runtime drops `Gpu` before
    /// the window it borrows.
    surface: wgpu::Surface<'w>,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Set after a suboptimal present; cleared by reconfiguration.
    surface_state: SurfaceState,

    /// Device loss and uncaptured errors reported by wgpu callbacks.
    health: DeviceHealth,

    /// Upper bound for a single host wait on a submission.
    submission_timeout: Duration,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = UVec2::from(window.inner_size());
        anyhow::ensure!(!size.has_zero_area(), "window has zero size");

        let GpuInit {
            prefer_srgb,
            vsync,
            alpha_mode,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
            submission_timeout,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter '{}' ({:?}, {:?})", info.name, info.backend, info.device_type);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("kiln device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let health = DeviceHealth::watch(&device);

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps.formats, prefer_srgb)
            .context("no supported surface formats")?;
        let present_mode = surface::choose_present_mode(&caps.present_modes, vsync);
        let alpha_mode = surface::choose_alpha_mode(&caps.alpha_modes, alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.x,
            height: size.y,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);
        log::info!(
            "surface configured: {}x{} {:?}, {:?}",
            size.x,
            size.y,
            format,
            present_mode
        );

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            surface_state: SurfaceState::default(),
            health,
            submission_timeout,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Reconfigures the surface for a new drawable size.
    ///
    /// Callers must have drained in-flight frames first. A zero size is
    /// ignored; configuration resumes on the next non-zero size.
    pub fn resize(&mut self, extent: UVec2) {
        if surface::apply_extent(&mut self.config, extent) {
            self.surface.configure(&self.device, &self.config);
            self.surface_state.configured();
            log::debug!("surface reconfigured to {}x{}", extent.x, extent.y);
        }
    }

    /// Acquires the next surface texture and creates an encoder.
    ///
    /// Fails with the recorded fault once the device is lost, and with
    /// `Outdated` after a suboptimal present until the surface is resized.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, FrameError> {
        self.health.check()?;
        self.surface_state.check()?;

        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let suboptimal = surface_texture.suboptimal;

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("kiln frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
            suboptimal,
        })
    }

    /// Submits the recorded commands for `frame` and presents its image.
    ///
    /// The returned index identifies the submission for [`Timeline::wait`].
    pub fn submit(&mut self, frame: GpuFrame) -> wgpu::SubmissionIndex {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
            suboptimal,
        } = frame;

        let index = self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
        self.surface_state.presented(suboptimal);
        index
    }
}

impl Timeline for Gpu<'_> {
    type Submission = wgpu::SubmissionIndex;

    fn wait(&self, submission: &wgpu::SubmissionIndex) -> std::result::Result<(), FrameError> {
        self.health.check()?;
        let polled = self.device.poll(wgpu::PollType::Wait {
            submission_index: Some(submission.clone()),
            timeout: Some(self.submission_timeout),
        });

        // Loss detected while blocked is reported by the callback during the
        // poll and takes precedence over the poll's own error.
        self.health.check()?;
        polled?;
        Ok(())
    }
}
