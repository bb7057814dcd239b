use std::time::Duration;

/// Device and surface settings applied by [`Gpu::new`](super::Gpu::new).
///
/// Preferences that the surface cannot honour fall back to a supported value.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Synchronize presentation with the display refresh.
    ///
    /// `true` selects FIFO. `false` picks the first supported of
    /// Immediate/Mailbox and falls back to FIFO.
    pub vsync: bool,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,

    /// Upper bound for a single host wait on a submission.
    ///
    /// Exceeding it is treated as a lost device.
    pub submission_timeout: Duration,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            vsync: true,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
            submission_timeout: Duration::from_secs(5),
        }
    }
}
