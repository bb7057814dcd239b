/// One acquired swapchain image plus the encoder recording into it.
///
/// Short-lived: hand it back to [`Gpu::submit`](super::Gpu::submit) in the same
/// iteration. Holding the surface texture blocks acquisition of the next image.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,

    /// The image no longer matches the surface exactly; it can still be presented.
    pub suboptimal: bool,
}
