use crate::coords::UVec2;

use super::FrameError;

pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = *formats.first()?;

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| formats.contains(f)) {
            return Some(f);
        }
    }

    Some(first)
}

pub(crate) fn choose_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| modes.contains(m))
        .or_else(|| modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// FIFO is the only mode every surface must support, so it is both the vsync
/// choice and the fallback.
pub(crate) fn choose_present_mode(
    modes: &[wgpu::PresentMode],
    vsync: bool,
) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }

    [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
        .into_iter()
        .find(|m| modes.contains(m))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

/// Applies a new drawable size to the configuration.
///
/// Returns `false` when the size is zero; wgpu cannot configure a 0x0 surface,
/// so configuration is deferred until a non-zero size arrives.
pub(crate) fn apply_extent(config: &mut wgpu::SurfaceConfiguration, extent: UVec2) -> bool {
    if extent.has_zero_area() {
        return false;
    }

    config.width = extent.x;
    config.height = extent.y;
    true
}

/// Tracks whether the swapchain still matches the surface.
///
/// A suboptimal image is still presented; the next acquire then reports
/// `Outdated` so the caller drains in-flight frames and reconfigures.
#[derive(Debug, Default)]
pub(crate) struct SurfaceState {
    stale: bool,
}

impl SurfaceState {
    pub(crate) fn presented(&mut self, suboptimal: bool) {
        if suboptimal && !self.stale {
            log::debug!("surface reported a suboptimal image; reconfiguring before the next frame");
            self.stale = true;
        }
    }

    pub(crate) fn configured(&mut self) {
        self.stale = false;
    }

    pub(crate) fn check(&self) -> Result<(), FrameError> {
        if self.stale {
            return Err(FrameError::Outdated);
        }
        Ok(())
    }
}
