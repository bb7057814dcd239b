use thiserror::Error;

/// High-level response after a frame error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Swapchain-dependent state must be recreated; the frame may be retried.
    Recreate,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Unrecoverable; terminate the run after best-effort cleanup.
    Fatal,
}

/// Errors raised while producing a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("surface is outdated or lost and must be reconfigured")]
    Outdated,

    #[error("timed out acquiring a surface texture")]
    Timeout,

    #[error("surface reported an unspecified error")]
    Other,

    #[error("out of GPU memory")]
    OutOfMemory,

    #[error("device lost: {0}")]
    DeviceLost(String),

    #[error("GPU validation error: {0}")]
    Validation(String),
}

impl FrameError {
    pub fn action(&self) -> SurfaceErrorAction {
        match self {
            FrameError::Outdated => SurfaceErrorAction::Recreate,
            FrameError::Timeout | FrameError::Other => SurfaceErrorAction::SkipFrame,
            FrameError::OutOfMemory | FrameError::DeviceLost(_) | FrameError::Validation(_) => {
                SurfaceErrorAction::Fatal
            }
        }
    }
}

impl From<wgpu::SurfaceError> for FrameError {
    fn from(err: wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => FrameError::Outdated,
            wgpu::SurfaceError::Timeout => FrameError::Timeout,
            wgpu::SurfaceError::OutOfMemory => FrameError::OutOfMemory,
            wgpu::SurfaceError::Other => FrameError::Other,
        }
    }
}

impl From<wgpu::PollError> for FrameError {
    fn from(err: wgpu::PollError) -> Self {
        FrameError::DeviceLost(format!("waiting for submission failed: {err}"))
    }
}
