use std::fmt::Debug;

use crate::device::FrameError;

/// Device-side completion tracking for submitted command buffers.
///
/// `Gpu` implements this over wgpu submission indices. Tests implement it with
/// a simulated device.
pub trait Timeline {
    /// Marker identifying one submission.
    type Submission: Clone + Debug;

    /// Blocks until `submission` has finished executing on the device.
    fn wait(&self, submission: &Self::Submission) -> Result<(), FrameError>;
}
