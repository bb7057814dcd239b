//! In-flight frame resources.
//!
//! A [`FrameRing`] owns N sets of per-frame mutable resources. Frame `f` uses
//! slot `f mod N`. Before the host touches a slot again it waits, through a
//! [`Timeline`], for the submission that last read that slot. With N = 3 the
//! host may record frame `f + 2` while the device still executes frame `f`.
//!
//! ```text
//! frame:   0   1   2   3   4 ...
//! slot:    0   1   2   0   1 ...
//!                      ^ waits for frame 0's submission before reuse
//! ```

mod ring;
mod timeline;

pub use ring::FrameRing;
pub use timeline::Timeline;

/// Default number of frames in flight.
pub const FRAMES_IN_FLIGHT: usize = 3;
