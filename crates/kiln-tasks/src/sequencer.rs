use anyhow::Result;

use kiln_engine::device::FrameError;
use kiln_engine::frames::FrameRing;

use crate::backend::FrameBackend;
use crate::params::ShaderParams;

/// Records and submits the two-stage frame over a ring of parameter buffers.
///
/// Per frame: reclaim the slot, acquire an image, write parameters, record
/// Stage A, close it, record Stage B, submit, retire the slot.
pub struct FrameSequencer<P, S> {
    ring: FrameRing<P, S>,
}

impl<P, S> FrameSequencer<P, S>
where
    S: Clone + std::fmt::Debug,
{
    /// Creates `frames_in_flight` parameter buffers through `backend`.
    pub fn new<B>(backend: &mut B, frames_in_flight: usize) -> Result<Self>
    where
        B: FrameBackend<ParamsBuffer = P, Submission = S>,
    {
        let ring = FrameRing::new(frames_in_flight, |slot| backend.create_params_buffer(slot))?;
        log::debug!("frame sequencer ready with {frames_in_flight} slot(s)");
        Ok(Self { ring })
    }

    pub fn frames_in_flight(&self) -> usize {
        self.ring.len()
    }

    /// Slot used by frame `frame_counter`.
    pub fn acquire_slot(&self, frame_counter: u64) -> usize {
        self.ring.acquire_slot(frame_counter)
    }

    /// Records and submits frame `frame_counter`. Returns the slot it used.
    ///
    /// An acquire error leaves the slot reclaimed but not retired; nothing was
    /// recorded, so the frame can be retried.
    pub fn draw_frame<B>(
        &mut self,
        backend: &mut B,
        frame_counter: u64,
        params: &ShaderParams,
    ) -> Result<usize, FrameError>
    where
        B: FrameBackend<ParamsBuffer = P, Submission = S>,
    {
        let slot = self.ring.acquire_slot(frame_counter);
        let buffer = self.ring.reclaim(slot, &*backend)?;

        let mut frame = backend.acquire()?;

        backend.write_params(buffer, params);

        backend.texture_stage(&mut frame, buffer);
        backend.stage_barrier(&mut frame);
        backend.draw_stage(&mut frame, buffer);

        let submission = backend.submit(frame);
        log::trace!("frame {frame_counter}: slot {slot} submitted as {submission:?}");
        self.ring.retire(slot, submission);

        Ok(slot)
    }

    /// Waits until no submission reads any slot.
    pub fn wait_idle<B>(&mut self, backend: &B) -> Result<(), FrameError>
    where
        B: FrameBackend<ParamsBuffer = P, Submission = S>,
    {
        self.ring.drain(backend)
    }

    /// Number of slots still read by the device, as far as the host knows.
    pub fn in_flight(&self) -> usize {
        self.ring.in_flight()
    }
}

#[cfg(test)]
mod tests {
    use kiln_engine::coords::UVec2;

    use super::*;
    use crate::testing::{SimBackend, SimEvent};

    fn params(t: f32) -> ShaderParams {
        ShaderParams::new(UVec2::new(64, 32), UVec2::ZERO, t)
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn zero_slots_is_an_error() {
        let mut sim = SimBackend::new();
        assert!(FrameSequencer::new(&mut sim, 0).is_err());
    }

    #[test]
    fn one_buffer_per_slot() {
        let mut sim = SimBackend::new();
        let seq = FrameSequencer::new(&mut sim, 3).unwrap();
        assert_eq!(seq.frames_in_flight(), 3);
        assert_eq!(sim.buffers_created(), 3);
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn stages_run_in_order() {
        let mut sim = SimBackend::new();
        let mut seq = FrameSequencer::new(&mut sim, 3).unwrap();
        seq.draw_frame(&mut sim, 0, &params(0.0)).unwrap();

        assert_eq!(
            sim.events(),
            &[
                SimEvent::Acquire,
                SimEvent::WriteParams { slot: 0 },
                SimEvent::TextureBegin { slot: 0 },
                SimEvent::TextureEnd,
                SimEvent::DrawBegin { slot: 0 },
                SimEvent::Submit { slot: 0, submission: 1 },
            ]
        );
    }

    #[test]
    fn slot_reuse_waits_for_previous_submission() {
        let mut sim = SimBackend::new();
        let mut seq = FrameSequencer::new(&mut sim, 3).unwrap();

        for f in 0..4 {
            seq.draw_frame(&mut sim, f, &params(f as f32)).unwrap();
        }

        // Frame 3 reuses slot 0, last read by submission 1.
        assert_eq!(sim.waits(), vec![1]);
        assert_eq!(seq.in_flight(), 3);
    }

    #[test]
    fn params_never_written_while_pending() {
        let mut sim = SimBackend::new();
        let mut seq = FrameSequencer::new(&mut sim, 3).unwrap();

        // SimBackend panics on a write to a buffer whose reader is incomplete.
        for f in 0..30 {
            seq.draw_frame(&mut sim, f, &params(f as f32)).unwrap();
        }
        assert_eq!(sim.submissions(), 30);
    }

    #[test]
    fn single_slot_serializes_frames() {
        let mut sim = SimBackend::new();
        let mut seq = FrameSequencer::new(&mut sim, 1).unwrap();

        for f in 0..3 {
            assert_eq!(seq.draw_frame(&mut sim, f, &params(0.0)).unwrap(), 0);
        }
        assert_eq!(sim.waits(), vec![1, 2]);
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn acquire_failure_records_nothing() {
        let mut sim = SimBackend::new();
        let mut seq = FrameSequencer::new(&mut sim, 3).unwrap();
        sim.fail_next_acquire(FrameError::Timeout);

        assert_eq!(seq.draw_frame(&mut sim, 0, &params(0.0)), Err(FrameError::Timeout));
        assert_eq!(sim.submissions(), 0);
        assert_eq!(seq.in_flight(), 0);

        // Same frame again succeeds on the same slot.
        assert_eq!(seq.draw_frame(&mut sim, 0, &params(0.0)), Ok(0));
    }

    #[test]
    fn failed_wait_propagates() {
        let mut sim = SimBackend::new();
        let mut seq = FrameSequencer::new(&mut sim, 1).unwrap();
        seq.draw_frame(&mut sim, 0, &params(0.0)).unwrap();

        sim.lose_device();
        assert!(matches!(
            seq.draw_frame(&mut sim, 1, &params(0.0)),
            Err(FrameError::DeviceLost(_))
        ));
    }

    #[test]
    fn wait_idle_drains_every_slot() {
        let mut sim = SimBackend::new();
        let mut seq = FrameSequencer::new(&mut sim, 3).unwrap();
        for f in 0..2 {
            seq.draw_frame(&mut sim, f, &params(0.0)).unwrap();
        }

        seq.wait_idle(&sim).unwrap();
        assert_eq!(seq.in_flight(), 0);
        assert_eq!(sim.waits(), vec![1, 2]);
    }
}
