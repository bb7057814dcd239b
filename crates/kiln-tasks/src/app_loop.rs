//! Frame production state machine, independent of winit and wgpu.

use anyhow::Result;

use kiln_engine::coords::UVec2;
use kiln_engine::device::{FrameError, SurfaceErrorAction};

use crate::backend::FrameBackend;
use crate::params::ShaderParams;
use crate::sequencer::FrameSequencer;

/// Window notifications the loop reacts to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    /// New drawable size in physical pixels. Zero while minimized.
    Resized { width: u32, height: u32 },
    CloseRequested,
}

/// Per-redraw inputs sampled by the host.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Seconds since the loop started.
    pub elapsed: f32,

    /// Last known pointer position in physical pixels.
    pub pointer: Option<(f32, f32)>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Close requested. Terminal.
    Closed,
    /// Unrecoverable device error. Terminal.
    Failed,
}

/// What a redraw did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented { slot: usize },
    /// Transient surface error; the counter did not advance.
    Skipped,
    /// Zero-sized window; nothing recorded.
    Suspended,
    /// The loop is in a terminal state.
    Stopped,
}

/// Drives the sequencer once per redraw and owns the frame counter.
pub struct FrameLoop<P, S> {
    sequencer: FrameSequencer<P, S>,
    frame_counter: u64,
    resolution: UVec2,
    state: LoopState,
}

impl<P, S> FrameLoop<P, S>
where
    S: Clone + std::fmt::Debug,
{
    pub fn new<B>(backend: &mut B, frames_in_flight: usize, resolution: UVec2) -> Result<Self>
    where
        B: FrameBackend<ParamsBuffer = P, Submission = S>,
    {
        Ok(Self {
            sequencer: FrameSequencer::new(backend, frames_in_flight)?,
            frame_counter: 0,
            resolution,
            state: LoopState::Running,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Frames submitted so far.
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    pub fn resolution(&self) -> UVec2 {
        self.resolution
    }

    pub fn handle_event<B>(&mut self, backend: &mut B, event: LoopEvent) -> Result<(), FrameError>
    where
        B: FrameBackend<ParamsBuffer = P, Submission = S>,
    {
        if !self.is_running() {
            return Ok(());
        }

        match event {
            LoopEvent::Resized { width, height } => {
                let size = UVec2::new(width, height);
                if size == self.resolution {
                    return Ok(());
                }

                self.resolution = size;
                if size.has_zero_area() {
                    log::debug!("window minimized; frames suspended");
                    return Ok(());
                }

                log::debug!("resized to {width}x{height}");
                self.recreate(backend)
            }

            LoopEvent::CloseRequested => {
                log::info!("closing after {} frame(s)", self.frame_counter);
                self.state = LoopState::Closed;
                Ok(())
            }
        }
    }

    /// Builds this frame's parameters and records it.
    ///
    /// An outdated surface is recreated and the frame retried once.
    pub fn redraw<B>(&mut self, backend: &mut B, input: FrameInput) -> Result<FrameOutcome, FrameError>
    where
        B: FrameBackend<ParamsBuffer = P, Submission = S>,
    {
        if !self.is_running() {
            return Ok(FrameOutcome::Stopped);
        }
        if self.resolution.has_zero_area() {
            return Ok(FrameOutcome::Suspended);
        }

        let mouse = match input.pointer {
            Some((x, y)) => self.resolution.clamp_position(x, y),
            None => UVec2::ZERO,
        };
        let params = ShaderParams::new(self.resolution, mouse, input.elapsed);

        let mut retried = false;
        loop {
            let err = match self.sequencer.draw_frame(backend, self.frame_counter, &params) {
                Ok(slot) => {
                    self.frame_counter += 1;
                    return Ok(FrameOutcome::Presented { slot });
                }
                Err(err) => err,
            };

            match err.action() {
                SurfaceErrorAction::Recreate if !retried => {
                    log::warn!("{err}; recreating surface");
                    self.recreate(backend)?;
                    retried = true;
                }
                SurfaceErrorAction::Recreate | SurfaceErrorAction::SkipFrame => {
                    log::warn!("{err}; frame {} skipped", self.frame_counter);
                    return Ok(FrameOutcome::Skipped);
                }
                SurfaceErrorAction::Fatal => return Err(self.fail(err)),
            }
        }
    }

    /// Waits for in-flight frames. Errors are logged, not returned.
    pub fn shutdown<B>(&mut self, backend: &mut B)
    where
        B: FrameBackend<ParamsBuffer = P, Submission = S>,
    {
        if self.state == LoopState::Running {
            self.state = LoopState::Closed;
        }
        if let Err(err) = self.sequencer.wait_idle(backend) {
            log::warn!("frames still in flight at shutdown: {err}");
        }
    }

    fn recreate<B>(&mut self, backend: &mut B) -> Result<(), FrameError>
    where
        B: FrameBackend<ParamsBuffer = P, Submission = S>,
    {
        if let Err(err) = self.sequencer.wait_idle(backend) {
            return Err(self.fail(err));
        }
        backend.resize(self.resolution);
        Ok(())
    }

    fn fail(&mut self, err: FrameError) -> FrameError {
        log::error!("frame loop failed: {err}");
        self.state = LoopState::Failed;
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{SimBackend, SimBuffer, SimEvent};

    type SimLoop = FrameLoop<SimBuffer, u64>;

    fn setup(n: usize) -> (SimBackend, SimLoop) {
        let mut sim = SimBackend::new();
        let frame_loop = FrameLoop::new(&mut sim, n, UVec2::new(800, 600)).unwrap();
        (sim, frame_loop)
    }

    fn at(elapsed: f32) -> FrameInput {
        FrameInput {
            elapsed,
            pointer: None,
        }
    }

    // ── steady state ──────────────────────────────────────────────────────

    #[test]
    fn ten_frames_cycle_three_slots() {
        let (mut sim, mut fl) = setup(3);

        for i in 0..10 {
            let out = fl.redraw(&mut sim, at(i as f32 * 0.016)).unwrap();
            assert_eq!(out, FrameOutcome::Presented { slot: i % 3 });
        }

        assert_eq!(fl.frame_counter(), 10);
        assert_eq!(sim.submitted_slots(), vec![0, 1, 2, 0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(sim.waits(), (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn params_carry_time_and_clamped_mouse() {
        let (mut sim, mut fl) = setup(3);

        let input = FrameInput {
            elapsed: 2.5,
            pointer: Some((900.0, -4.0)),
        };
        fl.redraw(&mut sim, input).unwrap();

        let p = sim.written()[0];
        assert_eq!(p.resolution, UVec2::new(800, 600));
        assert_eq!(p.mouse_position, UVec2::new(799, 0));
        assert_eq!(p.time, 2.5);
    }

    #[test]
    fn missing_pointer_maps_to_origin() {
        let (mut sim, mut fl) = setup(1);
        fl.redraw(&mut sim, at(0.0)).unwrap();
        assert_eq!(sim.written()[0].mouse_position, UVec2::ZERO);
    }

    // ── close ─────────────────────────────────────────────────────────────

    #[test]
    fn close_stops_recording() {
        let (mut sim, mut fl) = setup(3);
        for i in 0..4 {
            fl.redraw(&mut sim, at(i as f32)).unwrap();
        }

        fl.handle_event(&mut sim, LoopEvent::CloseRequested).unwrap();
        sim.clear_events();

        assert_eq!(fl.redraw(&mut sim, at(5.0)).unwrap(), FrameOutcome::Stopped);
        assert_eq!(fl.state(), LoopState::Closed);
        assert!(sim.events().is_empty());
        assert_eq!(fl.frame_counter(), 4);
    }

    #[test]
    fn shutdown_drains_in_flight_frames() {
        let (mut sim, mut fl) = setup(3);
        for i in 0..2 {
            fl.redraw(&mut sim, at(i as f32)).unwrap();
        }

        fl.shutdown(&mut sim);
        assert_eq!(fl.state(), LoopState::Closed);
        assert_eq!(sim.waits(), vec![1, 2]);
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn resize_recreates_and_next_frame_uses_new_size() {
        let (mut sim, mut fl) = setup(3);
        for i in 0..5 {
            fl.redraw(&mut sim, at(i as f32)).unwrap();
        }
        sim.clear_events();

        fl.handle_event(&mut sim, LoopEvent::Resized { width: 1024, height: 768 })
            .unwrap();
        assert_eq!(sim.events(), &[SimEvent::Resize(UVec2::new(1024, 768))]);
        // Drained slot by slot before recreation.
        assert_eq!(sim.waits(), vec![1, 2, 4, 5, 3]);

        fl.redraw(&mut sim, at(6.0)).unwrap();
        let last = sim.written().last().copied().unwrap();
        assert_eq!(last.resolution, UVec2::new(1024, 768));
    }

    #[test]
    fn same_size_resize_is_ignored() {
        let (mut sim, mut fl) = setup(3);
        fl.handle_event(&mut sim, LoopEvent::Resized { width: 800, height: 600 })
            .unwrap();
        assert!(sim.events().is_empty());
    }

    #[test]
    fn zero_size_suspends_frames() {
        let (mut sim, mut fl) = setup(3);
        fl.handle_event(&mut sim, LoopEvent::Resized { width: 0, height: 600 })
            .unwrap();

        assert_eq!(fl.redraw(&mut sim, at(1.0)).unwrap(), FrameOutcome::Suspended);
        assert!(sim.events().is_empty());

        fl.handle_event(&mut sim, LoopEvent::Resized { width: 640, height: 480 })
            .unwrap();
        assert_eq!(
            fl.redraw(&mut sim, at(2.0)).unwrap(),
            FrameOutcome::Presented { slot: 0 }
        );
    }

    // ── surface errors ────────────────────────────────────────────────────

    #[test]
    fn outdated_surface_recreates_and_retries_once() {
        let (mut sim, mut fl) = setup(3);
        sim.fail_next_acquire(FrameError::Outdated);

        assert_eq!(
            fl.redraw(&mut sim, at(0.0)).unwrap(),
            FrameOutcome::Presented { slot: 0 }
        );
        assert_eq!(sim.events()[0], SimEvent::AcquireFailed(FrameError::Outdated));
        assert_eq!(sim.events()[1], SimEvent::Resize(UVec2::new(800, 600)));
        assert_eq!(fl.frame_counter(), 1);
    }

    #[test]
    fn outdated_twice_skips_the_frame() {
        let (mut sim, mut fl) = setup(3);
        sim.fail_next_acquire(FrameError::Outdated);
        sim.fail_next_acquire(FrameError::Outdated);

        assert_eq!(fl.redraw(&mut sim, at(0.0)).unwrap(), FrameOutcome::Skipped);
        assert_eq!(fl.frame_counter(), 0);
        assert!(fl.is_running());
    }

    #[test]
    fn timeout_skips_without_advancing() {
        let (mut sim, mut fl) = setup(3);
        sim.fail_next_acquire(FrameError::Timeout);

        assert_eq!(fl.redraw(&mut sim, at(0.0)).unwrap(), FrameOutcome::Skipped);
        assert_eq!(fl.frame_counter(), 0);

        assert_eq!(
            fl.redraw(&mut sim, at(0.1)).unwrap(),
            FrameOutcome::Presented { slot: 0 }
        );
    }

    #[test]
    fn device_lost_fails_the_loop() {
        let (mut sim, mut fl) = setup(1);
        fl.redraw(&mut sim, at(0.0)).unwrap();

        sim.lose_device();
        assert!(matches!(
            fl.redraw(&mut sim, at(0.1)),
            Err(FrameError::DeviceLost(_))
        ));
        assert_eq!(fl.state(), LoopState::Failed);
        assert_eq!(fl.redraw(&mut sim, at(0.2)).unwrap(), FrameOutcome::Stopped);
    }

    #[test]
    fn out_of_memory_on_acquire_is_fatal() {
        let (mut sim, mut fl) = setup(3);
        sim.fail_next_acquire(FrameError::OutOfMemory);

        assert_eq!(fl.redraw(&mut sim, at(0.0)), Err(FrameError::OutOfMemory));
        assert_eq!(fl.state(), LoopState::Failed);
    }
}
