//! Simulated device for protocol tests.
//!
//! Submissions complete only when the host waits for them (or when a test
//! completes them explicitly), which makes "still pending" observable.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use kiln_engine::coords::UVec2;
use kiln_engine::device::FrameError;
use kiln_engine::frames::Timeline;

use crate::backend::FrameBackend;
use crate::params::ShaderParams;

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Acquire,
    AcquireFailed(FrameError),
    WriteParams { slot: usize },
    TextureBegin { slot: usize },
    TextureEnd,
    DrawBegin { slot: usize },
    Submit { slot: usize, submission: u64 },
    Resize(UVec2),
}

pub struct SimBuffer {
    slot: usize,
}

#[derive(Debug, Default)]
pub struct SimFrame {
    slot: Option<usize>,
    texture_open: bool,
    texture_done: bool,
    drawn: bool,
}

#[derive(Default)]
pub struct SimBackend {
    events: Vec<SimEvent>,
    written: Vec<ShaderParams>,
    buffers_created: usize,

    next_submission: u64,

    /// Latest submission reading each slot's buffer.
    readers: Vec<Option<u64>>,

    /// Highest submission the device has finished.
    completed: Cell<u64>,
    waits: RefCell<Vec<u64>>,
    device_lost: Cell<bool>,

    acquire_failures: VecDeque<FrameError>,
}

impl SimBackend {
    pub fn new() -> Self {
        Self {
            next_submission: 1,
            ..Self::default()
        }
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Parameters in write order.
    pub fn written(&self) -> &[ShaderParams] {
        &self.written
    }

    pub fn buffers_created(&self) -> usize {
        self.buffers_created
    }

    pub fn submissions(&self) -> usize {
        (self.next_submission - 1) as usize
    }

    /// Submissions the host blocked on, in order.
    pub fn waits(&self) -> Vec<u64> {
        self.waits.borrow().clone()
    }

    /// Slots submitted, in order.
    pub fn submitted_slots(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SimEvent::Submit { slot, .. } => Some(*slot),
                _ => None,
            })
            .collect()
    }

    pub fn fail_next_acquire(&mut self, err: FrameError) {
        self.acquire_failures.push_back(err);
    }

    /// Every later wait fails.
    pub fn lose_device(&self) {
        self.device_lost.set(true);
    }
}

impl Timeline for SimBackend {
    type Submission = u64;

    fn wait(&self, submission: &u64) -> Result<(), FrameError> {
        if self.device_lost.get() {
            return Err(FrameError::DeviceLost("simulated".into()));
        }
        self.waits.borrow_mut().push(*submission);
        self.completed.set(self.completed.get().max(*submission));
        Ok(())
    }
}

impl FrameBackend for SimBackend {
    type ParamsBuffer = SimBuffer;
    type Frame = SimFrame;

    fn create_params_buffer(&mut self, slot: usize) -> SimBuffer {
        self.buffers_created += 1;
        if self.readers.len() <= slot {
            self.readers.resize(slot + 1, None);
        }
        SimBuffer { slot }
    }

    fn acquire(&mut self) -> Result<SimFrame, FrameError> {
        if let Some(err) = self.acquire_failures.pop_front() {
            self.events.push(SimEvent::AcquireFailed(err.clone()));
            return Err(err);
        }
        self.events.push(SimEvent::Acquire);
        Ok(SimFrame::default())
    }

    fn write_params(&mut self, buffer: &SimBuffer, params: &ShaderParams) {
        if let Some(reader) = self.readers[buffer.slot] {
            assert!(
                reader <= self.completed.get(),
                "slot {} written while submission {reader} may still read it",
                buffer.slot
            );
        }
        self.events.push(SimEvent::WriteParams { slot: buffer.slot });
        self.written.push(*params);
    }

    fn texture_stage(&mut self, frame: &mut SimFrame, buffer: &SimBuffer) {
        assert!(!frame.texture_done, "texture stage recorded twice");
        frame.slot = Some(buffer.slot);
        frame.texture_open = true;
        self.events.push(SimEvent::TextureBegin { slot: buffer.slot });
    }

    fn stage_barrier(&mut self, frame: &mut SimFrame) {
        assert!(frame.texture_open, "barrier without texture stage");
        frame.texture_open = false;
        frame.texture_done = true;
        self.events.push(SimEvent::TextureEnd);
    }

    fn draw_stage(&mut self, frame: &mut SimFrame, buffer: &SimBuffer) {
        assert!(
            frame.texture_done && !frame.texture_open,
            "draw stage began before texture stage ended"
        );
        assert_eq!(frame.slot, Some(buffer.slot));
        frame.drawn = true;
        self.events.push(SimEvent::DrawBegin { slot: buffer.slot });
    }

    fn submit(&mut self, frame: SimFrame) -> u64 {
        assert!(frame.drawn, "submitted without a draw stage");
        let slot = frame.slot.unwrap_or_default();

        let submission = self.next_submission;
        self.next_submission += 1;
        self.readers[slot] = Some(submission);
        self.events.push(SimEvent::Submit { slot, submission });
        submission
    }

    fn resize(&mut self, size: UVec2) {
        self.events.push(SimEvent::Resize(size));
    }
}
