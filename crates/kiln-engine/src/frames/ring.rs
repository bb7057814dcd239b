use anyhow::Result;

use crate::device::FrameError;

use super::Timeline;

struct FrameSlot<T, S> {
    resources: T,

    /// Last submission that reads `resources`, if it may still be executing.
    in_flight: Option<S>,
}

/// Fixed ring of per-frame resources guarded by submission markers.
///
/// The only way to reach a slot's resources mutably is [`FrameRing::reclaim`],
/// which first waits for the slot's previous submission. A slot can therefore
/// not be rewritten while the device may still read it.
pub struct FrameRing<T, S> {
    slots: Vec<FrameSlot<T, S>>,
}

impl<T, S> FrameRing<T, S>
where
    S: Clone + std::fmt::Debug,
{
    /// Creates `len` slots, calling `make(slot_index)` for each.
    pub fn new<F>(len: usize, mut make: F) -> Result<Self>
    where
        F: FnMut(usize) -> T,
    {
        anyhow::ensure!(len > 0, "frame ring needs at least one slot");

        let slots = (0..len)
            .map(|i| FrameSlot {
                resources: make(i),
                in_flight: None,
            })
            .collect();

        Ok(Self { slots })
    }

    /// Number of slots (frames in flight).
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot used by frame `frame_counter`.
    #[inline]
    pub fn acquire_slot(&self, frame_counter: u64) -> usize {
        (frame_counter % self.slots.len() as u64) as usize
    }

    /// Waits until `slot` is no longer read by the device and returns its
    /// resources for writing.
    ///
    /// On error the pending marker is kept, so a later call waits again.
    pub fn reclaim<L>(&mut self, slot: usize, timeline: &L) -> Result<&mut T, FrameError>
    where
        L: Timeline<Submission = S> + ?Sized,
    {
        let entry = &mut self.slots[slot];

        if let Some(pending) = entry.in_flight.as_ref() {
            log::trace!("slot {slot}: waiting for {pending:?}");
            timeline.wait(pending)?;
            entry.in_flight = None;
        }

        Ok(&mut entry.resources)
    }

    /// Records `submission` as the latest reader of `slot`.
    pub fn retire(&mut self, slot: usize, submission: S) {
        let previous = self.slots[slot].in_flight.replace(submission);
        debug_assert!(previous.is_none(), "slot {slot} retired without being reclaimed");
    }

    /// Marker of the submission still pending on `slot`, if any.
    pub fn pending(&self, slot: usize) -> Option<&S> {
        self.slots[slot].in_flight.as_ref()
    }

    /// Number of slots with a possibly executing submission.
    pub fn in_flight(&self) -> usize {
        self.slots.iter().filter(|s| s.in_flight.is_some()).count()
    }

    /// Waits for every pending slot, oldest slot index first.
    ///
    /// Used before swapchain recreation and at teardown.
    pub fn drain<L>(&mut self, timeline: &L) -> Result<(), FrameError>
    where
        L: Timeline<Submission = S> + ?Sized,
    {
        for slot in 0..self.slots.len() {
            self.reclaim(slot, timeline)?;
        }
        Ok(())
    }
}
