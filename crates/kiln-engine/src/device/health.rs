use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::FrameError;

/// First unrecoverable fault reported by wgpu for a device.
///
/// wgpu reports device loss and uncaptured errors through callbacks that may
/// run on any thread. They record the fault here; the frame path checks it
/// before acquiring and after waiting, so a lost device surfaces as a
/// `FrameError` instead of a panic in the default error handler.
#[derive(Debug, Clone, Default)]
pub(crate) struct DeviceHealth {
    faulted: Arc<AtomicBool>,
    fault: Arc<Mutex<Option<FrameError>>>,
}

impl DeviceHealth {
    /// Installs the device-lost callback and the uncaptured error handler.
    pub(crate) fn watch(device: &wgpu::Device) -> Self {
        let health = Self::default();

        let lost = health.clone();
        device.set_device_lost_callback(move |reason, message| {
            if matches!(reason, wgpu::DeviceLostReason::Destroyed) {
                log::debug!("device destroyed");
                return;
            }
            lost.record(device_lost_error(reason, &message));
        });

        let uncaptured = health.clone();
        device.on_uncaptured_error(Arc::new(move |err: wgpu::Error| {
            uncaptured.record(uncaptured_error(&err));
        }));

        health
    }

    /// Keeps the first fault; later ones are only logged.
    pub(crate) fn record(&self, err: FrameError) {
        let mut slot = self.fault.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            log::debug!("further device fault ignored: {err}");
            return;
        }

        log::error!("{err}");
        *slot = Some(err);
        self.faulted.store(true, Ordering::Release);
    }

    pub(crate) fn check(&self) -> Result<(), FrameError> {
        if !self.faulted.load(Ordering::Acquire) {
            return Ok(());
        }

        let slot = self.fault.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn device_lost_error(reason: wgpu::DeviceLostReason, message: &str) -> FrameError {
    if message.is_empty() {
        return FrameError::DeviceLost(format!("{reason:?}"));
    }
    FrameError::DeviceLost(format!("{reason:?}: {message}"))
}

fn uncaptured_error(err: &wgpu::Error) -> FrameError {
    match err {
        wgpu::Error::OutOfMemory { .. } => FrameError::OutOfMemory,
        wgpu::Error::Validation { description, .. } => FrameError::Validation(description.clone()),
        other => FrameError::DeviceLost(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::SurfaceErrorAction;

    #[test]
    fn healthy_until_a_fault_is_recorded() {
        let health = DeviceHealth::default();
        assert_eq!(health.check(), Ok(()));

        health.record(FrameError::DeviceLost("Unknown: driver reset".into()));
        assert_eq!(
            health.check(),
            Err(FrameError::DeviceLost("Unknown: driver reset".into()))
        );
    }

    #[test]
    fn first_fault_wins() {
        let health = DeviceHealth::default();
        health.record(FrameError::OutOfMemory);
        health.record(FrameError::DeviceLost("later".into()));

        assert_eq!(health.check(), Err(FrameError::OutOfMemory));
    }

    #[test]
    fn clones_share_the_fault() {
        let health = DeviceHealth::default();
        let callback_side = health.clone();

        std::thread::spawn(move || callback_side.record(FrameError::DeviceLost("x".into())))
            .join()
            .unwrap();

        assert!(matches!(health.check(), Err(FrameError::DeviceLost(_))));
    }

    #[test]
    fn lost_reason_is_fatal_and_carries_message() {
        let err = device_lost_error(wgpu::DeviceLostReason::Unknown, "gpu hung");
        assert_eq!(err, FrameError::DeviceLost("Unknown: gpu hung".into()));
        assert_eq!(err.action(), SurfaceErrorAction::Fatal);

        let bare = device_lost_error(wgpu::DeviceLostReason::Unknown, "");
        assert_eq!(bare, FrameError::DeviceLost("Unknown".into()));
    }
}
