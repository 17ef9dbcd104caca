// Bridges the one-shot "take a photo" signal from the application context
// to the per-frame callback, and hands the resulting artifact back without
// ever blocking the frame path.

use std::sync::atomic::{AtomicBool, Ordering};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::models::{CameraFrame, CaptureArtifact, CropRegion};
use crate::processing::FrameCropper;

pub struct CaptureCoordinator {
    /// One-shot trigger flag, the only state shared between the frame
    /// context and the application context.
    armed: AtomicBool,
    /// Snapshot of the current guide rectangle, written on viewport changes
    /// and read on the frame path.
    region: Mutex<Option<CropRegion>>,
    sender: UnboundedSender<CaptureArtifact>,
}

impl CaptureCoordinator {
    /// Create a coordinator and the application-side receiving end of the
    /// artifact channel.
    pub fn new() -> (Self, UnboundedReceiver<CaptureArtifact>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let coordinator = CaptureCoordinator {
            armed: AtomicBool::new(false),
            region: Mutex::new(None),
            sender,
        };
        (coordinator, receiver)
    }

    /// Arm the one-shot capture flag. No-op while a capture is already
    /// pending, so at most one artifact is produced per user intent.
    pub fn trigger(&self) {
        if self.armed.swap(true, Ordering::AcqRel) {
            log::debug!("capture already armed, ignoring trigger");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    pub fn set_crop_region(&self, region: CropRegion) {
        *self.region.lock() = Some(region);
    }

    /// Frame-context entry point, invoked once per delivered frame.
    ///
    /// If armed and a crop region is known, the flag is cleared with an
    /// atomic read-and-clear before any work happens, so re-entrant frame
    /// delivery cannot process the same trigger twice. A crop that yields
    /// no data consumes the trigger silently; the caller must re-trigger.
    pub fn on_frame(&self, frame: &CameraFrame, cropper: &dyn FrameCropper) {
        if !self.armed.load(Ordering::Acquire) {
            return;
        }
        // Hold the trigger until a region exists rather than consuming it.
        let region = match *self.region.lock() {
            Some(region) => region,
            None => return,
        };
        if !self.armed.swap(false, Ordering::AcqRel) {
            return;
        }

        let outcome = cropper.crop(frame, &region);
        let (base64_data, file_path) = match (outcome.base64_data, outcome.file_path) {
            (Some(data), Some(path)) => (data, path),
            _ => {
                log::warn!("crop produced no data, trigger consumed");
                return;
            }
        };

        match BASE64.decode(base64_data.as_bytes()) {
            Ok(image_data) => {
                let artifact = CaptureArtifact {
                    image_data,
                    storage_path: file_path,
                    captured_at: Utc::now(),
                };
                if self.sender.send(artifact).is_err() {
                    log::warn!("application side dropped the capture channel");
                }
            }
            Err(err) => {
                log::warn!("discarding capture with undecodable payload: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use crate::capture::CropRegionCalculator;
    use crate::models::ViewportSize;
    use crate::processing::CropOutcome;

    struct CountingCropper {
        calls: AtomicUsize,
        succeed: bool,
    }

    impl CountingCropper {
        fn new(succeed: bool) -> Self {
            CountingCropper {
                calls: AtomicUsize::new(0),
                succeed,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl FrameCropper for CountingCropper {
        fn crop(&self, _frame: &CameraFrame, _region: &CropRegion) -> CropOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                CropOutcome {
                    base64_data: Some(BASE64.encode(b"cropped-bytes")),
                    file_path: Some("/tmp/capture-0.png".to_string()),
                }
            } else {
                CropOutcome::default()
            }
        }
    }

    fn frame() -> CameraFrame {
        CameraFrame {
            width: 1920,
            height: 1080,
            data: vec![0; 16],
        }
    }

    fn armed_coordinator() -> (CaptureCoordinator, UnboundedReceiver<CaptureArtifact>) {
        let (coordinator, receiver) = CaptureCoordinator::new();
        let region =
            CropRegionCalculator::compute_default(ViewportSize::new(1080.0, 2400.0)).unwrap();
        coordinator.set_crop_region(region);
        coordinator.trigger();
        (coordinator, receiver)
    }

    #[test]
    fn test_at_most_one_delivery_per_trigger() {
        let (coordinator, mut receiver) = armed_coordinator();
        let cropper = CountingCropper::new(true);

        for _ in 0..50 {
            coordinator.on_frame(&frame(), &cropper);
        }

        assert_eq!(cropper.calls(), 1);
        let artifact = receiver.try_recv().unwrap();
        assert_eq!(artifact.image_data, b"cropped-bytes");
        assert_eq!(artifact.storage_path, "/tmp/capture-0.png");
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_failed_crop_consumes_trigger_silently() {
        let (coordinator, mut receiver) = armed_coordinator();
        let cropper = CountingCropper::new(false);

        for _ in 0..10 {
            coordinator.on_frame(&frame(), &cropper);
        }

        assert_eq!(cropper.calls(), 1);
        assert!(receiver.try_recv().is_err());
        assert!(!coordinator.is_armed());
    }

    #[test]
    fn test_retrigger_after_failure_delivers() {
        let (coordinator, mut receiver) = armed_coordinator();
        let failing = CountingCropper::new(false);
        coordinator.on_frame(&frame(), &failing);
        assert!(receiver.try_recv().is_err());

        let working = CountingCropper::new(true);
        coordinator.trigger();
        coordinator.on_frame(&frame(), &working);
        assert!(receiver.try_recv().is_ok());
    }

    #[test]
    fn test_trigger_held_until_region_known() {
        let (coordinator, mut receiver) = CaptureCoordinator::new();
        coordinator.trigger();
        let cropper = CountingCropper::new(true);

        coordinator.on_frame(&frame(), &cropper);
        assert_eq!(cropper.calls(), 0);
        assert!(coordinator.is_armed());

        let region =
            CropRegionCalculator::compute_default(ViewportSize::new(1080.0, 2400.0)).unwrap();
        coordinator.set_crop_region(region);
        coordinator.on_frame(&frame(), &cropper);
        assert_eq!(cropper.calls(), 1);
        assert!(receiver.try_recv().is_ok());
    }

    #[test]
    fn test_trigger_is_idempotent_while_armed() {
        let (coordinator, mut receiver) = armed_coordinator();
        coordinator.trigger();
        coordinator.trigger();
        let cropper = CountingCropper::new(true);

        for _ in 0..10 {
            coordinator.on_frame(&frame(), &cropper);
        }
        assert_eq!(cropper.calls(), 1);
        assert!(receiver.try_recv().is_ok());
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_unarmed_frames_do_nothing() {
        let (coordinator, mut receiver) = CaptureCoordinator::new();
        let region =
            CropRegionCalculator::compute_default(ViewportSize::new(1080.0, 2400.0)).unwrap();
        coordinator.set_crop_region(region);
        let cropper = CountingCropper::new(true);

        for _ in 0..10 {
            coordinator.on_frame(&frame(), &cropper);
        }
        assert_eq!(cropper.calls(), 0);
        assert!(receiver.try_recv().is_err());
    }
}
