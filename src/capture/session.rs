use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::capture::coordinator::CaptureCoordinator;
use crate::capture::crop::CropRegionCalculator;
use crate::models::{
    CameraControl, CameraFrame, CaptureArtifact, CropRegion, DocumentSlot, ViewportSize,
};
use crate::processing::FrameCropper;
use crate::utils::{CaptureError, Result};

/// Top-level capture driver. Owns the viewport-derived crop region, the
/// camera control snapshot and the slot currently being captured, and
/// bridges finished artifacts from the frame path to the application path.
///
/// The session itself lives on the application context; the frame context
/// holds a clone of the coordinator handle only.
pub struct CaptureSession {
    viewport: ViewportSize,
    region: CropRegion,
    coordinator: Arc<CaptureCoordinator>,
    receiver: UnboundedReceiver<CaptureArtifact>,
    camera: CameraControl,
    active_slot: Option<DocumentSlot>,
}

impl CaptureSession {
    pub fn new(viewport: ViewportSize) -> Result<Self> {
        let region = CropRegionCalculator::compute_default(viewport)?;
        let (coordinator, receiver) = CaptureCoordinator::new();
        coordinator.set_crop_region(region);
        Ok(CaptureSession {
            viewport,
            region,
            coordinator: Arc::new(coordinator),
            receiver,
            camera: CameraControl::default(),
            active_slot: None,
        })
    }

    /// Handle for the frame-processing context.
    pub fn coordinator(&self) -> Arc<CaptureCoordinator> {
        Arc::clone(&self.coordinator)
    }

    pub fn crop_region(&self) -> CropRegion {
        self.region
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    /// Recompute the crop region for a changed capture surface, e.g. on an
    /// orientation change.
    pub fn set_viewport(&mut self, viewport: ViewportSize) -> Result<()> {
        let region = CropRegionCalculator::compute_default(viewport)?;
        self.viewport = viewport;
        self.region = region;
        self.coordinator.set_crop_region(region);
        Ok(())
    }

    pub fn camera(&self) -> CameraControl {
        self.camera
    }

    pub fn grant_permission(&mut self) {
        self.camera.has_permission = true;
    }

    pub fn toggle_torch(&mut self) {
        self.camera.torch_on = !self.camera.torch_on;
    }

    /// Begin capturing for a slot: records the target and activates the
    /// camera. Fails when camera permission was never granted.
    pub fn start_capture(&mut self, slot: DocumentSlot) -> Result<()> {
        if !self.camera.has_permission {
            return Err(CaptureError::Camera(
                "camera permission not granted".to_string(),
            ));
        }
        self.active_slot = Some(slot);
        self.camera.is_active = true;
        log::info!("capture started for {} slot", slot.label());
        Ok(())
    }

    /// Arm the one-shot capture flag for the next frame.
    pub fn trigger(&self) {
        if self.active_slot.is_none() {
            log::debug!("trigger without an active capture slot");
        }
        self.coordinator.trigger();
    }

    /// Convenience frame-context entry for single-threaded callers; a real
    /// frame thread holds `coordinator()` instead.
    pub fn process_frame(&self, frame: &CameraFrame, cropper: &dyn FrameCropper) {
        self.coordinator.on_frame(frame, cropper);
    }

    /// Application-context receive of the next finished capture. Resolves
    /// once per successful trigger; deactivates the camera on delivery,
    /// mirroring the capture screen closing once the photo is taken.
    /// Returns None when the coordinator side is gone.
    pub async fn next_capture(&mut self) -> Option<(DocumentSlot, CaptureArtifact)> {
        loop {
            let artifact = self.receiver.recv().await?;
            match self.active_slot.take() {
                Some(slot) => {
                    self.camera.is_active = false;
                    return Some((slot, artifact));
                }
                None => {
                    log::warn!("dropping capture that arrived without an active slot");
                }
            }
        }
    }

    /// Non-blocking variant of `next_capture`.
    pub fn try_next_capture(&mut self) -> Option<(DocumentSlot, CaptureArtifact)> {
        let artifact = self.receiver.try_recv().ok()?;
        match self.active_slot.take() {
            Some(slot) => {
                self.camera.is_active = false;
                Some((slot, artifact))
            }
            None => {
                log::warn!("dropping capture that arrived without an active slot");
                None
            }
        }
    }
}
