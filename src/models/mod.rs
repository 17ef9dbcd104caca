pub mod data;

pub use data::{
    CameraControl, CameraFrame, CaptureArtifact, CropRegion, DocumentSlot, SlotNotice, SlotState,
    SlotVerdict, SubmissionBlocker, ValidationState, ViewportSize,
};
