// Collaborator seams for the external imaging engines. The crate consumes
// these contracts only; the engine internals (ML Kit, Tesseract, a native
// cropper plugin) live outside the core.

use async_trait::async_trait;

use crate::models::{CameraFrame, CaptureArtifact, CropRegion};
use crate::utils::Result;

/// Result of asking the crop primitive to cut the document region out of a
/// frame. Absence of either field signals failure.
#[derive(Debug, Clone, Default)]
pub struct CropOutcome {
    pub base64_data: Option<String>,
    pub file_path: Option<String>,
}

/// Synchronous crop primitive, callable from the frame-processing context.
/// Implementations must not block on I/O and must complete well within the
/// frame interval.
pub trait FrameCropper: Send + Sync {
    fn crop(&self, frame: &CameraFrame, region: &CropRegion) -> CropOutcome;
}

#[derive(Debug, Clone)]
pub struct RecognizedText {
    pub text: String,
}

/// A detected face with its bounding box. Only cardinality is consumed by
/// the validation pipeline.
#[derive(Debug, Clone, Copy)]
pub struct DetectedFace {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkMode {
    None,
    All,
}

#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &CaptureArtifact) -> Result<RecognizedText>;
}

#[async_trait]
pub trait FaceDetector: Send + Sync {
    async fn detect(
        &self,
        image: &CaptureArtifact,
        landmark_mode: LandmarkMode,
    ) -> Result<Vec<DetectedFace>>;
}
