pub mod engines;
pub mod extractors;

pub use engines::{
    CropOutcome, DetectedFace, FaceDetector, FrameCropper, LandmarkMode, RecognizedText,
    TextRecognizer,
};
pub use extractors::FieldExtractor;
