use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Geometry error: {0}")]
    Geometry(String),
    #[error("Crop extraction error: {0}")]
    CropExtraction(String),
    #[error("Text recognition error: {0}")]
    Recognition(String),
    #[error("Face detection error: {0}")]
    FaceDetection(String),
    #[error("Camera error: {0}")]
    Camera(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CaptureError>;
