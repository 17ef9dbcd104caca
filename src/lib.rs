pub mod capture;
pub mod models;
pub mod processing;
pub mod storage;
pub mod utils;
pub mod validation;

pub use capture::{CaptureCoordinator, CaptureSession, CropRegionCalculator};
pub use validation::ValidationPipeline;
