pub mod coordinator;
pub mod crop;
pub mod session;

pub use coordinator::CaptureCoordinator;
pub use crop::CropRegionCalculator;
pub use session::CaptureSession;
