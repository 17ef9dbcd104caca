pub mod error;

pub use error::{CaptureError, Result};
