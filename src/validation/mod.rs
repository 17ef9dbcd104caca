pub mod pipeline;

pub use pipeline::{PendingAnalysis, SlotAnalysis, ValidationPipeline};
