pub mod recorder;
pub mod metrics;
pub mod layer;

pub use recorder::Recorder;
pub use metrics::{LiveMetrics, GlobalMetrics};
pub use layer::ObservabilityLayer;
