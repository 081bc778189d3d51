pub mod ids;
pub mod events;
pub mod stats;

pub use ids::{QueueId, EngineId};
pub use events::{is_valid_time_format, TaskEvent};
pub use stats::QueueStats;
