//! # dog-task-queue: Named Serial Task Queues
//!
//! Push work under a string id; everything pushed under the same id runs
//! **one task at a time, in push order**, no matter how many producers push
//! concurrently. Different ids run independently.
//!
//! A task does not finish when `execute` returns. It finishes when it calls
//! [`CompletionToken::release`], which may happen much later, from a timer,
//! an I/O callback or another thread. Only then does the queue start the
//! next task.
//!
//! ## Guarantees
//!
//! - **FIFO**: tasks start in the order their `push` calls completed
//! - **Mutual exclusion**: at most one started-but-unreleased task per queue
//! - **One-shot tokens**: a second `release` is a no-op, never a double advance
//! - **Registry idempotence**: one engine per id per [`QueueRegistry`]
//!
//! A task that never releases stalls its queue. There is no timeout.
//!
//! Each queue's recorder starts **disabled**, so `recorder_replay()` returns
//! nothing until recording is turned on with `set_recording(true)` or
//! [`QueueConfig::with_record_events`].
//!
//! ## Quick Start
//!
//! ```rust
//! use dog_task_queue::prelude::*;
//!
//! let registry = QueueRegistry::new();
//! let queue = registry.get_queue("thumbnails");
//! queue.set_recording(true);
//!
//! queue.push(FnTask::new("first", |token| {
//!     // hand `token` to whatever finishes the work
//!     token.release();
//! }));
//! queue.push(FnTask::new("second", |token| {
//!     token.release();
//! }));
//!
//! assert!(queue.is_idle());
//! assert_eq!(queue.recorder_replay().len(), 6);
//! ```

pub mod engine;
pub mod error;
pub mod execution;
pub mod observability;
pub mod pending;
pub mod registry;
pub mod types;

pub use engine::{QueueEngine, QueueHandle};
pub use error::{QueueError, QueueResult};
pub use execution::{AsyncTask, CompletionToken, FnTask, ReleaseOutcome, Task};
pub use registry::{QueueConfig, QueueRegistry};
pub use types::{EngineId, QueueId, QueueStats, TaskEvent};

// Observability exports
pub use observability::{GlobalMetrics, LiveMetrics, ObservabilityLayer, Recorder};

/// Everything needed to register queues and push tasks
pub mod prelude {
    pub use crate::{
        AsyncTask, CompletionToken, FnTask, QueueConfig, QueueHandle, QueueId, QueueRegistry,
        ReleaseOutcome, Task,
    };

    pub use crate::{QueueError, QueueResult};
}
