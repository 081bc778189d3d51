use serde::{Deserialize, Serialize};

use super::{EngineId, QueueId};

/// Point-in-time view of one engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub queue: QueueId,
    pub engine: EngineId,

    /// Tag of the task holding the queue, if any
    pub running: Option<String>,

    /// Entries waiting behind the running task
    pub pending: usize,

    /// Tickets handed out so far, i.e. total pushes
    pub pushed: u64,

    pub recording: bool,
}

impl QueueStats {
    /// Whether the engine has nothing running and nothing waiting
    pub fn is_idle(&self) -> bool {
        self.running.is_none() && self.pending == 0
    }
}
