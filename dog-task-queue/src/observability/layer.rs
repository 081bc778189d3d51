use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::TaskEvent;
use super::LiveMetrics;

/// Event stream and counters shared by all queues of one registry
#[derive(Clone)]
pub struct ObservabilityLayer {
    event_broadcaster: broadcast::Sender<TaskEvent>,
    metrics: Arc<LiveMetrics>,
}

impl ObservabilityLayer {
    /// Create new observability layer
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    /// Create a layer whose event channel buffers `capacity` events per subscriber
    pub fn with_capacity(capacity: usize) -> Self {
        let (event_broadcaster, _) = broadcast::channel(capacity.max(1));

        Self {
            event_broadcaster,
            metrics: Arc::new(LiveMetrics::new()),
        }
    }

    /// Publish a lifecycle event and bump its counter
    pub fn publish(&self, event: TaskEvent) {
        match &event {
            TaskEvent::Queued { .. } => self.metrics.increment_tasks_queued(),
            TaskEvent::Started { .. } => self.metrics.increment_tasks_started(),
            TaskEvent::Released { .. } => self.metrics.increment_tasks_released(),
        }

        debug!(
            "Task {} {} on queue {} (ticket {})",
            event.tag(),
            event.event_name(),
            event.queue(),
            event.ticket()
        );

        // No subscribers is fine
        let _ = self.event_broadcaster.send(event);
    }

    pub fn record_stale_release(&self) {
        self.metrics.increment_stale_releases();
    }

    pub fn record_execute_panic(&self) {
        self.metrics.increment_execute_panics();
    }

    /// Get event stream
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.event_broadcaster.subscribe()
    }

    /// Get live metrics
    pub fn metrics(&self) -> &LiveMetrics {
        &self.metrics
    }
}

impl Default for ObservabilityLayer {
    fn default() -> Self {
        Self::new()
    }
}
