use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::{
    QueueError, QueueHandle, QueueId, QueueResult,
    engine::QueueEngine,
    types::is_valid_time_format,
    observability::{recorder::DEFAULT_TIME_FORMAT, ObservabilityLayer},
};

/// Settings applied to every queue a registry creates
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Whether new queues start with their event recorder enabled
    pub record_events: bool,
    /// Maximum events each recorder keeps; `None` keeps everything
    pub recorder_capacity: Option<usize>,
    /// Per-subscriber buffer of the shared event stream
    pub event_channel_capacity: usize,
    /// chrono format used for replayed timestamps
    pub replay_time_format: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            record_events: false,
            recorder_capacity: None,
            event_channel_capacity: 1000,
            replay_time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl QueueConfig {
    pub fn with_record_events(mut self, record_events: bool) -> Self {
        self.record_events = record_events;
        self
    }

    pub fn with_recorder_capacity(mut self, capacity: usize) -> Self {
        self.recorder_capacity = Some(capacity);
        self
    }

    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    pub fn with_replay_time_format(mut self, format: impl Into<String>) -> Self {
        self.replay_time_format = format.into();
        self
    }

    /// Reject settings that would make the observability side misbehave
    pub fn validate(&self) -> QueueResult<()> {
        if self.event_channel_capacity == 0 {
            return Err(QueueError::invalid_config("event_channel_capacity must be at least 1"));
        }
        if self.recorder_capacity == Some(0) {
            return Err(QueueError::invalid_config("recorder_capacity must be at least 1"));
        }
        if self.replay_time_format.trim().is_empty() {
            return Err(QueueError::invalid_config("replay_time_format must not be empty"));
        }
        if !is_valid_time_format(&self.replay_time_format) {
            return Err(QueueError::invalid_config(format!(
                "replay_time_format {:?} is not a valid chrono format",
                self.replay_time_format
            )));
        }
        Ok(())
    }
}

static GLOBAL: Lazy<QueueRegistry> = Lazy::new(QueueRegistry::new);

/// Directory of serial queues: one engine per id, created on first lookup
/// and kept for the registry's lifetime.
pub struct QueueRegistry {
    queues: RwLock<HashMap<QueueId, Arc<QueueEngine>>>,
    observability: Arc<ObservabilityLayer>,
    config: QueueConfig,
}

impl QueueRegistry {
    /// Create an empty registry with default configuration
    pub fn new() -> Self {
        Self::build(QueueConfig::default())
    }

    /// Create a registry with custom configuration
    pub fn with_config(config: QueueConfig) -> QueueResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Share an existing observability layer with this registry; queues
    /// created before the call keep the layer they were built with
    pub fn with_observability(mut self, observability: ObservabilityLayer) -> Self {
        self.observability = Arc::new(observability);
        self
    }

    /// Process-wide registry for hosts that want a single shared directory
    pub fn global() -> &'static QueueRegistry {
        &GLOBAL
    }

    fn build(config: QueueConfig) -> Self {
        Self {
            queues: RwLock::new(HashMap::new()),
            observability: Arc::new(ObservabilityLayer::with_capacity(config.event_channel_capacity)),
            config,
        }
    }

    /// Get the queue for `id`, creating it if this is the first lookup
    pub fn get_queue(&self, id: impl Into<QueueId>) -> QueueHandle {
        let id = id.into();

        if let Some(engine) = self.queues.read().get(&id) {
            return QueueHandle::new(engine.clone());
        }

        let mut queues = self.queues.write();
        let engine = queues
            .entry(id)
            .or_insert_with_key(|id| {
                debug!("Registering serial queue {}", id);
                QueueEngine::new(id.clone(), &self.config, self.observability.clone())
            })
            .clone();

        QueueHandle::new(engine)
    }

    pub fn contains(&self, id: &QueueId) -> bool {
        self.queues.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.queues.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.read().is_empty()
    }

    /// Registered ids, sorted
    pub fn queue_ids(&self) -> Vec<QueueId> {
        let mut ids: Vec<QueueId> = self.queues.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn observability(&self) -> &ObservabilityLayer {
        &self.observability
    }
}

impl Default for QueueRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_same_id_same_engine() {
        let registry = QueueRegistry::new();
        let a = registry.get_queue("uploads");
        let b = registry.get_queue(QueueId::from("uploads"));

        assert!(QueueHandle::ptr_eq(&a, &b));
        assert_eq!(a.engine_id(), b.engine_id());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_different_ids_distinct_engines() {
        let registry = QueueRegistry::new();
        let a = registry.get_queue("a");
        let b = registry.get_queue("b");

        assert!(!QueueHandle::ptr_eq(&a, &b));
        assert_eq!(registry.queue_ids(), vec![QueueId::from("a"), QueueId::from("b")]);
        assert!(registry.contains(&QueueId::from("a")));
        assert!(!registry.contains(&QueueId::from("c")));
    }

    #[test]
    fn test_concurrent_first_lookup_creates_one_engine() {
        let registry = Arc::new(QueueRegistry::new());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    registry.get_queue("contended").engine_id()
                })
            })
            .collect();

        let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_fresh_registries_do_not_share_engines() {
        let first = QueueRegistry::new().get_queue("T");
        let second = QueueRegistry::new().get_queue("T");

        assert_ne!(first.engine_id(), second.engine_id());
    }

    #[test]
    fn test_global_registry_is_shared() {
        let a = QueueRegistry::global().get_queue("registry-tests-global");
        let b = QueueRegistry::global().get_queue("registry-tests-global");

        assert!(QueueHandle::ptr_eq(&a, &b));
    }

    #[test]
    fn test_config_applies_to_new_queues() {
        let config = QueueConfig::default()
            .with_record_events(true)
            .with_recorder_capacity(2);
        let registry = QueueRegistry::with_config(config).unwrap();

        let queue = registry.get_queue("q");
        assert!(queue.stats().recording);
        assert!(queue.recorder().is_enabled());
    }

    #[test]
    fn test_config_validation() {
        assert!(QueueConfig::default().validate().is_ok());

        let zero_channel = QueueConfig::default().with_event_channel_capacity(0);
        assert!(matches!(
            QueueRegistry::with_config(zero_channel),
            Err(QueueError::InvalidConfig(_))
        ));

        let zero_recorder = QueueConfig::default().with_recorder_capacity(0);
        assert!(zero_recorder.validate().is_err());

        let blank_format = QueueConfig::default().with_replay_time_format("  ");
        assert!(blank_format.validate().is_err());

        let bad_format = QueueConfig::default()
            .with_record_events(true)
            .with_replay_time_format("%Q");
        assert!(matches!(bad_format.validate(), Err(QueueError::InvalidConfig(_))));
        assert!(QueueRegistry::with_config(bad_format).is_err());
    }
}
