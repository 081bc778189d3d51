use std::collections::VecDeque;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::types::{is_valid_time_format, TaskEvent};

#[cfg(feature = "json")]
use crate::QueueResult;

/// Default chrono format for replayed lines
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Per-queue history of queued/started/released events.
///
/// Purely diagnostic: nothing here feeds back into scheduling. While
/// disabled, incoming events are dropped.
pub struct Recorder {
    state: Mutex<RecorderState>,
    capacity: Option<usize>,
    time_format: String,
}

#[derive(Default)]
struct RecorderState {
    enabled: bool,
    events: VecDeque<TaskEvent>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RecorderState::default()),
            capacity: None,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }

    /// Keep at most `capacity` events, dropping the oldest first
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Chrono format for replayed timestamps; an invalid one keeps the default
    pub fn with_time_format(mut self, time_format: impl Into<String>) -> Self {
        let time_format = time_format.into();
        if is_valid_time_format(&time_format) {
            self.time_format = time_format;
        } else {
            warn!("Ignoring invalid replay time format {:?}", time_format);
        }
        self
    }

    pub fn enabled(self, enabled: bool) -> Self {
        self.set_enabled(enabled);
        self
    }

    /// Turn recording on or off; turning it off clears the history
    pub fn set_enabled(&self, enabled: bool) {
        let mut state = self.state.lock();
        state.enabled = enabled;
        if !enabled {
            state.events.clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    pub fn on_task_queued(&self, event: &TaskEvent) {
        self.record(event);
    }

    pub fn on_task_started(&self, event: &TaskEvent) {
        self.record(event);
    }

    pub fn on_task_released(&self, event: &TaskEvent) {
        self.record(event);
    }

    fn record(&self, event: &TaskEvent) {
        let mut state = self.state.lock();
        if !state.enabled {
            return;
        }

        state.events.push_back(event.clone());
        if let Some(capacity) = self.capacity {
            while state.events.len() > capacity {
                state.events.pop_front();
            }
        }
    }

    /// Snapshot of recorded events, oldest first
    pub fn events(&self) -> Vec<TaskEvent> {
        self.state.lock().events.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().events.is_empty()
    }

    pub fn clear(&self) {
        self.state.lock().events.clear();
    }

    /// Re-emit every recorded event as a line, in recorded order
    pub fn replay(&self) -> Vec<String> {
        let lines: Vec<String> = self
            .state
            .lock()
            .events
            .iter()
            .map(|event| event.describe(&self.time_format))
            .collect();

        for line in &lines {
            info!("{}", line);
        }
        lines
    }

    /// Export the history as a JSON array
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> QueueResult<String> {
        let events = self.events();
        Ok(serde_json::to_string(&events)?)
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueueId;

    fn queue() -> QueueId {
        QueueId::from("T")
    }

    #[test]
    fn test_disabled_by_default() {
        let recorder = Recorder::new();
        recorder.on_task_queued(&TaskEvent::queued(&queue(), 0, "1"));

        assert!(!recorder.is_enabled());
        assert!(recorder.is_empty());
        assert!(recorder.replay().is_empty());
    }

    #[test]
    fn test_replay_in_recorded_order() {
        let recorder = Recorder::new().enabled(true);
        recorder.on_task_queued(&TaskEvent::queued(&queue(), 0, "1"));
        recorder.on_task_started(&TaskEvent::started(&queue(), 0, "1"));
        recorder.on_task_released(&TaskEvent::released(&queue(), 0, "1"));

        let lines = recorder.replay();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("Task 1 pushed to queue"));
        assert!(lines[1].ends_with("Task 1 started - acquired lock"));
        assert!(lines[2].ends_with("Task 1 finished - released lock"));

        // replay does not consume
        assert_eq!(recorder.replay(), lines);
    }

    #[test]
    fn test_disable_clears_history() {
        let recorder = Recorder::new().enabled(true);
        recorder.on_task_queued(&TaskEvent::queued(&queue(), 0, "1"));
        assert_eq!(recorder.len(), 1);

        recorder.set_enabled(false);
        assert!(recorder.is_empty());

        recorder.on_task_queued(&TaskEvent::queued(&queue(), 1, "2"));
        assert!(recorder.is_empty());

        recorder.set_enabled(true);
        recorder.on_task_queued(&TaskEvent::queued(&queue(), 2, "3"));
        assert_eq!(recorder.events()[0].tag(), "3");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let recorder = Recorder::new().with_capacity(2).enabled(true);
        for ticket in 0..4 {
            recorder.on_task_queued(&TaskEvent::queued(&queue(), ticket, &ticket.to_string()));
        }

        let tags: Vec<_> = recorder.events().iter().map(|e| e.tag().to_string()).collect();
        assert_eq!(tags, vec!["2", "3"]);
    }

    #[test]
    fn test_custom_time_format() {
        let recorder = Recorder::new().with_time_format("[%Y]").enabled(true);
        recorder.on_task_queued(&TaskEvent::queued(&queue(), 0, "x"));

        let line = &recorder.replay()[0];
        assert!(line.starts_with('['));
        assert!(line.ends_with("]: Task x pushed to queue"));
    }

    #[test]
    fn test_invalid_time_format_keeps_default() {
        let recorder = Recorder::new().with_time_format("%Q").enabled(true);
        recorder.on_task_queued(&TaskEvent::queued(&queue(), 0, "x"));

        let line = &recorder.replay()[0];
        let (time, rest) = line.split_at(8);
        assert_eq!(time.matches(':').count(), 2);
        assert_eq!(rest, ": Task x pushed to queue");
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_export() {
        let recorder = Recorder::new().enabled(true);
        recorder.on_task_started(&TaskEvent::started(&queue(), 5, "five"));

        let json = recorder.to_json().unwrap();
        let parsed: Vec<TaskEvent> = serde_json::from_str(&json).unwrap();

        assert!(json.contains("\"event\":\"started\""));
        assert_eq!(parsed, recorder.events());
    }
}
