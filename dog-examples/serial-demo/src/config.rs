use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use dog_task_queue::QueueConfig;

/// Demo settings, read from `SERIAL_DEMO_*` environment variables
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub queue: String,
    pub tasks: usize,
    pub max_delay: Duration,
    pub recorder_capacity: Option<usize>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            queue: "T".to_string(),
            tasks: 20,
            max_delay: Duration::from_millis(600),
            recorder_capacity: None,
        }
    }
}

impl DemoConfig {
    /// Environment variables override defaults; malformed numbers are errors
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let queue = lookup("SERIAL_DEMO_QUEUE").unwrap_or(defaults.queue);
        let tasks = match lookup("SERIAL_DEMO_TASKS") {
            Some(raw) => raw.parse().context("SERIAL_DEMO_TASKS must be a number")?,
            None => defaults.tasks,
        };
        let max_delay = match lookup("SERIAL_DEMO_MAX_DELAY_MS") {
            Some(raw) => Duration::from_millis(raw.parse().context("SERIAL_DEMO_MAX_DELAY_MS must be a number")?),
            None => defaults.max_delay,
        };
        let recorder_capacity = lookup("SERIAL_DEMO_RECORDER_CAPACITY")
            .map(|raw| raw.parse().context("SERIAL_DEMO_RECORDER_CAPACITY must be a number"))
            .transpose()?;

        Ok(Self {
            queue,
            tasks,
            max_delay,
            recorder_capacity,
        })
    }

    /// Queue settings for the registry the demo builds
    pub fn queue_config(&self) -> QueueConfig {
        let config = QueueConfig::default().with_record_events(true);
        match self.recorder_capacity {
            Some(capacity) => config.with_recorder_capacity(capacity),
            None => config,
        }
    }
}
