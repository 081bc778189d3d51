use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::QueueId;
use crate::observability::recorder::DEFAULT_TIME_FORMAT;

/// Whether chrono can render `format` without error
pub fn is_valid_time_format(format: &str) -> bool {
    !format.trim().is_empty() && StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

/// Lifecycle event of a task inside one serial queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TaskEvent {
    /// Task was appended to the pending list
    Queued {
        queue: QueueId,
        ticket: u64,
        tag: String,
        at: DateTime<Utc>,
    },

    /// Task became the head and was handed its completion token
    Started {
        queue: QueueId,
        ticket: u64,
        tag: String,
        at: DateTime<Utc>,
    },

    /// Task released its token and was popped
    Released {
        queue: QueueId,
        ticket: u64,
        tag: String,
        at: DateTime<Utc>,
    },
}

impl TaskEvent {
    pub fn queued(queue: &QueueId, ticket: u64, tag: &str) -> Self {
        Self::Queued {
            queue: queue.clone(),
            ticket,
            tag: tag.to_string(),
            at: Utc::now(),
        }
    }

    pub fn started(queue: &QueueId, ticket: u64, tag: &str) -> Self {
        Self::Started {
            queue: queue.clone(),
            ticket,
            tag: tag.to_string(),
            at: Utc::now(),
        }
    }

    pub fn released(queue: &QueueId, ticket: u64, tag: &str) -> Self {
        Self::Released {
            queue: queue.clone(),
            ticket,
            tag: tag.to_string(),
            at: Utc::now(),
        }
    }

    /// Get event type name as string
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Queued { .. } => "queued",
            Self::Started { .. } => "started",
            Self::Released { .. } => "released",
        }
    }

    pub fn queue(&self) -> &QueueId {
        match self {
            Self::Queued { queue, .. } | Self::Started { queue, .. } | Self::Released { queue, .. } => queue,
        }
    }

    pub fn ticket(&self) -> u64 {
        match self {
            Self::Queued { ticket, .. } | Self::Started { ticket, .. } | Self::Released { ticket, .. } => *ticket,
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Queued { tag, .. } | Self::Started { tag, .. } | Self::Released { tag, .. } => tag,
        }
    }

    /// Get the timestamp from any event
    pub fn timestamp(&self) -> &DateTime<Utc> {
        match self {
            Self::Queued { at, .. } | Self::Started { at, .. } | Self::Released { at, .. } => at,
        }
    }

    /// Human-readable line, timestamp rendered with a chrono format string
    ///
    /// An unrenderable format falls back to [`DEFAULT_TIME_FORMAT`].
    pub fn describe(&self, time_format: &str) -> String {
        let mut time = String::new();
        if write!(time, "{}", self.timestamp().format(time_format)).is_err() {
            time = self.timestamp().format(DEFAULT_TIME_FORMAT).to_string();
        }
        match self {
            Self::Queued { tag, .. } => format!("{}: Task {} pushed to queue", time, tag),
            Self::Started { tag, .. } => format!("{}: Task {} started - acquired lock", time, tag),
            Self::Released { tag, .. } => format!("{}: Task {} finished - released lock", time, tag),
        }
    }
}
