use std::collections::VecDeque;
use std::sync::Arc;

use crate::execution::Task;

/// One queued task together with the ticket it was pushed under
#[derive(Clone)]
pub struct PendingEntry {
    pub ticket: u64,
    pub task: Arc<dyn Task>,
}

impl PendingEntry {
    pub fn tag(&self) -> &str {
        self.task.tag()
    }
}

impl std::fmt::Debug for PendingEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingEntry")
            .field("ticket", &self.ticket)
            .field("tag", &self.tag())
            .finish()
    }
}

/// FIFO of tasks for one engine: append at the tail, pop at the head.
///
/// Tickets are handed out in push order and never reused, so a ticket
/// identifies an entry for the lifetime of the list.
#[derive(Debug, Default)]
pub struct PendingList {
    entries: VecDeque<PendingEntry>,
    next_ticket: u64,
}

impl PendingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task and return the entry it was stored as
    pub fn push(&mut self, task: Arc<dyn Task>) -> &PendingEntry {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.entries.push_back(PendingEntry { ticket, task });
        // just pushed
        &self.entries[self.entries.len() - 1]
    }

    pub fn head(&self) -> Option<&PendingEntry> {
        self.entries.front()
    }

    pub fn pop_head(&mut self) -> Option<PendingEntry> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tickets issued so far
    pub fn issued(&self) -> u64 {
        self.next_ticket
    }

    /// Tags in execution order, head first
    pub fn tags(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.tag().to_string()).collect()
    }
}
