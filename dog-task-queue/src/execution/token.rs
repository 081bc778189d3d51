use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;
use tracing::{debug, warn};

use crate::engine::QueueEngine;
use crate::QueueId;

/// What a call to [`CompletionToken::release`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The queue advanced past this task
    Released,

    /// This token was already released; nothing happened
    AlreadyReleased,

    /// The engine was not running this token's ticket; nothing happened
    Stale,

    /// The engine no longer exists; nothing happened
    EngineDropped,
}

impl ReleaseOutcome {
    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released)
    }
}

/// One-shot signal a running task uses to hand the queue to the next task.
///
/// Only the first `release` reaches the engine. The token does not keep its
/// engine alive, and dropping it unreleased leaves the queue stalled.
pub struct CompletionToken {
    engine: Weak<QueueEngine>,
    queue: QueueId,
    ticket: u64,
    released: AtomicBool,
}

impl CompletionToken {
    pub(crate) fn new(engine: Weak<QueueEngine>, queue: QueueId, ticket: u64) -> Self {
        Self {
            engine,
            queue,
            ticket,
            released: AtomicBool::new(false),
        }
    }

    /// Signal that the task holding this token is done
    pub fn release(&self) -> ReleaseOutcome {
        if self.released.swap(true, Ordering::AcqRel) {
            debug!("Ignoring repeated release of ticket {} on queue {}", self.ticket, self.queue);
            return ReleaseOutcome::AlreadyReleased;
        }

        match self.engine.upgrade() {
            Some(engine) => engine.on_token_released(self.ticket),
            None => {
                debug!("Queue {} dropped before ticket {} was released", self.queue, self.ticket);
                ReleaseOutcome::EngineDropped
            }
        }
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    pub fn queue(&self) -> &QueueId {
        &self.queue
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

impl fmt::Debug for CompletionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionToken")
            .field("queue", &self.queue)
            .field("ticket", &self.ticket)
            .field("released", &self.is_released())
            .finish()
    }
}

impl Drop for CompletionToken {
    fn drop(&mut self) {
        if !*self.released.get_mut() && self.engine.strong_count() > 0 {
            warn!(
                "Completion token for ticket {} on queue {} dropped without release; queue is stalled",
                self.ticket, self.queue
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn detached(ticket: u64) -> CompletionToken {
        CompletionToken::new(Weak::new(), QueueId::from("detached"), ticket)
    }

    #[test]
    fn test_release_without_engine_is_noop() {
        let token = detached(4);

        assert_eq!(token.release(), ReleaseOutcome::EngineDropped);
        assert!(token.is_released());
        assert_eq!(token.release(), ReleaseOutcome::AlreadyReleased);
    }

    #[test]
    fn test_token_metadata() {
        let token = detached(9);
        assert_eq!(token.ticket(), 9);
        assert_eq!(token.queue().as_str(), "detached");
        assert!(!token.is_released());
        assert!(format!("{:?}", token).contains("ticket: 9"));
    }

    #[traced_test]
    #[test]
    fn test_detached_drop_is_quiet() {
        drop(detached(1));
        assert!(!logs_contain("dropped without release"));
    }
}
