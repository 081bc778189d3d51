use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, MutexGuard};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::{
    CompletionToken, EngineId, QueueConfig, QueueId, QueueStats, ReleaseOutcome, Task, TaskEvent,
    observability::{ObservabilityLayer, Recorder},
    pending::PendingList,
};

/// Serial executor for one queue id.
///
/// Runs at most one task at a time, in push order. There are no worker
/// threads: `push` and token release are the only things that move the
/// engine forward, and both may come from any thread.
pub struct QueueEngine {
    id: QueueId,
    instance: EngineId,
    state: Mutex<EngineState>,
    recorder: Recorder,
    observability: Arc<ObservabilityLayer>,
    idle: Notify,
    this: Weak<QueueEngine>,
}

#[derive(Default)]
struct EngineState {
    /// Running task stays at the head until its token is released
    pending: PendingList,

    /// Ticket whose token is outstanding
    running: Option<u64>,

    /// Set while some caller is looping in `advance`
    dispatching: bool,
}

impl EngineState {
    fn is_idle(&self) -> bool {
        self.running.is_none() && self.pending.is_empty()
    }
}

impl QueueEngine {
    pub(crate) fn new(
        id: QueueId,
        config: &QueueConfig,
        observability: Arc<ObservabilityLayer>,
    ) -> Arc<Self> {
        let mut recorder = Recorder::new().with_time_format(config.replay_time_format.clone());
        if let Some(capacity) = config.recorder_capacity {
            recorder = recorder.with_capacity(capacity);
        }
        recorder.set_enabled(config.record_events);

        let engine = Arc::new_cyclic(|this| Self {
            id,
            instance: EngineId::new(),
            state: Mutex::new(EngineState::default()),
            recorder,
            observability,
            idle: Notify::new(),
            this: this.clone(),
        });

        info!("Created serial queue {} (engine {})", engine.id, engine.instance);
        engine
    }

    /// Append a task; starts it right away if the queue is idle
    pub fn push(&self, task: Arc<dyn Task>) {
        {
            let mut state = self.state.lock();
            let entry = state.pending.push(task);
            let event = TaskEvent::queued(&self.id, entry.ticket, entry.tag());
            self.recorder.on_task_queued(&event);
            self.observability.publish(event);
        }
        self.advance();
    }

    /// Start the head task if nothing is running.
    ///
    /// Only one caller dispatches at a time. Releases that land while a
    /// dispatcher is inside `execute` (including synchronous ones) are picked
    /// up by that dispatcher's loop instead of recursing.
    fn advance(&self) {
        let mut state = self.state.lock();
        if state.dispatching {
            return;
        }
        state.dispatching = true;

        while state.running.is_none() {
            let Some(head) = state.pending.head() else {
                break;
            };
            let ticket = head.ticket;
            let task = head.task.clone();

            state.running = Some(ticket);
            let event = TaskEvent::started(&self.id, ticket, task.tag());
            self.recorder.on_task_started(&event);
            self.observability.publish(event);

            let token = CompletionToken::new(self.this.clone(), self.id.clone(), ticket);
            let outcome = MutexGuard::unlocked(&mut state, || {
                panic::catch_unwind(AssertUnwindSafe(|| task.execute(token)))
            });

            // A panicking task is treated as one that never released
            if outcome.is_err() {
                error!(
                    "Task {} panicked in execute on queue {}; queue is stalled until it releases",
                    task.tag(),
                    self.id
                );
                self.observability.record_execute_panic();
            }
        }

        state.dispatching = false;
        let idle = state.is_idle();
        drop(state);

        if idle {
            self.idle.notify_waiters();
        }
    }

    pub(crate) fn on_token_released(&self, ticket: u64) -> ReleaseOutcome {
        {
            let mut state = self.state.lock();
            if state.running != Some(ticket) {
                warn!(
                    "Stale release of ticket {} on queue {} (running: {:?})",
                    ticket, self.id, state.running
                );
                self.observability.record_stale_release();
                return ReleaseOutcome::Stale;
            }

            state.running = None;
            match state.pending.pop_head() {
                Some(entry) => {
                    let event = TaskEvent::released(&self.id, entry.ticket, entry.tag());
                    self.recorder.on_task_released(&event);
                    self.observability.publish(event);
                }
                None => debug!("Released ticket {} on queue {} with no head", ticket, self.id),
            }
        }

        self.advance();
        ReleaseOutcome::Released
    }

    pub fn id(&self) -> &QueueId {
        &self.id
    }

    pub fn engine_id(&self) -> EngineId {
        self.instance
    }

    /// Tasks waiting behind the running one
    pub fn pending_len(&self) -> usize {
        let state = self.state.lock();
        state.pending.len() - usize::from(state.running.is_some())
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running.is_some()
    }

    pub fn is_idle(&self) -> bool {
        self.state.lock().is_idle()
    }

    pub fn running_tag(&self) -> Option<String> {
        let state = self.state.lock();
        state.running?;
        state.pending.head().map(|entry| entry.tag().to_string())
    }

    /// Tags still in the list, running task first
    pub fn pending_tags(&self) -> Vec<String> {
        self.state.lock().pending.tags()
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock();
        let running = state
            .running
            .and(state.pending.head())
            .map(|entry| entry.tag().to_string());

        QueueStats {
            queue: self.id.clone(),
            engine: self.instance,
            pending: state.pending.len() - usize::from(running.is_some()),
            running,
            pushed: state.pending.issued(),
            recording: self.recorder.is_enabled(),
        }
    }

    /// Resolves once nothing is running and nothing is waiting
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }
}

/// Cheap, cloneable reference to a registered queue
#[derive(Clone)]
pub struct QueueHandle {
    engine: Arc<QueueEngine>,
}

impl QueueHandle {
    pub(crate) fn new(engine: Arc<QueueEngine>) -> Self {
        Self { engine }
    }

    /// Enqueue a task behind everything already pushed to this queue
    pub fn push<T: Task>(&self, task: T) {
        self.engine.push(Arc::new(task));
    }

    /// Enqueue a task that is already shared
    pub fn push_shared(&self, task: Arc<dyn Task>) {
        self.engine.push(task);
    }

    pub fn id(&self) -> &QueueId {
        self.engine.id()
    }

    pub fn engine_id(&self) -> EngineId {
        self.engine.engine_id()
    }

    pub fn pending_len(&self) -> usize {
        self.engine.pending_len()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn is_idle(&self) -> bool {
        self.engine.is_idle()
    }

    pub fn running_tag(&self) -> Option<String> {
        self.engine.running_tag()
    }

    pub fn pending_tags(&self) -> Vec<String> {
        self.engine.pending_tags()
    }

    pub fn stats(&self) -> QueueStats {
        self.engine.stats()
    }

    pub async fn wait_idle(&self) {
        self.engine.wait_idle().await
    }

    /// Enable or disable the event recorder; disabling clears its history
    pub fn set_recording(&self, enabled: bool) {
        self.engine.recorder().set_enabled(enabled);
    }

    /// Replay recorded events as human-readable lines
    pub fn recorder_replay(&self) -> Vec<String> {
        self.engine.recorder().replay()
    }

    pub fn recorder(&self) -> &Recorder {
        self.engine.recorder()
    }

    /// Whether both handles point at the same engine
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.engine, &b.engine)
    }
}

impl std::fmt::Debug for QueueHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueHandle")
            .field("id", self.engine.id())
            .field("engine", &self.engine.engine_id())
            .finish()
    }
}
