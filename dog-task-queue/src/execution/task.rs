use std::future::Future;
use std::pin::Pin;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::warn;

use crate::{CompletionToken, QueueError, QueueResult};

/// Unit of work run by a serial queue.
///
/// `execute` must return promptly. Long-running work happens elsewhere
/// (a spawned future, a thread, a callback) and ends with `token.release()`.
/// A task that never releases holds its queue forever.
pub trait Task: Send + Sync + 'static {
    /// Diagnostic label used in events and logs
    fn tag(&self) -> &str;

    /// Start the work; the token must be released exactly once when it is done
    fn execute(&self, token: CompletionToken);
}

type BoxedRun = Box<dyn FnOnce(CompletionToken) + Send>;

/// Task backed by a closure that receives the completion token.
///
/// The closure runs once; executing the same task again releases the new
/// token straight away.
pub struct FnTask {
    tag: String,
    run: Mutex<Option<BoxedRun>>,
}

impl FnTask {
    pub fn new<F>(tag: impl Into<String>, run: F) -> Self
    where
        F: FnOnce(CompletionToken) + Send + 'static,
    {
        Self {
            tag: tag.into(),
            run: Mutex::new(Some(Box::new(run))),
        }
    }
}

impl Task for FnTask {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn execute(&self, token: CompletionToken) {
        let run = self.run.lock().take();
        match run {
            Some(run) => run(token),
            None => {
                warn!("Task {} executed twice; closure already consumed, releasing", self.tag);
                token.release();
            }
        }
    }
}

type BoxedFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type BoxedMake = Box<dyn FnOnce() -> BoxedFuture + Send>;

/// Task that runs a future on a tokio runtime and releases when it finishes.
///
/// The runtime is captured when the task is built, so the queue may start it
/// from any thread. If the future panics the token is never released.
pub struct AsyncTask {
    tag: String,
    runtime: Handle,
    make: Mutex<Option<BoxedMake>>,
}

impl AsyncTask {
    /// Build on the current runtime
    pub fn new<F, Fut>(tag: impl Into<String>, make: F) -> QueueResult<Self>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| QueueError::NoRuntime)?;
        Ok(Self::with_runtime(tag, runtime, make))
    }

    /// Build on an explicit runtime handle
    pub fn with_runtime<F, Fut>(tag: impl Into<String>, runtime: Handle, make: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let make: BoxedMake = Box::new(move || Box::pin(make()) as BoxedFuture);
        Self {
            tag: tag.into(),
            runtime,
            make: Mutex::new(Some(make)),
        }
    }
}

impl Task for AsyncTask {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn execute(&self, token: CompletionToken) {
        let Some(make) = self.make.lock().take() else {
            warn!("Task {} executed twice; future already consumed, releasing", self.tag);
            token.release();
            return;
        };

        let work = make();
        self.runtime.spawn(async move {
            work.await;
            token.release();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Weak};
    use crate::{QueueId, ReleaseOutcome};

    fn detached() -> CompletionToken {
        CompletionToken::new(Weak::new(), QueueId::from("detached"), 0)
    }

    #[test]
    fn test_fn_task_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let task = FnTask::new("once", move |token| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert_eq!(token.release(), ReleaseOutcome::EngineDropped);
        });

        assert_eq!(task.tag(), "once");
        task.execute(detached());
        task.execute(detached());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_async_task_requires_runtime() {
        let result = AsyncTask::new("no-runtime", || async {});
        assert!(matches!(result, Err(QueueError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_async_task_releases_after_future() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let task = AsyncTask::new("async", move || async move {
            tokio::task::yield_now().await;
            let _ = tx.send(());
        })
        .unwrap();

        let token = detached();
        task.execute(token);

        rx.await.unwrap();
    }
}
