//! Pushes a batch of random-length tasks onto one serial queue and replays
//! what the queue recorded.

pub mod config;

use anyhow::Result;
use rand::Rng;
use std::time::Duration;
use tracing::info;

use dog_task_queue::prelude::*;

pub use config::DemoConfig;

/// Run the demo to completion and return the replayed history
pub async fn run(config: &DemoConfig) -> Result<Vec<String>> {
    let registry = QueueRegistry::with_config(config.queue_config())?;
    let queue = registry.get_queue(config.queue.as_str());

    let max_delay_ms = config.max_delay.as_millis().max(1) as u64;
    let delays: Vec<Duration> = {
        let mut rng = rand::thread_rng();
        (0..config.tasks)
            .map(|_| Duration::from_millis(rng.gen_range(1..=max_delay_ms)))
            .collect()
    };

    for (i, delay) in delays.into_iter().enumerate() {
        let index = i + 1;
        queue.push(AsyncTask::new(index.to_string(), move || async move {
            info!("Task {} working for {:?}", index, delay);
            tokio::time::sleep(delay).await;
        })?);
    }

    queue.wait_idle().await;

    let metrics = registry.observability().metrics().snapshot();
    info!(
        "Queue {} drained: {} queued, {} released",
        queue.id(),
        metrics.tasks_queued,
        metrics.tasks_released
    );

    Ok(queue.recorder_replay())
}
