use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by every engine of a registry
#[derive(Debug, Default)]
pub struct LiveMetrics {
    tasks_queued: AtomicU64,
    tasks_started: AtomicU64,
    tasks_released: AtomicU64,
    stale_releases: AtomicU64,
    execute_panics: AtomicU64,
}

impl LiveMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_tasks_queued(&self) {
        self.tasks_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tasks_started(&self) {
        self.tasks_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tasks_released(&self) {
        self.tasks_released.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_stale_releases(&self) {
        self.stale_releases.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_execute_panics(&self) {
        self.execute_panics.fetch_add(1, Ordering::Relaxed);
    }

    // Getters for global metrics
    pub fn tasks_queued(&self) -> u64 {
        self.tasks_queued.load(Ordering::Relaxed)
    }

    pub fn tasks_started(&self) -> u64 {
        self.tasks_started.load(Ordering::Relaxed)
    }

    pub fn tasks_released(&self) -> u64 {
        self.tasks_released.load(Ordering::Relaxed)
    }

    pub fn stale_releases(&self) -> u64 {
        self.stale_releases.load(Ordering::Relaxed)
    }

    pub fn execute_panics(&self) -> u64 {
        self.execute_panics.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> GlobalMetrics {
        GlobalMetrics {
            tasks_queued: self.tasks_queued(),
            tasks_started: self.tasks_started(),
            tasks_released: self.tasks_released(),
            stale_releases: self.stale_releases(),
            execute_panics: self.execute_panics(),
        }
    }
}

/// Plain copy of the counters at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalMetrics {
    pub tasks_queued: u64,
    pub tasks_started: u64,
    pub tasks_released: u64,
    pub stale_releases: u64,
    pub execute_panics: u64,
}

impl GlobalMetrics {
    /// Tasks pushed but not yet released, running ones included
    pub fn backlog(&self) -> u64 {
        self.tasks_queued.saturating_sub(self.tasks_released)
    }

    /// Tasks started and still holding their queue
    pub fn in_flight(&self) -> u64 {
        self.tasks_started.saturating_sub(self.tasks_released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_metrics() {
        let metrics = LiveMetrics::new();

        metrics.increment_tasks_queued();
        metrics.increment_tasks_queued();
        metrics.increment_tasks_started();
        metrics.increment_stale_releases();

        assert_eq!(metrics.tasks_queued(), 2);
        assert_eq!(metrics.tasks_started(), 1);
        assert_eq!(metrics.stale_releases(), 1);
        assert_eq!(metrics.tasks_released(), 0);
    }

    #[test]
    fn test_global_metrics() {
        let global = GlobalMetrics {
            tasks_queued: 10,
            tasks_started: 4,
            tasks_released: 3,
            stale_releases: 0,
            execute_panics: 0,
        };

        assert_eq!(global.backlog(), 7);
        assert_eq!(global.in_flight(), 1);
    }
}
