// src/queue/pool.rs

//! Worker-pool configuration for the task queue.
//!
//! The pool is an explicit options object passed to [`TaskQueue::new`]
//! instead of a process-wide thread-factory helper, so two queues in the
//! same process can size themselves independently.
//!
//! [`TaskQueue::new`]: crate::queue::TaskQueue::new

use serde::Deserialize;

/// Bounded worker pool settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolOptions {
    /// Maximum number of tasks executing at the same time. Defaults to the
    /// hardware's available parallelism; a configured `0` is treated as 1.
    pub workers: usize,
    /// Label attached to this queue's log events, to tell concurrent runs
    /// apart.
    pub label: String,
}

impl PoolOptions {
    /// One worker per available CPU.
    pub fn per_cpu() -> Self {
        Self::default()
    }

    /// A fixed-size pool.
    pub fn fixed(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    /// Default options, with the worker count overridable through the
    /// `TASKDAG_WORKERS` environment variable.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(workers) = std::env::var("TASKDAG_WORKERS")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
        {
            options.workers = workers;
        }
        options
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Worker count actually used by the run loop (never zero).
    pub(crate) fn effective_workers(&self) -> usize {
        self.workers.max(1)
    }
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            label: "taskdag".to_string(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_has_at_least_one_worker() {
        assert!(PoolOptions::default().effective_workers() >= 1);
    }

    #[test]
    fn zero_workers_is_clamped_to_one() {
        assert_eq!(PoolOptions::fixed(0).effective_workers(), 1);
    }

    #[test]
    fn deserializes_with_defaults() {
        let options: PoolOptions = serde_json::from_str("{\"workers\": 4}").unwrap();
        assert_eq!(options.workers, 4);
        assert_eq!(options.label, "taskdag");
    }
}
