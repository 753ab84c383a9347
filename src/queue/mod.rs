// src/queue/mod.rs

//! Task queue and scheduling loop.
//!
//! - [`pool`] holds the worker-pool configuration passed to the queue.
//! - [`runner`] contains the `run_all` scheduling loop plus the
//!   [`RunReport`] it produces.
//!
//! A [`TaskQueue`] owns the full set of tasks for one run. It is created
//! empty, populated by [`TaskQueue::enqueue`] (and, mid-run, by
//! [`QueueHandle::enqueue`] from inside running tasks), driven to
//! completion by one `run_all` call, then discarded.

pub mod pool;
pub mod runner;

pub use pool::PoolOptions;
pub use runner::{RunReport, TaskSummary};

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::errors::{EngineError, Result};
use crate::task::TaskHandle;

/// Events flowing into the scheduling loop from workers and queue handles.
#[derive(Debug)]
pub(crate) enum QueueEvent {
    /// A dispatched task finished (its result slot is now frozen).
    Finished { task: TaskHandle, run: Result<()> },
    /// A running task (or other holder of a [`QueueHandle`]) submitted
    /// follow-on work.
    Enqueued { task: TaskHandle },
}

/// Owns the working set of tasks for a single run.
pub struct TaskQueue {
    options: PoolOptions,
    /// Tasks waiting to become runnable, in enqueue order.
    pending: Vec<TaskHandle>,
    /// Every handle ever accepted, for duplicate-enqueue detection.
    seen: Vec<TaskHandle>,
    tx: mpsc::Sender<QueueEvent>,
    rx: mpsc::Receiver<QueueEvent>,
}

impl TaskQueue {
    pub fn new(options: PoolOptions) -> Self {
        let (tx, rx) = mpsc::channel(64);
        Self {
            options,
            pending: Vec::new(),
            seen: Vec::new(),
            tx,
            rx,
        }
    }

    /// Add a task to the pending set.
    ///
    /// Rejects tasks that already hold a terminal result and handles that
    /// were already enqueued (a task is enqueued once and only once;
    /// identity is by handle, not by name).
    pub fn enqueue(&mut self, task: TaskHandle) -> Result<()> {
        validate_enqueue(&self.seen, &task)?;
        self.seen.push(Arc::clone(&task));
        self.pending.push(task);
        Ok(())
    }

    /// A clonable handle for enqueuing work while the run is in progress.
    ///
    /// Typically captured by a task's execute closure so it can install
    /// per-artifact sub-tasks it discovers along the way.
    pub fn handle(&self) -> QueueHandle {
        QueueHandle {
            tx: self.tx.clone(),
        }
    }

    /// Number of tasks currently waiting to be dispatched.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn options(&self) -> &PoolOptions {
        &self.options
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("options", &self.options)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

/// Sender half used for dynamic enqueues from in-flight tasks.
#[derive(Debug, Clone)]
pub struct QueueHandle {
    tx: mpsc::Sender<QueueEvent>,
}

impl QueueHandle {
    /// Submit a task to the running queue.
    ///
    /// The task joins the same readiness scan as everything else and is
    /// eligible for dispatch as soon as its prerequisites are decided.
    /// Fails only if the run has already ended.
    pub async fn enqueue(&self, task: TaskHandle) -> Result<()> {
        self.tx
            .send(QueueEvent::Enqueued { task })
            .await
            .map_err(|_| EngineError::ChannelClosed)
    }
}

pub(crate) fn validate_enqueue(seen: &[TaskHandle], task: &TaskHandle) -> Result<()> {
    if task.result().is_some() {
        return Err(EngineError::AlreadyTerminal(task.name().to_string()));
    }
    if seen.iter().any(|t| Arc::ptr_eq(t, task)) {
        return Err(EngineError::DuplicateEnqueue(task.name().to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;
    use crate::task::Task;

    #[tokio::test]
    async fn enqueue_rejects_terminal_tasks() {
        let task = Task::from_fn("done", || async { Ok(Outcome::Success) });
        task.run().await.unwrap();

        let mut queue = TaskQueue::new(PoolOptions::default());
        let err = queue.enqueue(task).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyTerminal(name) if name == "done"));
    }

    #[test]
    fn enqueue_rejects_duplicate_handles() {
        let task = Task::from_fn("t", || async { Ok(Outcome::Success) });
        let mut queue = TaskQueue::new(PoolOptions::default());

        queue.enqueue(Arc::clone(&task)).unwrap();
        let err = queue.enqueue(task).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateEnqueue(name) if name == "t"));
    }

    #[test]
    fn same_name_different_instance_is_fine() {
        // Names are diagnostics only; identity is per handle.
        let a = Task::from_fn("same", || async { Ok(Outcome::Success) });
        let b = Task::from_fn("same", || async { Ok(Outcome::Success) });

        let mut queue = TaskQueue::new(PoolOptions::default());
        queue.enqueue(a).unwrap();
        queue.enqueue(b).unwrap();
        assert_eq!(queue.len(), 2);
    }
}
