// src/queue/runner.rs

//! The scheduling loop that drives a queue of tasks to quiescence.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::errors::{EngineError, Result};
use crate::outcome::Outcome;
use crate::queue::{validate_enqueue, QueueEvent, TaskQueue};
use crate::task::TaskHandle;

/// One terminal result per completed task, in completion order.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub name: String,
    pub outcome: Outcome,
}

/// Summary of a finished run.
///
/// Entry order is completion order, which for mutually-independent tasks is
/// not deterministic; consumers needing per-task lookups should keep their
/// own [`TaskHandle`]s and read results from those.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub entries: Vec<TaskSummary>,
    pub succeeded: usize,
    /// Tasks that declared themselves inapplicable ([`Outcome::Unsupported`]).
    pub skipped: usize,
    pub failed: usize,
}

impl RunReport {
    fn record(&mut self, name: &str, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.succeeded += 1,
            Outcome::Unsupported => self.skipped += 1,
            _ => self.failed += 1,
        }
        self.entries.push(TaskSummary {
            name: name.to_string(),
            outcome,
        });
    }

    /// Whether no completed task failed. Skipped tasks do not count
    /// against success.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

impl TaskQueue {
    /// Drive every enqueued task (including ones enqueued mid-run) to a
    /// terminal result.
    ///
    /// The loop alternates between a readiness scan over the pending set
    /// (dispatching every runnable task to a semaphore-bounded worker) and
    /// waiting on the event channel for a completion or a dynamic enqueue.
    /// It never busy-spins: with work in flight it blocks on the channel.
    ///
    /// Returns [`EngineError::StuckRun`] when pending tasks remain but
    /// nothing is runnable and nothing is executing (a dependency cycle or
    /// a permanently-unmet prerequisite), naming the tasks that never ran.
    ///
    /// A task's own failure never aborts the run; only programming errors
    /// (reuse, stuck configuration) do.
    pub async fn run_all(mut self) -> Result<RunReport> {
        let workers = self.options().effective_workers();
        info!(
            label = %self.options().label,
            workers,
            pending = self.pending.len(),
            "queue run starting"
        );

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut in_flight = 0usize;
        let mut report = RunReport::default();

        loop {
            // Readiness scan, in enqueue order. Dispatching frees no new
            // prerequisites, so a single pass per wakeup suffices.
            let mut i = 0;
            while i < self.pending.len() {
                if self.pending[i].is_runnable() {
                    let task = self.pending.remove(i);
                    self.dispatch(task, &semaphore);
                    in_flight += 1;
                } else {
                    i += 1;
                }
            }

            if in_flight == 0 {
                // Nothing executing. Absorb enqueues already sitting in the
                // channel before declaring the run finished or stuck.
                let mut absorbed_any = false;
                while let Ok(event) = self.rx.try_recv() {
                    self.absorb(event, &mut report, &mut in_flight)?;
                    absorbed_any = true;
                }
                if absorbed_any {
                    continue;
                }

                if self.pending.is_empty() {
                    break;
                }

                let pending: Vec<String> = self
                    .pending
                    .iter()
                    .map(|t| t.name().to_string())
                    .collect();
                error!(
                    ?pending,
                    "no task is runnable and none is executing; aborting run"
                );
                return Err(EngineError::StuckRun { pending });
            }

            match self.rx.recv().await {
                Some(event) => self.absorb(event, &mut report, &mut in_flight)?,
                // Unreachable while `self.tx` is alive, but don't hang if it
                // ever happens.
                None => return Err(EngineError::ChannelClosed),
            }
        }

        info!(
            label = %self.options().label,
            completed = report.entries.len(),
            failed = report.failed,
            "queue run finished"
        );
        Ok(report)
    }

    /// Hand a runnable task to a worker.
    ///
    /// The worker body runs on its own spawn so that a panicking execute
    /// future is contained there and surfaced as [`Outcome::Error`] instead
    /// of taking the scheduler down.
    fn dispatch(&self, task: TaskHandle, semaphore: &Arc<Semaphore>) {
        debug!(task = %task, "dispatching");
        let tx = self.tx.clone();
        let semaphore = Arc::clone(semaphore);

        tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            let run = {
                let body = Arc::clone(&task);
                match tokio::spawn(async move { body.run().await }).await {
                    Ok(run) => run,
                    Err(join_err) => {
                        error!(task = %task, error = %join_err, "task body panicked");
                        task.resolve_abnormal(Outcome::Error);
                        Ok(())
                    }
                }
            };

            // Receiver gone means the run was aborted; nothing left to do.
            let _ = tx.send(QueueEvent::Finished { task, run }).await;
        });
    }

    /// Fold one event into the loop state.
    fn absorb(
        &mut self,
        event: QueueEvent,
        report: &mut RunReport,
        in_flight: &mut usize,
    ) -> Result<()> {
        match event {
            QueueEvent::Finished { task, run } => {
                *in_flight -= 1;
                // A reuse violation is a programming error; halt the run.
                run?;
                let outcome = task.result().unwrap_or(Outcome::Error);
                debug!(task = %task, outcome = %outcome, "task finished");
                report.record(task.name(), outcome);
            }
            QueueEvent::Enqueued { task } => match validate_enqueue(&self.seen, &task) {
                Ok(()) => {
                    debug!(task = %task, "task enqueued mid-run");
                    self.seen.push(Arc::clone(&task));
                    self.pending.push(task);
                }
                Err(err) => {
                    // No caller to hand the error back to; record and drop.
                    warn!(task = %task, error = %err, "rejecting mid-run enqueue");
                }
            },
        }
        Ok(())
    }
}
