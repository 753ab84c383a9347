// src/task/mod.rs

//! The schedulable unit of work.
//!
//! A [`Task`] pairs a diagnostic name with a [`Work`] implementation (the
//! readiness predicate plus the execute step) and a write-once result slot.
//! Tasks are shared as [`TaskHandle`]s; dependency bookkeeping always
//! compares handles by identity ([`Arc::ptr_eq`]), never by name.

pub mod composite;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::errors::{EngineError, Result};
use crate::outcome::Outcome;

/// Boxed future returned by [`Work::execute`].
pub type WorkFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<Outcome>> + Send + 'a>>;

/// Capability interface a task-producing collaborator implements.
///
/// The queue only ever calls through this trait; concrete work (pushing
/// artifacts, running remote actions, filesystem operations, ...) lives
/// entirely behind it.
pub trait Work: Send + Sync {
    /// Pure, side-effect-free readiness predicate.
    ///
    /// May be evaluated arbitrarily many times before the task runs, so it
    /// must only read currently-visible state (typically the results of
    /// other tasks). Tasks with no prerequisites return `true` from
    /// construction onwards.
    fn is_runnable(&self) -> bool;

    /// Perform the work, producing a terminal [`Outcome`].
    ///
    /// Returning `Err` signals an unexpected failure; the task boundary
    /// converts it to [`Outcome::Error`] rather than propagating it.
    fn execute(&self) -> WorkFuture<'_>;
}

/// Shared handle to a [`Task`].
///
/// The queue and any composites hold clones of the same `Arc`; result
/// lookups always go through the one instance.
pub type TaskHandle = Arc<Task>;

/// A unit of schedulable work with a one-shot terminal result.
pub struct Task {
    name: String,
    work: Box<dyn Work>,
    result: OnceLock<Outcome>,
}

impl Task {
    /// Wrap a [`Work`] implementation into a shareable task.
    pub fn new(name: impl Into<String>, work: impl Work + 'static) -> TaskHandle {
        Arc::new(Self {
            name: name.into(),
            work: Box::new(work),
            result: OnceLock::new(),
        })
    }

    /// A task with no prerequisites: runnable immediately, executes `f`.
    pub fn from_fn<F, Fut>(name: impl Into<String>, f: F) -> TaskHandle
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Outcome>> + Send + 'static,
    {
        Self::from_fn_when(name, || true, f)
    }

    /// A task with a caller-supplied readiness predicate.
    ///
    /// `runnable` must be pure; it is typically a closure over the
    /// [`TaskHandle`]s of prerequisite tasks, inspecting their results.
    pub fn from_fn_when<P, F, Fut>(name: impl Into<String>, runnable: P, f: F) -> TaskHandle
    where
        P: Fn() -> bool + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Outcome>> + Send + 'static,
    {
        Self::new(name, FnWork { runnable, run: f })
    }

    /// Diagnostic name. Not used for identity or dependency lookup.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The frozen terminal result, or `None` while the task is pending.
    pub fn result(&self) -> Option<Outcome> {
        self.result.get().copied()
    }

    /// Whether the task's declared prerequisites are satisfied.
    pub fn is_runnable(&self) -> bool {
        self.work.is_runnable()
    }

    /// Execute the task exactly once.
    ///
    /// - Calling `run` on a task that already has a result is a programming
    ///   error and fails with [`EngineError::TaskReuse`].
    /// - An `Err` from the execute step is caught here and recorded as
    ///   [`Outcome::Error`]; it never propagates to the caller.
    pub async fn run(&self) -> Result<()> {
        if self.result.get().is_some() {
            return Err(EngineError::TaskReuse(self.name.clone()));
        }

        debug!(task = %self.name, "running");

        let outcome = match self.work.execute().await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(task = %self.name, error = %err, "task body raised an unexpected error");
                Outcome::Error
            }
        };

        // Publishing through the OnceLock gives every later reader a fully
        // synchronized view of the result.
        if self.result.set(outcome).is_err() {
            return Err(EngineError::TaskReuse(self.name.clone()));
        }

        if outcome.is_success() {
            debug!(task = %self.name, "success");
        } else {
            warn!(task = %self.name, outcome = %outcome, "warning");
        }

        Ok(())
    }

    /// Force-resolve a task whose execute future never reached the normal
    /// publish path (the worker observed a panic). No-op if a result is
    /// already set.
    pub(crate) fn resolve_abnormal(&self, outcome: Outcome) {
        if self.result.set(outcome).is_ok() {
            warn!(task = %self.name, outcome = %outcome, "warning");
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("result", &self.result.get())
            .finish_non_exhaustive()
    }
}

/// Closure-backed [`Work`] used by `from_fn` / `from_fn_when`.
struct FnWork<P, F> {
    runnable: P,
    run: F,
}

impl<P, F, Fut> Work for FnWork<P, F>
where
    P: Fn() -> bool + Send + Sync,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Outcome>> + Send + 'static,
{
    fn is_runnable(&self) -> bool {
        (self.runnable)()
    }

    fn execute(&self) -> WorkFuture<'_> {
        Box::pin((self.run)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_freezes_result_and_rejects_reuse() {
        let task = Task::from_fn("once", || async { Ok(Outcome::Success) });
        assert!(task.result().is_none());

        task.run().await.unwrap();
        assert_eq!(task.result(), Some(Outcome::Success));

        let err = task.run().await.unwrap_err();
        assert!(matches!(err, EngineError::TaskReuse(name) if name == "once"));
        assert_eq!(task.result(), Some(Outcome::Success));
    }

    #[tokio::test]
    async fn dependency_free_task_is_runnable_from_construction() {
        let task = Task::from_fn("free", || async { Ok(Outcome::Success) });
        assert!(task.is_runnable());
    }

    #[tokio::test]
    async fn execute_error_is_recorded_not_propagated() {
        let task = Task::from_fn("broken", || async {
            Err(anyhow::anyhow!("remote shell disconnected"))
        });

        // `run` itself succeeds; the failure lands in the result slot.
        task.run().await.unwrap();
        assert_eq!(task.result(), Some(Outcome::Error));
    }

    #[tokio::test]
    async fn predicate_gates_runnability() {
        let dep = Task::from_fn("dep", || async { Ok(Outcome::Success) });
        let gated = {
            let dep = dep.clone();
            Task::from_fn_when(
                "gated",
                move || dep.result().is_some(),
                || async { Ok(Outcome::Success) },
            )
        };

        assert!(!gated.is_runnable());
        dep.run().await.unwrap();
        assert!(gated.is_runnable());
    }

    #[test]
    fn resolve_abnormal_never_overwrites() {
        let task = Task::from_fn("t", || async { Ok(Outcome::Success) });
        task.resolve_abnormal(Outcome::Error);
        task.resolve_abnormal(Outcome::ExecFailed);
        assert_eq!(task.result(), Some(Outcome::Error));
    }
}
