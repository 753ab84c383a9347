// src/lib.rs

//! `taskdag`: a dependency-aware task execution engine.
//!
//! The crate coordinates a set of operations where some may only run after
//! others have produced a result (preparing a remote environment, pushing
//! artifacts, running actions, retrieving results, cleaning up). It
//! provides:
//!
//! - [`Outcome`]: the closed set of terminal results a task can produce.
//! - [`Task`] / [`Work`]: the schedulable unit, with a pure readiness
//!   predicate, an execute step, and a write-once result slot.
//! - [`Task::upon_success_of`]: a composite task that unblocks once a set
//!   of prerequisites all have results and reduces their outcomes to one.
//! - [`TaskQueue`]: owns the tasks for one run and drives them to
//!   quiescence on a bounded worker pool, running independent tasks in
//!   parallel and reporting a stuck configuration instead of hanging.
//!
//! Concrete work (remote transports, compilers, filesystem operations) is
//! supplied by the embedding application through the [`Work`] trait; the
//! engine only ever calls through that interface.
//!
//! ```no_run
//! use taskdag::{Outcome, PoolOptions, Task, TaskQueue};
//!
//! # async fn demo() -> taskdag::Result<()> {
//! let prepare = Task::from_fn("prepare device", || async { Ok(Outcome::Success) });
//! let after_prepare = Task::upon_success_of(vec![prepare.clone()]);
//! let push = {
//!     let gate = after_prepare.clone();
//!     Task::from_fn_when(
//!         "push artifacts",
//!         move || gate.result().is_some(),
//!         || async { Ok(Outcome::Success) },
//!     )
//! };
//!
//! let mut queue = TaskQueue::new(PoolOptions::per_cpu());
//! queue.enqueue(prepare)?;
//! queue.enqueue(after_prepare)?;
//! queue.enqueue(push)?;
//! let report = queue.run_all().await?;
//! assert!(report.all_succeeded());
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod logging;
pub mod outcome;
pub mod queue;
pub mod task;

pub use errors::{EngineError, Result};
pub use outcome::Outcome;
pub use queue::{PoolOptions, QueueHandle, RunReport, TaskQueue, TaskSummary};
pub use task::{Task, TaskHandle, Work, WorkFuture};
