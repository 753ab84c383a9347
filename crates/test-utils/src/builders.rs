#![allow(dead_code)]

//! Ready-made tasks for queue and composite tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskdag::{Outcome, Task, TaskHandle};

/// Shared execution log; builders that record append their task name when
/// their body actually runs.
pub type ExecLog = Arc<Mutex<Vec<String>>>;

pub fn new_exec_log() -> ExecLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// A dependency-free task that finishes with the given outcome.
pub fn finishing_with(name: &str, outcome: Outcome) -> TaskHandle {
    Task::from_fn(name, move || async move { Ok(outcome) })
}

/// A dependency-free task that succeeds.
pub fn succeeding(name: &str) -> TaskHandle {
    finishing_with(name, Outcome::Success)
}

/// A task whose execute body returns an unexpected error.
pub fn erroring(name: &str) -> TaskHandle {
    Task::from_fn(name, || async { Err(anyhow::anyhow!("simulated unexpected failure")) })
}

/// A task whose execute body panics.
pub fn panicking(name: &str) -> TaskHandle {
    Task::from_fn(name, || async { panic!("simulated panic in task body") })
}

/// A task that records its name in `log` when executed, then finishes with
/// `outcome`.
pub fn recording(name: &str, outcome: Outcome, log: &ExecLog) -> TaskHandle {
    let log = Arc::clone(log);
    let owned = name.to_string();
    Task::from_fn(name, move || {
        let log = Arc::clone(&log);
        let owned = owned.clone();
        async move {
            log.lock().unwrap().push(owned);
            Ok(outcome)
        }
    })
}

/// A recording task that sleeps before finishing, to hold a worker slot.
pub fn slow_recording(
    name: &str,
    outcome: Outcome,
    delay: Duration,
    log: &ExecLog,
) -> TaskHandle {
    let log = Arc::clone(log);
    let owned = name.to_string();
    Task::from_fn(name, move || {
        let log = Arc::clone(&log);
        let owned = owned.clone();
        async move {
            tokio::time::sleep(delay).await;
            log.lock().unwrap().push(owned);
            Ok(outcome)
        }
    })
}

/// A recording task that becomes runnable only once `gate` has a result.
pub fn recording_after(
    name: &str,
    gate: &TaskHandle,
    outcome: Outcome,
    log: &ExecLog,
) -> TaskHandle {
    let log = Arc::clone(log);
    let owned = name.to_string();
    let gate = Arc::clone(gate);
    Task::from_fn_when(
        name,
        move || gate.result().is_some(),
        move || {
            let log = Arc::clone(&log);
            let owned = owned.clone();
            async move {
                log.lock().unwrap().push(owned);
                Ok(outcome)
            }
        },
    )
}

/// A task that can never become runnable; useful for stuck-run tests.
pub fn never_runnable(name: &str) -> TaskHandle {
    Task::from_fn_when(name, || false, || async { Ok(Outcome::Success) })
}
