// src/outcome.rs

//! Terminal outcomes for a unit of work.

use std::fmt;

use serde::Serialize;

/// The closed set of terminal results a task may produce.
///
/// A task's result slot moves from "unset" to exactly one of these variants
/// exactly once; pending is represented by the absence of an `Outcome`
/// (`Task::result()` returning `None`), not by a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The task did what it set out to do.
    Success,
    /// The task declared itself inapplicable and was skipped.
    Unsupported,
    /// The work the task ran reported a failure (e.g. a remote action
    /// exited unsuccessfully, or a prerequisite's failure was propagated).
    ExecFailed,
    /// The work the task ran exceeded its own deadline.
    ExecTimedOut,
    /// The task's body raised an unexpected error or panicked.
    Error,
}

impl Outcome {
    /// `true` only for [`Outcome::Success`].
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Success => "success",
            Outcome::Unsupported => "unsupported",
            Outcome::ExecFailed => "exec_failed",
            Outcome::ExecTimedOut => "exec_timed_out",
            Outcome::Error => "error",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_success_is_success() {
        assert!(Outcome::Success.is_success());
        for o in [
            Outcome::Unsupported,
            Outcome::ExecFailed,
            Outcome::ExecTimedOut,
            Outcome::Error,
        ] {
            assert!(!o.is_success());
        }
    }
}
