// src/task/composite.rs

//! The "upon success of" composite task.
//!
//! A composite is a plain [`Task`] whose readiness is "every prerequisite
//! has a decided result" and whose execute step does no independent work:
//! it reduces the prerequisites' outcomes to a single terminal outcome.

use tracing::warn;

use crate::outcome::Outcome;
use crate::task::{Task, TaskHandle, Work, WorkFuture};

impl Task {
    /// A task that completes only once every task in `prereqs` has a result.
    ///
    /// - Runnable iff every prerequisite has a non-pending result; a
    ///   prerequisite's *failure* still counts as decided and unblocks the
    ///   composite.
    /// - Its outcome is the first non-success outcome among the
    ///   prerequisites in the order given here, or [`Outcome::Success`] if
    ///   all of them succeeded. Scanning in declaration order keeps the
    ///   aggregate deterministic even when prerequisites finished out of
    ///   temporal order.
    ///
    /// The composite holds read-only handles; it never re-triggers or
    /// otherwise drives its prerequisites.
    pub fn upon_success_of(prereqs: Vec<TaskHandle>) -> TaskHandle {
        let names: Vec<&str> = prereqs.iter().map(|t| t.name()).collect();
        let name = format!("completion of [{}]", names.join(", "));
        Task::new(name, CompositeWork { prereqs })
    }
}

struct CompositeWork {
    prereqs: Vec<TaskHandle>,
}

impl CompositeWork {
    fn reduce(&self) -> Outcome {
        for task in &self.prereqs {
            match task.result() {
                Some(outcome) if outcome.is_success() => {}
                Some(outcome) => return outcome,
                None => {
                    // Only reachable if someone executes the composite by
                    // hand before it is runnable.
                    warn!(task = %task, "composite executed before prerequisite was decided");
                    return Outcome::Error;
                }
            }
        }
        Outcome::Success
    }
}

impl Work for CompositeWork {
    fn is_runnable(&self) -> bool {
        self.prereqs.iter().all(|t| t.result().is_some())
    }

    fn execute(&self) -> WorkFuture<'_> {
        let outcome = self.reduce();
        Box::pin(async move { Ok(outcome) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn succeeding(name: &str) -> TaskHandle {
        Task::from_fn(name, || async { Ok(Outcome::Success) })
    }

    fn failing(name: &str, outcome: Outcome) -> TaskHandle {
        Task::from_fn(name, move || async move { Ok(outcome) })
    }

    #[tokio::test]
    async fn not_runnable_until_every_prereq_is_decided() {
        let a = succeeding("a");
        let b = failing("b", Outcome::ExecFailed);
        let c = succeeding("c");
        let all = Task::upon_success_of(vec![a.clone(), b.clone(), c.clone()]);

        assert!(!all.is_runnable());
        a.run().await.unwrap();
        assert!(!all.is_runnable());
        b.run().await.unwrap();
        assert!(!all.is_runnable());
        c.run().await.unwrap();

        // A failed prerequisite still counts as decided.
        assert!(all.is_runnable());
    }

    #[tokio::test]
    async fn reduction_takes_first_non_success_in_declaration_order() {
        let a = succeeding("a");
        let b = failing("b", Outcome::ExecTimedOut);
        let c = failing("c", Outcome::ExecFailed);
        let all = Task::upon_success_of(vec![a.clone(), b.clone(), c.clone()]);

        // Decide prerequisites out of declaration order.
        c.run().await.unwrap();
        a.run().await.unwrap();
        b.run().await.unwrap();

        all.run().await.unwrap();
        assert_eq!(all.result(), Some(Outcome::ExecTimedOut));
    }

    #[tokio::test]
    async fn all_successes_reduce_to_success() {
        let a = succeeding("a");
        let b = succeeding("b");
        let all = Task::upon_success_of(vec![a.clone(), b.clone()]);

        a.run().await.unwrap();
        b.run().await.unwrap();
        all.run().await.unwrap();

        assert_eq!(all.result(), Some(Outcome::Success));
    }

    #[tokio::test]
    async fn empty_prerequisite_set_is_immediately_successful() {
        let all = Task::upon_success_of(Vec::new());
        assert!(all.is_runnable());
        all.run().await.unwrap();
        assert_eq!(all.result(), Some(Outcome::Success));
    }

    #[test]
    fn name_describes_the_prerequisites() {
        let a = succeeding("push");
        let b = succeeding("compile");
        let all = Task::upon_success_of(vec![a, b]);
        assert_eq!(all.name(), "completion of [push, compile]");
    }
}
