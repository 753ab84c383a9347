// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("task `{0}` has already run and may not be run again")]
    TaskReuse(String),

    #[error("task `{0}` already has a terminal result and cannot be enqueued")]
    AlreadyTerminal(String),

    #[error("task `{0}` is already enqueued in this queue")]
    DuplicateEnqueue(String),

    #[error("run is stuck: no pending task can become runnable (cycle or unmet prerequisite): {pending:?}")]
    StuckRun { pending: Vec<String> },

    #[error("queue event channel closed while tasks were still in flight")]
    ChannelClosed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, EngineError>;
