// src/engine/mod.rs

//! Orchestration engine.
//!
//! Ties together:
//! - the per-run task scheduler
//! - the trigger queue (what happens when triggers arrive mid-run)
//! - the runtime event loop reacting to file-watch triggers, task
//!   completions, and shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Outcome of a task run for the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Manual trigger (e.g. the initial build at startup).
    Manual,
    /// Triggered by a filesystem event.
    FileWatch,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Exit the runtime once all tasks are idle and no triggers are queued.
    /// Set for one-shot builds; unset in serve/watch mode.
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from watchers and executors.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A task should be (logically) triggered.
    TaskTriggered {
        task: TaskName,
        reason: TriggerReason,
    },
    /// A task finished with a concrete outcome.
    TaskCompleted {
        task: TaskName,
        outcome: TaskOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod queue;
pub mod runtime;

pub use core::{CoreCommand, CoreRuntime, CoreStep};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
