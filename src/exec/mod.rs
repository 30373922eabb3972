// src/exec/mod.rs

//! Task execution layer.
//!
//! Runs the asset transforms for scheduled tasks and reports back to the
//! orchestration runtime via `RuntimeEvent`s.
//!
//! - [`executor_loop`] owns the main executor loop that manages in-flight
//!   task work.
//! - [`task_runner`] executes one task: collect sources, skip fresh
//!   outputs, transform, write, notify reload.
//! - [`backend`] provides the `ExecutorBackend` trait and the concrete
//!   `RealExecutorBackend` the runtime uses in production; tests can
//!   substitute a fake implementation.

pub mod backend;
pub mod executor_loop;
pub mod task_runner;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use executor_loop::spawn_executor;
pub use task_runner::{PipelineContext, TaskReport, execute_spec};
