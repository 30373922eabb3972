// src/pipeline/mod.rs

//! Task definitions and per-run scheduling.

pub mod clean;
pub mod registry;
pub mod scheduler;
pub mod task;

pub use registry::TaskRegistry;
pub use scheduler::{Scheduler, TaskRunState};
pub use task::{OutputMode, ReloadKind, ScheduledTask, TaskKind, TaskSpec};
