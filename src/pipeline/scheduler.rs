// src/pipeline/scheduler.rs

//! Per-run task state tracking.
//!
//! Tasks are independent leaves: triggering one never implies another, and
//! a run is simply the set of tasks dispatched together. The scheduler
//! remembers which tasks participate in the active run, hands out run IDs,
//! and declares the run finished once every participant is terminal.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::engine::{TaskName, TaskOutcome};

use super::task::ScheduledTask;

/// Where a task stands relative to the active run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// Not participating in the active run.
    NotInRun,
    /// Dispatched to the executor, not yet completed.
    Running,
    DoneSuccess,
    DoneFailed,
}

#[derive(Debug)]
pub struct Scheduler {
    states: HashMap<TaskName, Option<TaskRunState>>,
    /// Monotonically increasing run ID.
    run_counter: u64,
    /// Currently active run ID, or `None` when idle.
    current_run_id: Option<u64>,
}

impl Scheduler {
    pub fn new(task_names: impl IntoIterator<Item = TaskName>) -> Self {
        let states = task_names.into_iter().map(|n| (n, None)).collect();
        Self {
            states,
            run_counter: 0,
            current_run_id: None,
        }
    }

    /// `true` when there is no active run.
    pub fn is_idle(&self) -> bool {
        self.current_run_id.is_none()
    }

    /// Run state of `task` within the active run. `None` for unknown tasks.
    pub fn run_state_of(&self, task: &str) -> Option<TaskRunState> {
        if self.current_run_id.is_none() {
            return self.states.get(task).map(|_| TaskRunState::NotInRun);
        }
        self.states
            .get(task)
            .map(|s| s.unwrap_or(TaskRunState::NotInRun))
    }

    /// Start a new run, clearing all per-run state.
    pub fn start_new_run(&mut self) {
        self.run_counter += 1;
        self.current_run_id = Some(self.run_counter);

        for state in self.states.values_mut() {
            *state = None;
        }

        debug!(run_id = self.run_counter, "scheduler: starting new run");
    }

    /// Mark `task` as part of the active run and return it as ready to
    /// dispatch. Starts a run implicitly if none is active.
    ///
    /// Returns an empty vector for unknown tasks and for tasks already
    /// running in this run (the caller queues re-triggers).
    pub fn handle_trigger(&mut self, task: &str) -> Vec<ScheduledTask> {
        if self.current_run_id.is_none() {
            self.start_new_run();
        }
        let run_id = self.run_counter;

        match self.states.get_mut(task) {
            None => {
                warn!(task = %task, "trigger for unknown task; ignoring");
                Vec::new()
            }
            Some(state @ None) | Some(state @ Some(TaskRunState::NotInRun)) => {
                *state = Some(TaskRunState::Running);
                vec![ScheduledTask {
                    name: task.to_string(),
                    run_id,
                }]
            }
            Some(Some(TaskRunState::Running)) => {
                debug!(task = %task, run_id, "task already running in this run");
                Vec::new()
            }
            Some(state @ Some(_)) => {
                // Finished earlier in this run; re-enter it.
                *state = Some(TaskRunState::Running);
                vec![ScheduledTask {
                    name: task.to_string(),
                    run_id,
                }]
            }
        }
    }

    /// Record a task's outcome. Returns `true` if this completion finished
    /// the active run.
    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> bool {
        let Some(run_id) = self.current_run_id else {
            warn!(task = %task, "completion with no active run; ignoring");
            return false;
        };

        match self.states.get_mut(task) {
            Some(state) => {
                *state = Some(match outcome {
                    TaskOutcome::Success => {
                        debug!(task = %task, run_id, "task completed successfully");
                        TaskRunState::DoneSuccess
                    }
                    TaskOutcome::Failed => {
                        warn!(task = %task, run_id, "task failed");
                        TaskRunState::DoneFailed
                    }
                });
            }
            None => {
                warn!(task = %task, "completion for unknown task; ignoring");
            }
        }

        self.maybe_finish_run()
    }

    /// Clear `current_run_id` once every participating task is terminal.
    fn maybe_finish_run(&mut self) -> bool {
        if self.current_run_id.is_none() {
            return false;
        }

        let all_terminal = self.states.values().all(|s| {
            matches!(
                s,
                None | Some(TaskRunState::DoneSuccess) | Some(TaskRunState::DoneFailed)
            )
        });

        if all_terminal {
            info!(
                run_id = self.current_run_id,
                "scheduler: all tasks terminal; run finished"
            );
            self.current_run_id = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> Scheduler {
        Scheduler::new(["styles".to_string(), "scripts".to_string()])
    }

    #[test]
    fn trigger_starts_run_and_dispatches() {
        let mut s = scheduler();
        assert!(s.is_idle());

        let ready = s.handle_trigger("styles");
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].name, "styles");
        assert_eq!(ready[0].run_id, 1);
        assert!(!s.is_idle());
        assert_eq!(s.run_state_of("styles"), Some(TaskRunState::Running));
    }

    #[test]
    fn second_trigger_merges_into_active_run() {
        let mut s = scheduler();
        s.handle_trigger("styles");
        let ready = s.handle_trigger("scripts");
        assert_eq!(ready[0].run_id, 1);
    }

    #[test]
    fn retrigger_while_running_dispatches_nothing() {
        let mut s = scheduler();
        s.handle_trigger("styles");
        assert!(s.handle_trigger("styles").is_empty());
    }

    #[test]
    fn run_finishes_when_all_participants_terminal() {
        let mut s = scheduler();
        s.handle_trigger("styles");
        s.handle_trigger("scripts");

        assert!(!s.handle_completion("styles", TaskOutcome::Success));
        assert!(s.handle_completion("scripts", TaskOutcome::Failed));
        assert!(s.is_idle());
    }

    #[test]
    fn run_ids_increase_across_runs() {
        let mut s = scheduler();
        s.handle_trigger("styles");
        s.handle_completion("styles", TaskOutcome::Success);

        let ready = s.handle_trigger("styles");
        assert_eq!(ready[0].run_id, 2);
    }

    #[test]
    fn unknown_task_is_ignored() {
        let mut s = scheduler();
        assert!(s.handle_trigger("nope").is_empty());
        // The implicit run has no participants, so it finishes immediately
        // on the next completion check.
        assert!(!s.is_idle());
        s.handle_trigger("styles");
        s.handle_completion("styles", TaskOutcome::Success);
        assert!(s.is_idle());
    }
}
