// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! A synchronous, deterministic core that consumes [`RuntimeEvent`]s and
//! produces commands describing what the IO shell should do next. The
//! async shell (`engine::runtime::Runtime`) reads events from channels,
//! sends [`ScheduledTask`]s to the executor, and handles Ctrl-C.
//!
//! The core has no channels, no Tokio types, and performs no IO, so the
//! trigger/queue/completion semantics can be unit tested directly.

use std::collections::HashSet;

use crate::pipeline::{ScheduledTask, Scheduler, TaskRunState};

use super::queue::TriggerQueue;
use super::{RuntimeEvent, RuntimeOptions, TaskName, TaskOutcome, TriggerReason};

/// Command produced by the pure core, executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Send these tasks to the executor.
    DispatchTasks(Vec<ScheduledTask>),
    /// Request process exit (one-shot builds once everything is idle).
    RequestExit,
}

/// Decision returned by the core after handling a single [`RuntimeEvent`].
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Pure core runtime state: the scheduler, the trigger queue, and the
/// runtime options.
#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
    queue: TriggerQueue,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(scheduler: Scheduler, queue_length: usize, options: RuntimeOptions) -> Self {
        Self {
            scheduler,
            queue: TriggerQueue::new(queue_length),
            options,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Handle a single runtime event, returning the resulting commands.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => self.handle_trigger(task, reason),
            RuntimeEvent::TaskCompleted { task, outcome } => {
                self.handle_completion(task, outcome)
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }

    /// Trigger handling:
    /// - Idle: start a new run seeded with this trigger plus anything
    ///   already queued.
    /// - Run active, task not yet in it: merge into the active run and
    ///   dispatch immediately.
    /// - Run active, task already running: queue it for a trailing run, so
    ///   an edit that lands mid-run is never lost.
    fn handle_trigger(&mut self, task: TaskName, _reason: TriggerReason) -> CoreStep {
        if self.scheduler.is_idle() {
            let mut triggers: HashSet<TaskName> =
                self.queue.drain_pending().into_iter().collect();
            triggers.insert(task);
            return self.start_run_from(triggers.into_iter().collect());
        }

        match self.scheduler.run_state_of(&task) {
            None => CoreStep::running(Vec::new()),
            Some(TaskRunState::Running) => {
                self.queue.record_trigger(&task);
                CoreStep::running(Vec::new())
            }
            Some(_) => {
                let ready = self.scheduler.handle_trigger(&task);
                CoreStep::running(dispatch(ready))
            }
        }
    }

    fn handle_completion(&mut self, task: TaskName, outcome: TaskOutcome) -> CoreStep {
        let run_finished = self.scheduler.handle_completion(&task, outcome);

        let mut commands = Vec::new();
        if run_finished {
            // One queued batch per run; later batches wait their turn.
            let queued = self.queue.pop_next_run();
            if !queued.is_empty() {
                let mut step = self.start_run_from(queued);
                commands.append(&mut step.commands);
            }
        }

        let mut keep_running = true;
        if self.options.exit_when_idle && self.scheduler.is_idle() && self.queue.is_empty() {
            keep_running = false;
            commands.push(CoreCommand::RequestExit);
        }

        CoreStep {
            commands,
            keep_running,
        }
    }

    fn start_run_from(&mut self, triggers: Vec<TaskName>) -> CoreStep {
        if triggers.is_empty() {
            return CoreStep::running(Vec::new());
        }

        self.scheduler.start_new_run();
        let mut ready = Vec::new();
        for task in triggers {
            ready.extend(self.scheduler.handle_trigger(&task));
        }

        CoreStep::running(dispatch(ready))
    }
}

fn dispatch(tasks: Vec<ScheduledTask>) -> Vec<CoreCommand> {
    if tasks.is_empty() {
        Vec::new()
    } else {
        vec![CoreCommand::DispatchTasks(tasks)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(exit_when_idle: bool) -> CoreRuntime {
        let scheduler = Scheduler::new(["styles".to_string(), "scripts".to_string()]);
        CoreRuntime::new(scheduler, 1, RuntimeOptions { exit_when_idle })
    }

    fn trigger(task: &str) -> RuntimeEvent {
        RuntimeEvent::TaskTriggered {
            task: task.to_string(),
            reason: TriggerReason::FileWatch,
        }
    }

    fn completed(task: &str) -> RuntimeEvent {
        RuntimeEvent::TaskCompleted {
            task: task.to_string(),
            outcome: TaskOutcome::Success,
        }
    }

    fn dispatched(step: &CoreStep) -> Vec<String> {
        step.commands
            .iter()
            .flat_map(|c| match c {
                CoreCommand::DispatchTasks(ts) => {
                    ts.iter().map(|t| t.name.clone()).collect::<Vec<_>>()
                }
                CoreCommand::RequestExit => Vec::new(),
            })
            .collect()
    }

    #[test]
    fn idle_trigger_dispatches_immediately() {
        let mut core = core(false);
        let step = core.step(trigger("styles"));
        assert_eq!(dispatched(&step), vec!["styles"]);
        assert!(step.keep_running);
    }

    #[test]
    fn retrigger_mid_run_queues_a_trailing_run() {
        let mut core = core(false);
        core.step(trigger("styles"));

        // Same task again while running: queued, not dispatched.
        let step = core.step(trigger("styles"));
        assert!(dispatched(&step).is_empty());
        assert!(!core.queue_is_empty());

        // Completion finishes the run and immediately starts the queued one.
        let step = core.step(completed("styles"));
        assert_eq!(dispatched(&step), vec!["styles"]);
        assert!(core.queue_is_empty());
    }

    #[test]
    fn unrelated_task_merges_into_active_run() {
        let mut core = core(false);
        core.step(trigger("styles"));
        let step = core.step(trigger("scripts"));
        assert_eq!(dispatched(&step), vec!["scripts"]);
    }

    #[test]
    fn burst_of_retriggers_collapses_to_one_trailing_run() {
        let mut core = core(false);
        core.step(trigger("styles"));
        core.step(trigger("styles"));
        core.step(trigger("styles"));
        core.step(trigger("styles"));

        let step = core.step(completed("styles"));
        assert_eq!(dispatched(&step), vec!["styles"]);

        // Completing the trailing run leaves everything idle.
        core.step(completed("styles"));
        assert!(core.is_idle());
        assert!(core.queue_is_empty());
    }

    #[test]
    fn queue_length_two_replays_repeated_saves_as_separate_runs() {
        let scheduler = Scheduler::new(["styles".to_string()]);
        let mut core = CoreRuntime::new(scheduler, 2, RuntimeOptions { exit_when_idle: false });

        core.step(trigger("styles"));
        // Two re-saves while running: two pending batches.
        core.step(trigger("styles"));
        core.step(trigger("styles"));

        let step = core.step(completed("styles"));
        assert_eq!(dispatched(&step), vec!["styles"]);
        assert!(!core.queue_is_empty());

        let step = core.step(completed("styles"));
        assert_eq!(dispatched(&step), vec!["styles"]);
        assert!(core.queue_is_empty());

        core.step(completed("styles"));
        assert!(core.is_idle());
    }

    #[test]
    fn exit_when_idle_requests_exit_after_last_completion() {
        let mut core = core(true);
        core.step(trigger("styles"));
        core.step(trigger("scripts"));

        let step = core.step(completed("styles"));
        assert!(step.keep_running);

        let step = core.step(completed("scripts"));
        assert!(!step.keep_running);
        assert!(step
            .commands
            .iter()
            .any(|c| matches!(c, CoreCommand::RequestExit)));
    }

    #[test]
    fn exit_when_idle_waits_for_queued_run() {
        let mut core = core(true);
        core.step(trigger("styles"));
        core.step(trigger("styles"));

        // First completion starts the queued trailing run, so no exit yet.
        let step = core.step(completed("styles"));
        assert!(step.keep_running);

        let step = core.step(completed("styles"));
        assert!(!step.keep_running);
    }

    #[test]
    fn shutdown_stops_the_loop() {
        let mut core = core(false);
        let step = core.step(RuntimeEvent::ShutdownRequested);
        assert!(!step.keep_running);
        assert!(step.commands.is_empty());
    }
}
