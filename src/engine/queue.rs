// src/engine/queue.rs

use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use super::TaskName;

/// Queue of triggers that arrive while a run is already executing.
///
/// Semantics:
/// - Each queued entry is a *batch* of task names to trigger together as
///   one future run. A trigger for a task not yet queued merges into the
///   newest batch; re-triggering a task that is already pending opens a new
///   batch, because the pending run would already rebuild it once.
/// - `queue_length` caps how many future runs can pile up. Past the cap the
///   oldest batches merge together rather than being dropped, so a mid-run
///   trigger is never lost. The default of 1 therefore collapses a burst of
///   saves into a single trailing run.
/// - When a run finishes, [`pop_next_run`] hands back the oldest batch as
///   the next run. [`drain_pending`] merges everything, for seeding a run
///   from idle.
///
/// [`pop_next_run`]: TriggerQueue::pop_next_run
/// [`drain_pending`]: TriggerQueue::drain_pending
#[derive(Debug)]
pub struct TriggerQueue {
    max_runs: usize,
    runs: VecDeque<HashSet<TaskName>>,
}

impl TriggerQueue {
    /// `max_runs` is clamped to at least 1; a zero-length queue would drop
    /// every mid-run trigger on the floor.
    pub fn new(max_runs: usize) -> Self {
        Self {
            max_runs: max_runs.max(1),
            runs: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Record that a task was triggered while a run is in progress.
    pub fn record_trigger(&mut self, task: &str) {
        let name = task.to_string();

        match self.runs.back_mut() {
            Some(last_batch) if !last_batch.contains(&name) => {
                last_batch.insert(name.clone());
                debug!(task = %name, "merged trigger into queued batch");
            }
            _ => {
                self.runs.push_back(HashSet::from([name.clone()]));
                debug!(task = %name, batches = self.runs.len(), "opened queued batch");
            }
        }

        if self.runs.len() > self.max_runs {
            warn!(
                current_batches = self.runs.len(),
                max_runs = self.max_runs,
                "exceeded queue_length; merging oldest queued batches"
            );
            while self.runs.len() > self.max_runs {
                if let Some(oldest) = self.runs.pop_front() {
                    if let Some(front) = self.runs.front_mut() {
                        front.extend(oldest);
                    }
                }
            }
        }
    }

    /// Pop the oldest pending batch as the trigger set for the next run.
    pub fn pop_next_run(&mut self) -> Vec<TaskName> {
        let Some(batch) = self.runs.pop_front() else {
            return Vec::new();
        };

        let tasks: Vec<TaskName> = batch.into_iter().collect();
        debug!(
            drained = tasks.len(),
            remaining_batches = self.runs.len(),
            "popped queued batch into new run"
        );
        tasks
    }

    /// Drain all pending batches, merged into a single deduplicated list.
    pub fn drain_pending(&mut self) -> Vec<TaskName> {
        let mut merged: HashSet<TaskName> = HashSet::new();
        while let Some(batch) = self.runs.pop_front() {
            merged.extend(batch);
        }

        let tasks: Vec<TaskName> = merged.into_iter().collect();
        if !tasks.is_empty() {
            debug!(drained = tasks.len(), "drained queued triggers into new run");
        }
        tasks
    }
}
