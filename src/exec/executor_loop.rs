// src/exec/executor_loop.rs

//! Main executor loop that turns scheduling requests into task runs.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::exec::task_runner::{PipelineContext, run_task};
use crate::pipeline::{ScheduledTask, TaskRegistry};

/// Spawn the background executor loop.
///
/// The returned sender is what the runtime (via `RealExecutorBackend`)
/// dispatches scheduled tasks on. Each task runs in its own Tokio task and
/// reports back with a `TaskCompleted` event.
///
/// One-in-flight-per-task is the scheduler's invariant, not this loop's: a
/// task is re-dispatched only after its completion event has been
/// processed, so every request that arrives here gets spawned. Dropping a
/// request instead would leave the scheduler waiting forever for a
/// completion that never comes.
pub fn spawn_executor(
    registry: Arc<TaskRegistry>,
    ctx: PipelineContext,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> mpsc::Sender<ScheduledTask> {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        while let Some(task) = rx.recv().await {
            let spec = match registry.get(&task.name) {
                Ok(spec) => spec,
                Err(err) => {
                    warn!(task = %task.name, error = %err, "scheduled task not in registry; ignoring");
                    continue;
                }
            };

            debug!(task = %task.name, run_id = task.run_id, "spawning task run");
            let ctx = ctx.clone();
            let rt_tx = runtime_tx.clone();
            tokio::spawn(run_task(task, spec, ctx, rt_tx));
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::ConfigFile;
    use crate::engine::TaskOutcome;
    use crate::fs::mock::MockFileSystem;
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::time::timeout;

    fn ctx() -> PipelineContext {
        PipelineContext {
            fs: Arc::new(MockFileSystem::new()),
            public_root: PathBuf::from("public"),
            reload: None,
        }
    }

    fn scheduled(name: &str, run_id: u64) -> ScheduledTask {
        ScheduledTask {
            name: name.to_string(),
            run_id,
        }
    }

    async fn recv_completion(rx: &mut mpsc::Receiver<RuntimeEvent>) -> (String, TaskOutcome) {
        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for completion")
            .expect("runtime channel closed");
        match event {
            RuntimeEvent::TaskCompleted { task, outcome } => (task, outcome),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    /// The trailing-run dispatch can reach the executor while the previous
    /// run's Tokio task is still winding down after sending its completion.
    /// Every request must produce a completion event of its own.
    #[tokio::test(flavor = "multi_thread")]
    async fn back_to_back_requests_each_emit_a_completion() {
        let registry = Arc::new(TaskRegistry::from_config(&ConfigFile::default()).unwrap());
        let (rt_tx, mut rt_rx) = mpsc::channel::<RuntimeEvent>(64);
        let exec_tx = spawn_executor(registry, ctx(), rt_tx);

        exec_tx.send(scheduled("styles", 1)).await.unwrap();
        exec_tx.send(scheduled("styles", 2)).await.unwrap();

        let (task, outcome) = recv_completion(&mut rt_rx).await;
        assert_eq!(task, "styles");
        assert_eq!(outcome, TaskOutcome::Success);

        let (task, outcome) = recv_completion(&mut rt_rx).await;
        assert_eq!(task, "styles");
        assert_eq!(outcome, TaskOutcome::Success);
    }

    #[tokio::test]
    async fn unknown_task_is_skipped_without_a_completion() {
        let registry = Arc::new(TaskRegistry::from_config(&ConfigFile::default()).unwrap());
        let (rt_tx, mut rt_rx) = mpsc::channel::<RuntimeEvent>(64);
        let exec_tx = spawn_executor(registry, ctx(), rt_tx);

        exec_tx.send(scheduled("nope", 1)).await.unwrap();
        exec_tx.send(scheduled("styles", 1)).await.unwrap();

        // The first completion to arrive is for the known task.
        let (task, _) = recv_completion(&mut rt_rx).await;
        assert_eq!(task, "styles");
    }
}
