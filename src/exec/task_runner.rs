// src/exec/task_runner.rs

//! Individual task execution.
//!
//! One task run is: collect the files matching the task's source glob,
//! drop the ones whose outputs are already fresh, run the transformer,
//! write outputs, and notify connected browsers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::changed::{any_stale, change_set};
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::errors::{PipelineError, Result};
use crate::fs::FileSystem;
use crate::pipeline::{OutputMode, ReloadKind, ScheduledTask, TaskSpec};
use crate::reload::ReloadHandle;
use crate::watch::patterns::{collect_matching_files, relative_str};

/// Shared context every task run needs: the filesystem, the public root
/// (for reload paths), and an optional live-reload handle.
#[derive(Clone)]
pub struct PipelineContext {
    pub fs: Arc<dyn FileSystem + Send + Sync>,
    pub public_root: PathBuf,
    pub reload: Option<ReloadHandle>,
}

/// What one task run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskReport {
    /// Output paths written this run.
    pub written: Vec<PathBuf>,
    /// Matched sources skipped because their output was fresh.
    pub skipped: usize,
}

/// Run a scheduled task and emit the `TaskCompleted` event.
pub async fn run_task(
    task: ScheduledTask,
    spec: Arc<TaskSpec>,
    ctx: PipelineContext,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let name = task.name.clone();
    let run_id = task.run_id;

    // Transforms are synchronous CPU and filesystem work.
    let result = tokio::task::spawn_blocking({
        let spec = Arc::clone(&spec);
        let ctx = ctx.clone();
        move || execute_spec(&spec, &ctx)
    })
    .await;

    let outcome = match result {
        Ok(Ok(report)) => {
            info!(
                task = %name,
                run_id,
                written = report.written.len(),
                skipped = report.skipped,
                "task finished"
            );
            notify_reload(&spec, &ctx, &report);
            TaskOutcome::Success
        }
        Ok(Err(err)) => {
            error!(task = %name, run_id, error = %err, "task failed");
            TaskOutcome::Failed
        }
        Err(join_err) => {
            error!(task = %name, run_id, error = %join_err, "task panicked");
            TaskOutcome::Failed
        }
    };

    let _ = runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task: name,
            outcome,
        })
        .await;
}

/// Execute one task synchronously. Public so one-shot builds and tests can
/// run tasks without the runtime loop.
pub fn execute_spec(spec: &TaskSpec, ctx: &PipelineContext) -> Result<TaskReport> {
    let fs = ctx.fs.as_ref();
    let sources = collect_matching_files(fs, &spec.base, &spec.glob)?;
    debug!(task = %spec.name, matched = sources.len(), "collected sources");

    match &spec.output {
        OutputMode::PerFile { ext } => run_per_file(spec, fs, &sources, *ext),
        OutputMode::Concat { file_name } => run_concat(spec, fs, &sources, file_name),
    }
}

fn run_per_file(
    spec: &TaskSpec,
    fs: &dyn FileSystem,
    sources: &[PathBuf],
    ext: Option<&'static str>,
) -> Result<TaskReport> {
    let dest_for = |source: &Path| dest_path(spec, source, ext);

    // In-place tasks read and write the same tree, so output mtimes say
    // nothing useful; process everything that matched.
    let (stale, skipped) = if spec.in_place {
        (sources.to_vec(), 0)
    } else {
        let stale = change_set(fs, sources, &dest_for);
        let skipped = sources.len() - stale.len();
        (stale, skipped)
    };

    let mut written = Vec::new();
    for source in &stale {
        let output = transform_one(spec, fs, source)?;
        let dest = dest_for(source);
        fs.write(&dest, &output)?;
        debug!(task = %spec.name, src = %source.display(), dst = %dest.display(), "wrote output");
        written.push(dest);
    }

    Ok(TaskReport { written, skipped })
}

fn run_concat(
    spec: &TaskSpec,
    fs: &dyn FileSystem,
    sources: &[PathBuf],
    file_name: &str,
) -> Result<TaskReport> {
    let dest = spec.dest.join(file_name);

    if sources.is_empty() {
        debug!(task = %spec.name, "no sources matched; nothing to concatenate");
        return Ok(TaskReport::default());
    }

    // Any stale input invalidates the whole bundle.
    if !spec.in_place && !any_stale(fs, sources, &dest) {
        return Ok(TaskReport {
            written: Vec::new(),
            skipped: sources.len(),
        });
    }

    let mut parts = Vec::with_capacity(sources.len());
    for source in sources {
        let output = transform_one(spec, fs, source)?;
        parts.push(output);
    }
    let joined = parts.join(&b'\n');

    fs.write(&dest, &joined)?;
    debug!(task = %spec.name, dst = %dest.display(), inputs = sources.len(), "wrote bundle");

    Ok(TaskReport {
        written: vec![dest],
        skipped: 0,
    })
}

fn transform_one(spec: &TaskSpec, fs: &dyn FileSystem, source: &Path) -> Result<Vec<u8>> {
    let input = fs.read(source)?;
    spec.transformer
        .transform(source, &input)
        .map_err(|e| PipelineError::Transform {
            task: spec.name.clone(),
            message: e.to_string(),
        })
}

/// Mirror a matched source into the destination directory, dropping the
/// glob's literal prefix and optionally rewriting the extension.
fn dest_path(spec: &TaskSpec, source: &Path, ext: Option<&'static str>) -> PathBuf {
    let prefix = spec.base.join(&spec.src_prefix);
    let rel = source.strip_prefix(&prefix).unwrap_or(source);
    let mut dest = spec.dest.join(rel);
    if let Some(ext) = ext {
        dest.set_extension(ext);
    }
    dest
}

fn notify_reload(spec: &TaskSpec, ctx: &PipelineContext, report: &TaskReport) {
    let Some(reload) = &ctx.reload else {
        return;
    };
    if report.written.is_empty() {
        return;
    }

    match spec.reload {
        ReloadKind::CssInject => {
            // One message per stylesheet so the client can swap each one.
            for path in &report.written {
                let rel = relative_str(&ctx.public_root, path);
                reload.notify_css(rel.as_deref().unwrap_or_default());
            }
        }
        ReloadKind::Full => reload.notify_full(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::ConfigFile;
    use crate::fs::mock::{MockFileSystem, mtime_at};
    use crate::pipeline::TaskRegistry;

    fn ctx(fs: MockFileSystem) -> PipelineContext {
        PipelineContext {
            fs: Arc::new(fs),
            public_root: PathBuf::from("public"),
            reload: None,
        }
    }

    fn registry() -> TaskRegistry {
        TaskRegistry::from_config(&ConfigFile::default()).unwrap()
    }

    #[test]
    fn per_file_mirrors_paths_and_rewrites_extension() {
        let fs = MockFileSystem::new();
        fs.add_file("source/styles/site.css", b"a { color: red; }", mtime_at(10));
        let ctx = ctx(fs);

        let spec = registry().get("styles").unwrap();
        let report = execute_spec(&spec, &ctx).unwrap();

        assert_eq!(report.written, vec![PathBuf::from("public/styles/site.css")]);
        assert_eq!(report.skipped, 0);
        assert!(ctx.fs.exists(Path::new("public/styles/site.css")));
    }

    #[test]
    fn fresh_outputs_are_skipped() {
        let fs = MockFileSystem::new();
        fs.add_file("source/styles/site.css", b"a{}", mtime_at(10));
        fs.add_file("public/styles/site.css", b"a{}", mtime_at(20));
        let ctx = ctx(fs);

        let spec = registry().get("styles").unwrap();
        let report = execute_spec(&spec, &ctx).unwrap();

        assert!(report.written.is_empty());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn concat_joins_sorted_inputs() {
        let fs = MockFileSystem::new();
        fs.add_file("source/scripts/vendor/b.js", b"var b=2", mtime_at(10));
        fs.add_file("source/scripts/vendor/a.js", b"var a=1", mtime_at(10));
        let ctx = ctx(fs);

        let spec = registry().get("vendor").unwrap();
        let report = execute_spec(&spec, &ctx).unwrap();

        assert_eq!(report.written, vec![PathBuf::from("public/scripts/vendor.js")]);
        let out = ctx.fs.read_to_string(Path::new("public/scripts/vendor.js")).unwrap();
        // a.js content precedes b.js content.
        let a = out.find("a=1").unwrap();
        let b = out.find("b=2").unwrap();
        assert!(a < b);
    }

    #[test]
    fn concat_skips_when_bundle_is_fresh() {
        let fs = MockFileSystem::new();
        fs.add_file("source/scripts/vendor/a.js", b"var a=1", mtime_at(10));
        fs.add_file("public/scripts/vendor.js", b"var a=1;", mtime_at(20));
        let ctx = ctx(fs);

        let spec = registry().get("vendor").unwrap();
        let report = execute_spec(&spec, &ctx).unwrap();
        assert!(report.written.is_empty());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn in_place_task_always_processes_everything() {
        let fs = MockFileSystem::new();
        fs.add_file("public/styles/site.css", b"a {\n  color: red;\n}\n", mtime_at(10));
        let ctx = ctx(fs);

        let spec = registry().get("minify-css").unwrap();

        let report = execute_spec(&spec, &ctx).unwrap();
        assert_eq!(report.written.len(), 1);

        // Running again still rewrites; there is no freshness to compare.
        let report = execute_spec(&spec, &ctx).unwrap();
        assert_eq!(report.written.len(), 1);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn transform_failure_names_the_task() {
        let fs = MockFileSystem::new();
        fs.add_file("source/styles/broken.css", b"a { color: }", mtime_at(10));
        let ctx = ctx(fs);

        let spec = registry().get("styles").unwrap();
        let err = execute_spec(&spec, &ctx).unwrap_err();
        assert!(err.to_string().contains("styles"));
    }

    #[test]
    fn empty_match_is_a_successful_no_op() {
        let ctx = ctx(MockFileSystem::new());
        let spec = registry().get("fonts").unwrap();
        let report = execute_spec(&spec, &ctx).unwrap();
        assert_eq!(report, TaskReport::default());
    }
}
