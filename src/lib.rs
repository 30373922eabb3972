// src/lib.rs

pub mod changed;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod reload;
pub mod serve;
pub mod transform;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use crate::cli::{CliArgs, PipelineCommand};
use crate::config::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::errors::Result;
use crate::exec::{PipelineContext, RealExecutorBackend};
use crate::fs::RealFileSystem;
use crate::pipeline::{TaskKind, TaskRegistry};
use crate::reload::start_reload_hub;
use crate::serve::{ServeOptions, start_http_server};
use crate::watch::WatchProfile;

/// High-level entry point used by `main.rs`.
///
/// Wires together config loading, the task registry, the scheduler/queue
/// runtime, the executor, and in serve mode the dev server, reload hub and
/// file watcher.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    let registry = Arc::new(TaskRegistry::from_config(&cfg)?);

    if args.dry_run {
        print_dry_run(&cfg, &registry);
        return Ok(());
    }

    let fs: Arc<dyn fs::FileSystem + Send + Sync> = Arc::new(RealFileSystem);

    if matches!(args.command, Some(PipelineCommand::Clean)) {
        return pipeline::clean::clean(fs.as_ref(), &cfg.paths.public_root);
    }

    // Default invocation behaves like `serve`: build, then watch and serve.
    let serve_mode = matches!(args.command, None | Some(PipelineCommand::Serve));
    let seed_tasks = seed_tasks_for(args.command);

    // Serve mode: reload hub first so the HTTP server knows what port to
    // inject into pages.
    let reload = if serve_mode && cfg.serve.inject_changes {
        let (handle, ws_port) = start_reload_hub(cfg.serve.ws_port)?;
        Some((handle, ws_port))
    } else {
        None
    };

    if serve_mode {
        start_http_server(ServeOptions {
            public_root: cfg.paths.public_root.clone(),
            port: cfg.serve.port,
            ws_port: reload.as_ref().map(|(_, port)| *port),
        })?;
    }

    let ctx = PipelineContext {
        fs,
        public_root: cfg.paths.public_root.clone(),
        reload: reload.map(|(handle, _)| handle),
    };

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let executor = RealExecutorBackend::new(Arc::clone(&registry), ctx, rt_tx.clone());

    // File watcher only in serve mode.
    let _watcher_handle = if serve_mode {
        let profiles = WatchProfile::from_registry(&registry);
        let debounce = Duration::from_millis(cfg.serve.debounce_ms);
        Some(watch::spawn_watcher(
            cfg.paths.source_root.clone(),
            profiles,
            debounce,
            rt_tx.clone(),
        )?)
    } else {
        None
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    info!(?seed_tasks, "tasks to trigger at startup");
    for task in &seed_tasks {
        rt_tx
            .send(RuntimeEvent::TaskTriggered {
                task: task.name().to_string(),
                reason: TriggerReason::Manual,
            })
            .await
            .map_err(|e| anyhow::anyhow!("runtime channel closed: {e}"))?;
    }

    let options = RuntimeOptions {
        exit_when_idle: !serve_mode,
    };

    let scheduler = pipeline::Scheduler::new(registry.task_names().map(String::from));
    let core = CoreRuntime::new(scheduler, cfg.runtime.queue_length, options);
    let runtime = Runtime::new(core, rt_rx, executor);
    runtime.run().await
}

/// The task kinds each command seeds at startup.
fn seed_tasks_for(command: Option<PipelineCommand>) -> Vec<TaskKind> {
    match command {
        // Default and serve both start from a fresh dev build.
        None | Some(PipelineCommand::Serve) | Some(PipelineCommand::Build) => {
            TaskKind::DEFAULT_PIPELINE.to_vec()
        }
        Some(PipelineCommand::Minify) => TaskKind::MINIFY_PIPELINE.to_vec(),
        Some(PipelineCommand::Templates) => vec![TaskKind::Templates],
        Some(PipelineCommand::Styles) => vec![TaskKind::Styles],
        Some(PipelineCommand::Scripts) => vec![TaskKind::Scripts],
        Some(PipelineCommand::Vendor) => vec![TaskKind::Vendor],
        Some(PipelineCommand::Bundle) => vec![TaskKind::Bundle],
        Some(PipelineCommand::MinifyCss) => vec![TaskKind::MinifyCss],
        Some(PipelineCommand::MinifyHtml) => vec![TaskKind::MinifyHtml],
        Some(PipelineCommand::Images) => vec![TaskKind::Images],
        Some(PipelineCommand::Fonts) => vec![TaskKind::Fonts],
        Some(PipelineCommand::Clean) => Vec::new(),
    }
}

/// Dry-run output: the resolved task table.
fn print_dry_run(cfg: &ConfigFile, registry: &TaskRegistry) {
    println!("assetpipe dry-run");
    println!("  source_root = {}", cfg.paths.source_root.display());
    println!("  public_root = {}", cfg.paths.public_root.display());
    println!("  queue_length = {}", cfg.runtime.queue_length);
    println!();

    let mut specs: Vec<_> = registry.iter().collect();
    specs.sort_by(|a, b| a.name.cmp(&b.name));

    println!("tasks ({}):", specs.len());
    for spec in specs {
        println!("  - {}", spec.name);
        println!("      sources: {}/{}", spec.base.display(), spec.src_glob);
        println!("      dest:    {}", spec.dest.display());
        match &spec.output {
            pipeline::OutputMode::PerFile { ext: Some(ext) } => {
                println!("      output:  per-file (*.{ext})")
            }
            pipeline::OutputMode::PerFile { ext: None } => println!("      output:  per-file"),
            pipeline::OutputMode::Concat { file_name } => {
                println!("      output:  concat -> {file_name}")
            }
        }
        if spec.watched {
            println!("      watched: true");
        }
        if spec.in_place {
            println!("      in-place: true");
        }
    }
}
