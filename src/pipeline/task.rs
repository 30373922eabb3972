// src/pipeline/task.rs

//! Task metadata: the binding of one source glob, one transformer, one
//! destination and a reload notification kind.

use std::fmt;
use std::path::PathBuf;

use globset::GlobSet;

use crate::engine::TaskName;
use crate::transform::Transformer;

/// The fixed set of asset categories the pipeline knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Templates,
    Styles,
    Scripts,
    Vendor,
    Bundle,
    MinifyCss,
    MinifyHtml,
    Images,
    Fonts,
}

impl TaskKind {
    pub const ALL: [TaskKind; 9] = [
        TaskKind::Templates,
        TaskKind::Styles,
        TaskKind::Scripts,
        TaskKind::Vendor,
        TaskKind::Bundle,
        TaskKind::MinifyCss,
        TaskKind::MinifyHtml,
        TaskKind::Images,
        TaskKind::Fonts,
    ];

    /// The default pipeline: what runs before serving.
    pub const DEFAULT_PIPELINE: [TaskKind; 3] =
        [TaskKind::Templates, TaskKind::Styles, TaskKind::Scripts];

    /// The minification pipeline.
    pub const MINIFY_PIPELINE: [TaskKind; 5] = [
        TaskKind::MinifyCss,
        TaskKind::MinifyHtml,
        TaskKind::Bundle,
        TaskKind::Vendor,
        TaskKind::Fonts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Templates => "templates",
            TaskKind::Styles => "styles",
            TaskKind::Scripts => "scripts",
            TaskKind::Vendor => "vendor",
            TaskKind::Bundle => "bundle",
            TaskKind::MinifyCss => "minify-css",
            TaskKind::MinifyHtml => "minify-html",
            TaskKind::Images => "images",
            TaskKind::Fonts => "fonts",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a task maps inputs to outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// One output per changed input, mirroring the path after the glob
    /// prefix. `ext` rewrites the output extension when set.
    PerFile { ext: Option<&'static str> },
    /// All matched inputs are transformed individually and written as one
    /// path-ordered concatenation. Any stale input re-reads the whole batch.
    Concat { file_name: &'static str },
}

/// What to tell connected browsers after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadKind {
    /// Full page reload.
    Full,
    /// Stylesheet changes can be injected without a reload.
    CssInject,
}

/// A fully resolved task: immutable for the process lifetime.
pub struct TaskSpec {
    pub name: TaskName,
    /// Directory the source glob is evaluated against (the source root, or
    /// the public root for in-place minify tasks).
    pub base: PathBuf,
    /// Source glob, relative to `base`.
    pub src_glob: String,
    /// Compiled form of `src_glob`.
    pub glob: GlobSet,
    /// Literal directory prefix of `src_glob`; matched paths are mirrored
    /// into `dest` relative to this.
    pub src_prefix: PathBuf,
    /// Destination directory.
    pub dest: PathBuf,
    pub output: OutputMode,
    pub reload: ReloadKind,
    /// Whether watch mode re-runs this task on source changes.
    pub watched: bool,
    /// In-place tasks (minify-css, minify-html) read and write the same
    /// tree; mtime change detection is meaningless for them, so they
    /// process the full matched set on every run.
    pub in_place: bool,
    pub transformer: Box<dyn Transformer>,
}

impl fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec")
            .field("name", &self.name)
            .field("src_glob", &self.src_glob)
            .field("dest", &self.dest)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/// Description of a task the scheduler wants the executor to run now.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub name: TaskName,
    /// Monotonically increasing run identifier; all tasks belonging to the
    /// same run share it.
    pub run_id: u64,
}
