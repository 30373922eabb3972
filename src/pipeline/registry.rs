// src/pipeline/registry.rs

//! The task table: resolves the declarative path/option configuration into
//! immutable [`TaskSpec`]s. This is where the whole pipeline is declared;
//! everything downstream just executes it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::model::ConfigFile;
use crate::engine::TaskName;
use crate::errors::{PipelineError, Result};
use crate::transform::{
    CopyTransformer, CssProcessor, HtmlMinifier, ImageOptimizer, JsMinifier,
    ScriptTranspiler, TemplateCompiler, Transformer,
};
use crate::watch::patterns::{compile_glob, glob_prefix};

use super::task::{OutputMode, ReloadKind, TaskKind, TaskSpec};

#[derive(Debug)]
pub struct TaskRegistry {
    specs: HashMap<TaskName, Arc<TaskSpec>>,
}

impl TaskRegistry {
    /// Build every task from a validated config.
    ///
    /// Glob compilation happens here, so a malformed pattern fails at
    /// startup as a config error, before any task runs.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let mut specs = HashMap::new();
        for kind in TaskKind::ALL {
            let spec = build_spec(kind, cfg)?;
            specs.insert(spec.name.clone(), Arc::new(spec));
        }
        Ok(Self { specs })
    }

    pub fn get(&self, name: &str) -> Result<Arc<TaskSpec>> {
        self.specs
            .get(name)
            .cloned()
            .ok_or_else(|| PipelineError::TaskNotFound(name.to_string()))
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(|s| s.as_str())
    }

    /// Tasks that watch mode should re-run on source changes.
    pub fn watched(&self) -> impl Iterator<Item = &Arc<TaskSpec>> {
        self.specs.values().filter(|s| s.watched)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TaskSpec>> {
        self.specs.values()
    }
}

fn build_spec(kind: TaskKind, cfg: &ConfigFile) -> Result<TaskSpec> {
    let paths = &cfg.paths;
    let opts = &cfg.transform;
    let source_root = paths.source_root.clone();
    let public_root = paths.public_root.clone();

    // (base, glob, dest, output, reload, watched, in_place, transformer)
    let spec = match kind {
        TaskKind::Templates => raw_spec(
            kind,
            source_root,
            &paths.source.templates,
            public_root,
            OutputMode::PerFile { ext: Some("html") },
            ReloadKind::Full,
            true,
            false,
            Box::new(TemplateCompiler::new(&opts.templates)),
        ),
        TaskKind::Styles => raw_spec(
            kind,
            source_root,
            &paths.source.styles,
            public_root.join(&paths.public.styles),
            OutputMode::PerFile { ext: Some("css") },
            ReloadKind::CssInject,
            true,
            false,
            Box::new(CssProcessor::pretty()),
        ),
        TaskKind::Scripts => raw_spec(
            kind,
            source_root,
            &paths.source.scripts,
            public_root.join(&paths.public.scripts),
            OutputMode::PerFile { ext: Some("js") },
            ReloadKind::Full,
            true,
            false,
            Box::new(ScriptTranspiler::new(&opts.scripts)),
        ),
        TaskKind::Vendor => raw_spec(
            kind,
            source_root,
            &paths.source.vendor,
            public_root.join(&paths.public.scripts),
            OutputMode::Concat {
                file_name: "vendor.js",
            },
            ReloadKind::Full,
            true,
            false,
            Box::new(JsMinifier::new(&opts.minify)),
        ),
        TaskKind::Bundle => raw_spec(
            kind,
            source_root,
            &paths.source.scripts,
            public_root.join(&paths.public.scripts),
            OutputMode::Concat {
                file_name: "main.js",
            },
            ReloadKind::Full,
            false,
            false,
            Box::new(JsMinifier::new(&opts.minify)),
        ),
        TaskKind::MinifyCss => raw_spec(
            kind,
            public_root.clone(),
            &styles_out_glob(cfg),
            public_root.join(&paths.public.styles),
            OutputMode::PerFile { ext: None },
            ReloadKind::CssInject,
            false,
            true,
            Box::new(CssProcessor::minified()),
        ),
        TaskKind::MinifyHtml => raw_spec(
            kind,
            public_root.clone(),
            "*.html",
            public_root,
            OutputMode::PerFile { ext: None },
            ReloadKind::Full,
            false,
            true,
            Box::new(HtmlMinifier::new(&opts.html)),
        ),
        TaskKind::Images => raw_spec(
            kind,
            source_root,
            &paths.source.images,
            public_root.join(&paths.public.images),
            OutputMode::PerFile { ext: None },
            ReloadKind::Full,
            true,
            false,
            Box::new(ImageOptimizer::new(&opts.images)),
        ),
        TaskKind::Fonts => raw_spec(
            kind,
            source_root,
            &paths.source.fonts,
            public_root.join(&paths.public.fonts),
            OutputMode::PerFile { ext: None },
            ReloadKind::Full,
            true,
            false,
            Box::new(CopyTransformer),
        ),
    };

    finish_spec(spec)
}

/// Glob over the generated stylesheets, relative to the public root.
fn styles_out_glob(cfg: &ConfigFile) -> String {
    let dir = cfg.paths.public.styles.to_string_lossy().replace('\\', "/");
    format!("{dir}/*.css")
}

struct RawSpec {
    kind: TaskKind,
    base: std::path::PathBuf,
    src_glob: String,
    dest: std::path::PathBuf,
    output: OutputMode,
    reload: ReloadKind,
    watched: bool,
    in_place: bool,
    transformer: Box<dyn Transformer>,
}

#[allow(clippy::too_many_arguments)]
fn raw_spec(
    kind: TaskKind,
    base: std::path::PathBuf,
    src_glob: impl Into<String>,
    dest: std::path::PathBuf,
    output: OutputMode,
    reload: ReloadKind,
    watched: bool,
    in_place: bool,
    transformer: Box<dyn Transformer>,
) -> RawSpec {
    RawSpec {
        kind,
        base,
        src_glob: src_glob.into(),
        dest,
        output,
        reload,
        watched,
        in_place,
        transformer,
    }
}

fn finish_spec(raw: RawSpec) -> Result<TaskSpec> {
    let glob = compile_glob(&raw.src_glob).map_err(|e| {
        PipelineError::Config(format!(
            "task '{}': invalid source glob {:?}: {e}",
            raw.kind, raw.src_glob
        ))
    })?;
    let src_prefix = glob_prefix(&raw.src_glob);

    Ok(TaskSpec {
        name: raw.kind.name().to_string(),
        base: raw.base,
        src_glob: raw.src_glob,
        glob,
        src_prefix,
        dest: raw.dest,
        output: raw.output,
        reload: raw.reload,
        watched: raw.watched,
        in_place: raw.in_place,
        transformer: raw.transformer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn registry_has_every_task_kind() {
        let cfg = ConfigFile::default();
        let registry = TaskRegistry::from_config(&cfg).unwrap();
        for kind in TaskKind::ALL {
            assert!(registry.get(kind.name()).is_ok(), "missing {kind}");
        }
        assert!(registry.get("nope").is_err());
    }

    #[test]
    fn default_layout_matches_convention() {
        let cfg = ConfigFile::default();
        let registry = TaskRegistry::from_config(&cfg).unwrap();

        let styles = registry.get("styles").unwrap();
        assert_eq!(styles.base, PathBuf::from("source"));
        assert_eq!(styles.dest, PathBuf::from("public/styles"));
        assert_eq!(styles.src_prefix, PathBuf::from("styles"));
        assert_eq!(styles.reload, ReloadKind::CssInject);

        let templates = registry.get("templates").unwrap();
        assert_eq!(templates.dest, PathBuf::from("public"));

        let vendor = registry.get("vendor").unwrap();
        assert_eq!(
            vendor.output,
            OutputMode::Concat {
                file_name: "vendor.js"
            }
        );
        assert_eq!(vendor.src_prefix, PathBuf::from("scripts/vendor"));
    }

    #[test]
    fn minify_tasks_are_in_place_and_unwatched() {
        let cfg = ConfigFile::default();
        let registry = TaskRegistry::from_config(&cfg).unwrap();

        let css = registry.get("minify-css").unwrap();
        assert!(css.in_place);
        assert!(!css.watched);
        assert_eq!(css.base, PathBuf::from("public"));
        assert_eq!(css.src_glob, "styles/*.css");

        let watched: Vec<_> = registry.watched().map(|s| s.name.clone()).collect();
        assert!(!watched.contains(&"minify-html".to_string()));
        assert!(watched.contains(&"styles".to_string()));
    }
}
