// src/watch/watcher.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use globset::GlobSet;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::{RuntimeEvent, TaskName, TriggerReason};
use crate::pipeline::TaskRegistry;
use crate::watch::patterns::relative_str;

/// A watched task: its name plus the compiled source glob, evaluated
/// against paths relative to the watch root.
#[derive(Debug, Clone)]
pub struct WatchProfile {
    pub name: TaskName,
    pub glob: GlobSet,
}

impl WatchProfile {
    /// Profiles for every watched task in the registry.
    pub fn from_registry(registry: &TaskRegistry) -> Vec<WatchProfile> {
        registry
            .watched()
            .map(|spec| WatchProfile {
                name: spec.name.clone(),
                glob: spec.glob.clone(),
            })
            .collect()
    }

    fn matches(&self, rel: &str) -> bool {
        self.glob.is_match(rel)
    }
}

/// Handle for the filesystem watcher.
///
/// Exists mainly so the underlying `RecommendedWatcher` stays alive;
/// dropping this handle stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher observing `root` recursively, sending
/// `RuntimeEvent::TaskTriggered` for tasks whose globs match a changed
/// path.
///
/// Events are debounced: after the first match the watcher keeps
/// collecting for `debounce`, then emits one trigger per distinct task.
/// Editors that write a file several times in quick succession therefore
/// cause a single trigger.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profiles: Vec<WatchProfile>,
    debounce: Duration,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so notify's absolute paths strip cleanly.
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // tracing is not safe from the notify thread's callback.
                    eprintln!("assetpipe: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("assetpipe: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!(root = %root.display(), "file watcher started");

    let profiles = Arc::new(profiles);
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let mut triggered = HashSet::new();
            collect_triggers(&root, &profiles, &event, &mut triggered);

            // Debounce window: keep absorbing events before triggering.
            loop {
                match tokio::time::timeout(debounce, event_rx.recv()).await {
                    Ok(Some(event)) => {
                        collect_triggers(&root, &profiles, &event, &mut triggered)
                    }
                    Ok(None) => return,
                    Err(_) => break,
                }
            }

            for task in triggered {
                debug!(task = %task, "source change triggers task");
                if runtime_tx
                    .send(RuntimeEvent::TaskTriggered {
                        task,
                        reason: TriggerReason::FileWatch,
                    })
                    .await
                    .is_err()
                {
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}

fn collect_triggers(
    root: &Path,
    profiles: &[WatchProfile],
    event: &Event,
    triggered: &mut HashSet<TaskName>,
) {
    for path in &event.paths {
        let Some(rel) = relative_str(root, path) else {
            continue;
        };
        for profile in profiles {
            if profile.matches(&rel) {
                triggered.insert(profile.name.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::ConfigFile;

    #[test]
    fn profiles_match_their_sources_only() {
        let registry = TaskRegistry::from_config(&ConfigFile::default()).unwrap();
        let profiles = WatchProfile::from_registry(&registry);

        let matching = |rel: &str| -> Vec<String> {
            let mut names: Vec<_> = profiles
                .iter()
                .filter(|p| p.matches(rel))
                .map(|p| p.name.clone())
                .collect();
            names.sort();
            names
        };

        assert_eq!(matching("styles/site.css"), vec!["styles"]);
        assert_eq!(matching("templates/index.md"), vec!["templates"]);
        assert_eq!(matching("fonts/sans/regular.woff2"), vec!["fonts"]);
        assert_eq!(matching("scripts/vendor/lib.js"), vec!["vendor"]);
        assert!(matching("notes.txt").is_empty());
    }

    #[test]
    fn scripts_glob_does_not_match_vendor() {
        let registry = TaskRegistry::from_config(&ConfigFile::default()).unwrap();
        let profiles = WatchProfile::from_registry(&registry);

        let scripts = profiles.iter().find(|p| p.name == "scripts").unwrap();
        assert!(scripts.matches("scripts/app.js"));
        assert!(!scripts.matches("scripts/vendor/lib.js"));
    }
}
