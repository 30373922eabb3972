// src/watch/mod.rs

//! Filesystem watching: glob helpers and the notify-backed watcher that
//! turns source edits into task triggers.

pub mod patterns;
pub mod watcher;

pub use watcher::{WatchProfile, WatcherHandle, spawn_watcher};
