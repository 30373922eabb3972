// src/reload/mod.rs

//! Live reload: a WebSocket hub that pushes reload messages to connected
//! browsers after a task writes new output.

pub mod hub;
pub mod message;

pub use hub::{ReloadHandle, start_reload_hub};
pub use message::ReloadMessage;
