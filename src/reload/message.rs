// src/reload/message.rs

//! JSON message protocol between the dev server and browser clients.

use serde::{Deserialize, Serialize};

/// Reload message sent over the WebSocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Full page reload.
    Reload {
        /// Public-relative path that changed, when known.
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    /// Stylesheet update; the client swaps the matching `<link>` href
    /// instead of reloading the page.
    Css { path: String },
}

impl ReloadMessage {
    pub fn reload() -> Self {
        Self::Reload { path: None }
    }

    pub fn css(path: impl Into<String>) -> Self {
        Self::Css { path: path.into() }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
