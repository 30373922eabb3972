// src/reload/hub.rs

//! WebSocket hub for live reload.
//!
//! An acceptor thread performs the WebSocket handshake for each incoming
//! connection and parks the socket in a shared client list. Task runs
//! broadcast through [`ReloadHandle`]; delivery is fire-and-forget and a
//! failed send just drops that client.

use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};
use tungstenite::{Message, WebSocket};

use super::message::ReloadMessage;

/// Ports tried above the configured one before giving up.
const MAX_PORT_RETRIES: u16 = 10;

type ClientList = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Clonable broadcast handle. Safe to use from blocking task code.
#[derive(Clone)]
pub struct ReloadHandle {
    clients: ClientList,
}

impl std::fmt::Debug for ReloadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadHandle").finish()
    }
}

impl ReloadHandle {
    pub fn notify_full(&self) {
        self.broadcast(&ReloadMessage::reload());
    }

    pub fn notify_css(&self, path: &str) {
        self.broadcast(&ReloadMessage::css(path));
    }

    pub fn broadcast(&self, msg: &ReloadMessage) {
        let json = msg.to_json();
        let Ok(mut clients) = self.clients.lock() else {
            return;
        };

        let before = clients.len();
        clients.retain_mut(|ws| match ws.send(Message::text(json.clone())) {
            Ok(()) => true,
            Err(err) => {
                debug!(error = %err, "dropping dead reload client");
                false
            }
        });

        if before > 0 {
            debug!(sent = clients.len(), dropped = before - clients.len(), msg = %json, "broadcast reload");
        }
    }
}

/// Bind the reload WebSocket server and spawn its acceptor thread.
///
/// Returns the handle plus the port actually bound, which may differ from
/// `base_port` when that port is taken.
pub fn start_reload_hub(base_port: u16) -> Result<(ReloadHandle, u16)> {
    let (listener, actual_port) = try_bind_port(base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    let clients: ClientList = Arc::new(Mutex::new(Vec::new()));
    let handle = ReloadHandle {
        clients: Arc::clone(&clients),
    };

    std::thread::spawn(move || {
        loop {
            match listener.accept() {
                Ok((stream, addr)) => {
                    debug!(%addr, "reload client connecting");
                    // Handshake wants a blocking socket.
                    let _ = stream.set_nonblocking(false);
                    match tungstenite::accept(stream) {
                        Ok(ws) => {
                            if let Ok(mut clients) = clients.lock() {
                                clients.push(ws);
                                info!(%addr, total = clients.len(), "reload client connected");
                            }
                        }
                        Err(err) => {
                            warn!(%addr, error = %err, "websocket handshake failed");
                        }
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    warn!(error = %e, "reload accept error");
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
    });

    info!(port = actual_port, "live reload hub listening");
    Ok((handle, actual_port))
}

/// Try binding to `base_port`, walking upwards when the port is in use.
fn try_bind_port(base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(format!("127.0.0.1:{port}")) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
            }
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind reload server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
