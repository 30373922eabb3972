// src/serve/mod.rs

//! Static dev server over the public root.
//!
//! A plain `tiny_http` file server on its own thread. HTML responses get
//! the live-reload client script injected before `</body>` so the browser
//! connects back to the reload hub.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use tiny_http::{Header, Request, Response, Server};
use tracing::{debug, info, warn};

/// Reload client injected into served HTML pages. `{ws_port}` is
/// substituted at serve time.
const RELOAD_JS: &str = r#"
<script>
(function () {
  var ws = new WebSocket("ws://127.0.0.1:{ws_port}/");
  ws.onmessage = function (ev) {
    var msg = JSON.parse(ev.data);
    if (msg.type === "css") {
      var links = document.querySelectorAll("link[rel=stylesheet]");
      for (var i = 0; i < links.length; i++) {
        var href = links[i].getAttribute("href").split("?")[0];
        if (href.indexOf(msg.path) !== -1) {
          links[i].setAttribute("href", href + "?t=" + Date.now());
        }
      }
    } else {
      location.reload();
    }
  };
})();
</script>
"#;

/// Options for the HTTP server thread.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub public_root: PathBuf,
    pub port: u16,
    /// Reload hub port; `None` disables script injection.
    pub ws_port: Option<u16>,
}

/// Bind the HTTP server and spawn its request loop thread.
pub fn start_http_server(opts: ServeOptions) -> Result<()> {
    let server = Server::http(("127.0.0.1", opts.port))
        .map_err(|e| anyhow::anyhow!("binding http server on port {}: {e}", opts.port))?;

    info!(port = opts.port, root = %opts.public_root.display(), "dev server listening");

    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            if let Err(err) = handle_request(request, &opts) {
                warn!(error = %err, "request handling failed");
            }
        }
    });

    Ok(())
}

fn handle_request(request: Request, opts: &ServeOptions) -> Result<()> {
    let url = request.url().split('?').next().unwrap_or("/").to_string();
    debug!(method = %request.method(), url = %url, "request");

    let Some(path) = resolve_path(&opts.public_root, &url) else {
        return respond_not_found(request);
    };

    let body = match std::fs::read(&path) {
        Ok(body) => body,
        Err(_) => return respond_not_found(request),
    };

    let content_type = content_type_for(&path);
    let body = match opts.ws_port {
        Some(ws_port) if content_type.starts_with("text/html") => {
            inject_reload_script(&body, ws_port)
        }
        _ => body,
    };

    let response = Response::from_data(body)
        .with_status_code(200)
        .with_header(header("Content-Type", content_type));
    request.respond(response).context("sending response")
}

fn respond_not_found(request: Request) -> Result<()> {
    let response = Response::from_string("404 not found")
        .with_status_code(404)
        .with_header(header("Content-Type", "text/plain; charset=utf-8"));
    request.respond(response).context("sending 404")
}

/// Map a URL to a file under the public root. Directory URLs resolve to
/// their `index.html`. Any path traversal component rejects the request.
fn resolve_path(public_root: &Path, url: &str) -> Option<PathBuf> {
    let rel = url.trim_start_matches('/');
    let rel = Path::new(rel);
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let mut path = public_root.join(rel);
    if path.is_dir() || rel.as_os_str().is_empty() {
        path = path.join("index.html");
    }
    path.is_file().then_some(path)
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        _ => "application/octet-stream",
    }
}

/// Insert the reload client before `</body>`, or append when the page has
/// no body close tag.
fn inject_reload_script(content: &[u8], ws_port: u16) -> Vec<u8> {
    let script = RELOAD_JS.replace("{ws_port}", &ws_port.to_string());
    let script_bytes = script.as_bytes();

    const PATTERN: &[u8] = b"</body>";
    if let Some(pos) = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        let mut result = Vec::with_capacity(content.len() + script_bytes.len());
        result.extend_from_slice(&content[..pos]);
        result.extend_from_slice(script_bytes);
        result.extend_from_slice(&content[pos..]);
        return result;
    }

    let mut result = Vec::with_capacity(content.len() + script_bytes.len());
    result.extend_from_slice(content);
    result.extend_from_slice(script_bytes);
    result
}

fn header(key: &str, value: &str) -> Header {
    Header::from_bytes(key.as_bytes(), value.as_bytes()).expect("static header")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injection_lands_before_body_close() {
        let html = b"<html><body><p>hi</p></body></html>";
        let out = inject_reload_script(html, 8080);
        let text = String::from_utf8(out).unwrap();

        let script = text.find("new WebSocket").unwrap();
        let body_close = text.find("</body>").unwrap();
        assert!(script < body_close);
        assert!(text.contains("ws://127.0.0.1:8080/"));
    }

    #[test]
    fn injection_appends_without_body_tag() {
        let out = inject_reload_script(b"<p>bare fragment</p>", 9000);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("<p>bare fragment</p>"));
        assert!(text.contains("ws://127.0.0.1:9000/"));
    }

    #[test]
    fn traversal_components_are_rejected() {
        assert!(resolve_path(Path::new("public"), "/../etc/passwd").is_none());
        assert!(resolve_path(Path::new("public"), "/a/../../b").is_none());
    }

    #[test]
    fn content_types_cover_pipeline_outputs() {
        assert_eq!(content_type_for(Path::new("a.css")), "text/css; charset=utf-8");
        assert_eq!(content_type_for(Path::new("a.woff2")), "font/woff2");
        assert_eq!(content_type_for(Path::new("a.bin")), "application/octet-stream");
    }
}
