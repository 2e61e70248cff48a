// Copyright © 2024 Folio. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Preview Server
//!
//! A small static file server over the output root, built on `tiny_http`.
//!
//! - `index.html` is served for directory requests; `/dir` redirects to
//!   `/dir/`
//! - Content types are chosen by file extension
//! - Each request is handled on its own thread
//! - A [`ShutdownHandle`] (wired to Ctrl+C by [`serve`]) stops the accept
//!   loop; the listening socket is released when [`PreviewServer::run`]
//!   returns

use crate::{FolioError, Result};
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Weak};
use std::thread;
use tiny_http::{Header, Method, Request, Response, Server};

/// A bound preview server that has not started accepting yet.
pub struct PreviewServer {
    server: Arc<Server>,
    root: Arc<PathBuf>,
    addr: SocketAddr,
    url: String,
}

impl std::fmt::Debug for PreviewServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewServer")
            .field("root", &self.root)
            .field("addr", &self.addr)
            .field("url", &self.url)
            .finish()
    }
}

/// Stops a running [`PreviewServer`] from another thread.
///
/// Holds a weak reference, so it never keeps the socket open on its own.
#[derive(Clone)]
pub struct ShutdownHandle {
    server: Weak<Server>,
}

impl std::fmt::Debug for ShutdownHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownHandle")
            .field("active", &(self.server.strong_count() > 0))
            .finish()
    }
}

impl ShutdownHandle {
    /// Unblocks the accept loop. Does nothing once the server is gone.
    pub fn shutdown(&self) {
        if let Some(server) = self.server.upgrade() {
            server.unblock();
        }
    }
}

impl PreviewServer {
    /// Binds `host:port` for serving files from `root`.
    ///
    /// Port `0` picks a free port; see [`PreviewServer::addr`].
    pub fn bind(root: &Path, host: &str, port: u16) -> Result<Self> {
        if !root.is_dir() {
            return Err(FolioError::io_error(
                root.to_path_buf(),
                io::Error::new(io::ErrorKind::NotFound, "output folder not found"),
            ));
        }

        let address = format!("{}:{}", host, port);
        let server = Server::http(address.as_str()).map_err(|source| {
            FolioError::BindError {
                address: address.clone(),
                source,
            }
        })?;
        let addr = server.server_addr().to_ip().ok_or_else(|| {
            FolioError::internal_error("Preview server is not listening on TCP")
        })?;

        Ok(Self {
            server: Arc::new(server),
            root: Arc::new(root.to_path_buf()),
            addr,
            url: format!("http://{}:{}/", host, addr.port()),
        })
    }

    /// The bound socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Browser-facing URL of the site root.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns a handle that stops [`PreviewServer::run`].
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            server: Arc::downgrade(&self.server),
        }
    }

    /// Serves requests until the shutdown handle fires, then closes the socket.
    pub fn run(self) {
        info!("Serving {} at {}", self.root.display(), self.url);

        for request in self.server.incoming_requests() {
            let root = Arc::clone(&self.root);
            _ = thread::spawn(move || {
                if let Err(e) = handle_request(request, &root) {
                    warn!("Request error: {}", e);
                }
            });
        }

        info!("Server stopped.");
    }
}

/// Serves `root` until Ctrl+C, optionally opening a browser at the site URL.
///
/// Bind failures are returned before anything is served.
pub fn serve(root: &Path, host: &str, port: u16, open: bool) -> Result<()> {
    let server = PreviewServer::bind(root, host, port)?;
    let url = server.url().to_string();

    let handle = server.shutdown_handle();
    ctrlc::set_handler(move || {
        info!("Shutting down...");
        handle.shutdown();
    })
    .map_err(|e| {
        FolioError::internal_error(format!("Failed to set Ctrl+C handler: {}", e))
    })?;

    let worker = thread::Builder::new()
        .name("preview-server".to_string())
        .spawn(move || server.run())
        .map_err(|e| FolioError::io_error(root.to_path_buf(), e))?;

    if open {
        info!("Opening {}", url);
        if let Err(e) = open_browser(&url) {
            warn!("Could not open browser: {}", e);
        }
    }

    worker
        .join()
        .map_err(|_| FolioError::internal_error("Preview server thread panicked"))
}

/// Asks the platform's opener to show `url`. Best effort.
pub fn open_browser(url: &str) -> io::Result<()> {
    let (program, args): (&str, Vec<&str>) = if cfg!(target_os = "macos") {
        ("open", vec![url])
    } else if cfg!(target_os = "windows") {
        // `start` is a cmd.exe builtin, not a standalone executable
        ("cmd", vec!["/C", "start", "", url])
    } else if cfg!(unix) {
        ("xdg-open", vec![url])
    } else {
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "no known browser opener on this platform",
        ));
    };

    let child = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    debug!("Launched {} (pid {})", program, child.id());
    Ok(())
}

/// Handle a single HTTP request.
///
/// Resolution order: exact file, then `index.html` inside a directory,
/// otherwise 404. A directory requested without its trailing slash is
/// redirected to the slash form so relative links keep working.
fn handle_request(request: Request, root: &Path) -> Result<()> {
    if !matches!(request.method(), Method::Get | Method::Head) {
        return respond_status(request, 405, "405 Method Not Allowed");
    }

    let (path, suffix) = split_url(request.url());
    let Some(local_path) = resolve_path(root, path) else {
        return respond_status(request, 404, "404 Not Found");
    };

    if local_path.is_file() {
        return serve_file(request, &local_path);
    }

    if local_path.is_dir() {
        if !path.ends_with('/') {
            let location = format!("{}/{}", path, suffix);
            return redirect(request, &location);
        }
        let index_path = local_path.join("index.html");
        if index_path.is_file() {
            return serve_file(request, &index_path);
        }
    }

    respond_status(request, 404, "404 Not Found")
}

/// Splits a raw request URL into its path and the `?query#fragment` rest.
fn split_url(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(index) => url.split_at(index),
        None => (url, ""),
    }
}

/// Maps the raw path of a request URL onto a path under `root`.
///
/// Returns `None` for paths that fail to decode or that try to climb out of
/// `root`.
fn resolve_path(root: &Path, path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(path).ok()?;

    let mut local = root.to_path_buf();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s if s.contains('\\') || s.contains(':') => return None,
            s => local.push(s),
        }
    }
    Some(local)
}

fn content_type_header(value: &str) -> Result<Header> {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes()).map_err(|()| {
        FolioError::internal_error(format!("Invalid Content-Type header: {}", value))
    })
}

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content =
        fs::read(path).map_err(|e| FolioError::io_error(path.to_path_buf(), e))?;
    let response = Response::from_data(content)
        .with_header(content_type_header(guess_content_type(path))?);

    request
        .respond(response)
        .map_err(|e| FolioError::io_error(path.to_path_buf(), e))
}

fn redirect(request: Request, location: &str) -> Result<()> {
    let header = Header::from_bytes(&b"Location"[..], location.as_bytes())
        .map_err(|()| {
            FolioError::internal_error(format!("Invalid Location header: {}", location))
        })?;
    let response = Response::from_string("301 Moved Permanently")
        .with_status_code(301)
        .with_header(header);

    request.respond(response).map_err(FolioError::from)
}

fn respond_status(request: Request, status: u16, body: &str) -> Result<()> {
    // `from_string` already sets a text/plain content type.
    let response = Response::from_string(body).with_status_code(status);

    request.respond(response).map_err(FolioError::from)
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        Some("pdf") => "application/pdf",

        _ => "application/octet-stream",
    }
}
