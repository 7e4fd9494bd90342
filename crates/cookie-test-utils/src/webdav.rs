//! Minimal in-memory WebDAV server for integration tests.
//!
//! Speaks just enough HTTP for the sync client: PROPFIND, MKCOL, GET,
//! PUT and DELETE against an in-memory file map. Connections are served
//! on background threads and kept alive, which is what a pooling HTTP
//! client expects.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

#[derive(Debug, Default)]
struct DavState {
    files: HashMap<String, String>,
    collections: HashSet<String>,
    requests: Vec<String>,
}

/// Handle to a running stub server.
///
/// The listener thread is detached and lives for the rest of the test
/// process; every handle method only touches shared state.
pub struct DavServer {
    url: String,
    state: Arc<Mutex<DavState>>,
}

impl DavServer {
    /// Bind to an ephemeral port and start serving.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .unwrap_or_else(|e| panic!("DavServer: failed to bind: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("DavServer: no local addr: {e}"));
        let state = Arc::new(Mutex::new(DavState::default()));
        let accept_state = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let state = Arc::clone(&accept_state);
                thread::spawn(move || serve_connection(stream, state));
            }
        });
        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    /// Base URL clients should connect to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Pre-populate a file.
    pub fn seed_file(&self, path: &str, body: &str) {
        self.lock().files.insert(path.to_string(), body.to_string());
    }

    /// Pre-populate a collection so MKCOL reports it as already there.
    pub fn seed_collection(&self, path: &str) {
        self.lock().collections.insert(path.to_string());
    }

    /// Current body of a file, if present.
    pub fn file(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).cloned()
    }

    /// Paths of files under a prefix, sorted.
    pub fn files_under(&self, prefix: &str) -> Vec<String> {
        let mut paths: Vec<String> = self
            .lock()
            .files
            .keys()
            .filter(|p| p.starts_with(prefix))
            .cloned()
            .collect();
        paths.sort();
        paths
    }

    /// Every "METHOD path" request line seen so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, DavState> {
        self.state
            .lock()
            .unwrap_or_else(|e| panic!("DavServer: poisoned lock: {e}"))
    }
}

fn serve_connection(mut stream: TcpStream, state: Arc<Mutex<DavState>>) {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let header_end = loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        };
        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())?
            })
            .unwrap_or(0);
        while buf.len() < header_end + content_length {
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
        let body = String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string();
        buf.drain(..header_end + content_length);

        let request_line = head.lines().next().unwrap_or_default();
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default().to_string();
        let path = parts.next().unwrap_or_default().to_string();

        let (status, response_body) = respond(&method, &path, body, &state);
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\n\r\n{response_body}",
            response_body.len()
        );
        if stream.write_all(response.as_bytes()).is_err() {
            return;
        }
    }
}

fn respond(
    method: &str,
    path: &str,
    body: String,
    state: &Arc<Mutex<DavState>>,
) -> (&'static str, String) {
    let mut state = state
        .lock()
        .unwrap_or_else(|e| panic!("DavServer: poisoned lock: {e}"));
    state.requests.push(format!("{method} {path}"));
    match method {
        "PROPFIND" => ("207 Multi-Status", String::new()),
        "MKCOL" => {
            if state.collections.contains(path) {
                ("405 Method Not Allowed", String::new())
            } else {
                state.collections.insert(path.to_string());
                ("201 Created", String::new())
            }
        }
        "GET" => match state.files.get(path) {
            Some(body) => ("200 OK", body.clone()),
            None => ("404 Not Found", String::new()),
        },
        "PUT" => {
            state.files.insert(path.to_string(), body);
            ("201 Created", String::new())
        }
        "DELETE" => {
            if state.files.remove(path).is_some() {
                ("204 No Content", String::new())
            } else {
                ("404 Not Found", String::new())
            }
        }
        _ => ("400 Bad Request", String::new()),
    }
}
