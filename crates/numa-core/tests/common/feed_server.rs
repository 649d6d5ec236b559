//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a mutable set of routes (path → status + body) and records the
//! request path and `Authorization` header of every request it sees.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }
}

/// One request as seen by the server: (path, Authorization header if any).
type Seen = Arc<Mutex<Vec<(String, Option<String>)>>>;
type Routes = Arc<Mutex<HashMap<String, Route>>>;

pub struct FeedServer {
    pub base_url: String,
    routes: Routes,
    seen: Seen,
}

impl FeedServer {
    /// Add or replace the response for `path`.
    pub fn route(&self, path: &str, route: Route) {
        self.routes.lock().unwrap().insert(path.to_string(), route);
    }

    /// Requests made to `path`, in order, with their Authorization headers.
    pub fn auth_for(&self, path: &str) -> Vec<Option<String>> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, a)| a.clone())
            .collect()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Starts a server with no routes in a background thread. `base_url` has no
/// trailing slash (e.g. "http://127.0.0.1:12345"). Runs until the process exits.
pub fn start() -> FeedServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Routes = Arc::new(Mutex::new(HashMap::new()));
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let routes_srv = Arc::clone(&routes);
    let seen_srv = Arc::clone(&seen);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes_srv);
            let seen = Arc::clone(&seen_srv);
            thread::spawn(move || handle(stream, &routes, &seen));
        }
    });
    FeedServer {
        base_url: format!("http://127.0.0.1:{}", port),
        routes,
        seen,
    }
}

fn handle(mut stream: std::net::TcpStream, routes: &Routes, seen: &Seen) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (path, auth) = parse_request(request);
    seen.lock().unwrap().push((path.to_string(), auth));

    let route = routes
        .lock()
        .unwrap()
        .get(path)
        .cloned()
        .unwrap_or_else(|| Route::status(404));
    let reason = match route.status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.status,
        reason,
        route.body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(&route.body);
}

/// Returns (path, optional Authorization header value).
fn parse_request(request: &str) -> (&str, Option<String>) {
    let mut path = "";
    let mut auth = None;
    for (i, line) in request.lines().enumerate() {
        let line = line.trim_end();
        if i == 0 {
            path = line.split_whitespace().nth(1).unwrap_or("");
            continue;
        }
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("authorization") {
                auth = Some(value.trim().to_string());
            }
        }
    }
    (path, auth)
}
