//! Minimal HTTP/1.1 mirror for integration tests.
//!
//! Serves an index page at `/us.html` and extract files under `/us/`. Each
//! route can answer normally, with an error status, without Content-Length,
//! or by closing before the declared length. Every request path is recorded.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with Content-Length.
    Body(Vec<u8>),
    /// 200 without Content-Length; the body ends when the connection closes.
    BodyNoLength(Vec<u8>),
    /// 200 declaring `declared` bytes but sending only `body`.
    Short { body: Vec<u8>, declared: u64 },
    /// Bare status with a short text body.
    Status(u16),
}

pub struct Mirror {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl Mirror {
    pub fn index_url(&self) -> String {
        format!("{}/us.html", self.base)
    }

    pub fn file_base_url(&self) -> String {
        format!("{}/us", self.base)
    }

    /// Paths requested so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn pbf_requests(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|p| p.ends_with(".osm.pbf"))
            .collect()
    }
}

/// Geofabrik-style listing with one `href="<name>-latest.osm.pbf"` per region.
pub fn index_page(regions: &[&str]) -> Vec<u8> {
    let mut html = String::from("<html><body><table>\n");
    for r in regions {
        html.push_str(&format!(
            "<tr><td><a href=\"us/{r}.html\">{r}</a></td><td><a href=\"{r}-latest.osm.pbf\">[.osm.pbf]</a></td></tr>\n"
        ));
    }
    html.push_str("</table></body></html>\n");
    html.into_bytes()
}

/// Deterministic payload of `len` bytes.
pub fn payload(len: usize) -> Vec<u8> {
    (0u8..251).cycle().take(len).collect()
}

/// Starts the mirror on an ephemeral port. `files` maps file names
/// (e.g. `wyoming-latest.osm.pbf`) to replies; unknown paths get 404.
pub fn start(index: Reply, files: Vec<(&str, Reply)>) -> Mirror {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let mut routes: HashMap<String, Reply> = files
        .into_iter()
        .map(|(name, reply)| (format!("/us/{}", name), reply))
        .collect();
    routes.insert("/us.html".to_string(), index);
    let routes = Arc::new(routes);
    let requests = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &routes, &log));
        }
    });

    Mirror {
        base: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Reply>, log: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let path = request
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    log.lock().unwrap().push(path.clone());

    let reply = routes.get(&path).cloned().unwrap_or(Reply::Status(404));
    let _ = match reply {
        Reply::Body(body) => respond(&mut stream, "200 OK", Some(body.len() as u64), &body),
        Reply::BodyNoLength(body) => respond(&mut stream, "200 OK", None, &body),
        Reply::Short { body, declared } => respond(&mut stream, "200 OK", Some(declared), &body),
        Reply::Status(code) => {
            let body = format!("status {}\n", code).into_bytes();
            respond(&mut stream, &format!("{} Error", code), Some(body.len() as u64), &body)
        }
    };
}

fn respond(
    stream: &mut TcpStream,
    status: &str,
    content_length: Option<u64>,
    body: &[u8],
) -> std::io::Result<()> {
    let length = content_length
        .map(|n| format!("Content-Length: {}\r\n", n))
        .unwrap_or_default();
    let head = format!(
        "HTTP/1.1 {}\r\n{}Content-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        status, length
    );
    stream.write_all(head.as_bytes())?;
    stream.write_all(body)?;
    stream.flush()
}
