//! Minimal HTTP/1.1 server with Range support for integration tests.
//!
//! Serves a single static body on every path. Open-ended `Range: bytes=N-`
//! requests get 206 (or 416 when N is at or past the end). Every request's
//! Range header is recorded so tests can check what the client sent.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// Answer this many GETs with 500 before serving normally.
    pub fail_first: usize,
    /// Answer every GET with 500.
    pub always_fail: bool,
    /// Sleep before each response (lets transfers overlap).
    pub delay: Duration,
    /// Send only this many body bytes, then hold the connection open for
    /// `STALL` without sending the rest.
    pub stall_after: Option<usize>,
}

/// How long a stalled response hangs before the server gives up.
pub const STALL: Duration = Duration::from_secs(4);

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            support_ranges: true,
            fail_first: 0,
            always_fail: false,
            delay: Duration::ZERO,
            stall_after: None,
        }
    }
}

/// Handle to a running server.
#[derive(Debug, Clone)]
pub struct RangeServer {
    base: String,
    ranges: Arc<Mutex<Vec<Option<String>>>>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl RangeServer {
    /// URL of `name` on this server, e.g. "http://127.0.0.1:12345/name".
    pub fn url(&self, name: &str) -> String {
        format!("{}{}", self.base, name)
    }

    /// Range header of every GET received so far, in arrival order.
    pub fn ranges(&self) -> Vec<Option<String>> {
        self.ranges.lock().unwrap().clone()
    }

    pub fn requests(&self) -> usize {
        self.ranges.lock().unwrap().len()
    }

    /// Highest number of requests handled at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `body`. The server runs
/// until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let server = RangeServer {
        base: format!("http://127.0.0.1:{}/", port),
        ranges: Arc::new(Mutex::new(Vec::new())),
        in_flight: Arc::new(AtomicUsize::new(0)),
        peak: Arc::new(AtomicUsize::new(0)),
    };
    let body = Arc::new(body);
    let shared = server.clone();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let shared = shared.clone();
            thread::spawn(move || handle(stream, &body, opts, &shared));
        }
    });
    server
}

fn handle(mut stream: TcpStream, body: &[u8], opts: RangeServerOptions, server: &RangeServer) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, range) = parse_request(request);
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
        return;
    }

    let seen = {
        let mut ranges = server.ranges.lock().unwrap();
        ranges.push(range.clone());
        ranges.len()
    };
    let now = server.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    server.peak.fetch_max(now, Ordering::SeqCst);
    if !opts.delay.is_zero() {
        thread::sleep(opts.delay);
    }
    // counted until the response starts
    server.in_flight.fetch_sub(1, Ordering::SeqCst);

    if opts.always_fail || seen <= opts.fail_first {
        let msg = b"server error";
        let head = format!(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            msg.len()
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(msg);
    } else {
        respond(&mut stream, body, range.as_deref().and_then(range_start), opts);
    }
}

fn respond(stream: &mut TcpStream, body: &[u8], start: Option<u64>, opts: RangeServerOptions) {
    let total = body.len() as u64;
    let (status, content_range, slice) = match start.filter(|_| opts.support_ranges) {
        Some(start) if start >= total => (
            "416 Range Not Satisfiable",
            Some(format!("bytes */{}", total)),
            &body[0..0],
        ),
        Some(start) => (
            "206 Partial Content",
            Some(format!("bytes {}-{}/{}", start, total - 1, total)),
            &body[start as usize..],
        ),
        None => ("200 OK", None, body),
    };
    let content_range = content_range
        .map(|v| format!("Content-Range: {}\r\n", v))
        .unwrap_or_default();
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Accept-Ranges: bytes\r\nConnection: close\r\n\r\n",
        status,
        slice.len(),
        content_range
    );
    let _ = stream.write_all(head.as_bytes());
    match opts.stall_after {
        Some(n) => {
            let _ = stream.write_all(&slice[..n.min(slice.len())]);
            let _ = stream.flush();
            thread::sleep(STALL);
        }
        None => {
            let _ = stream.write_all(slice);
        }
    }
}

/// Start offset of an open-ended `bytes=N-` value.
fn range_start(value: &str) -> Option<u64> {
    let bounds = value.trim().strip_prefix("bytes=")?;
    let (start, _) = bounds.split_once('-')?;
    start.trim().parse().ok()
}

/// Returns (method, Range header value).
fn parse_request(request: &str) -> (&str, Option<String>) {
    let mut lines = request.lines();
    let method = lines
        .next()
        .and_then(|l| l.split_whitespace().next())
        .unwrap_or("");
    let range = lines
        .take_while(|l| !l.trim().is_empty())
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("range"))
        .map(|(_, value)| value.trim().to_string());
    (method, range)
}
