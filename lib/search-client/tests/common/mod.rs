#![allow(
    clippy::missing_errors_doc,
    dead_code,
    missing_docs,
    clippy::expect_used
)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use http::StatusCode;
use rstest::fixture;
use tracing::{debug, info};

use search_client::SearchClient;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

/// A request as received by the [`FakeNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ReceivedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }
}

/// Minimal HTTP/1.1 node answering one request per connection.
#[derive(Debug)]
pub struct FakeNode {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
}

impl FakeNode {
    pub fn start<F>(handler: F) -> anyhow::Result<Self>
    where
        F: Fn(&ReceivedRequest) -> (StatusCode, String) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let received = Arc::<Mutex<Vec<ReceivedRequest>>>::default();

        let log = Arc::clone(&received);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else {
                    continue;
                };
                if let Err(error) = serve(stream, &handler, &log) {
                    debug!(?error, "fake node failed to answer");
                }
            }
        });

        info!(%addr, "fake node listening");
        Ok(Self { addr, received })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn client(&self) -> SearchClient {
        SearchClient::builder()
            .with_port(self.port())
            .build()
            .expect("valid client")
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_received(&self) -> ReceivedRequest {
        self.received().pop().expect("a request was received")
    }
}

fn serve<F>(
    stream: TcpStream,
    handler: &F,
    log: &Mutex<Vec<ReceivedRequest>>,
) -> anyhow::Result<()>
where
    F: Fn(&ReceivedRequest) -> (StatusCode, String),
{
    let mut reader = BufReader::new(stream.try_clone()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or_default();
    let mut body = vec![0; length];
    reader.read_exact(&mut body)?;

    let request = ReceivedRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    let (status, body) = handler(&request);
    debug!(?request, %status, "fake node answering");
    log.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(request);

    let mut stream = stream;
    write!(
        stream,
        "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown"),
        body.len(),
    )?;
    stream.flush()?;
    Ok(())
}

/// Answers like a small cluster holding a `logs` index.
pub fn cluster(request: &ReceivedRequest) -> (StatusCode, String) {
    let shards = r#"{"_shards":{"total":2,"successful":1,"failed":0}}"#;
    match (request.method.as_str(), request.path()) {
        ("POST", "/_refresh" | "/logs/_refresh") => (StatusCode::OK, shards.to_string()),
        ("POST", path) if path.ends_with("/_refresh") => (
            StatusCode::NOT_FOUND,
            r#"{"error":"IndexMissingException[[missing] missing]","status":404}"#.to_string(),
        ),
        ("GET", "/_cat/indices" | "/_cat/indices/logs") => (
            StatusCode::OK,
            r#"[{"health":"yellow","status":"open","index":"logs","docs.count":"1200"}]"#
                .to_string(),
        ),
        ("GET", "/_cat/health") => (
            StatusCode::OK,
            r#"[{"epoch":"1412345678","timestamp":"12:00:00","cluster":"test","status":"green"}]"#
                .to_string(),
        ),
        ("DELETE", "/_search/scroll" | "/_search/scroll/_all") => (StatusCode::OK, String::new()),
        _ => (
            StatusCode::BAD_REQUEST,
            r#"{"error":"no handler found","status":400}"#.to_string(),
        ),
    }
}

#[fixture]
pub fn node() -> FakeNode {
    init_tracing();
    FakeNode::start(cluster).expect("fake node started")
}
