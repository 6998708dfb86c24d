//! Low-level transport: raw HTTP exchanges and response materialization.
//!
//! - [`Connection`] - sends one [`HttpRequest`] and returns a [`RawResponse`]
//! - [`HttpConnection`] - `reqwest`-backed connection, blocking and async
//! - [`InMemoryConnection`] - canned responses, records sent requests
//! - [`Transport`] - turns a [`RequestPath`](crate::RequestPath) into a typed
//!   [`TransportResponse`](crate::TransportResponse), honoring deserialization overrides

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

mod http_connection;
pub use self::http_connection::HttpConnection;

mod in_memory;
pub use self::in_memory::InMemoryConnection;

mod settings;
pub use self::settings::ConnectionSettings;

mod low_level;
pub use self::low_level::Transport;

/// A fully prepared HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL, query string included.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Option<Bytes>,
    /// Timeout for the complete exchange.
    pub timeout: Option<Duration>,
}

/// Transport-level result of an HTTP exchange.
///
/// The body is read completely before the response is handed over, then decoded once.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

/// The HTTP exchange did not complete.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ConnectionError {
    /// Error from the underlying reqwest client (connect, timeout, body read).
    #[display("{_0}")]
    Http(reqwest::Error),

    /// The node cannot be reached.
    #[display("Node unreachable: {message}")]
    #[from(skip)]
    Unreachable {
        /// Description of the failure.
        message: String,
    },
}

/// Sends HTTP requests to a cluster node.
///
/// Both forms must have the same semantics: given the same node behavior, `send` and
/// `send_async` return equivalent responses. Cancellation of the async form is dropping
/// the future.
pub trait Connection: Debug + Clone + Send + Sync + 'static {
    /// Sends the request, blocking the calling thread until the body is read.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] if no HTTP response was received.
    fn send(&self, request: HttpRequest) -> Result<RawResponse, ConnectionError>;

    /// Sends the request asynchronously.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] if no HTTP response was received.
    fn send_async(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<RawResponse, ConnectionError>> + Send;
}
