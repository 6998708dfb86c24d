use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use headers::{ContentType, HeaderMapExt};
use http::{HeaderMap, StatusCode};
use tracing::debug;

use super::{Connection, ConnectionError, HttpRequest, RawResponse};

/// [`Connection`] answering every request with the same canned response.
///
/// Sent requests are recorded and shared between clones, which makes this connection handy
/// to check what a client puts on the wire without a running cluster.
///
/// # Example
///
/// ```rust
/// use http::StatusCode;
/// use search_client::{InMemoryConnection, RefreshRequest, SearchClient};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let connection = InMemoryConnection::json(
///     StatusCode::OK,
///     r#"{"_shards":{"total":2,"successful":2,"failed":0}}"#,
/// );
/// let client = SearchClient::builder().build_with_connection(connection.clone())?;
///
/// let response = client.refresh(RefreshRequest::all())?;
///
/// assert!(response.is_valid());
/// assert_eq!(connection.requests().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryConnection {
    outcome: Outcome,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

#[derive(Debug, Clone)]
enum Outcome {
    Respond(RawResponse),
    Unreachable(String),
}

impl InMemoryConnection {
    /// Answers with the given status and body, without content type.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let response = RawResponse {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        };
        Self::with_outcome(Outcome::Respond(response))
    }

    /// Answers with the given status and a JSON body.
    pub fn json(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        headers.typed_insert(ContentType::json());
        let response = RawResponse {
            status,
            headers,
            body: body.into(),
        };
        Self::with_outcome(Outcome::Respond(response))
    }

    /// Fails every request as if the node could not be reached.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Unreachable(message.into()))
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            requests: Arc::default(),
        }
    }

    /// Returns the requests sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the last request sent.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    fn answer(&self, request: HttpRequest) -> Result<RawResponse, ConnectionError> {
        debug!(method = %request.method, url = %request.url, "in-memory exchange");
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        match &self.outcome {
            Outcome::Respond(response) => Ok(response.clone()),
            Outcome::Unreachable(message) => Err(ConnectionError::Unreachable {
                message: message.clone(),
            }),
        }
    }
}

impl Connection for InMemoryConnection {
    fn send(&self, request: HttpRequest) -> Result<RawResponse, ConnectionError> {
        self.answer(request)
    }

    async fn send_async(&self, request: HttpRequest) -> Result<RawResponse, ConnectionError> {
        self.answer(request)
    }
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;

    fn request(path: &str) -> HttpRequest {
        HttpRequest {
            method: Method::GET,
            url: format!("http://127.0.0.1:9200{path}")
                .parse()
                .expect("valid url"),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    #[test]
    fn test_records_requests_across_clones() {
        let connection = InMemoryConnection::new(StatusCode::OK, "");
        let clone = connection.clone();

        clone.send(request("/_cat/health")).expect("canned response");
        connection.send(request("/_cat/nodes")).expect("canned response");

        let paths: Vec<String> = connection
            .requests()
            .iter()
            .map(|request| request.url.path().to_string())
            .collect();
        assert_eq!(paths, ["/_cat/health", "/_cat/nodes"]);
    }

    #[tokio::test]
    async fn test_unreachable_fails_async() {
        let connection = InMemoryConnection::unreachable("connection refused");

        let result = connection.send_async(request("/")).await;

        let error = result.expect_err("should fail");
        insta::assert_snapshot!(error, @"Node unreachable: connection refused");
        assert!(connection.last_request().is_some());
    }

    #[test]
    fn test_json_sets_content_type() {
        let connection = InMemoryConnection::json(StatusCode::OK, "[]");

        let response = connection.send(request("/")).expect("canned response");

        assert_eq!(
            response.headers.typed_get::<ContentType>(),
            Some(ContentType::json())
        );
    }
}
