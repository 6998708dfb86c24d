use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use super::{Connection, ConnectionError, HttpRequest, RawResponse};

/// `reqwest`-backed [`Connection`].
///
/// The async client is shared by clones. The blocking client is only created on the first
/// blocking call, so a connection can be built and dropped inside an async runtime.
/// Blocking calls themselves must not run on an async runtime thread.
#[derive(Clone)]
pub struct HttpConnection {
    client: reqwest::Client,
    blocking: Arc<OnceLock<reqwest::blocking::Client>>,
}

impl HttpConnection {
    /// Creates a connection using the given async client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            blocking: Arc::default(),
        }
    }

    fn blocking_client(&self) -> Result<&reqwest::blocking::Client, ConnectionError> {
        if let Some(client) = self.blocking.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(self.blocking.get_or_init(|| client))
    }
}

impl Default for HttpConnection {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl fmt::Debug for HttpConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConnection")
            .field("blocking_initialized", &self.blocking.get().is_some())
            .finish_non_exhaustive()
    }
}

impl Connection for HttpConnection {
    fn send(&self, request: HttpRequest) -> Result<RawResponse, ConnectionError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        let mut builder = self.blocking_client()?.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body.to_vec());
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send()?;
        debug!(status = %response.status(), "...receiving (blocking)");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes()?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    async fn send_async(&self, request: HttpRequest) -> Result<RawResponse, ConnectionError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        debug!(status = %response.status(), "...receiving");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
