use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use headers::{ContentType, HeaderMapExt};
use http::{HeaderMap, Method, StatusCode};
use serde::Deserialize;
use url::Url;

use super::serializer::DeserializeError;

/// Metadata of one HTTP exchange with the cluster.
///
/// Every [`Response`] carries the details of the call that produced it, whether the call
/// succeeded or not.
#[derive(Debug, Clone)]
pub struct ApiCallDetails {
    success: bool,
    status_code: StatusCode,
    method: Method,
    uri: Url,
    opaque_id: Option<String>,
    request_body: Option<Bytes>,
    response_headers: HeaderMap,
    server_error: Option<ServerError>,
    original_error: Option<Arc<DeserializeError>>,
}

impl ApiCallDetails {
    pub(in crate::client) fn new(
        method: Method,
        uri: Url,
        status_code: StatusCode,
        allowed_status_codes: &[u16],
    ) -> Self {
        let success =
            status_code.is_success() || allowed_status_codes.contains(&status_code.as_u16());
        Self {
            success,
            status_code,
            method,
            uri,
            opaque_id: None,
            request_body: None,
            response_headers: HeaderMap::new(),
            server_error: None,
            original_error: None,
        }
    }

    pub(in crate::client) fn with_opaque_id(mut self, opaque_id: Option<String>) -> Self {
        self.opaque_id = opaque_id;
        self
    }

    pub(in crate::client) fn with_request_body(mut self, request_body: Option<Bytes>) -> Self {
        self.request_body = request_body;
        self
    }

    pub(in crate::client) fn with_response_headers(mut self, headers: HeaderMap) -> Self {
        self.response_headers = headers;
        self
    }

    pub(in crate::client) fn set_server_error(&mut self, server_error: ServerError) {
        self.server_error = Some(server_error);
    }

    pub(in crate::client) fn set_original_error(&mut self, error: DeserializeError) {
        self.original_error = Some(Arc::new(error));
    }

    /// Whether the status code is 2xx or one of the allowed status codes of the request.
    pub fn success(&self) -> bool {
        self.success
    }

    /// Returns the HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the complete request URI.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Returns the `X-Opaque-Id` sent with the request.
    pub fn opaque_id(&self) -> Option<&str> {
        self.opaque_id.as_deref()
    }

    /// Returns the request body, if one was sent.
    pub fn request_body(&self) -> Option<&[u8]> {
        self.request_body.as_deref()
    }

    /// Returns the response headers.
    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    /// Returns the response content type, if present and valid.
    pub fn response_content_type(&self) -> Option<ContentType> {
        self.response_headers.typed_get::<ContentType>()
    }

    /// Returns the error reported by the node for a failed call.
    pub fn server_error(&self) -> Option<&ServerError> {
        self.server_error.as_ref()
    }

    /// Returns the error raised while decoding the response body.
    pub fn original_error(&self) -> Option<&DeserializeError> {
        self.original_error.as_deref()
    }
}

impl fmt::Display for ApiCallDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.success {
            "successful"
        } else {
            "unsuccessful"
        };
        write!(
            f,
            "{outcome} call {} {} (status {})",
            self.method, self.uri, self.status_code
        )?;
        if let Some(error) = &self.server_error {
            write!(f, ", server error: {}", error.reason().unwrap_or("<unknown>"))?;
        }
        if let Some(error) = &self.original_error {
            write!(f, ", deserialization error: {error}")?;
        }
        Ok(())
    }
}

/// Error body returned by the cluster for a failed call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerError {
    /// Status code echoed in the body.
    #[serde(default)]
    pub status: Option<u16>,
    /// Error description; a plain string on older clusters, a structured object on newer ones.
    #[serde(default)]
    pub error: serde_json::Value,
}

impl ServerError {
    /// Returns a human readable reason, if the error carries one.
    pub fn reason(&self) -> Option<&str> {
        match &self.error {
            serde_json::Value::String(reason) => Some(reason),
            serde_json::Value::Object(error) => {
                error.get("reason").and_then(serde_json::Value::as_str)
            }
            _ => None,
        }
    }
}

/// Response materialized by the [`Transport`](crate::Transport): decoded body and call details.
#[derive(Debug)]
pub struct TransportResponse<R> {
    /// Metadata of the call.
    pub details: ApiCallDetails,
    /// Decoded body; `None` for an empty body or a failed call.
    pub body: Option<R>,
}

/// Typed response returned to the caller: the decoded payload plus call metadata.
///
/// Failed calls do not produce an `Err`: inspect [`is_valid`](Self::is_valid) and the
/// [`api_call`](Self::api_call) details instead.
///
/// # Example
///
/// ```rust,no_run
/// use search_client::{SearchClient, RefreshRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SearchClient::builder().build()?;
/// let response = client.refresh_async(RefreshRequest::index("logs")).await?;
///
/// if response.is_valid() {
///     let shards = response.body().map(|body| body.shards.successful);
///     println!("refreshed {shards:?} shards");
/// } else {
///     println!("refresh failed: {}", response.api_call());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<R> {
    body: Option<R>,
    details: ApiCallDetails,
}

impl<R> Response<R> {
    /// Whether the call succeeded and its body, if any, was decoded.
    pub fn is_valid(&self) -> bool {
        self.details.success() && self.details.original_error().is_none()
    }

    /// Returns the decoded payload.
    ///
    /// `None` for an empty body (e.g. an acknowledgement) or a failed call.
    pub fn body(&self) -> Option<&R> {
        self.body.as_ref()
    }

    /// Consumes the response and returns the decoded payload.
    pub fn into_body(self) -> Option<R> {
        self.body
    }

    /// Returns the call metadata.
    pub fn api_call(&self) -> &ApiCallDetails {
        &self.details
    }

    /// Returns the HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        self.details.status_code()
    }

    /// Returns the error reported by the node, if any.
    pub fn server_error(&self) -> Option<&ServerError> {
        self.details.server_error()
    }

    /// Returns the error raised while decoding the body, if any.
    pub fn original_error(&self) -> Option<&DeserializeError> {
        self.details.original_error()
    }
}

impl<R> From<TransportResponse<R>> for Response<R> {
    fn from(value: TransportResponse<R>) -> Self {
        let TransportResponse { details, body } = value;
        Self { body, details }
    }
}
