use std::sync::Arc;

use bytes::Bytes;
use headers::{ContentType, HeaderMapExt};
use http::header::{ACCEPT, CONTENT_TYPE, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::{Connection, ConnectionSettings, HttpConnection, HttpRequest, RawResponse};
use crate::client::request::{
    DeserializationOverride, PostData, RequestParameters, RequestPath,
};
use crate::client::response::{ApiCallDetails, ServerError, TransportResponse};
use crate::client::serializer::{JsonSerializer, Serializer};
use crate::client::SearchClientError;

const OPAQUE_ID: HeaderName = HeaderName::from_static("x-opaque-id");

/// Everything about a prepared call that is still needed once the response arrives.
struct CallContext {
    method: Method,
    url: Url,
    opaque_id: String,
    allowed_status_codes: Vec<u16>,
    request_body: Option<Bytes>,
}

/// Low-level dispatch surface of the client.
///
/// A `Transport` resolves a [`RequestPath`] into an HTTP request, sends it through its
/// [`Connection`], and materializes a [`TransportResponse`]: the body is decoded by the
/// deserialization override attached to the descriptor when there is one, by the serializer
/// otherwise. Endpoint-specific dispatch methods (`indices_refresh_dispatch`,
/// `clear_scroll_dispatch`, `cat_dispatch`, ...) build on [`perform`](Self::perform) and
/// [`perform_async`](Self::perform_async).
///
/// Failed calls are not errors: they produce a response whose details are unsuccessful,
/// unless the settings ask to throw on invalid responses.
///
/// A deserialization override attached to the descriptor only runs on a successful call with a
/// non-blank body. It is dropped without being called otherwise.
#[derive(Debug, Clone)]
pub struct Transport<C = HttpConnection, S = JsonSerializer> {
    connection: C,
    serializer: S,
    settings: Arc<ConnectionSettings>,
}

impl<C, S> Transport<C, S>
where
    C: Connection,
    S: Serializer,
{
    /// Creates a transport.
    pub fn new(connection: C, serializer: S, settings: ConnectionSettings) -> Self {
        Self {
            connection,
            serializer,
            settings: Arc::new(settings),
        }
    }

    /// Returns the connection.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Returns the serializer.
    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    /// Returns the client-wide settings.
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Sends a request, blocking the calling thread.
    ///
    /// The route values of the descriptor are not read: `path` is the already resolved URL path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built, if the node cannot be reached, or, when
    /// throwing is enabled, if the response is invalid.
    #[tracing::instrument(skip_all, fields(%method, %path))]
    pub fn perform<P, R>(
        &self,
        method: Method,
        path: &str,
        descriptor: RequestPath<P, R>,
    ) -> Result<TransportResponse<R>, SearchClientError>
    where
        P: RequestParameters,
        R: DeserializeOwned,
    {
        let (_, params, body, deserialization_override) = descriptor.into_parts();
        let (request, context) = self.prepare(method, path, &params, body)?;

        debug!(url = %context.url, opaque_id = %context.opaque_id, "sending...");
        let raw = self.connection.send(request)?;

        self.materialize(context, raw, deserialization_override)
    }

    /// Sends a request asynchronously.
    ///
    /// # Errors
    ///
    /// Same as [`perform`](Self::perform).
    #[tracing::instrument(skip_all, fields(%method, %path))]
    pub async fn perform_async<P, R>(
        &self,
        method: Method,
        path: &str,
        descriptor: RequestPath<P, R>,
    ) -> Result<TransportResponse<R>, SearchClientError>
    where
        P: RequestParameters,
        R: DeserializeOwned,
    {
        let (_, params, body, deserialization_override) = descriptor.into_parts();
        let (request, context) = self.prepare(method, path, &params, body)?;

        debug!(url = %context.url, opaque_id = %context.opaque_id, "sending...");
        let raw = self.connection.send_async(request).await?;

        self.materialize(context, raw, deserialization_override)
    }

    fn prepare<P>(
        &self,
        method: Method,
        path: &str,
        params: &P,
        body: Option<PostData>,
    ) -> Result<(HttpRequest, CallContext), SearchClientError>
    where
        P: RequestParameters,
    {
        let url = self.build_url(path, params)?;
        let configuration = params.request_configuration();

        let mut headers = self.settings.default_headers.clone();
        if let Some(authentication) = &self.settings.authentication {
            let (name, value) = authentication.to_header()?;
            headers.insert(name, value);
        }

        let body = match body {
            Some(PostData::Raw(data)) => Some(data),
            Some(PostData::Json(value)) => Some(Bytes::from(self.serializer.serialize(&value)?)),
            None => None,
        };

        let content_type = configuration.and_then(|configuration| configuration.content_type());
        if let Some(content_type) = content_type {
            let value = HeaderValue::from_str(content_type)?;
            headers.insert(CONTENT_TYPE, value.clone());
            headers.insert(ACCEPT, value);
        } else if body.is_some() {
            headers.typed_insert(ContentType::json());
        }

        if let Some(configuration) = configuration {
            for (name, value) in configuration.headers() {
                headers.insert(
                    HeaderName::from_bytes(name.as_bytes())?,
                    HeaderValue::from_str(value)?,
                );
            }
        }

        let opaque_id = configuration
            .and_then(|configuration| configuration.opaque_id())
            .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);
        headers.insert(OPAQUE_ID, HeaderValue::from_str(&opaque_id)?);

        let timeout = configuration
            .and_then(|configuration| configuration.request_timeout())
            .or(self.settings.request_timeout);
        let allowed_status_codes = configuration
            .map(|configuration| configuration.allowed_status_codes().to_vec())
            .unwrap_or_default();

        let context = CallContext {
            method: method.clone(),
            url: url.clone(),
            opaque_id,
            allowed_status_codes,
            request_body: body.clone(),
        };
        let request = HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        };
        Ok((request, context))
    }

    fn build_url<P>(&self, path: &str, params: &P) -> Result<Url, SearchClientError>
    where
        P: RequestParameters,
    {
        let url = format!(
            "{}/{}",
            self.settings.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = url.parse::<Url>()?;

        let query = params.query_string();
        if !query.is_empty() {
            let query_string = query.to_query_string()?;
            url.set_query(Some(&query_string));
        }

        Ok(url)
    }

    fn materialize<R>(
        &self,
        context: CallContext,
        raw: RawResponse,
        deserialization_override: Option<DeserializationOverride<R>>,
    ) -> Result<TransportResponse<R>, SearchClientError>
    where
        R: DeserializeOwned,
    {
        let CallContext {
            method,
            url,
            opaque_id,
            allowed_status_codes,
            request_body,
        } = context;
        let RawResponse {
            status,
            headers,
            body,
        } = raw;

        let mut details = ApiCallDetails::new(method, url, status, &allowed_status_codes)
            .with_opaque_id(Some(opaque_id))
            .with_request_body(request_body)
            .with_response_headers(headers);
        debug!(%status, "...receiving");

        let decoded = if !details.success() {
            if let Some(server_error) = self.decode_server_error(status, &body) {
                details.set_server_error(server_error);
            }
            warn!(%details, "call failed");
            None
        } else if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            let result = match deserialization_override {
                Some(deserialize) => deserialize(&details, &body),
                None => self.serializer.deserialize::<R>(&body),
            };
            match result {
                Ok(value) => Some(value),
                Err(error) => {
                    warn!(%error, "failed to deserialize response body");
                    details.set_original_error(error);
                    None
                }
            }
        };

        let valid = details.success() && details.original_error().is_none();
        if self.settings.throw_exceptions && !valid {
            return Err(SearchClientError::InvalidResponse {
                method: details.method().clone(),
                uri: details.uri().to_string(),
                status_code: status.as_u16(),
                details: Box::new(details),
            });
        }

        Ok(TransportResponse {
            details,
            body: decoded,
        })
    }

    fn decode_server_error(&self, status: StatusCode, body: &[u8]) -> Option<ServerError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        let server_error = self
            .serializer
            .deserialize::<ServerError>(body)
            .unwrap_or_else(|_| ServerError {
                status: Some(status.as_u16()),
                error: serde_json::Value::String(String::from_utf8_lossy(body).into_owned()),
            });
        Some(server_error)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use serde::Deserialize;

    use super::*;
    use crate::client::request::{RequestConfiguration, RouteValues, request_parameters};
    use crate::client::serializer::DeserializeError;
    use crate::client::transport::InMemoryConnection;
    use crate::client::Authentication;

    request_parameters! {
        /// Parameters used by the tests.
        TestParameters {
            /// Verbose flag.
            verbose(bool) => "v",
            /// Columns.
            columns(&[&str]) => "h",
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Count {
        count: u32,
    }

    fn transport(connection: InMemoryConnection) -> Transport<InMemoryConnection> {
        let settings = ConnectionSettings::new("http://127.0.0.1:9200".parse().expect("valid url"));
        Transport::new(connection, JsonSerializer, settings)
    }

    fn descriptor<R>(params: TestParameters) -> RequestPath<TestParameters, R> {
        RequestPath::new(RouteValues::default(), params)
    }

    #[test]
    fn test_default_decode() {
        let connection = InMemoryConnection::json(StatusCode::OK, r#"{"count":3}"#);
        let transport = transport(connection);

        let response = transport
            .perform::<_, Count>(Method::GET, "/_count", descriptor(TestParameters::new()))
            .expect("should dispatch");

        assert!(response.details.success());
        assert_eq!(response.body, Some(Count { count: 3 }));
    }

    #[test]
    fn test_override_replaces_default_decode() {
        let connection = InMemoryConnection::json(StatusCode::OK, "[1,2,3]");
        let transport = transport(connection);
        let serializer = *transport.serializer();

        let descriptor = descriptor::<Count>(TestParameters::new()).with_deserialization_override(
            move |details: &ApiCallDetails, body: &[u8]| {
                assert!(details.success());
                let values: Vec<u32> = serializer.deserialize(body)?;
                Ok(Count {
                    count: values.iter().sum(),
                })
            },
        );
        let response = transport
            .perform(Method::GET, "/_numbers", descriptor)
            .expect("should dispatch");

        assert_eq!(response.body, Some(Count { count: 6 }));
    }

    #[test]
    fn test_deserialization_failure_is_captured() {
        let connection = InMemoryConnection::json(StatusCode::OK, r#"{"count":"many"}"#);
        let transport = transport(connection);

        let response = transport
            .perform::<_, Count>(Method::GET, "/_count", descriptor(TestParameters::new()))
            .expect("should dispatch");

        assert!(response.body.is_none());
        let error: &DeserializeError = response
            .details
            .original_error()
            .expect("error captured");
        insta::assert_snapshot!(error.path, @"count");
    }

    #[test]
    fn test_failed_call_captures_server_error() {
        let connection = InMemoryConnection::json(
            StatusCode::NOT_FOUND,
            r#"{"error":"IndexMissingException[[logs] missing]","status":404}"#,
        );
        let transport = transport(connection);

        let response = transport
            .perform::<_, Count>(Method::GET, "/logs/_count", descriptor(TestParameters::new()))
            .expect("should dispatch");

        assert!(!response.details.success());
        assert!(response.body.is_none());
        let server_error = response.details.server_error().expect("server error");
        assert_eq!(server_error.reason(), Some("IndexMissingException[[logs] missing]"));
    }

    #[test]
    fn test_non_json_error_body_is_kept_as_text() {
        let connection = InMemoryConnection::new(StatusCode::BAD_GATEWAY, "upstream down");
        let transport = transport(connection);

        let response = transport
            .perform::<_, Count>(Method::GET, "/", descriptor(TestParameters::new()))
            .expect("should dispatch");

        let server_error = response.details.server_error().expect("server error");
        assert_eq!(server_error.status, Some(502));
        assert_eq!(server_error.reason(), Some("upstream down"));
    }

    #[test]
    fn test_allowed_status_code_is_decoded() {
        let connection = InMemoryConnection::json(StatusCode::NOT_FOUND, r#"{"count":0}"#);
        let transport = transport(connection);
        let mut params = TestParameters::new().verbose(true);
        *params.request_configuration_mut() =
            Some(RequestConfiguration::new().with_allowed_status_code(404));

        let response = transport
            .perform::<_, Count>(Method::GET, "/_count", descriptor(params))
            .expect("should dispatch");

        assert!(response.details.success());
        assert_eq!(response.body, Some(Count { count: 0 }));
    }

    #[test]
    fn test_empty_body_is_not_decoded() {
        let connection = InMemoryConnection::new(StatusCode::OK, "");
        let transport = transport(connection);

        let response = transport
            .perform::<_, Count>(Method::DELETE, "/_search/scroll", descriptor(TestParameters::new()))
            .expect("should dispatch");

        assert!(response.details.success());
        assert!(response.details.original_error().is_none());
        assert!(response.body.is_none());
    }

    #[test]
    fn test_blank_body_is_not_decoded() {
        let connection = InMemoryConnection::new(StatusCode::OK, " \r\n");
        let transport = transport(connection);

        let response = transport
            .perform::<_, Count>(Method::POST, "/_refresh", descriptor(TestParameters::new()))
            .expect("should dispatch");

        assert!(response.details.success());
        assert!(response.details.original_error().is_none());
        assert!(response.body.is_none());
    }

    #[test]
    fn test_override_is_skipped_on_failed_call() {
        let connection = InMemoryConnection::json(StatusCode::INTERNAL_SERVER_ERROR, r#"{"count":1}"#);
        let transport = transport(connection);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let path = descriptor(TestParameters::new()).with_deserialization_override(
            move |_details: &ApiCallDetails, _body: &[u8]| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Count { count: 42 })
            },
        );

        let response = transport
            .perform::<_, Count>(Method::GET, "/_count", path)
            .expect("should dispatch");

        assert!(!response.details.success());
        assert!(response.body.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_throw_exceptions_turns_failures_into_errors() {
        let connection = InMemoryConnection::json(StatusCode::INTERNAL_SERVER_ERROR, "{}");
        let mut settings =
            ConnectionSettings::new("http://127.0.0.1:9200".parse().expect("valid url"));
        settings.throw_exceptions = true;
        let transport = Transport::new(connection, JsonSerializer, settings);

        let result = transport.perform::<_, Count>(
            Method::GET,
            "/_count",
            descriptor(TestParameters::new()),
        );

        let error = result.expect_err("should throw");
        insta::assert_snapshot!(error, @"Invalid response for GET http://127.0.0.1:9200/_count: status 500");
    }

    #[test]
    fn test_unreachable_node_is_an_error() {
        let transport = transport(InMemoryConnection::unreachable("connection refused"));

        let result = transport.perform::<_, Count>(
            Method::GET,
            "/",
            descriptor(TestParameters::new()),
        );

        assert!(matches!(result, Err(SearchClientError::ConnectionError(_))));
    }

    #[test]
    fn test_request_line_headers_and_body() {
        let connection = InMemoryConnection::json(StatusCode::OK, "{}");
        let mut settings =
            ConnectionSettings::new("http://localhost:9200/es/".parse().expect("valid url"));
        settings.authentication = Some(Authentication::Bearer("token".into()));
        settings.request_timeout = Some(Duration::from_secs(30));
        let transport = Transport::new(connection.clone(), JsonSerializer, settings);

        let mut params = TestParameters::new()
            .verbose(true)
            .columns(&["index", "docs.count"]);
        *params.request_configuration_mut() = Some(
            RequestConfiguration::new()
                .with_content_type("application/json")
                .with_opaque_id("trace-42")
                .with_header("X-Custom", "yes"),
        );

        let response = transport
            .perform::<_, serde_json::Value>(
                Method::POST,
                "/_cat/indices",
                descriptor(params).with_body(PostData::raw("abc123")),
            )
            .expect("should dispatch");

        let request = connection.last_request().expect("request sent");
        insta::assert_snapshot!(request.url, @"http://localhost:9200/es/_cat/indices?v=true&h=index%2Cdocs.count");
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers[ACCEPT], "application/json");
        assert_eq!(request.headers["authorization"], "Bearer token");
        assert_eq!(request.headers["x-opaque-id"], "trace-42");
        assert_eq!(request.headers["x-custom"], "yes");
        assert_eq!(request.body.as_deref(), Some(b"abc123".as_slice()));
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
        assert_eq!(response.details.opaque_id(), Some("trace-42"));
        assert_eq!(response.details.request_body(), Some(b"abc123".as_slice()));
    }

    #[test]
    fn test_json_body_uses_serializer_and_generates_opaque_id() {
        let connection = InMemoryConnection::json(StatusCode::OK, "{}");
        let transport = transport(connection.clone());

        transport
            .perform::<_, serde_json::Value>(
                Method::DELETE,
                "/_search/scroll",
                descriptor(TestParameters::new()).with_body(PostData::Json(
                    serde_json::json!({ "scroll_id": ["a", "b"] }),
                )),
            )
            .expect("should dispatch");

        let request = connection.last_request().expect("request sent");
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert!(request.headers.get(ACCEPT).is_none());
        let opaque_id = request.headers["x-opaque-id"].to_str().expect("ascii");
        assert!(uuid::Uuid::parse_str(opaque_id).is_ok());
        insta::assert_snapshot!(
            String::from_utf8_lossy(request.body.as_deref().unwrap_or_default()),
            @r#"{"scroll_id":["a","b"]}"#
        );
    }

    #[tokio::test]
    async fn test_async_matches_blocking() {
        let body = r#"{"count":7}"#;
        let transport = transport(InMemoryConnection::json(StatusCode::OK, body));

        let blocking = transport
            .perform::<_, Count>(Method::GET, "/_count", descriptor(TestParameters::new()))
            .expect("should dispatch");
        let non_blocking = transport
            .perform_async::<_, Count>(Method::GET, "/_count", descriptor(TestParameters::new()))
            .await
            .expect("should dispatch");

        assert_eq!(blocking.body, non_blocking.body);
        assert_eq!(blocking.details.success(), non_blocking.details.success());
        assert_eq!(
            blocking.details.status_code(),
            non_blocking.details.status_code()
        );
    }
}
