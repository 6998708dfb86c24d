use std::fmt::Debug;

use super::auth::AuthenticationError;
use super::response::ApiCallDetails;
use super::transport::ConnectionError;

/// Errors that can occur when using the [`SearchClient`](crate::SearchClient).
///
/// HTTP-level failures (non-2xx status, undecodable bodies) are *not* reported through this
/// type: they are captured in the [`Response`](crate::Response) metadata so callers can handle
/// expected failures (e.g. a 404 on an existence check) without matching on errors.
/// This enum is reserved for calls that produced no usable HTTP exchange.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum SearchClientError {
    /// The connection could not complete the HTTP exchange.
    ///
    /// Occurs when the node is unreachable, the request times out, or the body cannot be read.
    #[display("Connection error: {_0}")]
    ConnectionError(ConnectionError),

    /// URL parsing error when constructing request URLs.
    UrlError(url::ParseError),

    /// HTTP protocol error from the http crate.
    HttpError(http::Error),

    /// Invalid HTTP header name.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// Query parameter serialization error.
    QuerySerializationError(serde_urlencoded::ser::Error),

    /// Authentication could not be turned into a request header.
    #[display("Authentication error: {_0}")]
    AuthenticationError(AuthenticationError),

    /// Invalid base path configuration.
    #[display("Invalid base path: {error}")]
    #[from(skip)]
    InvalidBasePath {
        /// Description of why the base path is invalid.
        error: String,
    },

    /// Request body serialization failed.
    #[display("Serialization error: {message}")]
    #[from(skip)]
    SerializationError {
        /// Description of the serialization failure.
        message: String,
    },

    /// The node answered but the response is not valid.
    ///
    /// Only produced when the client is built with
    /// [`with_throw_exceptions(true)`](crate::SearchClientBuilder::with_throw_exceptions).
    #[display("Invalid response for {method} {uri}: status {status_code}")]
    #[from(skip)]
    InvalidResponse {
        /// HTTP method of the failed call.
        method: http::Method,
        /// Target URI of the failed call.
        uri: String,
        /// HTTP status code returned by the node.
        status_code: u16,
        /// Complete metadata of the failed call.
        details: Box<ApiCallDetails>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_client_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<SearchClientError>();
        assert_sync::<SearchClientError>();
    }

    #[test]
    fn test_invalid_base_path_display() {
        let error = SearchClientError::InvalidBasePath {
            error: "contains spaces".to_string(),
        };

        insta::assert_snapshot!(error, @"Invalid base path: contains spaces");
    }
}
