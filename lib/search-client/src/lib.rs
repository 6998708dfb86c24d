//! # Search Client
//!
//! Strongly-typed client for the HTTP API of a distributed search cluster.
//!
//! - **[`SearchClient`]** - typed endpoints, each in a blocking and an `_async` form
//! - **[`Transport`]** - low-level dispatch of request descriptors, usable directly
//! - **[`Connection`]** - the HTTP exchange itself ([`HttpConnection`], [`InMemoryConnection`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use search_client::cat::{CatHealth, CatRequest};
//! use search_client::{ClearScrollRequest, RefreshRequest, SearchClient};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SearchClient::builder()
//!     .with_host("localhost")
//!     .with_port(9200)
//!     .build()?;
//!
//! let health = client.cat_health(CatRequest::<CatHealth>::new())?;
//! if let Some(row) = health.body().and_then(|rows| rows.records.first()) {
//!     println!("cluster is {:?}", row.status);
//! }
//!
//! let refreshed = client.refresh(RefreshRequest::index("logs"))?;
//! assert!(refreshed.is_valid());
//!
//! client.clear_scroll(ClearScrollRequest::all())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Responses and errors
//!
//! A call that reached the cluster always yields a [`Response`], even when the cluster
//! answered with an error status or a body that cannot be decoded:
//! [`Response::is_valid`] tells them apart, and [`Response::api_call`] exposes the
//! [`ApiCallDetails`] (status, server error, decoding error, opaque id, ...).
//! `Err(SearchClientError)` is reserved for calls that could not be built or sent, unless
//! the client is built with
//! [`with_throw_exceptions(true)`](SearchClientBuilder::with_throw_exceptions).
//!
//! ## Per-request configuration
//!
//! Every request carries an optional [`RequestConfiguration`] (content type, timeout, allowed
//! status codes, opaque id, extra headers). Endpoints that need a specific setting use
//! [`force_configuration`] so values set by the caller win.
//!
//! ## Logging
//!
//! The crate logs through [`tracing`]: one span per dispatch and per transport call, with the
//! method, path and status at `debug` level, and failed calls at `warn` level.

mod client;

pub use self::client::dispatch;

pub use self::client::cat;

pub use self::client::{
    ALL_SCROLLS, ApiCallDetails, Authentication, AuthenticationError, ByteUnit,
    ClearScrollRequest, ClearScrollRequestParameters, Connection, ConnectionError,
    ConnectionSettings, DEFAULT_PORT, DeserializationOverride, DeserializeError, EmptyResponse,
    ExpandWildcards, HttpConnection, HttpRequest, InMemoryConnection, JsonSerializer, PostData,
    QueryString, QueryValue, RawResponse, RefreshRequest, RefreshRequestParameters, Request,
    RequestConfiguration, RequestParameters, RequestPath, Response, RouteValues, SearchClient,
    SearchClientBuilder, SearchClientError, SecureString, Serializer, ServerError, ShardFailure,
    ShardsMetadata, ShardsOperationResponse, Transport, TransportResponse, force_configuration,
    patch_clear_scroll,
};
