mod builder;
pub use self::builder::{DEFAULT_PORT, SearchClientBuilder};

mod auth;
pub use self::auth::{Authentication, AuthenticationError, SecureString};

mod error;
pub use self::error::SearchClientError;

mod serializer;
pub use self::serializer::{DeserializeError, JsonSerializer, Serializer};

mod request;
pub use self::request::{
    ByteUnit, DeserializationOverride, ExpandWildcards, PostData, QueryString, QueryValue,
    Request, RequestConfiguration, RequestParameters, RequestPath, RouteValues,
    force_configuration,
};

mod response;
pub use self::response::{ApiCallDetails, Response, ServerError, TransportResponse};

mod transport;
pub use self::transport::{
    Connection, ConnectionError, ConnectionSettings, HttpConnection, HttpRequest,
    InMemoryConnection, RawResponse, Transport,
};

pub mod dispatch;

mod endpoints;
pub use self::endpoints::cat;
pub use self::endpoints::{
    ALL_SCROLLS, ClearScrollRequest, ClearScrollRequestParameters, EmptyResponse,
    RefreshRequest, RefreshRequestParameters, ShardFailure, ShardsMetadata,
    ShardsOperationResponse, patch_clear_scroll,
};

/// Typed client of a search cluster.
///
/// Every endpoint comes as a blocking method and an `_async` twin with the same semantics.
/// Both go through the same dispatch: the request is turned into a
/// [`RequestPath`] descriptor, sent by the [`Transport`], and the decoded body comes back
/// wrapped in a [`Response`] with the call details.
///
/// Cloning is cheap; clones share the connection and the settings.
///
/// # Example
///
/// ```rust,no_run
/// use search_client::SearchClient;
/// use search_client::cat::{CatIndices, CatRequest, CatRequestParameters};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SearchClient::builder().with_host("localhost").build()?;
///
/// let request = CatRequest::<CatIndices>::new()
///     .with_targets(["logs-*"])
///     .with_params(CatRequestParameters::new().columns(&["index", "docs.count"]));
/// let response = client.cat_indices(request)?;
///
/// for row in response.body().into_iter().flatten() {
///     println!("{:?}: {:?}", row.index, row.docs_count);
/// }
/// # Ok(())
/// # }
/// ```
///
/// Blocking methods must not be called from an async runtime thread; use the `_async`
/// methods there.
#[derive(Debug, Clone)]
pub struct SearchClient<C = HttpConnection, S = JsonSerializer> {
    transport: Transport<C, S>,
}

// Create
impl SearchClient {
    /// Creates a builder, see [`SearchClientBuilder`] for the defaults.
    pub fn builder() -> SearchClientBuilder {
        SearchClientBuilder::default()
    }
}

impl<C, S> SearchClient<C, S>
where
    C: Connection,
    S: Serializer,
{
    /// Creates a client over an existing transport.
    pub fn new(transport: Transport<C, S>) -> Self {
        Self { transport }
    }

    /// Returns the low-level transport, for dispatching descriptors directly.
    pub fn transport(&self) -> &Transport<C, S> {
        &self.transport
    }
}
