use std::fmt::Debug;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use http::header::{HeaderName, HeaderValue};
use http::uri::{PathAndQuery, Scheme};
use http::{HeaderMap, Uri};
use url::Url;

use super::serializer::{JsonSerializer, Serializer};
use super::transport::{Connection, ConnectionSettings, HttpConnection, Transport};
use super::{Authentication, SearchClient, SearchClientError};

/// Default port of a search node.
pub const DEFAULT_PORT: u16 = 9200;

/// Builder for [`SearchClient`] instances.
///
/// # Default Configuration
///
/// - **Scheme**: HTTP (use `with_scheme()` to change to HTTPS)
/// - **Host**: 127.0.0.1 (localhost)
/// - **Port**: 9200
/// - **Base path**: None (requests go to the root path)
/// - **Authentication**: None
/// - **Request timeout**: None (the reqwest client default)
/// - **Throw exceptions**: false (invalid responses are returned, not raised)
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use http::uri::Scheme;
/// use search_client::{Authentication, SearchClient};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SearchClient::builder()
///     .with_scheme(Scheme::HTTPS)
///     .with_host("search.example.com")
///     .with_port(443)
///     .with_base_path("/es")?
///     .with_authentication(Authentication::Basic {
///         username: "elastic".to_string(),
///         password: "changeme".into(),
///     })
///     .with_request_timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SearchClientBuilder {
    client: reqwest::Client,
    scheme: Scheme,
    host: String,
    port: u16,
    base_path: Option<PathAndQuery>,
    authentication: Option<Authentication>,
    request_timeout: Option<Duration>,
    throw_exceptions: bool,
    default_headers: HeaderMap,
}

impl SearchClientBuilder {
    /// Builds a client sending requests with `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the node URL cannot be built from the host, port and base path.
    pub fn build(self) -> Result<SearchClient, SearchClientError> {
        let connection = HttpConnection::new(self.client.clone());
        self.build_with(connection, JsonSerializer)
    }

    /// Builds a client sending requests through the given connection.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_with_connection<C>(
        self,
        connection: C,
    ) -> Result<SearchClient<C>, SearchClientError>
    where
        C: Connection,
    {
        self.build_with(connection, JsonSerializer)
    }

    /// Builds a client from a connection and a serializer.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_with<C, S>(
        self,
        connection: C,
        serializer: S,
    ) -> Result<SearchClient<C, S>, SearchClientError>
    where
        C: Connection,
        S: Serializer,
    {
        let Self {
            client: _,
            scheme,
            host,
            port,
            base_path,
            authentication,
            request_timeout,
            throw_exceptions,
            default_headers,
        } = self;

        let builder = Uri::builder()
            .scheme(scheme)
            .authority(format!("{host}:{port}"));
        let builder = if let Some(path) = &base_path {
            builder.path_and_query(path.path())
        } else {
            builder.path_and_query("/")
        };
        let base_uri = builder.build()?;
        let base_url = Url::parse(&base_uri.to_string())?;

        let settings = ConnectionSettings {
            base_url,
            authentication,
            request_timeout,
            throw_exceptions,
            default_headers,
        };
        let transport = Transport::new(connection, serializer, settings);

        Ok(SearchClient::new(transport))
    }

    /// Sets the HTTP scheme.
    ///
    /// Defaults to `Scheme::HTTP`.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the host name or IP address of the node.
    ///
    /// Defaults to `"127.0.0.1"`.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port of the node.
    ///
    /// Defaults to [`DEFAULT_PORT`].
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets a path prepended to every request path, for nodes behind a reverse proxy.
    ///
    /// # Errors
    ///
    /// Returns [`SearchClientError::InvalidBasePath`] if the path is not a valid URI path.
    pub fn with_base_path<P>(mut self, base_path: P) -> Result<Self, SearchClientError>
    where
        P: TryInto<PathAndQuery>,
        P::Error: Debug + 'static,
    {
        let base_path = base_path
            .try_into()
            .map_err(|err| SearchClientError::InvalidBasePath {
                error: format!("{err:?}"),
            })?;
        self.base_path = Some(base_path);
        Ok(self)
    }

    /// Authenticates every request.
    ///
    /// - **Bearer**: adds `Authorization: Bearer <token>`
    /// - **Basic**: adds `Authorization: Basic <base64(username:password)>`
    /// - **ApiKey**: adds `Authorization: ApiKey <base64(id:api_key)>`
    pub fn with_authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = Some(authentication);
        self
    }

    /// Sets the default timeout of every request.
    ///
    /// A timeout in a [`RequestConfiguration`](crate::RequestConfiguration) takes precedence.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Turns invalid responses into [`SearchClientError::InvalidResponse`] errors.
    pub fn with_throw_exceptions(mut self, throw_exceptions: bool) -> Self {
        self.throw_exceptions = throw_exceptions;
        self
    }

    /// Adds a header sent with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_default_header(
        mut self,
        name: &str,
        value: &str,
    ) -> Result<Self, SearchClientError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Uses a preconfigured `reqwest` client (proxy, TLS, pool settings) for async calls.
    ///
    /// Only used by [`build`](Self::build).
    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

impl Default for SearchClientBuilder {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            scheme: Scheme::HTTP,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST).to_string(),
            port: DEFAULT_PORT,
            base_path: None,
            authentication: None,
            request_timeout: None,
            throw_exceptions: false,
            default_headers: HeaderMap::new(),
        }
    }
}
