//! Typed requests and their canonical parameter sets.
//!
//! - [`Request`] - a typed API call exposing its parameter-set type
//! - [`RequestParameters`] - query string plus per-request configuration
//! - [`RequestConfiguration`] - content type, timeout, allowed status codes, headers
//! - [`RequestPath`] - the descriptor built from a request right before dispatch

use std::fmt::{self, Debug};
use std::time::Duration;

use indexmap::IndexMap;

mod path;
pub(in crate::client) use self::path::url_path;
pub use self::path::{DeserializationOverride, PostData, RequestPath, RouteValues};

mod query;
pub use self::query::{ByteUnit, ExpandWildcards, QueryString, QueryValue};

/// A typed API call.
///
/// Each endpoint request exposes its canonical parameter set through [`Request::Params`];
/// the dispatcher only relies on this trait, never on a concrete request type.
pub trait Request: Debug + Send + Sized {
    /// Query parameters and configuration accepted by this endpoint.
    type Params: RequestParameters;

    /// Returns the parameter set.
    fn params(&self) -> &Self::Params;

    /// Returns the parameter set for modification.
    fn params_mut(&mut self) -> &mut Self::Params;

    /// Splits the request into its route values and parameters.
    fn into_parts(self) -> (RouteValues, Self::Params);

    /// Replaces the request configuration.
    #[must_use]
    fn with_configuration(mut self, configuration: RequestConfiguration) -> Self {
        *self.params_mut().request_configuration_mut() = Some(configuration);
        self
    }

    /// Builds the canonical descriptor for this request.
    fn into_request_path<R>(self) -> RequestPath<Self::Params, R> {
        let (route, params) = self.into_parts();
        RequestPath::new(route, params)
    }
}

/// Canonical parameter set shared by every endpoint: a query string and an optional
/// per-request configuration.
///
/// Endpoint parameter types are declared with `request_parameters!`, which adds typed setters
/// for the query parameters the endpoint accepts.
pub trait RequestParameters: Debug + Clone + Default + Send + Sync + 'static {
    /// Returns the query string.
    fn query_string(&self) -> &QueryString;

    /// Returns the query string for modification.
    fn query_string_mut(&mut self) -> &mut QueryString;

    /// Returns the per-request configuration, if any.
    fn request_configuration(&self) -> Option<&RequestConfiguration>;

    /// Returns the per-request configuration slot.
    fn request_configuration_mut(&mut self) -> &mut Option<RequestConfiguration>;
}

macro_rules! request_parameters {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$setter_meta:meta])*
                $setter:ident($ty:ty) => $key:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            query: $crate::client::request::QueryString,
            configuration: Option<$crate::client::request::RequestConfiguration>,
        }

        impl $name {
            /// Creates an empty parameter set.
            pub fn new() -> Self {
                Self::default()
            }

            $(
                $(#[$setter_meta])*
                #[must_use]
                pub fn $setter(mut self, value: $ty) -> Self {
                    self.query.set($key, value);
                    self
                }
            )*
        }

        impl $crate::client::request::RequestParameters for $name {
            fn query_string(&self) -> &$crate::client::request::QueryString {
                &self.query
            }

            fn query_string_mut(&mut self) -> &mut $crate::client::request::QueryString {
                &mut self.query
            }

            fn request_configuration(
                &self,
            ) -> Option<&$crate::client::request::RequestConfiguration> {
                self.configuration.as_ref()
            }

            fn request_configuration_mut(
                &mut self,
            ) -> &mut Option<$crate::client::request::RequestConfiguration> {
                &mut self.configuration
            }
        }
    };
}
pub(in crate::client) use request_parameters;

/// Per-request overrides of the client configuration.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use search_client::RequestConfiguration;
///
/// let configuration = RequestConfiguration::new()
///     .with_content_type("application/yaml")
///     .with_request_timeout(Duration::from_secs(5))
///     .with_allowed_status_code(404);
/// ```
///
/// The `Debug` output lists extra header names only, their values may hold credentials.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestConfiguration {
    content_type: Option<String>,
    request_timeout: Option<Duration>,
    allowed_status_codes: Vec<u16>,
    opaque_id: Option<String>,
    headers: IndexMap<String, String>,
}

impl Debug for RequestConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfiguration")
            .field("content_type", &self.content_type)
            .field("request_timeout", &self.request_timeout)
            .field("allowed_status_codes", &self.allowed_status_codes)
            .field("opaque_id", &self.opaque_id)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RequestConfiguration {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the media type sent as `Content-Type` and `Accept`.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the timeout of this request, overriding the client default.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Accepts a non-2xx status code as a successful call.
    #[must_use]
    pub fn with_allowed_status_code(mut self, status_code: u16) -> Self {
        self.allowed_status_codes.push(status_code);
        self
    }

    /// Sets the `X-Opaque-Id` header used to correlate the call in node logs.
    #[must_use]
    pub fn with_opaque_id(mut self, opaque_id: impl Into<String>) -> Self {
        self.opaque_id = Some(opaque_id.into());
        self
    }

    /// Adds an extra header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the content type only if none was set by the caller.
    pub fn force_content_type(&mut self, content_type: impl Into<String>) {
        if self.content_type.is_none() {
            self.content_type = Some(content_type.into());
        }
    }

    /// Returns the media type, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the request timeout, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Returns the status codes accepted in addition to 2xx.
    pub fn allowed_status_codes(&self) -> &[u16] {
        &self.allowed_status_codes
    }

    /// Returns the opaque id, if any.
    pub fn opaque_id(&self) -> Option<&str> {
        self.opaque_id.as_deref()
    }

    /// Returns the extra headers.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Applies a mutation to the effective configuration of a request.
///
/// An empty configuration is created when the request has none. The mutator decides whether
/// caller-set values are kept: [`RequestConfiguration::force_content_type`] only fills an
/// absent value.
///
/// # Example
///
/// ```rust
/// use search_client::cat::{CatIndices, CatRequest};
/// use search_client::{Request, RequestConfiguration, RequestParameters, force_configuration};
///
/// let request = CatRequest::<CatIndices>::new()
///     .with_configuration(RequestConfiguration::new().with_content_type("application/yaml"));
/// let request = force_configuration(request, |configuration| {
///     configuration.force_content_type("application/json");
/// });
///
/// let content_type = request
///     .params()
///     .request_configuration()
///     .and_then(RequestConfiguration::content_type);
/// assert_eq!(content_type, Some("application/yaml"));
/// ```
pub fn force_configuration<Q, F>(mut request: Q, mutator: F) -> Q
where
    Q: Request,
    F: FnOnce(&mut RequestConfiguration),
{
    let configuration = request
        .params_mut()
        .request_configuration_mut()
        .get_or_insert_with(RequestConfiguration::default);
    mutator(configuration);
    request
}
