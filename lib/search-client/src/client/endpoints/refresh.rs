use http::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::client::dispatch::{dispatch, dispatch_async};
use crate::client::request::{
    ExpandWildcards, Request, RequestPath, RouteValues, request_parameters, url_path,
};
use crate::client::response::{Response, TransportResponse};
use crate::client::serializer::Serializer;
use crate::client::transport::{Connection, Transport};
use crate::client::{SearchClient, SearchClientError};

request_parameters! {
    /// Query parameters of the refresh endpoint.
    RefreshRequestParameters {
        /// Whether a wildcard expression that matches no index is ignored.
        allow_no_indices(bool) => "allow_no_indices",
        /// Which kind of indices wildcard expressions expand to.
        expand_wildcards(ExpandWildcards) => "expand_wildcards",
        /// Whether unavailable (missing or closed) indices are ignored.
        ignore_unavailable(bool) => "ignore_unavailable",
        /// Forces a refresh even if not required.
        force(bool) => "force",
    }
}

/// Makes recent operations on indices visible to search.
///
/// Without target, every index of the cluster is refreshed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshRequest {
    indices: Vec<String>,
    params: RefreshRequestParameters,
}

impl RefreshRequest {
    /// Refreshes every index.
    pub fn all() -> Self {
        Self::default()
    }

    /// Refreshes a single index (or alias, or wildcard expression).
    pub fn index(index: impl Into<String>) -> Self {
        Self::indices([index])
    }

    /// Refreshes the given indices.
    pub fn indices<I>(indices: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            indices: indices.into_iter().map(Into::into).collect(),
            params: RefreshRequestParameters::default(),
        }
    }

    /// Replaces the query parameters.
    #[must_use]
    pub fn with_params(mut self, params: RefreshRequestParameters) -> Self {
        self.params = params;
        self
    }
}

impl Request for RefreshRequest {
    type Params = RefreshRequestParameters;

    fn params(&self) -> &RefreshRequestParameters {
        &self.params
    }

    fn params_mut(&mut self) -> &mut RefreshRequestParameters {
        &mut self.params
    }

    fn into_parts(self) -> (RouteValues, RefreshRequestParameters) {
        let route = RouteValues {
            indices: self.indices,
            ..RouteValues::default()
        };
        (route, self.params)
    }
}

/// Response of broadcast operations such as refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ShardsOperationResponse {
    /// Shard-level outcome.
    #[serde(rename = "_shards", default)]
    pub shards: ShardsMetadata,
}

/// How many shards an operation reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShardsMetadata {
    /// Number of shards the operation was sent to.
    pub total: u32,
    /// Number of shards that succeeded.
    pub successful: u32,
    /// Number of shards that failed.
    pub failed: u32,
    /// Details of the failed shards.
    pub failures: Vec<ShardFailure>,
}

/// A shard that failed the operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShardFailure {
    /// Index of the failed shard.
    pub index: Option<String>,
    /// Shard number.
    pub shard: Option<u32>,
    /// Node holding the shard.
    pub node: Option<String>,
    /// Status name, e.g. `INTERNAL_SERVER_ERROR`.
    pub status: Option<String>,
    /// Free-form failure reason, as reported by the node.
    pub reason: Option<serde_json::Value>,
}

fn refresh_path(route: &RouteValues) -> String {
    let indices = route.indices.join(",");
    url_path([indices.as_str(), "_refresh"])
}

impl<C, S> Transport<C, S>
where
    C: Connection,
    S: Serializer,
{
    /// `POST /_refresh` or `POST /{index}/_refresh`.
    ///
    /// # Errors
    ///
    /// See [`Transport::perform`].
    pub fn indices_refresh_dispatch<R>(
        &self,
        descriptor: RequestPath<RefreshRequestParameters, R>,
    ) -> Result<TransportResponse<R>, SearchClientError>
    where
        R: DeserializeOwned,
    {
        let path = refresh_path(descriptor.route());
        self.perform(Method::POST, &path, descriptor)
    }

    /// Async twin of [`indices_refresh_dispatch`](Self::indices_refresh_dispatch).
    ///
    /// # Errors
    ///
    /// See [`Transport::perform`].
    pub async fn indices_refresh_dispatch_async<R>(
        &self,
        descriptor: RequestPath<RefreshRequestParameters, R>,
    ) -> Result<TransportResponse<R>, SearchClientError>
    where
        R: DeserializeOwned,
    {
        let path = refresh_path(descriptor.route());
        self.perform_async(Method::POST, &path, descriptor).await
    }
}

impl<C, S> SearchClient<C, S>
where
    C: Connection,
    S: Serializer,
{
    /// Refreshes one or more indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent. A refresh rejected by the cluster is an
    /// invalid [`Response`], not an error.
    pub fn refresh(
        &self,
        request: RefreshRequest,
    ) -> Result<Response<ShardsOperationResponse>, SearchClientError> {
        dispatch(request, |descriptor| {
            self.transport.indices_refresh_dispatch(descriptor)
        })
    }

    /// Refreshes one or more indices asynchronously.
    ///
    /// # Errors
    ///
    /// See [`refresh`](Self::refresh).
    pub async fn refresh_async(
        &self,
        request: RefreshRequest,
    ) -> Result<Response<ShardsOperationResponse>, SearchClientError> {
        dispatch_async(request, |descriptor| {
            self.transport.indices_refresh_dispatch_async(descriptor)
        })
        .await
    }
}
