//! Compact, human-oriented cluster listings (`/_cat/*`), requested as JSON.
//!
//! The cat endpoints answer with a bare JSON array of rows. Every cat call forces the JSON
//! content type and decodes that array into a [`CatResponse`] through a deserialization
//! override, since the default decode expects an object.

use std::fmt::Debug;
use std::marker::PhantomData;

use http::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::dispatch::{dispatch, dispatch_async};
use crate::client::request::{
    ByteUnit, Request, RequestPath, RouteValues, force_configuration, request_parameters,
    url_path,
};
use crate::client::response::{ApiCallDetails, Response, TransportResponse};
use crate::client::serializer::{DeserializeError, Serializer};
use crate::client::transport::{Connection, Transport};
use crate::client::{SearchClient, SearchClientError};

mod records;
pub use self::records::{
    CatAliases, CatAliasesRecord, CatAllocation, CatAllocationRecord, CatCount, CatCountRecord,
    CatHealth, CatHealthRecord, CatIndices, CatIndicesRecord, CatMaster, CatMasterRecord,
    CatNodes, CatNodesRecord, CatPendingTasks, CatPendingTasksRecord, CatPlugins,
    CatPluginsRecord, CatShards, CatShardsRecord,
};

request_parameters! {
    /// Query parameters shared by every cat endpoint.
    CatRequestParameters {
        /// Adds column headers to the output.
        verbose(bool) => "v",
        /// Columns to return.
        columns(&[&str]) => "h",
        /// Returns the available columns instead of rows.
        help(bool) => "help",
        /// Reads from the local node instead of the master node.
        local(bool) => "local",
        /// Timeout for the connection to the master node, e.g. `30s`.
        master_timeout(&str) => "master_timeout",
        /// Unit used to display byte values.
        bytes(ByteUnit) => "bytes",
    }
}

/// What the optional target of a cat endpoint designates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatTarget {
    /// The endpoint takes no target.
    None,
    /// Index names.
    Indices,
    /// Alias names.
    Names,
    /// Node ids.
    NodeIds,
}

/// One `/_cat/{name}` endpoint and the row type it returns.
pub trait CatEndpoint: Debug + Send + Sync + 'static {
    /// Path segment after `/_cat/`.
    const NAME: &'static str;
    /// Kind of target appended after the name.
    const TARGET: CatTarget;
    /// Row of the listing.
    type Record: DeserializeOwned + Debug + Send + 'static;
}

/// Request to a cat endpoint, optionally restricted to some targets.
#[derive(Debug, Clone, PartialEq)]
pub struct CatRequest<E> {
    targets: Vec<String>,
    params: CatRequestParameters,
    endpoint: PhantomData<fn() -> E>,
}

impl<E> CatRequest<E>
where
    E: CatEndpoint,
{
    /// Lists every row.
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            params: CatRequestParameters::default(),
            endpoint: PhantomData,
        }
    }

    /// Restricts the listing to the given targets.
    ///
    /// Targets are ignored by endpoints whose [`CatEndpoint::TARGET`] is [`CatTarget::None`].
    #[must_use]
    pub fn with_targets<I>(mut self, targets: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the query parameters.
    #[must_use]
    pub fn with_params(mut self, params: CatRequestParameters) -> Self {
        self.params = params;
        self
    }
}

impl<E> Default for CatRequest<E>
where
    E: CatEndpoint,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Request for CatRequest<E>
where
    E: CatEndpoint,
{
    type Params = CatRequestParameters;

    fn params(&self) -> &CatRequestParameters {
        &self.params
    }

    fn params_mut(&mut self) -> &mut CatRequestParameters {
        &mut self.params
    }

    fn into_parts(self) -> (RouteValues, CatRequestParameters) {
        let mut route = RouteValues::default();
        match E::TARGET {
            CatTarget::Indices => route.indices = self.targets,
            CatTarget::Names => route.names = self.targets,
            CatTarget::NodeIds => route.node_ids = self.targets,
            CatTarget::None => {
                if !self.targets.is_empty() {
                    debug!(endpoint = E::NAME, targets = ?self.targets, "ignoring cat targets");
                }
            }
        }
        (route, self.params)
    }
}

/// Rows returned by a cat endpoint, in server order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatResponse<R> {
    /// The rows.
    pub records: Vec<R>,
}

impl<R> CatResponse<R> {
    /// Iterates over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }
}

impl<'a, R> IntoIterator for &'a CatResponse<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<R> IntoIterator for CatResponse<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Decodes a bare JSON array of rows.
fn deserialize_cat_response<R, S>(
    serializer: &S,
    _details: &ApiCallDetails,
    body: &[u8],
) -> Result<CatResponse<R>, DeserializeError>
where
    R: DeserializeOwned,
    S: Serializer,
{
    let records = serializer.deserialize::<Vec<R>>(body)?;
    Ok(CatResponse { records })
}

fn cat_path<E>(route: &RouteValues) -> String
where
    E: CatEndpoint,
{
    let targets = match E::TARGET {
        CatTarget::None => String::new(),
        CatTarget::Indices => route.indices.join(","),
        CatTarget::Names => route.names.join(","),
        CatTarget::NodeIds => route.node_ids.join(","),
    };
    url_path(["_cat", E::NAME, targets.as_str()])
}

impl<C, S> Transport<C, S>
where
    C: Connection,
    S: Serializer,
{
    /// `GET /_cat/{name}` or `GET /_cat/{name}/{targets}`.
    ///
    /// # Errors
    ///
    /// See [`Transport::perform`].
    pub fn cat_dispatch<E, R>(
        &self,
        descriptor: RequestPath<CatRequestParameters, R>,
    ) -> Result<TransportResponse<R>, SearchClientError>
    where
        E: CatEndpoint,
        R: DeserializeOwned,
    {
        let path = cat_path::<E>(descriptor.route());
        self.perform(Method::GET, &path, descriptor)
    }

    /// Async twin of [`cat_dispatch`](Self::cat_dispatch).
    ///
    /// # Errors
    ///
    /// See [`Transport::perform`].
    pub async fn cat_dispatch_async<E, R>(
        &self,
        descriptor: RequestPath<CatRequestParameters, R>,
    ) -> Result<TransportResponse<R>, SearchClientError>
    where
        E: CatEndpoint,
        R: DeserializeOwned,
    {
        let path = cat_path::<E>(descriptor.route());
        self.perform_async(Method::GET, &path, descriptor).await
    }
}

type CatResult<E> =
    Result<Response<CatResponse<<E as CatEndpoint>::Record>>, SearchClientError>;
type CatDescriptor<E> = RequestPath<CatRequestParameters, CatResponse<<E as CatEndpoint>::Record>>;

fn prepare_cat<E>(request: CatRequest<E>) -> CatRequest<E>
where
    E: CatEndpoint,
{
    force_configuration(request, |configuration| {
        configuration.force_content_type(mime::APPLICATION_JSON.as_ref());
    })
}

fn attach_cat_override<E, S>(descriptor: CatDescriptor<E>, serializer: S) -> CatDescriptor<E>
where
    E: CatEndpoint,
    S: Serializer,
{
    descriptor.with_deserialization_override(move |details, body| {
        deserialize_cat_response(&serializer, details, body)
    })
}

impl<C, S> SearchClient<C, S>
where
    C: Connection,
    S: Serializer,
{
    /// Calls a cat endpoint, blocking the calling thread.
    ///
    /// A content type set on the request configuration is kept; otherwise JSON is requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub fn cat<E>(&self, request: CatRequest<E>) -> CatResult<E>
    where
        E: CatEndpoint,
    {
        let serializer = self.transport.serializer().clone();
        dispatch(prepare_cat(request), |descriptor| {
            let descriptor = attach_cat_override::<E, _>(descriptor, serializer);
            self.transport.cat_dispatch::<E, _>(descriptor)
        })
    }

    /// Calls a cat endpoint asynchronously.
    ///
    /// # Errors
    ///
    /// See [`cat`](Self::cat).
    pub async fn cat_async<E>(&self, request: CatRequest<E>) -> CatResult<E>
    where
        E: CatEndpoint,
    {
        let serializer = self.transport.serializer().clone();
        dispatch_async(prepare_cat(request), |descriptor| {
            let descriptor = attach_cat_override::<E, _>(descriptor, serializer);
            self.transport.cat_dispatch_async::<E, _>(descriptor)
        })
        .await
    }
}

macro_rules! cat_api {
    (
        $(
            $(#[$meta:meta])*
            $endpoint:ident => $name:ident, $name_async:ident;
        )*
    ) => {
        impl<C, S> SearchClient<C, S>
        where
            C: Connection,
            S: Serializer,
        {
            $(
                $(#[$meta])*
                ///
                /// # Errors
                ///
                /// Returns an error if the request cannot be sent.
                pub fn $name(&self, request: CatRequest<$endpoint>) -> CatResult<$endpoint> {
                    self.cat(request)
                }

                #[doc = concat!("Async twin of [`", stringify!($name), "`](Self::", stringify!($name), ").")]
                ///
                /// # Errors
                ///
                /// Returns an error if the request cannot be sent.
                pub async fn $name_async(
                    &self,
                    request: CatRequest<$endpoint>,
                ) -> CatResult<$endpoint> {
                    self.cat_async(request).await
                }
            )*
        }
    };
}

cat_api! {
    /// `GET /_cat/aliases`: aliases and the indices they point to.
    CatAliases => cat_aliases, cat_aliases_async;
    /// `GET /_cat/allocation`: shard count and disk usage per data node.
    CatAllocation => cat_allocation, cat_allocation_async;
    /// `GET /_cat/count`: document count of the cluster or of some indices.
    CatCount => cat_count, cat_count_async;
    /// `GET /_cat/health`: one-line cluster health.
    CatHealth => cat_health, cat_health_async;
    /// `GET /_cat/indices`: health, document count and size per index.
    CatIndices => cat_indices, cat_indices_async;
    /// `GET /_cat/master`: the elected master node.
    CatMaster => cat_master, cat_master_async;
    /// `GET /_cat/nodes`: cluster topology.
    CatNodes => cat_nodes, cat_nodes_async;
    /// `GET /_cat/pending_tasks`: cluster-level changes not yet executed.
    CatPendingTasks => cat_pending_tasks, cat_pending_tasks_async;
    /// `GET /_cat/plugins`: plugins installed on each node.
    CatPlugins => cat_plugins, cat_plugins_async;
    /// `GET /_cat/shards`: shard placement and state.
    CatShards => cat_shards, cat_shards_async;
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use http::header::{ACCEPT, CONTENT_TYPE};
    use rstest::rstest;

    use super::*;
    use crate::client::request::RequestConfiguration;
    use crate::client::serializer::JsonSerializer;
    use crate::client::transport::InMemoryConnection;

    #[derive(Debug)]
    struct Letters;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Letter {
        a: u32,
    }

    impl CatEndpoint for Letters {
        const NAME: &'static str = "letters";
        const TARGET: CatTarget = CatTarget::None;
        type Record = Letter;
    }

    fn client(connection: InMemoryConnection) -> SearchClient<InMemoryConnection> {
        SearchClient::builder()
            .build_with_connection(connection)
            .expect("valid client")
    }

    #[test]
    fn test_array_body_becomes_ordered_records() {
        let details = ApiCallDetails::new(
            Method::GET,
            "http://127.0.0.1:9200/_cat/letters".parse().expect("valid url"),
            StatusCode::OK,
            &[],
        );

        let response = deserialize_cat_response::<Letter, _>(
            &JsonSerializer,
            &details,
            br#"[{"a":1},{"a":2}]"#,
        )
        .expect("valid rows");

        assert_eq!(response.records, [Letter { a: 1 }, Letter { a: 2 }]);
    }

    #[test]
    fn test_custom_endpoint_goes_through_override() {
        let connection = InMemoryConnection::json(StatusCode::OK, r#"[{"a":1},{"a":2}]"#);
        let client = client(connection.clone());

        let response = client
            .cat(CatRequest::<Letters>::new().with_targets(["ignored"]))
            .expect("should dispatch");

        assert!(response.is_valid());
        let letters: Vec<u32> = response
            .into_body()
            .expect("decoded body")
            .into_iter()
            .map(|letter| letter.a)
            .collect();
        assert_eq!(letters, [1, 2]);
        let sent = connection.last_request().expect("request sent");
        assert_eq!(sent.url.path(), "/_cat/letters");
    }

    #[test]
    fn test_json_is_forced() {
        let connection = InMemoryConnection::json(StatusCode::OK, "[]");
        let client = client(connection.clone());

        let response = client
            .cat_health(CatRequest::new())
            .expect("should dispatch");

        let sent = connection.last_request().expect("request sent");
        assert_eq!(sent.method, Method::GET);
        assert_eq!(sent.headers[CONTENT_TYPE], "application/json");
        assert_eq!(sent.headers[ACCEPT], "application/json");
        assert_eq!(response.body().map(|body| body.records.len()), Some(0));
    }

    #[test]
    fn test_caller_content_type_is_kept() {
        let connection = InMemoryConnection::new(StatusCode::OK, "");
        let client = client(connection.clone());
        let request = CatRequest::<CatIndices>::new()
            .with_configuration(RequestConfiguration::new().with_content_type("application/yaml"));

        client.cat_indices(request).expect("should dispatch");

        let sent = connection.last_request().expect("request sent");
        assert_eq!(sent.headers[ACCEPT], "application/yaml");
    }

    #[test]
    fn test_object_body_is_a_captured_deserialization_error() {
        let connection = InMemoryConnection::json(StatusCode::OK, r#"{"a":1}"#);
        let client = client(connection);

        let response = client
            .cat(CatRequest::<Letters>::new())
            .expect("should dispatch");

        assert!(!response.is_valid());
        assert!(response.body().is_none());
        assert!(response.original_error().is_some());
    }

    #[rstest]
    #[case::no_target(&[], "/_cat/indices")]
    #[case::single(&["logs"], "/_cat/indices/logs")]
    #[case::many(&["logs", "metrics-*"], "/_cat/indices/logs,metrics-*")]
    fn test_cat_indices_path(#[case] targets: &[&str], #[case] expected: &str) {
        let request = CatRequest::<CatIndices>::new().with_targets(targets.iter().copied());

        let (route, _) = request.into_parts();

        assert_eq!(cat_path::<CatIndices>(&route), expected);
    }

    #[test]
    fn test_targets_follow_endpoint_kind() {
        let (aliases, _) = CatRequest::<CatAliases>::new()
            .with_targets(["current"])
            .into_parts();
        let (allocation, _) = CatRequest::<CatAllocation>::new()
            .with_targets(["node-1"])
            .into_parts();
        let (health, _) = CatRequest::<CatHealth>::new()
            .with_targets(["ignored"])
            .into_parts();

        assert_eq!(aliases.names, ["current"]);
        assert_eq!(cat_path::<CatAliases>(&aliases), "/_cat/aliases/current");
        assert_eq!(allocation.node_ids, ["node-1"]);
        assert_eq!(cat_path::<CatAllocation>(&allocation), "/_cat/allocation/node-1");
        assert_eq!(health, RouteValues::default());
        assert_eq!(cat_path::<CatHealth>(&health), "/_cat/health");
        assert_eq!(cat_path::<CatPendingTasks>(&health), "/_cat/pending_tasks");
    }

    #[tokio::test]
    async fn test_cat_async_matches_blocking() {
        let body = r#"[{"epoch":"1412345678","timestamp":"12:00:00","count":"42"}]"#;
        let client = client(InMemoryConnection::json(StatusCode::OK, body));

        let blocking = client
            .cat_count(CatRequest::new())
            .expect("should dispatch");
        let non_blocking = client
            .cat_count_async(CatRequest::new())
            .await
            .expect("should dispatch");

        assert_eq!(blocking.body(), non_blocking.body());
        insta::assert_debug_snapshot!(non_blocking.body(), @r#"
        Some(
            CatResponse {
                records: [
                    CatCountRecord {
                        epoch: Some(
                            "1412345678",
                        ),
                        timestamp: Some(
                            "12:00:00",
                        ),
                        count: Some(
                            "42",
                        ),
                    },
                ],
            },
        )
        "#);
    }
}
