use http::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::dispatch::{dispatch, dispatch_async};
use crate::client::request::{
    PostData, Request, RequestPath, RouteValues, request_parameters, url_path,
};
use crate::client::response::{Response, TransportResponse};
use crate::client::serializer::Serializer;
use crate::client::transport::{Connection, Transport};
use crate::client::{SearchClient, SearchClientError};

/// Scroll id that targets every open scroll context.
pub const ALL_SCROLLS: &str = "_all";

request_parameters! {
    /// Query parameters of the clear-scroll endpoint.
    ClearScrollRequestParameters {}
}

/// Releases the server-side resources of a scroll context.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearScrollRequest {
    scroll_id: String,
    params: ClearScrollRequestParameters,
}

impl ClearScrollRequest {
    /// Clears the given scroll context.
    pub fn new(scroll_id: impl Into<String>) -> Self {
        Self {
            scroll_id: scroll_id.into(),
            params: ClearScrollRequestParameters::default(),
        }
    }

    /// Clears every open scroll context.
    pub fn all() -> Self {
        Self::new(ALL_SCROLLS)
    }

    /// Returns the targeted scroll id.
    pub fn scroll_id(&self) -> &str {
        &self.scroll_id
    }
}

impl Request for ClearScrollRequest {
    type Params = ClearScrollRequestParameters;

    fn params(&self) -> &ClearScrollRequestParameters {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ClearScrollRequestParameters {
        &mut self.params
    }

    fn into_parts(self) -> (RouteValues, ClearScrollRequestParameters) {
        let route = RouteValues {
            scroll_id: Some(self.scroll_id),
            ..RouteValues::default()
        };
        (route, self.params)
    }
}

/// Response without meaningful payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct EmptyResponse {}

/// Moves a specific scroll id from the URL path to the request body.
///
/// Scroll ids can be longer than what fits in a URL, so they are sent as the raw body of
/// `DELETE /_search/scroll`. The [`ALL_SCROLLS`] id stays in the path.
///
/// Returns the body to send. Applying the patch again leaves the descriptor unchanged and
/// returns the same body.
pub fn patch_clear_scroll<R>(
    descriptor: &mut RequestPath<ClearScrollRequestParameters, R>,
) -> Option<PostData> {
    let moved = descriptor
        .route_mut()
        .scroll_id
        .take_if(|scroll_id| scroll_id.as_str() != ALL_SCROLLS);
    if let Some(scroll_id) = moved {
        descriptor.set_body(Some(PostData::raw(scroll_id)));
    }
    descriptor.body().cloned()
}

fn clear_scroll_path(route: &RouteValues) -> String {
    let scroll_id = route.scroll_id.as_deref().unwrap_or_default();
    url_path(["_search", "scroll", scroll_id])
}

impl<C, S> Transport<C, S>
where
    C: Connection,
    S: Serializer,
{
    /// `DELETE /_search/scroll/{scroll_id}`, or `DELETE /_search/scroll` when the scroll id
    /// travels in the body.
    ///
    /// # Errors
    ///
    /// See [`Transport::perform`].
    pub fn clear_scroll_dispatch<R>(
        &self,
        descriptor: RequestPath<ClearScrollRequestParameters, R>,
    ) -> Result<TransportResponse<R>, SearchClientError>
    where
        R: DeserializeOwned,
    {
        let path = clear_scroll_path(descriptor.route());
        self.perform(Method::DELETE, &path, descriptor)
    }

    /// Async twin of [`clear_scroll_dispatch`](Self::clear_scroll_dispatch).
    ///
    /// # Errors
    ///
    /// See [`Transport::perform`].
    pub async fn clear_scroll_dispatch_async<R>(
        &self,
        descriptor: RequestPath<ClearScrollRequestParameters, R>,
    ) -> Result<TransportResponse<R>, SearchClientError>
    where
        R: DeserializeOwned,
    {
        let path = clear_scroll_path(descriptor.route());
        self.perform_async(Method::DELETE, &path, descriptor).await
    }
}

impl<C, S> SearchClient<C, S>
where
    C: Connection,
    S: Serializer,
{
    /// Clears a scroll context.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub fn clear_scroll(
        &self,
        request: ClearScrollRequest,
    ) -> Result<Response<EmptyResponse>, SearchClientError> {
        dispatch(request, |mut descriptor| {
            let body = patch_clear_scroll(&mut descriptor);
            debug!(scroll_id_in_body = body.is_some(), "clearing scroll");
            self.transport.clear_scroll_dispatch(descriptor)
        })
    }

    /// Clears a scroll context asynchronously.
    ///
    /// # Errors
    ///
    /// See [`clear_scroll`](Self::clear_scroll).
    pub async fn clear_scroll_async(
        &self,
        request: ClearScrollRequest,
    ) -> Result<Response<EmptyResponse>, SearchClientError> {
        dispatch_async(request, |mut descriptor| {
            let body = patch_clear_scroll(&mut descriptor);
            debug!(scroll_id_in_body = body.is_some(), "clearing scroll");
            self.transport.clear_scroll_dispatch_async(descriptor)
        })
        .await
    }
}
