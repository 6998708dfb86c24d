//! Generic request dispatch.
//!
//! Every typed endpoint call goes through [`dispatch`] or [`dispatch_async`]: the request is
//! turned into its [`RequestPath`] descriptor, handed to an endpoint-specific low-level
//! dispatch function, and the transport result is wrapped into a [`Response`].
//!
//! Call sites that need to adjust the descriptor (move a route value into the body, attach a
//! deserialization override) do it inside the dispatch function they pass in.

use std::future::Future;

use tracing::debug;

use super::SearchClientError;
use super::request::{Request, RequestPath};
use super::response::{Response, TransportResponse};

/// Dispatches a request, blocking the calling thread.
///
/// # Errors
///
/// Returns the error of the low-level dispatch unchanged. HTTP-level failures are reported in
/// the [`Response`] details instead.
#[tracing::instrument(level = "debug", skip_all, fields(request = std::any::type_name::<Q>()))]
pub fn dispatch<Q, R, F>(request: Q, low_level: F) -> Result<Response<R>, SearchClientError>
where
    Q: Request,
    F: FnOnce(RequestPath<Q::Params, R>) -> Result<TransportResponse<R>, SearchClientError>,
{
    debug!(?request, "dispatching...");
    let descriptor = request.into_request_path::<R>();
    let response = Response::from(low_level(descriptor)?);
    debug!(valid = response.is_valid(), "...dispatched");
    Ok(response)
}

/// Dispatches a request asynchronously.
///
/// Same semantics as [`dispatch`]; dropping the returned future cancels the call.
///
/// # Errors
///
/// Same as [`dispatch`].
#[tracing::instrument(level = "debug", skip_all, fields(request = std::any::type_name::<Q>()))]
pub async fn dispatch_async<Q, R, F, Fut>(
    request: Q,
    low_level: F,
) -> Result<Response<R>, SearchClientError>
where
    Q: Request,
    F: FnOnce(RequestPath<Q::Params, R>) -> Fut,
    Fut: Future<Output = Result<TransportResponse<R>, SearchClientError>>,
{
    debug!(?request, "dispatching...");
    let descriptor = request.into_request_path::<R>();
    let response = Response::from(low_level(descriptor).await?);
    debug!(valid = response.is_valid(), "...dispatched");
    Ok(response)
}
