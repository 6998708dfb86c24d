use std::fmt;

use bytes::Bytes;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::client::response::ApiCallDetails;
use crate::client::serializer::DeserializeError;

/// Characters escaped in a path segment. Commas are kept so multi-target lists stay readable.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A function replacing the default "decode the body as `R`" step for a single call.
///
/// It receives the call metadata and the complete response body.
pub type DeserializationOverride<R> =
    Box<dyn FnOnce(&ApiCallDetails, &[u8]) -> Result<R, DeserializeError> + Send>;

/// Body of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum PostData {
    /// Bytes sent as-is.
    Raw(Bytes),
    /// A document encoded by the transport serializer.
    Json(serde_json::Value),
}

impl PostData {
    /// Creates a body sent as-is, without any encoding.
    pub fn raw(data: impl Into<Bytes>) -> Self {
        Self::Raw(data.into())
    }
}

/// Values that end up as segments of the request URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteValues {
    /// Target indices (empty means all indices).
    pub indices: Vec<String>,
    /// Target names, such as alias names.
    pub names: Vec<String>,
    /// Target node ids.
    pub node_ids: Vec<String>,
    /// Scroll context identifier.
    pub scroll_id: Option<String>,
}

/// Canonical, per-call description of a request: route values, parameters, an optional body
/// and an optional deserialization override.
///
/// A `RequestPath` is built from a [`Request`](super::Request) right before dispatch and is owned
/// by that dispatch only. Endpoint patch functions may move data between its route values and
/// the request body.
pub struct RequestPath<P, R> {
    route: RouteValues,
    params: P,
    body: Option<PostData>,
    deserialization_override: Option<DeserializationOverride<R>>,
}

impl<P, R> RequestPath<P, R> {
    /// Creates a descriptor without deserialization override.
    pub fn new(route: RouteValues, params: P) -> Self {
        Self {
            route,
            params,
            body: None,
            deserialization_override: None,
        }
    }

    /// Returns the route values.
    pub fn route(&self) -> &RouteValues {
        &self.route
    }

    /// Returns the route values for patching.
    pub fn route_mut(&mut self) -> &mut RouteValues {
        &mut self.route
    }

    /// Returns the request parameters.
    pub fn params(&self) -> &P {
        &self.params
    }

    /// Returns the request parameters for patching.
    pub fn params_mut(&mut self) -> &mut P {
        &mut self.params
    }

    /// Returns the body sent with the request.
    pub fn body(&self) -> Option<&PostData> {
        self.body.as_ref()
    }

    /// Replaces the body sent with the request.
    pub fn set_body(&mut self, body: Option<PostData>) {
        self.body = body;
    }

    /// Sets the body sent with the request.
    #[must_use]
    pub fn with_body(mut self, body: PostData) -> Self {
        self.body = Some(body);
        self
    }

    /// Attaches a deserialization override to this call.
    ///
    /// The override replaces the default decoding of a successful, non-blank body. It is not
    /// called for failed calls or blank bodies.
    ///
    /// # Panics
    ///
    /// Panics if an override is already attached: a descriptor carries at most one.
    pub fn with_deserialization_override<F>(mut self, deserialize: F) -> Self
    where
        F: FnOnce(&ApiCallDetails, &[u8]) -> Result<R, DeserializeError> + Send + 'static,
    {
        assert!(
            self.deserialization_override.is_none(),
            "a deserialization override is already attached to this request"
        );
        self.deserialization_override = Some(Box::new(deserialize));
        self
    }

    /// Checks if a deserialization override is attached.
    pub fn has_deserialization_override(&self) -> bool {
        self.deserialization_override.is_some()
    }

    pub(in crate::client) fn into_parts(
        self,
    ) -> (
        RouteValues,
        P,
        Option<PostData>,
        Option<DeserializationOverride<R>>,
    ) {
        (
            self.route,
            self.params,
            self.body,
            self.deserialization_override,
        )
    }
}

impl<P, R> fmt::Debug for RequestPath<P, R>
where
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestPath")
            .field("route", &self.route)
            .field("params", &self.params)
            .field("body", &self.body)
            .field(
                "deserialization_override",
                &self.deserialization_override.is_some(),
            )
            .finish()
    }
}

/// Builds an absolute URL path from segments, skipping empty ones.
pub(in crate::client) fn url_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut path = String::new();
    for segment in segments.into_iter().filter(|segment| !segment.is_empty()) {
        path.push('/');
        path.extend(utf8_percent_encode(segment, PATH_SEGMENT));
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}
