use std::time::Duration;

use http::HeaderMap;
use url::Url;

use crate::client::Authentication;

/// Client-wide settings applied to every request sent by a [`Transport`](super::Transport).
///
/// Built by [`SearchClientBuilder`](crate::SearchClientBuilder); per-request values from a
/// [`RequestConfiguration`](crate::RequestConfiguration) take precedence.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub(in crate::client) base_url: Url,
    pub(in crate::client) authentication: Option<Authentication>,
    pub(in crate::client) request_timeout: Option<Duration>,
    pub(in crate::client) throw_exceptions: bool,
    pub(in crate::client) default_headers: HeaderMap,
}

impl ConnectionSettings {
    /// Creates settings for the given node URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            authentication: None,
            request_timeout: None,
            throw_exceptions: false,
            default_headers: HeaderMap::new(),
        }
    }

    /// Returns the node URL every request path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the default request timeout.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Whether invalid responses are turned into errors.
    pub fn throw_exceptions(&self) -> bool {
        self.throw_exceptions
    }
}
