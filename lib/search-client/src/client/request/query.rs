use indexmap::IndexMap;

use crate::client::SearchClientError;

/// Ordered query-string parameters of a request.
///
/// Insertion order is kept so generated URLs are stable; setting a key twice replaces the value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    params: IndexMap<String, String>,
}

impl QueryString {
    /// Creates an empty query string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing any previous value for the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl QueryValue) {
        self.params.insert(key.into(), value.to_query_value());
    }

    /// Returns the encoded value of a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Removes a parameter and returns its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.params.shift_remove(key)
    }

    /// Checks if no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub(in crate::client) fn to_query_string(&self) -> Result<String, SearchClientError> {
        let pairs: Vec<(&str, &str)> = self.iter().collect();
        let result = serde_urlencoded::to_string(pairs)?;
        Ok(result)
    }
}

/// A value that can be rendered as a query-string parameter.
pub trait QueryValue {
    /// Renders the value in the form the search engine expects.
    fn to_query_value(self) -> String;
}

impl QueryValue for bool {
    fn to_query_value(self) -> String {
        self.to_string()
    }
}

impl QueryValue for u32 {
    fn to_query_value(self) -> String {
        self.to_string()
    }
}

impl QueryValue for &str {
    fn to_query_value(self) -> String {
        self.to_string()
    }
}

impl QueryValue for String {
    fn to_query_value(self) -> String {
        self
    }
}

impl QueryValue for &[&str] {
    fn to_query_value(self) -> String {
        self.join(",")
    }
}

/// Which kind of concrete indices wildcard expressions may expand to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ExpandWildcards {
    /// Expand to open indices only.
    #[display("open")]
    Open,
    /// Expand to closed indices only.
    #[display("closed")]
    Closed,
    /// Disable wildcard expansion.
    #[display("none")]
    None,
    /// Expand to open and closed indices.
    #[display("all")]
    All,
}

impl QueryValue for ExpandWildcards {
    fn to_query_value(self) -> String {
        self.to_string()
    }
}

/// Unit used by cat endpoints to display byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ByteUnit {
    /// Bytes.
    #[display("b")]
    Bytes,
    /// Kilobytes.
    #[display("k")]
    Kilobytes,
    /// Megabytes.
    #[display("m")]
    Megabytes,
    /// Gigabytes.
    #[display("g")]
    Gigabytes,
}

impl QueryValue for ByteUnit {
    fn to_query_value(self) -> String {
        self.to_string()
    }
}
