use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::SearchClientError;

/// Maximum number of body bytes kept in a [`DeserializeError`].
const BODY_MAX_LENGTH: usize = 1024;

/// Converts typed values to request bytes and response bytes to typed values.
///
/// The client is generic over its serializer; [`JsonSerializer`] is the default.
/// Implementations must be cheap to clone: a clone is captured by deserialization
/// overrides such as the cat-API record decoder.
pub trait Serializer: Debug + Clone + Send + Sync + 'static {
    /// Encodes a value as a request body.
    ///
    /// # Errors
    ///
    /// Returns [`SearchClientError::SerializationError`] if the value cannot be encoded.
    fn serialize<T>(&self, value: &T) -> Result<Vec<u8>, SearchClientError>
    where
        T: Serialize + ?Sized;

    /// Decodes a response body.
    ///
    /// # Errors
    ///
    /// Returns a [`DeserializeError`] locating the first mismatch in the body.
    fn deserialize<T>(&self, body: &[u8]) -> Result<T, DeserializeError>
    where
        T: DeserializeOwned;
}

/// JSON serializer backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize<T>(&self, value: &T) -> Result<Vec<u8>, SearchClientError>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_vec(value).map_err(|err| SearchClientError::SerializationError {
            message: err.to_string(),
        })
    }

    fn deserialize<T>(&self, body: &[u8]) -> Result<T, DeserializeError>
    where
        T: DeserializeOwned,
    {
        let deserializer = &mut serde_json::Deserializer::from_slice(body);
        serde_path_to_error::deserialize(deserializer).map_err(|err| DeserializeError {
            path: err.path().to_string(),
            error: err.into_inner(),
            body: truncated_body(body),
        })
    }
}

/// A response body could not be decoded into the expected type.
#[derive(Debug, derive_more::Error, derive_more::Display)]
#[display("Failed to deserialize JSON at '{path}': {error}\n{body}")]
pub struct DeserializeError {
    /// Location of the failure inside the document.
    pub path: String,
    /// The underlying JSON parsing error.
    #[error(source)]
    pub error: serde_json::Error,
    /// The (possibly truncated) body that failed to parse.
    pub body: String,
}

fn truncated_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.chars().count() > BODY_MAX_LENGTH {
        let head: String = text.chars().take(BODY_MAX_LENGTH).collect();
        format!("{head}... (truncated)")
    } else {
        text.into_owned()
    }
}
