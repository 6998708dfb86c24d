use std::fmt;

use base64::Engine;
use http::HeaderValue;
use http::header::{AUTHORIZATION, HeaderName};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Errors that can occur while turning credentials into an `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum AuthenticationError {
    /// Bearer token contains invalid characters for HTTP headers.
    #[display("Bearer token contains invalid characters: {message}")]
    InvalidBearerToken {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// Basic authentication username contains invalid characters.
    #[display("Basic auth username contains invalid characters: {message}")]
    InvalidUsername {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// Basic authentication password contains invalid characters.
    #[display("Basic auth password contains invalid characters: {message}")]
    InvalidPassword {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// API key id or secret contains invalid characters.
    #[display("API key contains invalid characters: {message}")]
    InvalidApiKey {
        /// Description of the invalid characters or format issue.
        message: String,
    },
}

/// Secure wrapper for sensitive string data that zeroes memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks if the secure string equals the given string slice.
    pub fn equals_str(&self, other: &str) -> bool {
        self.0 == other
    }

    fn mask_sensitive(value: &str) -> String {
        let count = value.chars().count();
        if count <= 8 {
            "***".to_string()
        } else {
            let head: String = value.chars().take(4).collect();
            let tail: String = value.chars().skip(count - 4).collect();
            format!("{head}...{tail}")
        }
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// Credentials sent with every request issued by a client.
///
/// # Examples
///
/// ```rust
/// use search_client::Authentication;
///
/// let auth = Authentication::Basic {
///     username: "elastic".to_string(),
///     password: "changeme".into(),
/// };
///
/// let auth = Authentication::ApiKey {
///     id: "VuaCfGcBCdbkQm-e5aOx".to_string(),
///     api_key: "ui2lp2axTNmsyakw9tvNnw".into(),
/// };
/// ```
#[derive(Clone)]
pub enum Authentication {
    /// Adds `Authorization: Bearer <token>`.
    Bearer(SecureString),

    /// Adds `Authorization: Basic <base64(username:password)>`.
    Basic {
        /// The username for Basic authentication.
        username: String,
        /// The password for Basic authentication.
        password: SecureString,
    },

    /// Adds `Authorization: ApiKey <base64(id:api_key)>`.
    ApiKey {
        /// The API key identifier.
        id: String,
        /// The API key secret.
        api_key: SecureString,
    },
}

impl Authentication {
    /// Converts the authentication into an HTTP header.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationError` if the credentials cannot be encoded as a header value.
    pub fn to_header(&self) -> Result<(HeaderName, HeaderValue), AuthenticationError> {
        let header_value = match self {
            Self::Bearer(token) => HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|err| AuthenticationError::InvalidBearerToken {
                    message: err.to_string(),
                })?,

            Self::Basic { username, password } => {
                if username.contains(':') {
                    return Err(AuthenticationError::InvalidUsername {
                        message: "Username cannot contain colon (:) character".to_string(),
                    });
                }
                let credentials = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{}", password.as_str()));
                HeaderValue::from_str(&format!("Basic {credentials}")).map_err(|err| {
                    AuthenticationError::InvalidPassword {
                        message: err.to_string(),
                    }
                })?
            }

            Self::ApiKey { id, api_key } => {
                let credentials = base64::engine::general_purpose::STANDARD
                    .encode(format!("{id}:{}", api_key.as_str()));
                HeaderValue::from_str(&format!("ApiKey {credentials}")).map_err(|err| {
                    AuthenticationError::InvalidApiKey {
                        message: err.to_string(),
                    }
                })?
            }
        };

        Ok((AUTHORIZATION, header_value))
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::ApiKey { id, .. } => f
                .debug_struct("ApiKey")
                .field("id", id)
                .field("api_key", &"[REDACTED]")
                .finish(),
        }
    }
}
