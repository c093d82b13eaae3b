//! Authentication for Docker registry access
//!
//! Credentials are attached as given: either HTTP Basic (user id and
//! password, base64-encoded) or a pre-acquired bearer token. Token
//! acquisition and refresh against a separate auth service is out of scope;
//! callers obtain tokens themselves and hand them to the client.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::RequestBuilder;

/// How requests to the registry are authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RegistryAuth {
    /// No Authorization header.
    #[default]
    Anonymous,
    /// HTTP Basic credentials.
    Basic { user_id: String, password: String },
    /// A pre-acquired bearer token.
    Bearer(String),
}

impl RegistryAuth {
    pub fn basic(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        RegistryAuth::Basic {
            user_id: user_id.into(),
            password: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        RegistryAuth::Bearer(token.into())
    }

    /// The `Authorization` header value for these credentials, if any.
    pub fn header_value(&self) -> Option<String> {
        match self {
            RegistryAuth::Anonymous => None,
            RegistryAuth::Basic { user_id, password } => {
                let encoded = STANDARD.encode(format!("{}:{}", user_id, password));
                Some(format!("Basic {}", encoded))
            }
            RegistryAuth::Bearer(token) => Some(format!("Bearer {}", token)),
        }
    }

    /// Attach these credentials to an outgoing request.
    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            RegistryAuth::Anonymous => request,
            RegistryAuth::Basic { user_id, password } => {
                request.basic_auth(user_id, Some(password))
            }
            RegistryAuth::Bearer(token) => request.bearer_auth(token),
        }
    }
}
