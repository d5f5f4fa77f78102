//! User identity and session types.

use serde::{Deserialize, Serialize};

/// Opaque, stable identifier for one authenticated user.
///
/// Primary partition key for all per-user state: every persisted local key
/// and every remote profile row is qualified by this id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Construct a user id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authenticated session issued by the auth provider.
///
/// The gate only reads `user_id`; the tokens are carried opaquely for the
/// hosting application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}
