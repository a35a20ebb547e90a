//! Authenticated session returned by the backend's password grant.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::UserId;

/// The user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// User identifier; every row the user owns carries it as `user_id`.
    pub id: UserId,
    /// Sign-in email, when the backend reports it.
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens for an authenticated user.
///
/// Tokens are held as [`SecretString`] so they never show up in `Debug`
/// output or logs.
#[derive(Debug, Deserialize)]
#[serde(from = "RawSession")]
pub struct Session {
    /// Bearer token sent with every data request.
    pub access_token: SecretString,
    /// Token used to obtain a new access token.
    pub refresh_token: Option<SecretString>,
    /// Token type reported by the backend (normally `bearer`).
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: Option<i64>,
    /// The signed-in user.
    pub user: AuthUser,
}

impl Session {
    /// Creates a session from an already issued access token.
    #[inline]
    #[must_use]
    pub fn new<T: Into<String>>(access_token: T, user: AuthUser) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: None,
            token_type: "bearer".to_owned(),
            expires_in: None,
            user,
        }
    }

    /// Returns the signed-in user's ID.
    #[inline]
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user.id
    }
}

/// Wire shape of the token response before secrets are wrapped.
#[derive(Deserialize)]
struct RawSession {
    /// Access token.
    access_token: String,
    /// Refresh token.
    #[serde(default)]
    refresh_token: Option<String>,
    /// Token type.
    #[serde(default = "default_token_type")]
    token_type: String,
    /// Lifetime in seconds.
    #[serde(default)]
    expires_in: Option<i64>,
    /// Signed-in user.
    user: AuthUser,
}

/// Token type assumed when the backend omits it.
fn default_token_type() -> String {
    "bearer".to_owned()
}

impl From<RawSession> for Session {
    #[inline]
    fn from(raw: RawSession) -> Self {
        Self {
            access_token: SecretString::from(raw.access_token),
            refresh_token: raw.refresh_token.map(SecretString::from),
            token_type: raw.token_type,
            expires_in: raw.expires_in,
            user: raw.user,
        }
    }
}
