//! Types for authentication and user management

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Authentication response returned by sign-up and sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The user data
    pub user: Option<User>,

    /// The access token
    pub access_token: Option<String>,

    /// The refresh token
    pub refresh_token: Option<String>,

    /// The token type
    pub token_type: Option<String>,

    /// The expiry time in seconds
    pub expires_in: Option<i64>,
}

/// User data as returned by the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user ID
    pub id: String,

    /// The user's email address
    pub email: Option<String>,

    /// The user metadata; the display name lives under the `name` key
    #[serde(default)]
    pub user_metadata: HashMap<String, serde_json::Value>,
}

impl User {
    /// The display name stored in the user metadata, if any
    pub fn display_name(&self) -> Option<String> {
        self.user_metadata
            .get("name")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
}

/// The owner identity the listing workflow reads at submission time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    /// The user ID
    pub uid: String,

    /// The display name
    pub name: Option<String>,

    /// The email address
    pub email: Option<String>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            uid: user.id.clone(),
            name: user.display_name(),
            email: user.email.clone(),
        }
    }
}

/// A sign-in or sign-out transition, published to subscribers
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// A user signed in
    SignedIn(UserInfo),

    /// The current user signed out
    SignedOut,
}
