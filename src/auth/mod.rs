//! Authentication and the observable user session

mod session;
mod types;

use reqwest::Client;
use serde_json::json;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

use crate::error::Error;
use crate::fetch::Fetch;

pub use session::Session;
pub use types::{AuthEvent, AuthResponse, User, UserInfo};

/// Client for the authenticated identity provider
///
/// The current session is held behind a lock and every sign-in or
/// sign-out transition is published on a broadcast channel, so the
/// listing workflow can read the owner identity at submission time and
/// other components can subscribe to transitions.
pub struct Auth {
    /// The base URL for the backend project
    url: String,

    /// The anonymous API key
    key: String,

    /// HTTP client used for requests
    client: Client,

    /// The current session
    session: Arc<RwLock<Option<Session>>>,

    /// Sign-in/sign-out transitions
    events: broadcast::Sender<AuthEvent>,
}

impl Auth {
    /// Create a new Auth client
    pub(crate) fn new(url: &str, key: &str, client: Client) -> Self {
        let (events, _) = broadcast::channel(16);

        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(RwLock::new(None)),
            events,
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    /// Sign up a new user with a display name, email and password
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<UserInfo, Error> {
        let url = self.get_auth_url("/signup");

        let body = json!({
            "email": email,
            "password": password,
            "data": { "name": name },
        });

        let result = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .json(&body)?
            .execute::<AuthResponse>()
            .await?;

        self.store_session(result)
    }

    /// Sign in a user with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserInfo, Error> {
        let url = self.get_auth_url("/token?grant_type=password");

        let body = json!({
            "email": email,
            "password": password,
        });

        let result = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .json(&body)?
            .execute::<AuthResponse>()
            .await?;

        self.store_session(result)
    }

    /// Sign out the current user
    pub async fn sign_out(&self) -> Result<(), Error> {
        let url = self.get_auth_url("/logout");

        let token = {
            let current_session = self.session.read().unwrap();
            match *current_session {
                Some(ref session) => session.access_token.clone(),
                None => return Err(Error::auth("Not signed in")),
            }
        };

        let response = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .bearer_auth(&token)
            .execute_raw()
            .await?;

        if !response.status().is_success() {
            return Err(Error::auth(format!(
                "Sign-out failed with status {}",
                response.status()
            )));
        }

        {
            let mut current_session = self.session.write().unwrap();
            *current_session = None;
        }
        let _ = self.events.send(AuthEvent::SignedOut);

        Ok(())
    }

    /// Get the current session
    pub fn get_session(&self) -> Option<Session> {
        let current_session = self.session.read().unwrap();
        current_session.clone()
    }

    /// Get the identity of the currently signed-in user
    pub fn current_user(&self) -> Option<UserInfo> {
        let current_session = self.session.read().unwrap();
        current_session.as_ref().map(|s| UserInfo::from(&s.user))
    }

    /// Subscribe to sign-in and sign-out transitions
    ///
    /// Dropping the receiver unsubscribes.
    pub fn on_auth_state_change(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    fn store_session(&self, response: AuthResponse) -> Result<UserInfo, Error> {
        let user = response
            .user
            .ok_or_else(|| Error::auth("Response carried no user"))?;
        let access_token = response
            .access_token
            .ok_or_else(|| Error::auth("Response carried no access token"))?;

        let info = UserInfo::from(&user);
        let session = Session::new(
            access_token,
            response.refresh_token.unwrap_or_default(),
            response.expires_in.unwrap_or(3600),
            user,
        );

        {
            let mut current_session = self.session.write().unwrap();
            *current_session = Some(session);
        }
        let _ = self.events.send(AuthEvent::SignedIn(info.clone()));

        Ok(info)
    }
}
