//! WebCarros Rust Client Library
//!
//! A Rust client for the WebCarros car-classifieds platform, providing
//! authentication, listing persistence, image storage, and the
//! new-listing composition workflow (validated draft, incremental image
//! uploads, single submission).

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod listing;
pub mod storage;

use reqwest::Client;
use std::sync::Arc;

use crate::auth::Auth;
use crate::config::ClientOptions;
use crate::db::DbClient;
use crate::error::Error;
use crate::listing::{ListingComposer, ListingsCollection, LogNotifier, Notifier};
use crate::storage::StorageClient;

/// The main entry point for the WebCarros client
pub struct WebCarros {
    /// The base URL for the backend project
    pub url: String,
    /// The anonymous API key for the backend project
    pub key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Auth client for user management and the observable session
    pub auth: Auth,
    /// Client options
    pub options: ClientOptions,
}

impl WebCarros {
    /// Create a new WebCarros client
    ///
    /// # Example
    ///
    /// ```
    /// use webcarros_client::WebCarros;
    ///
    /// let client = WebCarros::new("https://your-project-url.example.com", "your-anon-key");
    /// ```
    pub fn new(url: &str, key: &str) -> Self {
        Self::new_with_options(url, key, ClientOptions::default())
    }

    /// Create a new WebCarros client with custom options
    pub fn new_with_options(url: &str, key: &str, options: ClientOptions) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().unwrap_or_default();

        let auth = Auth::new(url, key, http_client.clone());

        Self {
            url: url.to_string(),
            key: key.to_string(),
            http_client,
            auth,
            options,
        }
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Get a document store client
    pub fn db(&self) -> DbClient {
        DbClient::new(&self.url, &self.key, self.http_client.clone())
    }

    /// Get a handle to the listings collection
    pub fn listings(&self) -> ListingsCollection {
        ListingsCollection::new(self.db(), &self.options.listings_collection)
    }

    /// Get an object storage client for the configured image bucket
    pub fn storage(&self) -> StorageClient {
        StorageClient::new(
            &self.url,
            &self.key,
            &self.options.storage_bucket,
            self.http_client.clone(),
        )
    }

    /// Start composing a new listing for the signed-in user
    ///
    /// Notices go to the default [`LogNotifier`]; use
    /// [`WebCarros::new_listing_with_notifier`] to surface them in a UI.
    pub fn new_listing(&self) -> Result<ListingComposer, Error> {
        self.new_listing_with_notifier(Arc::new(LogNotifier))
    }

    /// Start composing a new listing with a custom notification sink
    pub fn new_listing_with_notifier(
        &self,
        notifier: Arc<dyn Notifier>,
    ) -> Result<ListingComposer, Error> {
        let owner = self
            .auth
            .current_user()
            .ok_or_else(|| Error::auth("Sign in before creating a listing"))?;

        Ok(ListingComposer::new(
            Arc::new(self.storage()),
            Arc::new(self.listings()),
            notifier,
            owner,
        ))
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{AuthEvent, UserInfo};
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::listing::{
        Field, ImageAttachment, ImageFile, ListingComposer, ListingForm, MediaCoordinator,
    };
    pub use crate::WebCarros;
}
