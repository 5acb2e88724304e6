//! Configuration options for the WebCarros client

use std::time::Duration;

/// Configuration options for the WebCarros client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The storage bucket holding listing images
    pub storage_bucket: String,

    /// The collection listings are written to
    pub listings_collection: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            storage_bucket: "car-images".to_string(),
            listings_collection: "cars".to_string(),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the storage bucket holding listing images
    pub fn with_storage_bucket(mut self, value: &str) -> Self {
        self.storage_bucket = value.to_string();
        self
    }

    /// Set the collection listings are written to
    pub fn with_listings_collection(mut self, value: &str) -> Self {
        self.listings_collection = value.to_string();
        self
    }
}
