//! The new-listing workflow: draft validation, media uploads, and
//! submission
//!
//! The workflow talks to the backend only through the narrow
//! capability traits defined here, so the coordinator and orchestrator
//! can be driven against any store.

pub mod media;
pub mod submit;
pub mod types;
pub mod validate;

use async_trait::async_trait;

use crate::db::DbClient;
use crate::error::Error;
use crate::storage::StorageClient;

pub use media::{MediaCoordinator, UploadState};
pub use submit::ListingComposer;
pub use types::{
    ImageAttachment, ImageFile, ImageFormat, Listing, ListingForm, ListingImage, NewListing,
};
pub use validate::{Field, FieldError, ValidationErrors};

/// Object-storage capability the media coordinator uploads through
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store the file at the given path
    async fn put(&self, path: &str, file: &ImageFile) -> Result<(), Error>;

    /// The publicly retrievable address for a stored path
    fn public_url(&self, path: &str) -> String;

    /// Delete the object at the given path; a missing object counts as
    /// a successful deletion
    async fn remove(&self, path: &str) -> Result<(), Error>;
}

#[async_trait]
impl ObjectStore for StorageClient {
    async fn put(&self, path: &str, file: &ImageFile) -> Result<(), Error> {
        self.upload(path, file).await
    }

    fn public_url(&self, path: &str) -> String {
        StorageClient::public_url(self, path)
    }

    async fn remove(&self, path: &str) -> Result<(), Error> {
        StorageClient::remove(self, path).await
    }
}

/// Document-store capability the orchestrator writes through
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Persist a new listing and return its record id
    async fn create(&self, listing: &NewListing) -> Result<String, Error>;
}

/// A named listings collection in the document store
pub struct ListingsCollection {
    db: DbClient,
    collection: String,
}

impl ListingsCollection {
    /// Create a collection handle
    pub fn new(db: DbClient, collection: &str) -> Self {
        Self {
            db,
            collection: collection.to_string(),
        }
    }

    /// Fetch a persisted listing by id
    pub async fn get(&self, id: &str) -> Result<Option<Listing>, Error> {
        self.db.find_by_id(&self.collection, id).await
    }
}

#[async_trait]
impl ListingStore for ListingsCollection {
    async fn create(&self, listing: &NewListing) -> Result<String, Error> {
        self.db.create_record(&self.collection, listing).await
    }
}

/// Fire-and-forget sink for user-visible success and failure notices
pub trait Notifier: Send + Sync {
    fn notify_success(&self, message: &str);
    fn notify_failure(&self, message: &str);
}

/// Default notifier that writes notices to the `log` facade
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_success(&self, message: &str) {
        log::info!("{}", message);
    }

    fn notify_failure(&self, message: &str) {
        log::error!("{}", message);
    }
}
