//! Media upload coordination for the in-progress draft
//!
//! Each attachment is uploaded independently; the visible collection
//! holds finished uploads in the order their uploads completed, which
//! is not necessarily the order [`MediaCoordinator::add`] was called
//! in. Failed uploads keep their file bytes so they can be retried
//! under the same attachment id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::types::{storage_path, ImageAttachment, ImageFile, ImageFormat};
use super::{Notifier, ObjectStore};
use crate::error::Error;

/// Lifecycle of one attachment's upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    /// The upload is in flight
    Pending,

    /// The upload finished and the attachment is in the collection
    Uploaded,

    /// The upload failed; the file is kept for retry
    Failed,
}

/// Manages zero-or-more image attachments for an in-progress draft
///
/// All mutation goes through internal locks, so concurrent `add`
/// completions and `remove` calls serialize without lost updates.
pub struct MediaCoordinator {
    store: Arc<dyn ObjectStore>,
    notifier: Arc<dyn Notifier>,
    owner_uid: String,

    /// Finished uploads, in completion order
    entries: Mutex<Vec<ImageAttachment>>,

    /// Upload state per attachment id
    states: Mutex<HashMap<Uuid, UploadState>>,

    /// Files whose upload failed, kept for retry
    failed: Mutex<HashMap<Uuid, ImageFile>>,
}

impl MediaCoordinator {
    /// Create a coordinator for one owner's draft
    pub fn new(store: Arc<dyn ObjectStore>, notifier: Arc<dyn Notifier>, owner_uid: &str) -> Self {
        Self {
            store,
            notifier,
            owner_uid: owner_uid.to_string(),
            entries: Mutex::new(Vec::new()),
            states: Mutex::new(HashMap::new()),
            failed: Mutex::new(HashMap::new()),
        }
    }

    /// Upload a newly selected file and attach it to the draft
    ///
    /// Anything other than a jpeg or png is rejected locally: no upload
    /// is attempted and no state changes. The attachment appears in the
    /// collection only once its upload has completed.
    pub async fn add(&self, file: ImageFile) -> Result<ImageAttachment, Error> {
        if ImageFormat::from_mime(&file.content_type).is_none() {
            self.notifier.notify_failure("Send a jpeg or png image");
            return Err(Error::UnsupportedMediaType(file.content_type));
        }

        let id = Uuid::new_v4();
        self.upload(id, file).await
    }

    /// Re-attempt a failed upload under its original attachment id
    pub async fn retry(&self, id: Uuid) -> Result<ImageAttachment, Error> {
        let file = {
            let mut failed = self.failed.lock().unwrap();
            failed.remove(&id)
        };

        match file {
            Some(file) => self.upload(id, file).await,
            None => Err(Error::general(format!("No failed upload with id {}", id))),
        }
    }

    async fn upload(&self, id: Uuid, file: ImageFile) -> Result<ImageAttachment, Error> {
        let path = storage_path(&self.owner_uid, &id);

        {
            let mut states = self.states.lock().unwrap();
            states.insert(id, UploadState::Pending);
        }

        match self.store.put(&path, &file).await {
            Ok(()) => {
                let attachment = ImageAttachment {
                    id,
                    owner_uid: self.owner_uid.clone(),
                    preview: file.name.clone(),
                    url: self.store.public_url(&path),
                };

                {
                    let mut entries = self.entries.lock().unwrap();
                    entries.push(attachment.clone());
                }
                {
                    let mut states = self.states.lock().unwrap();
                    states.insert(id, UploadState::Uploaded);
                }

                self.notifier.notify_success("Image uploaded successfully");
                Ok(attachment)
            }
            Err(err) => {
                log::error!("Upload of {} failed: {}", path, err);

                {
                    let mut states = self.states.lock().unwrap();
                    states.insert(id, UploadState::Failed);
                }
                {
                    let mut failed = self.failed.lock().unwrap();
                    failed.insert(id, file);
                }

                self.notifier.notify_failure("Image upload failed, retry to keep it");
                Err(err)
            }
        }
    }

    /// Remove an attachment, deleting its remote object first
    ///
    /// The local entry is dropped only after the remote deletion
    /// succeeded; on failure the collection is unchanged, so the
    /// collection and remote storage never disagree.
    pub async fn remove(&self, attachment: &ImageAttachment) -> Result<(), Error> {
        let path = attachment.storage_path();

        if let Err(err) = self.store.remove(&path).await {
            log::error!("Delete of {} failed: {}", path, err);
            self.notifier.notify_failure("Could not remove the image");
            return Err(err);
        }

        {
            let mut entries = self.entries.lock().unwrap();
            entries.retain(|e| e.id != attachment.id);
        }
        {
            let mut states = self.states.lock().unwrap();
            states.remove(&attachment.id);
        }

        Ok(())
    }

    /// Snapshot of the finished attachments, in completion order
    pub fn entries(&self) -> Vec<ImageAttachment> {
        self.entries.lock().unwrap().clone()
    }

    /// Number of finished attachments
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether no upload has finished yet
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// The upload state of one attachment, if known
    pub fn status(&self, id: Uuid) -> Option<UploadState> {
        self.states.lock().unwrap().get(&id).copied()
    }

    /// Ids of failed uploads that can be retried
    pub fn failed(&self) -> Vec<Uuid> {
        self.failed.lock().unwrap().keys().copied().collect()
    }

    /// Return the coordinator to its empty lifecycle state
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
        self.states.lock().unwrap().clear();
        self.failed.lock().unwrap().clear();
    }
}
