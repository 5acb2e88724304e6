//! The terminal step of the workflow: turning a validated draft plus
//! its finalized image set into one durable record

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::media::{MediaCoordinator, UploadState};
use super::types::{ImageAttachment, ImageFile, ListingForm, ListingImage, NewListing};
use super::validate::{Field, FieldError};
use super::{ListingStore, Notifier, ObjectStore};
use crate::auth::UserInfo;
use crate::error::Error;

/// Composes one new listing: a live-validated draft, its image
/// attachments, and a single submission into the document store
///
/// The draft is either *composing* (editable) or, after a successful
/// submission, cleared back to empty. A second `submit` while one is in
/// flight is refused, so a double-click cannot create two records.
pub struct ListingComposer {
    form: Mutex<ListingForm>,
    media: MediaCoordinator,
    store: Arc<dyn ListingStore>,
    notifier: Arc<dyn Notifier>,
    owner: UserInfo,
    submitting: AtomicBool,
}

impl ListingComposer {
    /// Create a composer for the given owner
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        store: Arc<dyn ListingStore>,
        notifier: Arc<dyn Notifier>,
        owner: UserInfo,
    ) -> Self {
        let media = MediaCoordinator::new(objects, notifier.clone(), &owner.uid);

        Self {
            form: Mutex::new(ListingForm::default()),
            media,
            store,
            notifier,
            owner,
            submitting: AtomicBool::new(false),
        }
    }

    /// Update one draft field and re-validate it, returning its current
    /// error if the new value violates a rule
    pub fn set_field(&self, field: Field, value: &str) -> Option<FieldError> {
        let mut form = self.form.lock().unwrap();
        match field {
            Field::Name => form.name = value.to_string(),
            Field::Model => form.model = value.to_string(),
            Field::Year => form.year = value.to_string(),
            Field::Km => form.km = value.to_string(),
            Field::Price => form.price = value.to_string(),
            Field::City => form.city = value.to_string(),
            Field::Whatsapp => form.whatsapp = value.to_string(),
            Field::Description => form.description = value.to_string(),
        }
        form.validate_field(field)
    }

    /// Snapshot of the current draft fields
    pub fn form(&self) -> ListingForm {
        self.form.lock().unwrap().clone()
    }

    /// The current error for one field, if any
    pub fn field_error(&self, field: Field) -> Option<FieldError> {
        self.form.lock().unwrap().validate_field(field)
    }

    /// The media coordinator managing this draft's attachments
    pub fn media(&self) -> &MediaCoordinator {
        &self.media
    }

    /// Upload a newly selected image and attach it to the draft
    pub async fn add_image(&self, file: ImageFile) -> Result<ImageAttachment, Error> {
        self.media.add(file).await
    }

    /// Re-attempt a failed image upload
    pub async fn retry_image(&self, id: Uuid) -> Result<ImageAttachment, Error> {
        self.media.retry(id).await
    }

    /// Remove an attached image, remote object first
    pub async fn remove_image(&self, attachment: &ImageAttachment) -> Result<(), Error> {
        self.media.remove(attachment).await
    }

    /// The finished attachments, in completion order
    pub fn images(&self) -> Vec<ImageAttachment> {
        self.media.entries()
    }

    /// The upload state of one attachment, if known
    pub fn image_status(&self, id: Uuid) -> Option<UploadState> {
        self.media.status(id)
    }

    /// Persist the draft as a new listing record
    ///
    /// On success the draft and the image collection are cleared and
    /// the record id is returned. On failure both are left intact so
    /// the user can retry without re-uploading images; already-uploaded
    /// remote objects are never rolled back.
    pub async fn submit(&self) -> Result<String, Error> {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return Err(Error::SubmissionInFlight);
        }
        let _guard = InFlightGuard(&self.submitting);

        let images = self.media.entries();
        if images.is_empty() {
            self.notifier.notify_failure("Send at least one image of the car");
            return Err(Error::EmptySubmission);
        }

        let form = self.form.lock().unwrap().clone();
        if let Err(errors) = form.validate() {
            return Err(Error::Validation(errors));
        }

        let record = assemble(form, &images, &self.owner);

        match self.store.create(&record).await {
            Ok(id) => {
                self.form.lock().unwrap().reset();
                self.media.clear();
                self.notifier.notify_success("Listing created successfully");
                Ok(id)
            }
            Err(err) => {
                log::error!("Failed to persist listing: {}", err);
                self.notifier
                    .notify_failure("Could not create the listing, try again");
                Err(err)
            }
        }
    }
}

/// Releases the in-flight flag on every exit path
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Combine the validated draft with its finalized image set
///
/// The name is upper-cased for display consistency, the creation time
/// is stamped here, the owner identity is attached, and each attachment
/// is projected down to its persisted shape (no preview handle).
fn assemble(form: ListingForm, images: &[ImageAttachment], owner: &UserInfo) -> NewListing {
    NewListing {
        name: form.name.to_uppercase(),
        model: form.model,
        year: form.year,
        km: form.km,
        price: form.price,
        city: form.city,
        whatsapp: form.whatsapp,
        description: form.description,
        created: Utc::now(),
        owner: owner.name.clone().unwrap_or_default(),
        uid: owner.uid.clone(),
        images: images.iter().map(ListingImage::from).collect(),
    }
}
