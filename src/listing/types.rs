//! Data model for the new-listing workflow

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::error::Error;

/// The two raster image formats a listing accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Parse a declared media type, `None` for anything unsupported
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    /// The media type string
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// A local file selected for upload, with its declared media type
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// The local file name, kept as the attachment's preview handle
    pub name: String,

    /// The declared media type
    pub content_type: String,

    /// The file contents
    pub bytes: Bytes,
}

impl ImageFile {
    /// Create an image file from in-memory bytes
    pub fn new(name: &str, content_type: &str, bytes: Bytes) -> Self {
        Self {
            name: name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        }
    }

    /// Read an image file from disk, deriving the media type from the
    /// file extension
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;

        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());

        let format = match path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => ImageFormat::Jpeg,
            Some("png") => ImageFormat::Png,
            other => return Err(Error::UnsupportedMediaType(other.unwrap_or("").to_string())),
        };

        Ok(Self::new(&name, format.mime(), Bytes::from(bytes)))
    }
}

/// One uploaded image attached to an in-progress draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Client-generated identifier, unique within the owner's namespace
    pub id: Uuid,

    /// The owning user's id
    pub owner_uid: String,

    /// Local preview handle; never persisted
    pub preview: String,

    /// The publicly retrievable address of the uploaded object
    pub url: String,
}

impl ImageAttachment {
    /// The storage path this attachment was uploaded to
    pub fn storage_path(&self) -> String {
        storage_path(&self.owner_uid, &self.id)
    }
}

/// The storage path for an attachment, scoped by owner
pub(crate) fn storage_path(owner_uid: &str, id: &Uuid) -> String {
    format!("images/{}/{}", owner_uid, id)
}

/// The persisted projection of an attachment: no preview handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingImage {
    /// The attachment id
    pub name: String,

    /// The owning user's id
    pub uid: String,

    /// The publicly retrievable address
    pub url: String,
}

impl From<&ImageAttachment> for ListingImage {
    fn from(attachment: &ImageAttachment) -> Self {
        Self {
            name: attachment.id.to_string(),
            uid: attachment.owner_uid.clone(),
            url: attachment.url.clone(),
        }
    }
}

/// The in-progress, unsaved listing the user is composing
///
/// All fields are strings at this layer; validation happens against the
/// rule table in [`crate::listing::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingForm {
    pub name: String,
    pub model: String,
    pub year: String,
    pub km: String,
    pub price: String,
    pub city: String,
    pub whatsapp: String,
    pub description: String,
}

impl ListingForm {
    /// Return the draft to its empty lifecycle state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The record written to the listings collection, exactly once
#[derive(Debug, Clone, Serialize)]
pub struct NewListing {
    pub name: String,
    pub model: String,
    pub year: String,
    pub km: String,
    pub price: String,
    pub city: String,
    pub whatsapp: String,
    pub description: String,
    pub created: DateTime<Utc>,
    pub owner: String,
    pub uid: String,
    pub images: Vec<ListingImage>,
}

fn id_to_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

/// A persisted listing read back from the store
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    /// Server-assigned id, normalized to a string whether the store
    /// uses numeric or string keys
    #[serde(deserialize_with = "id_to_string")]
    pub id: String,
    pub name: String,
    pub model: String,
    pub year: String,
    pub km: String,
    pub price: String,
    pub city: String,
    pub whatsapp: String,
    pub description: String,
    pub created: DateTime<Utc>,
    pub owner: String,
    pub uid: String,
    pub images: Vec<ListingImage>,
}
