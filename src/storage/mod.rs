//! Object storage operations for listing images

use reqwest::{multipart, Client, StatusCode};

use crate::error::Error;
use crate::fetch::Fetch;
use crate::listing::types::ImageFile;

/// Client for the object store holding listing images
pub struct StorageClient {
    /// The base URL for the backend project
    url: String,

    /// The anonymous API key
    key: String,

    /// The bucket images are written to
    bucket: String,

    /// HTTP client used for requests
    client: Client,
}

impl StorageClient {
    /// Create a new StorageClient
    pub(crate) fn new(url: &str, key: &str, bucket: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            bucket: bucket.to_string(),
            client,
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.url, self.bucket, path)
    }

    /// Upload a file to the bucket
    pub async fn upload(&self, path: &str, file: &ImageFile) -> Result<(), Error> {
        let url = self.object_url(path);

        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(file.content_type.as_str())
            .map_err(|e| Error::storage(format!("Invalid content type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.key)
            .header("X-Client-Info", "webcarros-client/0.1.0")
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::storage(format!(
                "Upload failed with status {}: {}",
                status, text
            )));
        }

        Ok(())
    }

    /// Get the public URL for an object
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.url, self.bucket, path
        )
    }

    /// Delete an object from the bucket
    ///
    /// An object that is already gone counts as a successful deletion,
    /// so a retried remove does not fail.
    pub async fn remove(&self, path: &str) -> Result<(), Error> {
        let url = self.object_url(path);

        let response = Fetch::delete(&self.client, &url)
            .header("apikey", &self.key)
            .execute_raw()
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(Error::storage(format!(
            "Delete failed with status {}: {}",
            status, text
        )))
    }
}
