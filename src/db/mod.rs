//! Document store operations for listings

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::fetch::Fetch;

/// Client for the document store backing the classifieds collections
pub struct DbClient {
    /// The base URL for the backend project
    url: String,

    /// The anonymous API key
    key: String,

    /// HTTP client used for requests
    client: Client,
}

impl DbClient {
    /// Create a new DbClient
    pub(crate) fn new(url: &str, key: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
        }
    }

    fn get_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.url, collection)
    }

    /// Create a new record in a collection and return its id
    pub async fn create_record<T: Serialize>(
        &self,
        collection: &str,
        fields: &T,
    ) -> Result<String, Error> {
        let url = self.get_url(collection);

        let response = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .header("Prefer", "return=representation")
            .json(fields)?
            .execute_raw()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::database(format!(
                "Create in '{}' failed with status {}: {}",
                collection, status, text
            )));
        }

        let rows = response.json::<Vec<Value>>().await?;
        let id = rows
            .first()
            .and_then(|row| row.get("id"))
            .ok_or_else(|| Error::database("Created record carried no id"))?;

        // The store may assign numeric or string primary keys
        match id {
            Value::String(s) => Ok(s.clone()),
            other => Ok(other.to_string()),
        }
    }

    /// Fetch a single record by id, or `None` if it does not exist
    pub async fn find_by_id<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, Error> {
        let url = format!("{}?id=eq.{}&select=*", self.get_url(collection), id);

        let mut rows = Fetch::get(&self.client, &url)
            .header("apikey", &self.key)
            .execute::<Vec<T>>()
            .await
            .map_err(|e| Error::database(format!("Lookup in '{}' failed: {}", collection, e)))?;

        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }
}
