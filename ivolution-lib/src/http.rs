use crate::config::Config;
use crate::error::UpdateError;
use crate::metadata::{UpdateMetadata, VersionEntry, VersionIndex};
use crate::metadata_source::MetadataSource;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// Shared HTTP client for the metadata endpoints and the downloader.
///
/// Cloning is cheap and reuses the same connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &Config) -> Result<Self, UpdateError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Single GET attempt; anything outside 2xx is an error.
    pub async fn get(&self, url: &str) -> Result<Response, UpdateError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(UpdateError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, UpdateError> {
        let body = self.get(url).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl MetadataSource for HttpClient {
    async fn fetch_metadata(&self, url: &str) -> Result<UpdateMetadata, UpdateError> {
        self.get_json(url).await
    }

    async fn fetch_versions(&self, url: &str) -> Result<Vec<VersionEntry>, UpdateError> {
        let index: VersionIndex = self.get_json(url).await?;
        Ok(index.versions)
    }
}
