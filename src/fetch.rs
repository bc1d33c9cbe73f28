use std::sync::Arc;

use log::debug;
use reqwest::Client;

use crate::error::ViewerError;
use crate::request::successful_bytes;

/// Raw bytes of a downloaded photo, only kept around for one selection
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub url: String,
    pub bytes: Vec<u8>,
}

pub struct ImageFetcher {
    pub client: Arc<Client>,
}

impl ImageFetcher {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchedImage, ViewerError> {
        let response = self.client.get(url).send().await?;
        let bytes = successful_bytes(response).await?;
        debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(FetchedImage {
            url: url.to_owned(),
            bytes,
        })
    }
}
