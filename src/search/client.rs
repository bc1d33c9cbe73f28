use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use reqwest::Client;
use url::Url;

use crate::error::ViewerError;
use crate::models::ResultSet;
use crate::request::successful_text;

use super::parse::parse_search_response;
use super::query::{search_url, SearchQuery};

pub const DEFAULT_ENDPOINT: &str = "https://api.flickr.com/services/rest/";

/// Issues tag searches against the flickr REST endpoint
pub struct SearchClient {
    pub client: Arc<Client>,
    pub endpoint: Url,
    api_key: String,
}

impl SearchClient {
    pub fn new(client: Arc<Client>, endpoint: Url, api_key: &str) -> Self {
        Self {
            client,
            endpoint,
            api_key: api_key.to_owned(),
        }
    }

    pub async fn search(&self, input: &str) -> Result<ResultSet, ViewerError> {
        let query = SearchQuery::parse(input);
        let url = search_url(&self.endpoint, &self.api_key, &query);
        debug!("Searching for tags [{}]", query.tag_parameter());

        let instant = Instant::now();
        let response = self.client.get(url).send().await?;
        let body = successful_text(response).await?;
        let results = parse_search_response(&body)?;
        info!(
            "Search for [{}] returned {} photos in {:?}",
            query.tag_parameter(),
            results.len(),
            instant.elapsed()
        );
        Ok(results)
    }
}
