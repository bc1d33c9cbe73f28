use std::env;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::models::ImageUrlTemplate;
use crate::search::DEFAULT_ENDPOINT;
use crate::thumbnail::{ThumbnailSpec, DEFAULT_JPEG_QUALITY, DEFAULT_THUMBNAIL_PATH};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing {0} environment variable")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub endpoint: Url,
    pub image_template: ImageUrlTemplate,
    pub thumbnail: ThumbnailSpec,
    pub user_agent: Option<String>,
}

impl Config {
    /// Reads configuration from the process environment. Call `dotenv()` first
    /// to pick up a `.env` file
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let api_key = lookup("FLICKR_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("FLICKR_API_KEY"))?;

        let endpoint = lookup("FLICKR_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());
        let endpoint = Url::parse(&endpoint).map_err(|err| ConfigError::Invalid {
            name: "FLICKR_ENDPOINT",
            reason: err.to_string(),
        })?;

        let quality = match lookup("THUMBNAIL_QUALITY") {
            None => DEFAULT_JPEG_QUALITY,
            Some(raw) => raw
                .parse::<u8>()
                .ok()
                .filter(|quality| (1..=100).contains(quality))
                .ok_or_else(|| ConfigError::Invalid {
                    name: "THUMBNAIL_QUALITY",
                    reason: format!("{} is not between 1 and 100", raw),
                })?,
        };

        let thumbnail = ThumbnailSpec {
            quality,
            path: PathBuf::from(
                lookup("THUMBNAIL_PATH").unwrap_or_else(|| DEFAULT_THUMBNAIL_PATH.to_owned()),
            ),
            ..ThumbnailSpec::default()
        };

        let image_template = lookup("FLICKR_IMAGE_TEMPLATE")
            .map(ImageUrlTemplate)
            .unwrap_or_default();

        Ok(Self {
            api_key,
            endpoint,
            image_template,
            thumbnail,
            user_agent: lookup("USER_AGENT"),
        })
    }
}
