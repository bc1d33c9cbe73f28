use std::path::PathBuf;

use thiserror::Error;

use crate::request::HttpError;

/// Everything that can go wrong between typing a tag and seeing a photo.
/// None of these are fatal, the session accepts a new search after any of them
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Request error: {0}")]
    Transport(#[from] HttpError),
    #[error("Could not parse the search response: {0}")]
    Parse(#[from] roxmltree::Error),
    #[error("Flickr rejected the request ({code}): {message}")]
    Service { code: String, message: String },
    #[error("Could not decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Thumbnail resize was aborted")]
    ResizeAborted,
    #[error("Could not encode thumbnail: {0}")]
    Encode(#[source] image::ImageError),
    #[error("Could not write thumbnail to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Search was cancelled")]
    UserCancelled,
    #[error("Background worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl From<reqwest::Error> for ViewerError {
    fn from(err: reqwest::Error) -> Self {
        ViewerError::Transport(HttpError::ReqwestError(err))
    }
}
