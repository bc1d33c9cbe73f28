use std::iter::FromIterator;

use log::error;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str = concat!("flickr-viewer/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub struct ResponseErrorContext {
    pub body: String,
    pub code: StatusCode,
}

impl std::fmt::Display for ResponseErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// Wrapper for providing actual useful information about
/// why responses failed since reqwest throws that information
/// away when it encounters errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Failed response code {0}")]
    FailStatus(ResponseErrorContext),
    #[error("{0}")]
    ReqwestError(#[from] reqwest::Error),
}

async fn fail_status(response: Response) -> HttpError {
    let code = response.status();
    let url = response.url().clone();
    // the body is only context here, losing it shouldn't hide the status
    let body = response.text().await.unwrap_or_default();
    error!("{} responded with {}", url, code);
    HttpError::FailStatus(ResponseErrorContext { body, code })
}

/// Reads the body of a response as text, failing on non 2xx codes
pub async fn successful_text(response: Response) -> Result<String, HttpError> {
    if !response.status().is_success() {
        return Err(fail_status(response).await);
    }
    Ok(response.text().await?)
}

/// Reads the raw body of a response, failing on non 2xx codes
pub async fn successful_bytes(response: Response) -> Result<Vec<u8>, HttpError> {
    if !response.status().is_success() {
        return Err(fail_status(response).await);
    }
    Ok(response.bytes().await?.to_vec())
}

pub fn request_default_headers(user_agent: Option<&str>) -> HeaderMap {
    let value = user_agent
        .and_then(|agent| HeaderValue::from_str(agent).ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_USER_AGENT));
    HeaderMap::from_iter([(HeaderName::from_static("user-agent"), value)])
}

/// The client shared by searches and image downloads. Proxies are never used
pub fn build_client(user_agent: Option<&str>) -> Result<Client, HttpError> {
    Ok(Client::builder()
        .no_proxy()
        .default_headers(request_default_headers(user_agent))
        .build()?)
}
