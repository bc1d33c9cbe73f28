mod client;
mod parse;
mod query;

pub use client::{SearchClient, DEFAULT_ENDPOINT};
pub use parse::parse_search_response;
pub use query::{search_url, SearchQuery, UrlBuilder, PAGE_SIZE, TAG_SEPARATOR};
