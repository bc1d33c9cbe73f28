use url::form_urlencoded::byte_serialize;
use url::Url;

/// Flickr separates multiple tags with commas
pub const TAG_SEPARATOR: &str = ",";

/// The only page that is ever requested
pub const PAGE_SIZE: usize = 500;

pub const SEARCH_METHOD: &str = "flickr.photos.search";

/// privacy_filter=1 restricts results to public photos
const PUBLIC_PHOTOS: &str = "1";

/// A tag query typed by the user, split on whitespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub tags: Vec<String>,
}

impl SearchQuery {
    pub fn parse(input: &str) -> Self {
        Self {
            tags: input.split_whitespace().map(str::to_owned).collect(),
        }
    }

    /// The tags parameter as the service expects it, `"red car"` becomes `red,car`
    pub fn tag_parameter(&self) -> String {
        self.tags.join(TAG_SEPARATOR)
    }
}

/// Collects already encoded query parameters in insertion order
#[derive(Default)]
pub struct UrlBuilder {
    pub params: Vec<(&'static str, String)>,
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

impl UrlBuilder {
    pub fn from_queries(params: Vec<(&'static str, &str)>) -> Self {
        let mut builder = Self::default();
        for (key, value) in params {
            builder.param(key, value);
        }
        builder
    }
    pub fn param(&mut self, key: &'static str, value: &str) -> &mut Self {
        self.params.push((key, encode(value)));
        self
    }
    /// Each tag is encoded on its own so the separator stays readable
    pub fn tags(&mut self, key: &'static str, query: &SearchQuery) -> &mut Self {
        let value = query
            .tags
            .iter()
            .map(|tag| encode(tag))
            .collect::<Vec<_>>()
            .join(TAG_SEPARATOR);
        self.params.push((key, value));
        self
    }
    pub fn page_size(&mut self, key: &'static str, page_size: usize) -> &mut Self {
        self.params.push((key, page_size.to_string()));
        self
    }
    pub fn build(&self, base_url: &Url) -> Url {
        let mut url = base_url.clone();
        let query = self
            .params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");
        url.set_query(Some(&query));
        url
    }
}

/// Full flickr.photos.search url for a query
pub fn search_url(endpoint: &Url, api_key: &str, query: &SearchQuery) -> Url {
    UrlBuilder::from_queries(vec![("method", SEARCH_METHOD), ("api_key", api_key)])
        .tags("tags", query)
        .param("tag_mode", "all")
        .page_size("per_page", PAGE_SIZE)
        .param("privacy_filter", PUBLIC_PHOTOS)
        .build(endpoint)
}
