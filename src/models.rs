use std::sync::Arc;

use image::DynamicImage;
use serde::Serialize;
use strum_macros::Display;

/// A single photo as reported by flickr.photos.search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoResult {
    pub id: String,
    pub title: String,
    pub secret: String,
    pub server: String,
    pub farm: String,
}

impl PhotoResult {
    /// Full size jpeg url built from the static farm template
    pub fn image_url(&self) -> String {
        ImageUrlTemplate::default().render(self)
    }
}

pub const DEFAULT_IMAGE_TEMPLATE: &str =
    "https://farm{farm}.staticflickr.com/{server}/{id}_{secret}.jpg";

/// Url pattern for full size photos with `{farm}`, `{server}`, `{id}`
/// and `{secret}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrlTemplate(pub String);

impl Default for ImageUrlTemplate {
    fn default() -> Self {
        Self(DEFAULT_IMAGE_TEMPLATE.to_owned())
    }
}

impl ImageUrlTemplate {
    pub fn render(&self, photo: &PhotoResult) -> String {
        self.0
            .replace("{farm}", &photo.farm)
            .replace("{server}", &photo.server)
            .replace("{id}", &photo.id)
            .replace("{secret}", &photo.secret)
    }
}

impl std::fmt::Display for PhotoResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Photos in the order the service returned them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultSet(pub Vec<PhotoResult>);

impl ResultSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn get(&self, index: usize) -> Option<&PhotoResult> {
        self.0.get(index)
    }
    pub fn iter(&self) -> std::slice::Iter<'_, PhotoResult> {
        self.0.iter()
    }
}

impl From<Vec<PhotoResult>> for ResultSet {
    fn from(photos: Vec<PhotoResult>) -> Self {
        Self(photos)
    }
}

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Placeholder {
    #[strum(serialize = "Loading...")]
    Loading,
    #[strum(serialize = "No matches")]
    NoMatches,
}

/// What the result list is currently showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "entries", rename_all = "snake_case")]
pub enum Listing {
    Empty,
    Placeholder(Placeholder),
    Results(ResultSet),
}

impl Default for Listing {
    fn default() -> Self {
        Listing::Empty
    }
}

impl Listing {
    /// The listing a finished search settles on
    pub fn from_results(results: ResultSet) -> Self {
        if results.is_empty() {
            Listing::Placeholder(Placeholder::NoMatches)
        } else {
            Listing::Results(results)
        }
    }

    pub fn photo(&self, index: usize) -> Option<&PhotoResult> {
        match self {
            Listing::Results(results) => results.get(index),
            _ => None,
        }
    }

    /// Rows as a list box would render them
    pub fn lines(&self) -> Vec<String> {
        match self {
            Listing::Empty => vec![],
            Listing::Placeholder(placeholder) => vec![placeholder.to_string()],
            Listing::Results(results) => results.iter().map(|photo| photo.to_string()).collect(),
        }
    }
}

/// A decoded photo ready to be drawn
#[derive(Debug, Clone)]
pub struct DisplayedImage {
    pub url: String,
    pub image: Arc<DynamicImage>,
}

impl DisplayedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Everything a presenter needs to draw the viewer. The selected index
/// is tracked apart from the listing so either can change on its own
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    pub listing: Listing,
    pub selected: Option<usize>,
    pub image: Option<DisplayedImage>,
}
