use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use tokio::task::{spawn_blocking, JoinError};

use crate::config::Config;
use crate::error::ViewerError;
use crate::fetch::ImageFetcher;
use crate::models::{DisplayedImage, ImageUrlTemplate, PhotoResult};
use crate::request::{build_client, HttpError};
use crate::search::SearchClient;
use crate::session::{CancelPrompt, SearchSession};
use crate::thumbnail::{decode, ThumbnailGenerator};

/// Result of selecting a photo. Display and thumbnail run side by side and
/// fail independently of each other
#[derive(Debug)]
pub struct SelectionOutcome {
    pub photo: PhotoResult,
    pub display: Result<DisplayedImage, ViewerError>,
    /// false when a newer search or selection made the image irrelevant
    pub shown: bool,
    pub thumbnail: Result<PathBuf, ViewerError>,
}

pub struct Viewer {
    pub session: SearchSession,
    fetcher: ImageFetcher,
    thumbnails: Arc<ThumbnailGenerator>,
    image_template: ImageUrlTemplate,
}

fn flatten<T>(joined: Result<Result<T, ViewerError>, JoinError>) -> Result<T, ViewerError> {
    joined?
}

impl Viewer {
    pub fn new(config: &Config, prompt: Arc<dyn CancelPrompt>) -> Result<Self, HttpError> {
        let client = Arc::new(build_client(config.user_agent.as_deref())?);
        let search = SearchClient::new(Arc::clone(&client), config.endpoint.clone(), &config.api_key);
        Ok(Self {
            session: SearchSession::new(Arc::new(search), prompt),
            fetcher: ImageFetcher::new(client),
            thumbnails: Arc::new(ThumbnailGenerator::new(config.thumbnail.clone())),
            image_template: config.image_template.clone(),
        })
    }

    /// Downloads the selected photo, then decodes it for display and writes
    /// the thumbnail concurrently. `None` when the index names no photo
    pub async fn select(&self, index: usize) -> Result<Option<SelectionOutcome>, ViewerError> {
        let (photo, token) = match self.session.select(index) {
            Some(selected) => selected,
            None => return Ok(None),
        };
        let url = self.image_template.render(&photo);
        let fetched = self.fetcher.fetch(&url).await?;

        // each side decodes its own copy
        let display_bytes = fetched.bytes.clone();
        let thumbnail_bytes = fetched.bytes;
        let thumbnails = Arc::clone(&self.thumbnails);
        let (display, thumbnail) = futures::join!(
            spawn_blocking(move || decode(&display_bytes)),
            spawn_blocking(move || thumbnails.generate(&thumbnail_bytes)),
        );

        let display = flatten(display).map(|image| DisplayedImage {
            url: url.clone(),
            image: Arc::new(image),
        });
        let shown = match &display {
            Ok(image) => self.session.show_image(&token, image.clone()),
            Err(err) => {
                warn!("Could not display {}: {}", url, err);
                false
            }
        };
        let thumbnail = flatten(thumbnail);
        if let Err(err) = &thumbnail {
            warn!("Could not generate thumbnail for {}: {}", url, err);
        }
        info!("Selected [{}] {}", photo.title, url);

        Ok(Some(SelectionOutcome {
            photo,
            display,
            shown,
            thumbnail,
        }))
    }
}
