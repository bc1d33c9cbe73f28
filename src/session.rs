use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{AbortHandle, AbortRegistration, Abortable};
use log::{debug, info, warn};
use parking_lot::Mutex;
use strum_macros::Display;
use tokio::sync::watch;

use crate::error::ViewerError;
use crate::models::{DisplayState, DisplayedImage, Listing, PhotoResult, Placeholder, ResultSet};
use crate::search::SearchClient;

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Searching,
    Completed,
    Cancelled,
    Failed,
}

/// Asks the user what to do with a search that is still running when
/// a new one starts
#[async_trait]
pub trait CancelPrompt: Send + Sync {
    /// `true` abandons the pending search, `false` lets it finish in the background
    async fn confirm_cancel(&self, pending_query: &str) -> bool;
}

pub struct AlwaysCancel;

#[async_trait]
impl CancelPrompt for AlwaysCancel {
    async fn confirm_cancel(&self, _pending_query: &str) -> bool {
        true
    }
}

pub struct NeverCancel;

#[async_trait]
impl CancelPrompt for NeverCancel {
    async fn confirm_cancel(&self, _pending_query: &str) -> bool {
        false
    }
}

#[derive(Debug)]
pub enum SearchOutcome {
    /// The results are now on display
    Displayed(ResultSet),
    /// A newer search started before this one came back, nothing was touched
    Superseded,
}

struct PendingHandle {
    generation: u64,
    query: String,
    abort: AbortHandle,
}

struct SessionInner {
    generation: u64,
    selection: u64,
    state: SessionState,
    pending: Option<PendingHandle>,
}

impl SessionInner {
    fn transition(&mut self, next: SessionState) {
        debug!("Session #{} {} -> {}", self.generation, self.state, next);
        self.state = next;
    }
}

/// Identifies which selection a decoded image belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionToken {
    generation: u64,
    selection: u64,
}

/// Owns the authoritative search. Every search bumps the generation and
/// only results from the current generation reach the display
pub struct SearchSession {
    client: Arc<SearchClient>,
    prompt: Arc<dyn CancelPrompt>,
    inner: Arc<Mutex<SessionInner>>,
    display: Arc<watch::Sender<DisplayState>>,
}

impl SearchSession {
    pub fn new(client: Arc<SearchClient>, prompt: Arc<dyn CancelPrompt>) -> Self {
        let (display, _) = watch::channel(DisplayState::default());
        Self {
            client,
            prompt,
            inner: Arc::new(Mutex::new(SessionInner {
                generation: 0,
                selection: 0,
                state: SessionState::Idle,
                pending: None,
            })),
            display: Arc::new(display),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn is_pending(&self) -> bool {
        self.inner.lock().pending.is_some()
    }

    /// Snapshot of what should be on screen right now
    pub fn display(&self) -> DisplayState {
        self.display.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.display.subscribe()
    }

    /// Registers a new search and puts the loading placeholder up. The request
    /// itself only runs once the returned [`PendingSearch`] is finished
    pub async fn start_search(&self, query: &str) -> PendingSearch {
        let previous = self
            .inner
            .lock()
            .pending
            .as_ref()
            .map(|pending| (pending.generation, pending.query.clone()));

        let mut cancel_previous = None;
        if let Some((previous_generation, previous_query)) = previous {
            if self.prompt.confirm_cancel(&previous_query).await {
                cancel_previous = Some(previous_generation);
            } else {
                debug!(
                    "Leaving search #{} for [{}] running, its results will be ignored",
                    previous_generation, previous_query
                );
            }
        }

        let (abort, registration) = AbortHandle::new_pair();
        // aborting and bumping the generation happen under one guard so a
        // response that already arrived can't slip in between
        let mut inner = self.inner.lock();
        if let Some(previous_generation) = cancel_previous {
            let still_pending = inner
                .pending
                .as_ref()
                .map_or(false, |p| p.generation == previous_generation);
            if still_pending {
                if let Some(pending) = inner.pending.take() {
                    info!("Cancelling search #{} for [{}]", pending.generation, pending.query);
                    pending.abort.abort();
                    inner.transition(SessionState::Cancelled);
                }
            }
        }
        // finished states rest in Idle before the next search
        if !matches!(inner.state, SessionState::Idle | SessionState::Searching) {
            inner.transition(SessionState::Idle);
        }
        inner.generation += 1;
        let generation = inner.generation;
        inner.transition(SessionState::Searching);
        inner.pending = Some(PendingHandle {
            generation,
            query: query.to_owned(),
            abort,
        });
        self.display.send_replace(DisplayState {
            listing: Listing::Placeholder(Placeholder::Loading),
            selected: None,
            image: None,
        });

        PendingSearch {
            generation,
            query: query.to_owned(),
            client: Arc::clone(&self.client),
            inner: Arc::clone(&self.inner),
            display: Arc::clone(&self.display),
            registration,
        }
    }

    /// Starts a search and waits for it in one go
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, ViewerError> {
        self.start_search(query).await.finish().await
    }

    /// Abandons the pending search without starting another one
    pub fn cancel(&self) -> bool {
        let mut inner = self.inner.lock();
        let pending = match inner.pending.take() {
            Some(pending) => pending,
            None => return false,
        };
        info!("Cancelling search #{} for [{}]", pending.generation, pending.query);
        pending.abort.abort();
        // a response that already arrived must not be applied either
        inner.generation += 1;
        inner.transition(SessionState::Cancelled);
        self.display.send_modify(|display| display.listing = Listing::Empty);
        true
    }

    /// Marks an entry as selected and returns the photo behind it. Placeholders
    /// and out of range indexes select nothing
    pub fn select(&self, index: usize) -> Option<(PhotoResult, SelectionToken)> {
        let mut inner = self.inner.lock();
        let photo = self.display.borrow().listing.photo(index).cloned()?;
        inner.selection += 1;
        let token = SelectionToken {
            generation: inner.generation,
            selection: inner.selection,
        };
        self.display.send_modify(|display| display.selected = Some(index));
        Some((photo, token))
    }

    /// Shows a decoded image unless a newer search or selection happened since
    pub fn show_image(&self, token: &SelectionToken, image: DisplayedImage) -> bool {
        let inner = self.inner.lock();
        if token.generation != inner.generation || token.selection != inner.selection {
            debug!("Dropping image {} for an outdated selection", image.url);
            return false;
        }
        self.display.send_modify(|display| display.image = Some(image));
        true
    }
}

/// A registered search that has not been sent yet. Finishing it can happen
/// on any task
pub struct PendingSearch {
    pub generation: u64,
    pub query: String,
    client: Arc<SearchClient>,
    inner: Arc<Mutex<SessionInner>>,
    display: Arc<watch::Sender<DisplayState>>,
    registration: AbortRegistration,
}

impl PendingSearch {
    pub async fn finish(self) -> Result<SearchOutcome, ViewerError> {
        let PendingSearch {
            generation,
            query,
            client,
            inner,
            display,
            registration,
        } = self;

        let response = Abortable::new(client.search(&query), registration).await;

        let mut inner = inner.lock();
        if inner
            .pending
            .as_ref()
            .map_or(false, |p| p.generation == generation)
        {
            inner.pending = None;
        }

        let result = match response {
            Ok(result) => result,
            Err(_aborted) => {
                debug!("Search #{} for [{}] was aborted", generation, query);
                return Err(ViewerError::UserCancelled);
            }
        };

        if generation != inner.generation {
            match &result {
                Ok(results) => debug!(
                    "Discarding {} results from stale search #{} for [{}]",
                    results.len(),
                    generation,
                    query
                ),
                Err(err) => warn!("Stale search #{} for [{}] failed: {}", generation, query, err),
            }
            return Ok(SearchOutcome::Superseded);
        }

        match result {
            Ok(results) => {
                inner.transition(SessionState::Completed);
                display.send_modify(|display| {
                    display.listing = Listing::from_results(results.clone())
                });
                Ok(SearchOutcome::Displayed(results))
            }
            Err(err) => {
                inner.transition(SessionState::Failed);
                display.send_modify(|display| display.listing = Listing::Empty);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use url::Url;

    fn offline_session() -> SearchSession {
        let endpoint = Url::parse("http://127.0.0.1:9/services/rest/").unwrap();
        let client = SearchClient::new(Arc::new(Client::new()), endpoint, "KEY");
        SearchSession::new(Arc::new(client), Arc::new(AlwaysCancel))
    }

    #[test]
    fn starts_idle_and_empty() {
        let session = offline_session();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.generation(), 0);
        assert_eq!(session.display().listing, Listing::Empty);
        assert!(!session.is_pending());
    }

    #[test]
    fn nothing_to_cancel_or_select_when_idle() {
        let session = offline_session();
        assert!(!session.cancel());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.select(0).is_none());
    }

    #[tokio::test]
    async fn start_shows_loading_placeholder() {
        let session = offline_session();
        let pending = session.start_search("red car").await;
        assert_eq!(pending.generation, 1);
        assert_eq!(session.state(), SessionState::Searching);
        assert!(session.is_pending());
        assert_eq!(session.display().listing.lines(), vec!["Loading..."]);
        // placeholders can't be selected
        assert!(session.select(0).is_none());

        assert!(session.cancel());
        assert_eq!(session.state(), SessionState::Cancelled);
        assert_eq!(session.display().listing, Listing::Empty);
        assert!(matches!(pending.finish().await, Err(ViewerError::UserCancelled)));
    }

    #[tokio::test]
    async fn confirmed_cancel_aborts_before_the_next_generation() {
        let session = offline_session();
        let first = session.start_search("first").await;
        let second = session.start_search("second").await;

        assert_eq!(second.generation, 2);
        assert_eq!(session.generation(), 2);
        assert_eq!(session.state(), SessionState::Searching);
        assert!(session.is_pending());
        // never polled before the cancel, so it can't have applied anything
        assert!(matches!(first.finish().await, Err(ViewerError::UserCancelled)));
        assert_eq!(session.display().listing.lines(), vec!["Loading..."]);
        assert!(session.cancel());
    }
}
