//! Add-recipe form controller.
//!
//! Watches the video-link field and, once the user stops typing, sends a
//! recognized link through the relay and folds the reply into the draft.
//! Manual editing is never blocked while an extraction runs.

mod debounce;

pub use debounce::Debouncer;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::client::{HttpRelayClient, RelaySender};
use crate::config::ClientConfig;
use crate::error::RecipeLinkError;
use crate::model::{Category, Country, DraftError, RecipeDraft, RecipeRecord};
use crate::parser::{extract_fields, ParseOutcome};
use crate::store::RecipeStore;

/// Host fragments of the video platforms extraction works for
pub const SUPPORTED_HOSTS: [&str; 4] = ["tiktok.com", "youtube.com", "youtu.be", "instagram.com"];

pub fn is_supported_video_url(url: &str) -> bool {
    SUPPORTED_HOSTS.iter().any(|host| url.contains(host))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Error,
}

/// User-facing message emitted by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    fn new(kind: NotificationKind, title: &str, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.into(),
        }
    }
}

/// Everything the form renders from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub draft: RecipeDraft,
    /// Set when extraction filled the draft; the form hides row editing then
    pub auto_filled: bool,
    /// Relay calls that have not answered yet
    pub in_flight: u32,
}

impl FormState {
    pub fn is_extracting(&self) -> bool {
        self.in_flight > 0
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Please sign in to add recipes")]
    Unauthenticated,

    #[error(transparent)]
    Invalid(#[from] DraftError),

    #[error("Failed to add recipe: {0}")]
    Store(#[from] RecipeLinkError),
}

pub struct ExtractionController {
    relay: Arc<dyn RelaySender>,
    state: Arc<watch::Sender<FormState>>,
    notifier: mpsc::UnboundedSender<Notification>,
    debouncer: Debouncer,
}

impl ExtractionController {
    /// Creates a controller with an empty draft, plus the stream of notifications it emits
    pub fn new(
        relay: Arc<dyn RelaySender>,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (notifier, notifications) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(FormState::default());

        let controller = Self {
            relay,
            state: Arc::new(state),
            notifier,
            debouncer: Debouncer::new(debounce),
        };
        (controller, notifications)
    }

    /// Controller talking to the relay configured in `config`
    pub fn from_config(config: &ClientConfig) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        Self::new(
            Arc::new(HttpRelayClient::new(config)),
            Duration::from_millis(config.debounce_ms),
        )
    }

    pub fn state(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn draft(&self) -> RecipeDraft {
        self.state.borrow().draft.clone()
    }

    pub fn is_auto_filled(&self) -> bool {
        self.state.borrow().auto_filled
    }

    pub fn is_extracting(&self) -> bool {
        self.state.borrow().is_extracting()
    }

    /// Observes every state transition
    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    /// Handles a change of the video-link field
    pub fn set_video_url(&mut self, url: &str) {
        if url.is_empty() {
            self.clear_video_url();
            return;
        }

        edit(&self.state, |draft| draft.with_video_url(url));

        let relay = self.relay.clone();
        let state = self.state.clone();
        let notifier = self.notifier.clone();
        let url = url.to_string();
        debug!(
            "Link changed, extracting in {:?} unless it changes again",
            self.debouncer.delay()
        );
        self.debouncer
            .schedule(move || extract(relay, state, notifier, url));
    }

    /// Empties the link field and blanks what extraction fills in
    pub fn clear_video_url(&mut self) {
        self.debouncer.cancel();
        self.state.send_modify(|form| {
            form.draft = std::mem::take(&mut form.draft).cleared();
            form.auto_filled = false;
        });
        debug!("Link cleared, draft reset");
    }

    pub fn set_title(&self, title: &str) {
        edit(&self.state, |draft| draft.with_title(title));
    }

    pub fn set_category(&self, category: Option<Category>) {
        edit(&self.state, |draft| draft.with_category(category));
    }

    pub fn set_country(&self, country: Option<Country>) {
        edit(&self.state, |draft| draft.with_country(country));
    }

    pub fn add_ingredient(&self) {
        edit(&self.state, RecipeDraft::add_ingredient);
    }

    pub fn remove_ingredient(&self, index: usize) {
        edit(&self.state, |draft| draft.remove_ingredient(index));
    }

    pub fn update_ingredient(&self, index: usize, value: &str) {
        edit(&self.state, |draft| draft.update_ingredient(index, value));
    }

    pub fn add_step(&self) {
        edit(&self.state, RecipeDraft::add_step);
    }

    pub fn remove_step(&self, index: usize) {
        edit(&self.state, |draft| draft.remove_step(index));
    }

    pub fn update_step(&self, index: usize, value: &str) {
        edit(&self.state, |draft| draft.update_step(index, value));
    }

    /// Validates the draft and persists it for `user_id`.
    ///
    /// The store is only called for a complete draft. On success the form
    /// starts over; on failure the draft is kept so it can be resubmitted.
    pub async fn submit(
        &mut self,
        store: &dyn RecipeStore,
        user_id: Option<&str>,
    ) -> Result<RecipeRecord, SubmitError> {
        let Some(user_id) = user_id else {
            self.notify(Notification::new(
                NotificationKind::Error,
                "Authentication Required",
                SubmitError::Unauthenticated.to_string(),
            ));
            return Err(SubmitError::Unauthenticated);
        };

        let record = match self.draft().to_record(user_id) {
            Ok(record) => record,
            Err(e) => {
                self.notify(Notification::new(
                    NotificationKind::Error,
                    "Missing Information",
                    e.to_string(),
                ));
                return Err(e.into());
            }
        };

        if let Err(e) = store.insert(&record).await {
            warn!("Error adding recipe: {}", e);
            self.notify(Notification::new(
                NotificationKind::Error,
                "Error",
                "Failed to add recipe",
            ));
            return Err(e.into());
        }

        self.debouncer.cancel();
        self.state.send_modify(|form| {
            form.draft = RecipeDraft::default();
            form.auto_filled = false;
        });
        info!("Recipe '{}' added", record.title);
        self.notify(Notification::new(
            NotificationKind::Success,
            "Success!",
            "Recipe added successfully",
        ));

        Ok(record)
    }

    fn notify(&self, notification: Notification) {
        // Nobody listening is fine
        let _ = self.notifier.send(notification);
    }
}

fn edit(state: &watch::Sender<FormState>, f: impl FnOnce(RecipeDraft) -> RecipeDraft) {
    state.send_modify(|form| {
        form.draft = f(std::mem::take(&mut form.draft));
    });
}

/// Runs once the debounce window for `url` has elapsed
async fn extract(
    relay: Arc<dyn RelaySender>,
    state: Arc<watch::Sender<FormState>>,
    notifier: mpsc::UnboundedSender<Notification>,
    url: String,
) {
    if !is_supported_video_url(&url) {
        debug!("Not a supported video link, skipping extraction: {}", url);
        return;
    }

    state.send_modify(|form| form.in_flight += 1);
    info!("Extracting recipe from {}", url);
    let result = relay.send(&url).await;

    let current = state.borrow().draft.video_url.clone();
    if current.as_deref() != Some(url.as_str()) {
        debug!("Discarding relay reply for superseded link {}", url);
        state.send_modify(|form| form.in_flight -= 1);
        return;
    }

    let notification = match result {
        Ok(envelope) => match extract_fields(&envelope.response) {
            ParseOutcome::Parsed(fields) => {
                state.send_modify(|form| {
                    form.draft = std::mem::take(&mut form.draft).merge(&fields);
                    form.auto_filled = true;
                    form.in_flight -= 1;
                });
                Notification::new(
                    NotificationKind::Success,
                    "Recipe Extracted!",
                    "Recipe details were filled in from the video. Please review and edit as needed.",
                )
            }
            ParseOutcome::Unparsable(_) => {
                state.send_modify(|form| form.in_flight -= 1);
                Notification::new(
                    NotificationKind::Info,
                    "Processing",
                    "The link was sent but no recipe could be read from the reply. Please check and fill in the details manually.",
                )
            }
        },
        Err(e) => {
            warn!("Error sending recipe link: {}", e);
            state.send_modify(|form| form.in_flight -= 1);
            Notification::new(
                NotificationKind::Error,
                "Error",
                "Failed to send recipe link to webhook",
            )
        }
    };

    let _ = notifier.send(notification);
}
