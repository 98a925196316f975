//! Editing session use case.
//!
//! `EditingUseCase` is the single authority over [`Session`] state. All
//! five commands go through it, it is the only caller of the
//! [`ImageEditAgent`], and presentation consumers only ever read
//! snapshots. Submission and promotion failures never propagate out;
//! they are translated into the session's `last_error` field.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use pictor_core::data_uri;
use pictor_core::image::{ImageResource, InMemoryImage};
use pictor_core::session::{Session, SessionSnapshot};
use pictor_interaction::{ImageEditAgent, ReplyPart, encode_image};
use tokio::sync::RwLock;

/// Shown when the service replied without any inline image part.
pub const NO_IMAGE_MESSAGE: &str = "The AI didn't return an image. Try a different prompt.";

/// Shown when the edit request itself failed.
pub const EDIT_FAILED_MESSAGE: &str =
    "An error occurred while editing the image. Please try again.";

/// Shown when an edited image could not be materialized as a new original.
pub const PROMOTE_FAILED_MESSAGE: &str =
    "Could not use the edited image as a new source. Please try downloading and re-uploading it.";

/// Name given to images promoted from a previous edit result.
const PROMOTED_IMAGE_NAME: &str = "edited-image.png";

/// Single authority over one live editing session.
///
/// The session lives behind an async `RwLock`; the lock is never held
/// across a suspension point, so mutations are applied atomically at the
/// start of a submission, when it settles, and on reset. A session epoch
/// detects completions that were abandoned by a reset or a new upload:
/// their write-back becomes a silent no-op instead of resurrecting stale
/// state.
pub struct EditingUseCase {
    agent: Arc<dyn ImageEditAgent>,
    session: RwLock<Session>,
    epoch: AtomicU64,
}

impl EditingUseCase {
    pub fn new(agent: Arc<dyn ImageEditAgent>) -> Self {
        Self {
            agent,
            session: RwLock::new(Session::new()),
            epoch: AtomicU64::new(0),
        }
    }

    /// Read-only view of the current session state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.read().await.snapshot()
    }

    /// Makes `image` the new original and clears everything derived from
    /// the previous one.
    ///
    /// Always accepted. If a submission is in flight it is abandoned: the
    /// session returns to idle now and the late completion is discarded.
    pub async fn upload_image(&self, image: Arc<dyn ImageResource>) {
        self.epoch.fetch_add(1, Ordering::SeqCst);

        let mut session = self.session.write().await;
        session.original_image = Some(image);
        session.edited_image = None;
        session.last_error = None;
        session.prompt.clear();
        session.submitting = false;
    }

    pub async fn set_prompt(&self, prompt: impl Into<String>) {
        self.session.write().await.prompt = prompt.into();
    }

    /// Submits the current original and prompt to the generation service.
    ///
    /// A no-op unless an original is present, the prompt is non-empty, and
    /// no submission is already in flight. The outcome lands either in
    /// `edited_image` or in `last_error`, never both.
    pub async fn submit(&self) {
        let (image, prompt, token) = {
            let mut session = self.session.write().await;
            let Some(image) = session.original_image.clone() else {
                return;
            };
            if session.prompt.is_empty() || session.submitting {
                return;
            }

            session.submitting = true;
            session.last_error = None;
            session.edited_image = None;

            let token = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            (image, session.prompt.clone(), token)
        };

        let encoded = encode_image(image.as_ref()).await;
        let outcome = self.agent.edit(encoded, &prompt).await;

        let mut session = self.session.write().await;
        if self.epoch.load(Ordering::SeqCst) != token {
            tracing::debug!("discarding stale edit completion (epoch {token})");
            return;
        }

        match outcome {
            Ok(parts) => match first_inline_image(&parts) {
                Some((mime_type, data)) => {
                    session.edited_image = Some(data_uri::build(mime_type, data));
                }
                None => {
                    session.last_error = Some(NO_IMAGE_MESSAGE.to_string());
                }
            },
            Err(err) => {
                tracing::error!("image edit request failed: {err}");
                session.last_error = Some(EDIT_FAILED_MESSAGE.to_string());
            }
        }

        session.submitting = false;
    }

    /// Clears the whole session back to its initial values.
    ///
    /// An in-flight submission is abandoned, not cancelled; the epoch bump
    /// guarantees its late completion cannot resurrect state.
    pub async fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.session.write().await.reset();
    }

    /// Turns the current edit result into the new original, so the next
    /// edit iterates on it.
    ///
    /// A no-op without an edited image. When the edited reference cannot be
    /// materialized back into bytes, existing state is left untouched and
    /// `last_error` advises a manual download/re-upload instead.
    pub async fn promote_edited_to_original(&self) {
        let (uri, token) = {
            let session = self.session.read().await;
            let Some(uri) = session.edited_image.clone() else {
                return;
            };
            (uri, self.epoch.load(Ordering::SeqCst))
        };

        let materialized = data_uri::decode(&uri)
            .map(|(mime_type, bytes)| InMemoryImage::new(PROMOTED_IMAGE_NAME, mime_type, bytes));

        let mut session = self.session.write().await;
        if self.epoch.load(Ordering::SeqCst) != token {
            tracing::debug!("discarding stale promotion (epoch {token})");
            return;
        }

        match materialized {
            Ok(image) => {
                session.original_image = Some(Arc::new(image));
                session.edited_image = None;
                session.prompt.clear();
                session.last_error = None;
            }
            Err(err) => {
                tracing::error!("failed to materialize edited image: {err}");
                session.last_error = Some(PROMOTE_FAILED_MESSAGE.to_string());
            }
        }
    }
}

/// Returns the first part in service order that carries inline image data.
fn first_inline_image(parts: &[ReplyPart]) -> Option<(&str, &str)> {
    parts.iter().find_map(|part| match part {
        ReplyPart::InlineData { mime_type, data } => Some((mime_type.as_str(), data.as_str())),
        ReplyPart::Text(_) => None,
    })
}
