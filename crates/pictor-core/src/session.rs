//! Editing session domain model.
//!
//! This module contains the core Session entity that represents one live
//! image-editing session. It is owned exclusively by the application-layer
//! controller; presentation code only ever sees a [`SessionSnapshot`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::image::ImageResource;

/// Observable status of a session.
///
/// `Submitting` is the only transient state; `Ready` is simply "idle with an
/// edited image available" and is derived rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Submitting,
    Ready,
}

/// Represents one live editing session.
///
/// This is the "pure" model that the controller mutates through its
/// commands. It carries no behavior beyond construction, reset, and
/// snapshotting.
pub struct Session {
    /// The image the next edit will be applied to.
    pub original_image: Option<Arc<dyn ImageResource>>,
    /// The last edit result as a base64 data URI.
    pub edited_image: Option<String>,
    /// Free-text description of the desired edit.
    pub prompt: String,
    /// Whether a submission is currently in flight.
    pub submitting: bool,
    /// User-facing message from the last failed operation.
    pub last_error: Option<String>,
}

impl Session {
    /// Creates a session with every field at its initial value.
    pub fn new() -> Self {
        Self {
            original_image: None,
            edited_image: None,
            prompt: String::new(),
            submitting: false,
            last_error: None,
        }
    }

    /// Returns all fields to their initial values.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn status(&self) -> SessionStatus {
        if self.submitting {
            SessionStatus::Submitting
        } else if self.edited_image.is_some() {
            SessionStatus::Ready
        } else {
            SessionStatus::Idle
        }
    }

    /// Produces a read-only view for presentation consumers.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            original_name: self
                .original_image
                .as_ref()
                .map(|image| image.name().to_string()),
            original_mime_type: self
                .original_image
                .as_ref()
                .map(|image| image.mime_type().to_string()),
            edited_image: self.edited_image.clone(),
            prompt: self.prompt.clone(),
            status: self.status(),
            last_error: self.last_error.clone(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field(
                "original_image",
                &self.original_image.as_ref().map(|image| image.name()),
            )
            .field("edited_image", &self.edited_image.is_some())
            .field("prompt", &self.prompt)
            .field("status", &self.status())
            .field("last_error", &self.last_error)
            .finish()
    }
}

/// Read-only view of a [`Session`] for the presentation layer.
///
/// Cloned out of the live entity so consumers cannot mutate session state
/// directly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub original_name: Option<String>,
    pub original_mime_type: Option<String>,
    pub edited_image: Option<String>,
    pub prompt: String,
    pub status: SessionStatus,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    pub fn has_original(&self) -> bool {
        self.original_name.is_some()
    }
}
