//! Image resource abstraction.
//!
//! An image resource is an opaque binary image together with its declared
//! media type. The bytes are read asynchronously so that file-backed
//! implementations do not block the runtime.

use std::fmt;

use crate::error::Result;

/// An opaque binary image with a declared media type.
///
/// The media type is whatever the source declares for itself (a file
/// extension mapping, a data URI header). Implementations never sniff the
/// byte content to decide it.
#[async_trait::async_trait]
pub trait ImageResource: Send + Sync {
    /// Display name of the resource (e.g. the original file name).
    fn name(&self) -> &str;

    /// Declared media type, e.g. `image/png`.
    fn mime_type(&self) -> &str;

    /// Reads the full byte content of the resource.
    async fn read_bytes(&self) -> Result<Vec<u8>>;
}

impl fmt::Debug for dyn ImageResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageResource")
            .field("name", &self.name())
            .field("mime_type", &self.mime_type())
            .finish()
    }
}

/// An image resource held entirely in memory.
///
/// Used for images materialized from a previous edit result, and as a
/// convenient fixture in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryImage {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl InMemoryImage {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Returns the raw bytes without going through the async reader.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[async_trait::async_trait]
impl ImageResource for InMemoryImage {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    async fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}
