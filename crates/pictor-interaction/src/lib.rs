//! External generation service layer.
//!
//! Defines the seam between the editing session controller and whatever
//! remote service performs the actual image generation: the
//! [`ImageEditAgent`] trait, the encoded request payload, and the ordered
//! reply parts the controller scans for an image. The one real
//! implementation is [`gemini_image_agent::GeminiImageAgent`].

pub mod gemini_image_agent;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use pictor_core::image::ImageResource;
use thiserror::Error;

pub use gemini_image_agent::GeminiImageAgent;

/// Errors surfaced by an [`ImageEditAgent`].
#[derive(Error, Debug)]
pub enum AgentError {
    /// The agent could not be constructed or could not build its request.
    #[error("Agent execution failed: {0}")]
    ExecutionFailed(String),

    /// The remote service rejected or failed the request.
    #[error("Service request failed: {message}")]
    Process {
        status_code: Option<u16>,
        message: String,
    },

    /// Anything else (malformed response body, transport glue).
    #[error("{0}")]
    Other(String),
}

/// An image payload in the self-describing wire form the service expects:
/// base64 text plus the declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: String,
    pub mime_type: String,
}

/// One fragment of a service reply, in the order the service returned it.
///
/// Replies are heterogeneous; the controller only cares about the first
/// inline-data part, but text parts are preserved so callers can log or
/// display them if they choose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyPart {
    Text(String),
    InlineData { mime_type: String, data: String },
}

/// Adapter over a remote image-generation service.
///
/// Implementations take an encoded image and an edit instruction and return
/// the ordered reply parts. An image-less (even empty) reply is `Ok` — the
/// caller decides what a missing image means.
#[async_trait::async_trait]
pub trait ImageEditAgent: Send + Sync {
    /// One-line description of the backing service, for logs.
    fn description(&self) -> &str;

    async fn edit(&self, image: EncodedImage, prompt: &str) -> Result<Vec<ReplyPart>, AgentError>;
}

/// Encodes an image resource into the wire payload.
///
/// Reading the bytes is the lenient step of submission: an unreadable
/// resource degrades to an empty payload (with the declared media type kept
/// intact) rather than aborting the request. The service's own rejection
/// then surfaces through the normal failure path.
pub async fn encode_image(image: &dyn ImageResource) -> EncodedImage {
    let data = match image.read_bytes().await {
        Ok(bytes) => BASE64_STANDARD.encode(bytes),
        Err(err) => {
            tracing::warn!("failed to read image bytes for encoding: {err}");
            String::new()
        }
    };

    EncodedImage {
        data,
        mime_type: image.mime_type().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pictor_core::PictorError;
    use pictor_core::image::InMemoryImage;

    struct UnreadableImage;

    #[async_trait::async_trait]
    impl ImageResource for UnreadableImage {
        fn name(&self) -> &str {
            "broken.png"
        }

        fn mime_type(&self) -> &str {
            "image/png"
        }

        async fn read_bytes(&self) -> pictor_core::error::Result<Vec<u8>> {
            Err(PictorError::io("simulated read failure"))
        }
    }

    #[tokio::test]
    async fn encodes_bytes_as_standard_base64() {
        let image = InMemoryImage::new("cat.png", "image/png", b"foo".to_vec());
        let encoded = encode_image(&image).await;
        assert_eq!(encoded.data, "Zm9v");
        assert_eq!(encoded.mime_type, "image/png");
    }

    #[tokio::test]
    async fn unreadable_image_degrades_to_empty_payload() {
        let encoded = encode_image(&UnreadableImage).await;
        assert_eq!(encoded.data, "");
        assert_eq!(encoded.mime_type, "image/png");
    }
}
