//! GeminiImageAgent - Direct REST API implementation for Gemini image editing.
//!
//! This agent calls the Gemini REST API directly without CLI dependency.
//! Configuration is loaded from secret.json or the `GEMINI_API_KEY`
//! environment variable.

use pictor_core::secret::SecretService;
use pictor_infrastructure::SecretServiceImpl;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{AgentError, EncodedImage, ImageEditAgent, ReplyPart};

const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Agent implementation that talks to the Gemini HTTP API.
///
/// Requests are sent with both image and text response modalities enabled;
/// the reply parts come back in service order, untouched.
#[derive(Clone)]
pub struct GeminiImageAgent {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiImageAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Loads configuration from the default secret sources.
    ///
    /// Model name defaults to `gemini-2.5-flash-image-preview` if not
    /// specified in secret.json.
    pub async fn try_from_env() -> Result<Self, AgentError> {
        let service = SecretServiceImpl::default().map_err(|e| {
            AgentError::ExecutionFailed(format!("Failed to initialize SecretService: {e}"))
        })?;
        Self::from_secrets(&service).await
    }

    /// Builds an agent from an explicit secret source.
    pub async fn from_secrets(service: &dyn SecretService) -> Result<Self, AgentError> {
        let secret_config = service
            .load_secrets()
            .await
            .map_err(AgentError::ExecutionFailed)?;

        let gemini_config = secret_config.gemini.ok_or_else(|| {
            AgentError::ExecutionFailed("Gemini configuration not found".to_string())
        })?;

        let model = gemini_config
            .model_name
            .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());

        Ok(Self::new(gemini_config.api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(image: &EncodedImage, prompt: &str) -> GenerateContentRequest {
        // Image part first, then the instruction, matching the order the
        // model was tuned for.
        let parts = vec![
            Part::InlineData {
                inline_data: InlineDataPayload {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                },
            },
            Part::Text {
                text: prompt.to_string(),
            },
        ];

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
            },
        }
    }

    async fn send_request(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<Vec<ReplyPart>, AgentError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| AgentError::Process {
                status_code: None,
                message: format!("Gemini API request failed: {err}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| AgentError::Other(format!("Failed to parse Gemini response: {err}")))?;

        Ok(extract_reply_parts(parsed))
    }
}

#[async_trait::async_trait]
impl ImageEditAgent for GeminiImageAgent {
    fn description(&self) -> &str {
        "Gemini API agent for image editing"
    }

    async fn edit(&self, image: EncodedImage, prompt: &str) -> Result<Vec<ReplyPart>, AgentError> {
        let request = Self::build_request(&image, prompt);
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseModalities")]
    response_modalities: Vec<String>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineDataResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataResponse {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

/// Flattens the first candidate into ordered reply parts.
///
/// Parts that carry neither text nor inline data (tool calls, future
/// shapes) are skipped without error, and an image-less reply is simply an
/// empty or text-only vector.
fn extract_reply_parts(response: GenerateContentResponse) -> Vec<ReplyPart> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| {
                    if let Some(inline) = part.inline_data {
                        Some(ReplyPart::InlineData {
                            mime_type: inline.mime_type,
                            data: inline.data,
                        })
                    } else {
                        part.text.map(ReplyPart::Text)
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

fn map_http_error(status: StatusCode, body: String) -> AgentError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    AgentError::Process {
        status_code: Some(status.as_u16()),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_to_the_gemini_wire_format() {
        let image = EncodedImage {
            data: "Zm9v".to_string(),
            mime_type: "image/png".to_string(),
        };
        let request = GeminiImageAgent::build_request(&image, "add a hat");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value.pointer("/contents/0/parts/0/inlineData/mimeType"),
            Some(&json!("image/png"))
        );
        assert_eq!(
            value.pointer("/contents/0/parts/0/inlineData/data"),
            Some(&json!("Zm9v"))
        );
        assert_eq!(
            value.pointer("/contents/0/parts/1/text"),
            Some(&json!("add a hat"))
        );
        assert_eq!(
            value.pointer("/generationConfig/responseModalities"),
            Some(&json!(["IMAGE", "TEXT"]))
        );
    }

    #[test]
    fn reply_parts_preserve_service_order() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your edit"},
                        {"inlineData": {"mimeType": "image/png", "data": "Zm9v"}},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "YmFy"}}
                    ]
                }
            }]
        }))
        .unwrap();

        let parts = extract_reply_parts(response);
        assert_eq!(
            parts,
            vec![
                ReplyPart::Text("Here is your edit".to_string()),
                ReplyPart::InlineData {
                    mime_type: "image/png".to_string(),
                    data: "Zm9v".to_string(),
                },
                ReplyPart::InlineData {
                    mime_type: "image/jpeg".to_string(),
                    data: "YmFy".to_string(),
                },
            ]
        );
    }

    #[test]
    fn missing_candidates_yield_no_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(extract_reply_parts(response).is_empty());
    }

    #[test]
    fn unknown_part_shapes_are_skipped() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"functionCall": {"name": "noop"}},
                        {"text": "still here"}
                    ]
                }
            }]
        }))
        .unwrap();

        let parts = extract_reply_parts(response);
        assert_eq!(parts, vec![ReplyPart::Text("still here".to_string())]);
    }

    #[test]
    fn http_errors_prefer_the_structured_service_message() {
        let body = json!({
            "error": {"code": 400, "message": "bad image", "status": "INVALID_ARGUMENT"}
        })
        .to_string();

        let err = map_http_error(StatusCode::BAD_REQUEST, body);
        match err {
            AgentError::Process {
                status_code,
                message,
            } => {
                assert_eq!(status_code, Some(400));
                assert_eq!(message, "INVALID_ARGUMENT: bad image");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn http_errors_fall_back_to_the_raw_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream blew up".to_string());
        match err {
            AgentError::Process { message, .. } => assert_eq!(message, "upstream blew up"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
