//! End-to-end exercise of the editing session lifecycle against a fake
//! service agent: upload, edit, iterate on the result, reset.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use pictor_application::EditingUseCase;
use pictor_core::image::InMemoryImage;
use pictor_core::session::SessionStatus;
use pictor_interaction::{AgentError, EncodedImage, ImageEditAgent, ReplyPart};

struct SequenceAgent {
    replies: Mutex<VecDeque<Vec<ReplyPart>>>,
}

impl SequenceAgent {
    fn new(replies: Vec<Vec<ReplyPart>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
        })
    }
}

#[async_trait::async_trait]
impl ImageEditAgent for SequenceAgent {
    fn description(&self) -> &str {
        "sequence test agent"
    }

    async fn edit(&self, _image: EncodedImage, _prompt: &str) -> Result<Vec<ReplyPart>, AgentError> {
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no reply left"))
    }
}

fn inline(mime_type: &str, data: &str) -> ReplyPart {
    ReplyPart::InlineData {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    }
}

#[tokio::test]
async fn iterative_editing_session_lifecycle() {
    let agent = SequenceAgent::new(vec![
        vec![ReplyPart::Text("done".to_string()), inline("image/png", "Zm9v")],
        vec![inline("image/jpeg", "YmFy")],
    ]);
    let usecase = EditingUseCase::new(agent);

    // First round: upload and edit.
    usecase
        .upload_image(Arc::new(InMemoryImage::new(
            "cat.png",
            "image/png",
            b"cat bytes".to_vec(),
        )))
        .await;
    usecase.set_prompt("add a birthday hat").await;
    usecase.submit().await;

    let snapshot = usecase.snapshot().await;
    assert_eq!(
        snapshot.edited_image.as_deref(),
        Some("data:image/png;base64,Zm9v")
    );
    assert_eq!(snapshot.status, SessionStatus::Ready);

    // Iterate: promote the result and edit again.
    usecase.promote_edited_to_original().await;
    let snapshot = usecase.snapshot().await;
    assert_eq!(snapshot.original_name.as_deref(), Some("edited-image.png"));
    assert!(snapshot.edited_image.is_none());
    assert!(snapshot.prompt.is_empty());

    usecase.set_prompt("now make it golden").await;
    usecase.submit().await;

    let snapshot = usecase.snapshot().await;
    assert_eq!(
        snapshot.edited_image.as_deref(),
        Some("data:image/jpeg;base64,YmFy")
    );
    assert!(snapshot.last_error.is_none());

    // Snapshots serialize with the wire-style field names the UI expects.
    let value = serde_json::to_value(&snapshot).unwrap();
    assert!(value.get("originalName").is_some());
    assert!(value.get("editedImage").is_some());
    assert_eq!(value.get("status").unwrap(), "ready");

    // Reset ends the session.
    usecase.reset().await;
    let snapshot = usecase.snapshot().await;
    assert!(!snapshot.has_original());
    assert!(snapshot.edited_image.is_none());
    assert!(snapshot.prompt.is_empty());
    assert!(snapshot.last_error.is_none());
    assert_eq!(snapshot.status, SessionStatus::Idle);
}
