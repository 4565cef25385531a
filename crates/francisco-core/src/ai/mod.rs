pub mod mistral;

pub use mistral::{CompletionSettings, MistralClient};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CompletionError;
use crate::state::ChatMessage;

/// What came back from a successful completion call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionReply {
    /// False when the body had no `choices` list at all (missing or null).
    pub has_choices: bool,
    /// The first choice's `message` object, exactly as the API sent it.
    pub message: Option<Value>,
}

impl CompletionReply {
    /// Non-empty text of the first message, if any.
    pub fn content(&self) -> Option<&str> {
        self.message
            .as_ref()?
            .get("content")?
            .as_str()
            .filter(|content| !content.is_empty())
    }
}

/// Something that turns a message list into a generated reply.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<CompletionReply, CompletionError>;
}
